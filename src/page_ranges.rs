use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Compresses page numbers into runs, e.g. `[1, 2, 3, 5, 10]` -> `"1-3, 5, 10"`.
#[must_use]
pub fn format_ranges<I>(pages: I) -> String
where
    I: IntoIterator<Item = u32>,
{
    PageRanges::from_iter(pages).to_string()
}

/// Deduplicated, ascending page set that renders as compressed ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRanges {
    pages: BTreeSet<u32>,
}

impl PageRanges {
    #[must_use]
    pub fn pages(&self) -> Vec<u32> {
        self.pages.iter().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn runs(&self) -> Vec<(u32, u32)> {
        let mut runs: Vec<(u32, u32)> = Vec::new();
        for &page in &self.pages {
            match runs.last_mut() {
                Some((_, end)) if end.checked_add(1) == Some(page) => *end = page,
                _ => runs.push((page, page)),
            }
        }
        runs
    }
}

impl FromIterator<u32> for PageRanges {
    fn from_iter<I: IntoIterator<Item = u32>>(pages: I) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }
}

impl Display for PageRanges {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, (start, end)) in self.runs().into_iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for PageRanges {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                pages.insert(page);
            }
        }

        Ok(Self { pages })
    }
}
