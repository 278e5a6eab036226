use std::path::Path;

use serde_json::{Value, json};

pub fn cell(row_span: u32, col_span: u32, text: &str) -> Value {
    json!({ "row_span": row_span, "col_span": col_span, "text": text })
}

pub fn table(pages: &[u32], grid: Vec<Vec<Value>>) -> Value {
    let prov = pages
        .iter()
        .map(|page| json!({ "page_no": page, "bbox": { "l": 0.0, "t": 0.0, "r": 1.0, "b": 1.0 } }))
        .collect::<Vec<_>>();
    json!({
        "self_ref": "#/tables/0",
        "label": "table",
        "prov": prov,
        "data": {
            "num_rows": grid.len(),
            "num_cols": grid.iter().map(Vec::len).max().unwrap_or(0),
            "grid": grid,
        }
    })
}

/// Writes a docling-style JSON export holding `tables`.
pub fn write_docling_json(path: &Path, tables: Vec<Value>) -> Result<(), Box<dyn std::error::Error>> {
    let document = json!({
        "schema_name": "DoclingDocument",
        "version": "1.0.0",
        "name": path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default(),
        "tables": tables,
    });
    std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
    Ok(())
}
