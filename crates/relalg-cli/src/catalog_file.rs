//! Loads an [`InMemoryCatalog`] from a JSON file.
//!
//! Shape: `{"<relation>": {"columns": [{"name": "a", "data_type": "number"}],
//! "rows": [["1", ...]]}}`. Rows are plain JSON values, matching
//! [`relalg_core::Value`]'s untagged serde representation.

use anyhow::{Context, Result};
use relalg_core::{Column, DataType, InMemoryCatalog, Relation, Tuple};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogFile(HashMap<String, RelationFile>);

#[derive(Debug, Deserialize)]
struct RelationFile {
    columns: Vec<ColumnFile>,
    #[serde(default)]
    rows: Vec<Tuple>,
}

#[derive(Debug, Deserialize)]
struct ColumnFile {
    name: String,
    data_type: DataType,
}

pub fn load_catalog(path: &Path) -> Result<InMemoryCatalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    let parsed: CatalogFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse catalog JSON: {}", path.display()))?;

    let mut catalog = InMemoryCatalog::new();
    for (name, relation) in parsed.0 {
        let schema = relation
            .columns
            .into_iter()
            .map(|c| Column::new(c.name, c.data_type))
            .collect();
        catalog.insert(Relation::new(name, schema).with_rows(relation.rows));
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relalg_core::Catalog;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_a_minimal_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"r": {{"columns": [{{"name": "a", "data_type": "number"}}], "rows": [[1]]}}}}"#
        )
        .unwrap();
        let catalog = load_catalog(file.path()).unwrap();
        let relation = catalog.lookup("r").expect("relation r");
        assert_eq!(relation.schema.len(), 1);
        assert_eq!(relation.rows.len(), 1);
    }
}
