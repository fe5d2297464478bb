use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{LookupEntry, RequirementRow};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;

const COL_ROUTE: &str = "Route";
const COL_SHORT_NAME: &str = "Short Name";
const COL_REGION: &str = "Region";
const COL_LOCO: &str = "Loco";
const COL_REQUIRED_DLC: &str = "Required DLC";

/// Splits a comma-separated requirement field into trimmed, non-empty
/// short-name tokens, preserving order.
pub fn split_requirements(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_lookup_table(path: &Path) -> Result<Vec<LookupEntry>> {
    let mut reader = open_table(path)?;
    let headers = headers(&mut reader, path)?;
    let route = require_column(&headers, COL_ROUTE, path)?;
    let short_name = require_column(&headers, COL_SHORT_NAME, path)?;
    let region = require_column(&headers, COL_REGION, path)?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        entries.push(LookupEntry {
            canonical_name: field(&record, route),
            short_name: field(&record, short_name),
            region: field(&record, region),
        });
    }
    Ok(entries)
}

pub fn load_network_table(path: &Path) -> Result<Vec<RequirementRow>> {
    let mut reader = open_table(path)?;
    let headers = headers(&mut reader, path)?;
    let route = require_column(&headers, COL_ROUTE, path)?;
    let loco = require_column(&headers, COL_LOCO, path)?;
    // The requirement column may be absent entirely; every row then has no
    // requirements.
    let required = headers.iter().position(|name| name == COL_REQUIRED_DLC);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let required_dlcs = required
            .map(|column| split_requirements(&field(&record, column)))
            .unwrap_or_default();
        rows.push(RequirementRow {
            route: field(&record, route),
            locomotive: field(&record, loco),
            required_dlcs,
        });
    }
    Ok(rows)
}

fn open_table(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.is_file() {
        return Err(TableError::FileNotFound(path.to_path_buf()));
    }
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn headers(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> Result<csv::StringRecord> {
    reader
        .headers()
        .map(Clone::clone)
        .map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn require_column(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| TableError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

fn field(record: &csv::StringRecord, column: usize) -> String {
    record.get(column).unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("locograph-{prefix}-{pid}-{nanos}"))
    }

    fn write_table(dir: &Path, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(dir).expect("create temp dir");
        let path = dir.join(name);
        fs::write(&path, content).expect("write table");
        path
    }

    #[test]
    fn split_requirements_trims_and_drops_empty_tokens() {
        assert_eq!(split_requirements("RTB, RTX"), vec!["RTB", "RTX"]);
        assert_eq!(split_requirements(" RTB ,, RTX,"), vec!["RTB", "RTX"]);
        assert!(split_requirements("").is_empty());
        assert!(split_requirements(" , ,").is_empty());
    }

    #[test]
    fn load_lookup_table_reads_named_columns() {
        let dir = unique_temp_dir("lookup");
        let path = write_table(
            &dir,
            "lookup.csv",
            "Route,Short Name,Region\nRouteA,RTA,US\nRouteB,RTB,DE\n",
        );

        let entries = load_lookup_table(&path).expect("load lookup");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].canonical_name, "RouteA");
        assert_eq!(entries[0].short_name, "RTA");
        assert_eq!(entries[1].region, "DE");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_network_table_splits_requirement_field() {
        let dir = unique_temp_dir("network");
        let path = write_table(
            &dir,
            "network.csv",
            "Route,Loco,Required DLC\nRTA,Loco1,\"RTB, RTX\"\nRTB,Loco2,\n",
        );

        let rows = load_network_table(&path).expect("load network");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].route, "RTA");
        assert_eq!(rows[0].locomotive, "Loco1");
        assert_eq!(rows[0].required_dlcs, vec!["RTB", "RTX"]);
        assert!(rows[1].required_dlcs.is_empty());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_network_table_allows_absent_requirement_column() {
        let dir = unique_temp_dir("network-no-req");
        let path = write_table(&dir, "network.csv", "Route,Loco\nRTA,Loco1\n");

        let rows = load_network_table(&path).expect("load network");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].required_dlcs.is_empty());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let dir = unique_temp_dir("missing-col");
        let path = write_table(&dir, "lookup.csv", "Route,Region\nRouteA,US\n");

        let err = load_lookup_table(&path).expect_err("missing column");
        assert!(matches!(
            err,
            TableError::MissingColumn { ref column, .. } if column == "Short Name"
        ));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = unique_temp_dir("nope").join("lookup.csv");
        let err = load_lookup_table(&path).expect_err("missing file");
        assert!(matches!(err, TableError::FileNotFound(_)));
    }
}
