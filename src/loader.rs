//! CSV loaders for the territory tables.
//!
//! - index values: `brick,index_value`
//! - distances: `brick,rp1,rp2,...` (one column per representative)
//! - baseline: `brick,rep`

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;
use crate::territory::{Baseline, Territory};

#[derive(Debug, Deserialize)]
struct IndexValueRow {
    brick: u32,
    index_value: f64,
}

#[derive(Debug, Deserialize)]
struct BaselineRow {
    brick: u32,
    rep: u32,
}

/// Distance table as read from disk: rep ids from the header, one row per brick.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    pub reps: Vec<u32>,
    pub rows: Vec<(u32, Vec<f64>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryLoader {
    rep_prefix: String,
}

impl Default for TerritoryLoader {
    fn default() -> Self {
        Self {
            rep_prefix: "rp".to_string(),
        }
    }
}

impl TerritoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header prefix of the representative columns in the distance table.
    pub fn rep_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rep_prefix = prefix.into();
        self
    }

    pub fn index_values_from_reader<Rd: Read>(
        &self,
        rdr: Rd,
    ) -> Result<Vec<(u32, f64)>, LoadError> {
        let mut reader = csv_reader(rdr);
        let mut values = Vec::new();
        for row in reader.deserialize::<IndexValueRow>() {
            let row = row?;
            values.push((row.brick, row.index_value));
        }
        Ok(values)
    }

    pub fn distances_from_reader<Rd: Read>(&self, rdr: Rd) -> Result<DistanceTable, LoadError> {
        let mut reader = csv_reader(rdr);
        let headers = reader.headers()?.clone();

        let mut columns = headers.iter();
        match columns.next() {
            Some("brick") => {}
            Some(other) => return Err(LoadError::UnexpectedColumn(other.to_string())),
            None => return Err(LoadError::NoRepColumns),
        }
        let reps = columns
            .map(|column| {
                column
                    .strip_prefix(self.rep_prefix.as_str())
                    .and_then(|id| id.parse::<u32>().ok())
                    .ok_or_else(|| LoadError::UnexpectedColumn(column.to_string()))
            })
            .collect::<Result<Vec<u32>, LoadError>>()?;
        if reps.is_empty() {
            return Err(LoadError::NoRepColumns);
        }

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for record in reader.records() {
            let record = record?;
            let raw_brick = record.get(0).unwrap_or_default();
            let brick = raw_brick.parse::<u32>().map_err(|_| LoadError::BadValue {
                brick: raw_brick.to_string(),
                column: "brick".to_string(),
                value: raw_brick.to_string(),
            })?;
            if !seen.insert(brick) {
                return Err(LoadError::DuplicateRow {
                    table: "distance",
                    brick,
                });
            }

            let mut distances = Vec::with_capacity(reps.len());
            for (column, raw) in headers.iter().zip(record.iter()).skip(1) {
                let value = raw.parse::<f64>().map_err(|_| LoadError::BadValue {
                    brick: brick.to_string(),
                    column: column.to_string(),
                    value: raw.to_string(),
                })?;
                distances.push(value);
            }
            rows.push((brick, distances));
        }

        Ok(DistanceTable { reps, rows })
    }

    pub fn baseline_from_reader<Rd: Read>(&self, rdr: Rd) -> Result<Baseline<u32, u32>, LoadError> {
        let mut reader = csv_reader(rdr);
        let mut baseline = Baseline::new();
        for row in reader.deserialize::<BaselineRow>() {
            let row = row?;
            if baseline.insert(row.brick, row.rep).is_some() {
                return Err(LoadError::DuplicateRow {
                    table: "baseline",
                    brick: row.brick,
                });
            }
        }
        Ok(baseline)
    }

    /// Builds a territory: bricks in index-table order, reps in distance-header order.
    pub fn territory_from_readers<I: Read, D: Read>(
        &self,
        index_values: I,
        distances: D,
    ) -> Result<Territory<u32, u32>, LoadError> {
        let index_values = self.index_values_from_reader(index_values)?;
        let table = self.distances_from_reader(distances)?;

        let bricks: Vec<u32> = index_values.iter().map(|(brick, _)| *brick).collect();
        let mut territory = Territory::new(bricks, table.reps.clone())?;
        for (brick, value) in index_values {
            territory.set_index_value(brick, value);
        }
        for (brick, row) in table.rows {
            if !territory.contains_brick(&brick) {
                return Err(LoadError::UnindexedBrick(brick));
            }
            for (rep, distance) in table.reps.iter().zip(row) {
                territory.set_distance(brick, *rep, distance);
            }
        }

        debug!(
            bricks = territory.bricks().len(),
            reps = territory.reps().len(),
            "loaded territory"
        );
        Ok(territory)
    }

    pub fn territory_from_paths(
        &self,
        index_values: impl AsRef<Path>,
        distances: impl AsRef<Path>,
    ) -> Result<Territory<u32, u32>, LoadError> {
        self.territory_from_readers(open(index_values.as_ref())?, open(distances.as_ref())?)
    }

    pub fn baseline_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Baseline<u32, u32>, LoadError> {
        self.baseline_from_reader(open(path.as_ref())?)
    }
}

fn csv_reader<Rd: Read>(rdr: Rd) -> csv::Reader<Rd> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    const INDEX: &str = "brick,index_value\n1,0.5\n2,0.25\n3,0.25\n";
    const DISTANCES: &str = "brick,rp1,rp2\n1,1.5,2.0\n2,0.0,3.25\n3,4.0,1.0\n";

    #[test]
    fn test_loads_territory() {
        let territory = TerritoryLoader::new()
            .territory_from_readers(INDEX.as_bytes(), DISTANCES.as_bytes())
            .unwrap();

        assert_eq!(territory.bricks(), &[1, 2, 3]);
        assert_eq!(territory.reps(), &[1, 2]);
        assert_eq!(territory.index_value(&2), Some(0.25));
        assert_eq!(territory.distance(&2, &2), Some(3.25));
        assert_eq!(territory.distance(&3, &1), Some(4.0));
    }

    #[test]
    fn test_trims_whitespace() {
        let index = "brick, index_value\n1, 1.0\n";
        let distances = "brick, rp1\n1, 2.0\n";
        let territory = TerritoryLoader::new()
            .territory_from_readers(index.as_bytes(), distances.as_bytes())
            .unwrap();
        assert_eq!(territory.distance(&1, &1), Some(2.0));
    }

    #[test]
    fn test_rep_ids_come_from_headers() {
        let table = TerritoryLoader::new()
            .distances_from_reader("brick,rp3,rp7\n1,1,2\n".as_bytes())
            .unwrap();
        assert_eq!(table.reps, vec![3, 7]);
        assert_eq!(table.rows, vec![(1, vec![1.0, 2.0])]);
    }

    #[test]
    fn test_custom_rep_prefix() {
        let table = TerritoryLoader::new()
            .rep_prefix("sr")
            .distances_from_reader("brick,sr1,sr2\n1,1,2\n".as_bytes())
            .unwrap();
        assert_eq!(table.reps, vec![1, 2]);
    }

    #[test]
    fn test_rejects_unknown_column() {
        let err = TerritoryLoader::new()
            .distances_from_reader("brick,rp1,notes\n1,1,x\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::UnexpectedColumn(column) if column == "notes"));
    }

    #[test]
    fn test_rejects_table_without_reps() {
        let err = TerritoryLoader::new()
            .distances_from_reader("brick\n1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::NoRepColumns));
    }

    #[test]
    fn test_bad_distance_value_names_cell() {
        let err = TerritoryLoader::new()
            .distances_from_reader("brick,rp1\n4,far\n".as_bytes())
            .unwrap_err();
        match err {
            LoadError::BadValue { brick, column, value } => {
                assert_eq!(brick, "4");
                assert_eq!(column, "rp1");
                assert_eq!(value, "far");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_distance_row_for_unindexed_brick() {
        let err = TerritoryLoader::new()
            .territory_from_readers(INDEX.as_bytes(), "brick,rp1\n9,1.0\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::UnindexedBrick(9)));
    }

    #[test]
    fn test_duplicate_brick_in_index_table() {
        let err = TerritoryLoader::new()
            .territory_from_readers(
                "brick,index_value\n1,1\n1,1\n".as_bytes(),
                DISTANCES.as_bytes(),
            )
            .unwrap_err();
        assert!(matches!(err, LoadError::Data(DataError::DuplicateBrick(_))));
    }

    #[test]
    fn test_duplicate_brick_in_distance_table() {
        let err = TerritoryLoader::new()
            .territory_from_readers(
                "brick,index_value\n1,1.0\n".as_bytes(),
                "brick,rp1\n1,1.0\n1,9.0\n".as_bytes(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateRow {
                table: "distance",
                brick: 1
            }
        ));
    }

    #[test]
    fn test_duplicate_brick_in_baseline() {
        let err = TerritoryLoader::new()
            .baseline_from_reader("brick,rep\n1,1\n1,2\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateRow {
                table: "baseline",
                brick: 1
            }
        ));
    }

    #[test]
    fn test_repeated_baseline_row_is_rejected_even_when_identical() {
        let err = TerritoryLoader::new()
            .baseline_from_reader("brick,rep\n3,2\n3,2\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateRow { brick: 3, .. }));
    }

    #[test]
    fn test_malformed_index_row() {
        let err = TerritoryLoader::new()
            .index_values_from_reader("brick,index_value\n1,heavy\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_loads_baseline() {
        let baseline = TerritoryLoader::new()
            .baseline_from_reader("brick,rep\n1,4\n2,1\n".as_bytes())
            .unwrap();
        assert_eq!(baseline.get(&1), Some(&4));
        assert_eq!(baseline.get(&2), Some(&1));
        assert_eq!(baseline.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = TerritoryLoader::new()
            .baseline_from_path("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
