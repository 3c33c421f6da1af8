use std::collections::BTreeMap;
use std::io::Read;

use property_core::{EngineError, RepositoryError, SnapshotRepository, TaxBracket, TaxTable};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Largest gap, in currency units, tolerated between a bracket's base tax and
/// the tax the previous bracket charges at the same threshold.
pub const CONTINUITY_TOLERANCE: Decimal = Decimal::ONE;

/// Repository keys for stored tables are this prefix followed by the version.
pub const TABLE_KEY_PREFIX: &str = "tax-table/";

/// Errors that can occur when loading tax table data.
#[derive(Debug, Error, PartialEq)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Tax table {version}: bracket row is missing '{field}'")]
    MissingField {
        version: String,
        field: &'static str,
    },

    #[error("Tax table {0} has no rebate row")]
    MissingRebate(String),

    #[error("Tax table {0} has more than one rebate row")]
    DuplicateRebate(String),

    #[error("Tax table {version} is invalid: {source}")]
    InvalidTable {
        version: String,
        source: EngineError,
    },

    #[error(
        "Tax table {version} is discontinuous at {threshold}: expected base tax {expected}, found {actual}"
    )]
    ContinuityGap {
        version: String,
        threshold: Decimal,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("Tax table version '{0}' not found")]
    VersionNotFound(String),

    #[error("No tax tables loaded")]
    Empty,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxTableLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTableLoaderError::CsvParse(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Bracket,
    Rebate,
}

/// A single row from the tax tables CSV file.
///
/// - `version`: table version label (e.g., `2024/25`)
/// - `kind`: `bracket` or `rebate`
/// - `threshold`: annual income where the bracket starts (empty for rebates)
/// - `rate`: marginal rate as a whole percentage (empty for rebates)
/// - `base`: base tax at the threshold, or the rebate amount
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxTableRecord {
    pub version: String,
    pub kind: RowKind,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub threshold: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub rate: Option<Decimal>,
    pub base: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for versioned tax tables.
///
/// Parses CSV rows, groups them into one validated [`TaxTable`] per version,
/// and moves tables in and out of any [`SnapshotRepository`] as JSON.
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse tax table rows from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxTableRecord>, TaxTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxTableRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group rows by version and validate each resulting table.
    ///
    /// Bracket rows may appear in any order; they are sorted by threshold
    /// before validation.
    pub fn build(
        records: &[TaxTableRecord]
    ) -> Result<BTreeMap<String, TaxTable>, TaxTableLoaderError> {
        let mut grouped: BTreeMap<&str, (Vec<TaxBracket>, Option<Decimal>)> = BTreeMap::new();

        for record in records {
            let (brackets, rebate) = grouped.entry(record.version.as_str()).or_default();
            match record.kind {
                RowKind::Bracket => {
                    let missing = |field| TaxTableLoaderError::MissingField {
                        version: record.version.clone(),
                        field,
                    };
                    brackets.push(TaxBracket {
                        threshold: record.threshold.ok_or_else(|| missing("threshold"))?,
                        rate: record.rate.ok_or_else(|| missing("rate"))?,
                        base_tax: record.base,
                    });
                }
                RowKind::Rebate => {
                    if rebate.replace(record.base).is_some() {
                        return Err(TaxTableLoaderError::DuplicateRebate(record.version.clone()));
                    }
                }
            }
        }

        let mut tables = BTreeMap::new();
        for (version, (mut brackets, rebate)) in grouped {
            let rebate =
                rebate.ok_or_else(|| TaxTableLoaderError::MissingRebate(version.to_string()))?;
            brackets.sort_by(|a, b| a.threshold.cmp(&b.threshold));

            let table = TaxTable::new(version, brackets, rebate).map_err(|source| {
                TaxTableLoaderError::InvalidTable {
                    version: version.to_string(),
                    source,
                }
            })?;

            if let Some(&(threshold, expected, actual)) =
                table.continuity_gaps(CONTINUITY_TOLERANCE).first()
            {
                return Err(TaxTableLoaderError::ContinuityGap {
                    version: version.to_string(),
                    threshold,
                    expected,
                    actual,
                });
            }

            debug!(version, brackets = table.brackets.len(), "tax table built");
            tables.insert(version.to_string(), table);
        }

        Ok(tables)
    }

    /// [`parse`](Self::parse) followed by [`build`](Self::build).
    pub fn read<R: Read>(reader: R) -> Result<BTreeMap<String, TaxTable>, TaxTableLoaderError> {
        Self::build(&Self::parse(reader)?)
    }

    /// Pick `version`, or the latest version when `None`.
    ///
    /// Versions order lexically, so `2024/25` is later than `2023/24`.
    pub fn select(
        tables: &BTreeMap<String, TaxTable>,
        version: Option<&str>,
    ) -> Result<TaxTable, TaxTableLoaderError> {
        match version {
            Some(v) => tables
                .get(v)
                .cloned()
                .ok_or_else(|| TaxTableLoaderError::VersionNotFound(v.to_string())),
            None => tables
                .last_key_value()
                .map(|(_, table)| table.clone())
                .ok_or(TaxTableLoaderError::Empty),
        }
    }

    pub fn key(version: &str) -> String {
        format!("{TABLE_KEY_PREFIX}{version}")
    }

    /// Store each table under [`key`](Self::key), replacing any earlier copy.
    ///
    /// Returns the number of tables stored.
    pub async fn store<'a>(
        repo: &dyn SnapshotRepository,
        tables: impl IntoIterator<Item = &'a TaxTable>,
    ) -> Result<usize, TaxTableLoaderError> {
        let mut stored = 0;
        for table in tables {
            let payload = serde_json::to_string(table)
                .map_err(|e| TaxTableLoaderError::Serialization(e.to_string()))?;
            repo.save(&Self::key(&table.version), &payload).await?;
            stored += 1;
        }
        info!(stored, "tax tables stored");
        Ok(stored)
    }

    /// Fetch a stored table by version.
    pub async fn fetch(
        repo: &dyn SnapshotRepository,
        version: &str,
    ) -> Result<TaxTable, TaxTableLoaderError> {
        let payload = repo
            .load(&Self::key(version))
            .await?
            .ok_or_else(|| TaxTableLoaderError::VersionNotFound(version.to_string()))?;
        serde_json::from_str(&payload).map_err(|e| TaxTableLoaderError::Serialization(e.to_string()))
    }

    /// Versions of every stored table, sorted.
    pub async fn stored_versions(
        repo: &dyn SnapshotRepository
    ) -> Result<Vec<String>, TaxTableLoaderError> {
        Ok(repo
            .list_keys()
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(TABLE_KEY_PREFIX).map(str::to_string))
            .collect())
    }
}
