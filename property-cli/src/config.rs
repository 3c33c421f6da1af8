//! Loading the engine configuration, input record and tax table from disk.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use property_core::{EngineConfig, EngineError, InputRecord};
use property_data::{TaxTableLoader, TaxTableLoaderError};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Engine(#[from] EngineError),

    #[error("tax table: {0}")]
    TaxTable(#[from] TaxTableLoaderError),
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Engine configuration from an optional TOML file, with the tax table
/// optionally replaced from a CSV.
///
/// Fields missing from the file keep their defaults.
pub fn load_engine_config(
    config_path: Option<&Path>,
    tax_table_csv: Option<&Path>,
    table_version: Option<&str>,
) -> Result<EngineConfig, ConfigError> {
    let mut config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading engine configuration");
            read_toml(path)?
        }
        None => EngineConfig::default(),
    };

    if let Some(path) = tax_table_csv {
        let file = File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = TaxTableLoader::read(file)?;
        config.tax_table = TaxTableLoader::select(&tables, table_version)?;
        info!(version = %config.tax_table.version, "using tax table from CSV");
    }

    config.validate()?;
    Ok(config)
}

/// Input record from a TOML file. Missing fields take default values.
pub fn load_input(path: &Path) -> Result<InputRecord, ConfigError> {
    let input: InputRecord = read_toml(path)?;
    input.validate()?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    /// Writes `contents` to a unique temp file and returns its path.
    fn temp_file(
        name: &str,
        contents: &str,
    ) -> PathBuf {
        let path = std::env::temp_dir().join(format!("propcalc-{}-{name}", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    // =========================================================================
    // engine config
    // =========================================================================

    #[test]
    fn no_files_gives_default_config() {
        assert_eq!(
            load_engine_config(None, None, None).unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn partial_toml_overrides_only_listed_fields() {
        let path = temp_file(
            "partial.toml",
            "appreciation_pct = 7\nwealth_horizon_months = 120\n",
        );

        let config = load_engine_config(Some(&path), None, None).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.appreciation_pct, dec!(7));
        assert_eq!(config.wealth_horizon_months, 120);
        assert_eq!(config.savings_horizon_months, 600);
    }

    #[test]
    fn invalid_config_values_are_rejected() {
        let path = temp_file("invalid.toml", "savings_horizon_months = 0\n");

        let result = load_engine_config(Some(&path), None, None);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Engine(_))));
    }

    #[test]
    fn malformed_toml_names_the_file() {
        let path = temp_file("malformed.toml", "appreciation_pct = = 7\n");

        let err = load_engine_config(Some(&path), None, None).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("malformed.toml"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = load_engine_config(Some(Path::new("/nonexistent/engine.toml")), None, None);

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn tax_table_csv_replaces_builtin_table() {
        let path = temp_file(
            "tables.csv",
            "version,kind,threshold,rate,base\n\
             flat,bracket,0,20,0\n\
             flat,rebate,,,1000\n",
        );

        let config = load_engine_config(None, Some(&path), Some("flat")).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.tax_table.version, "flat");
        assert_eq!(config.tax_table.rebate, dec!(1000));
    }

    #[test]
    fn unknown_table_version_is_rejected() {
        let path = temp_file(
            "one-table.csv",
            "version,kind,threshold,rate,base\nv1,bracket,0,20,0\nv1,rebate,,,0\n",
        );

        let result = load_engine_config(None, Some(&path), Some("v2"));
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(ConfigError::TaxTable(TaxTableLoaderError::VersionNotFound(_)))
        ));
    }

    // =========================================================================
    // input record
    // =========================================================================

    #[test]
    fn input_toml_fills_missing_fields_with_defaults() {
        let path = temp_file(
            "input.toml",
            "house_price = 1800000\nmonthly_savings = 12000\n",
        );

        let input = load_input(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(input.house_price, dec!(1800000));
        assert_eq!(input.monthly_savings, Some(dec!(12000)));
        assert_eq!(input.down_payment, InputRecord::default().down_payment);
    }

    #[test]
    fn input_with_zero_exchange_rate_is_rejected() {
        let path = temp_file("bad-input.toml", "exchange_rate = 0\n");

        let result = load_input(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Engine(_))));
    }
}
