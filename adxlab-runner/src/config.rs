//! Serializable run configuration.
//!
//! A run is described by a small TOML file:
//!
//! ```toml
//! [run]
//! input = "data/prices.csv"
//! period = 14
//!
//! [output]
//! dir = "results"
//! formats = ["csv", "json"]
//!
//! [verify]
//! reference = "data/expected.csv"
//! tolerance = 1e-8
//! ```
//!
//! Everything except `run.input` has a default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use adxlab_core::{OutputColumn, DEFAULT_PERIOD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Absolute tolerance used when comparing against a reference table.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub run: RunSection,

    #[serde(default)]
    pub output: OutputSection,

    /// Present only when the output should be checked against a reference table.
    #[serde(default)]
    pub verify: Option<VerifySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// CSV or Parquet price table.
    pub input: PathBuf,

    /// Wilder smoothing period.
    #[serde(default = "default_period")]
    pub period: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            formats: default_formats(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VerifySection {
    pub reference: PathBuf,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Derived column names to compare; matched case-insensitively.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

impl VerifySection {
    pub fn new(reference: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            tolerance: DEFAULT_TOLERANCE,
            columns: default_columns(),
        }
    }

    /// Resolve the configured names to output columns.
    pub fn output_columns(&self) -> Result<Vec<OutputColumn>, ConfigError> {
        parse_columns(&self.columns)
    }
}

/// Artifact formats for the processed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full table as CSV, empty cells for undefined values.
    Csv,
    /// Full table as Parquet, nulls for undefined values.
    Parquet,
    /// Chart payload (ADX, +DI14, -DI14 by row index).
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" | "pq" => Ok(OutputFormat::Parquet),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected csv, parquet or json)")),
        }
    }
}

fn default_period() -> usize {
    DEFAULT_PERIOD
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Csv]
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_columns() -> Vec<String> {
    OutputColumn::ALL.iter().map(|c| c.name().to_string()).collect()
}

/// Parse derived column names, rejecting unknown ones.
pub fn parse_columns<S: AsRef<str>>(names: &[S]) -> Result<Vec<OutputColumn>, ConfigError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            OutputColumn::from_name(name)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown output column '{name}'")))
        })
        .collect()
}

impl RunConfig {
    /// Config for `input` with default output settings and no verification.
    pub fn new(input: impl Into<PathBuf>, period: usize) -> Self {
        Self {
            run: RunSection {
                input: input.into(),
                period,
            },
            output: OutputSection::default(),
            verify: None,
        }
    }

    pub fn with_output(mut self, dir: impl Into<PathBuf>, formats: Vec<OutputFormat>) -> Self {
        self.output = OutputSection {
            dir: dir.into(),
            formats,
        };
        self
    }

    pub fn with_verify(mut self, verify: VerifySection) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.period == 0 {
            return Err(ConfigError::Invalid("run.period must be >= 1".into()));
        }
        if self.output.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "output.formats must name at least one format".into(),
            ));
        }
        if let Some(verify) = &self.verify {
            if !verify.tolerance.is_finite() || verify.tolerance < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "verify.tolerance must be a non-negative number, got {}",
                    verify.tolerance
                )));
            }
            if verify.columns.is_empty() {
                return Err(ConfigError::Invalid(
                    "verify.columns must name at least one column".into(),
                ));
            }
            verify.output_columns()?;
        }
        Ok(())
    }

    /// BLAKE3 digest of the config's JSON form.
    ///
    /// Two runs with identical configs share a hash.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("config is not serializable: {e}")))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = RunConfig::from_toml_str("[run]\ninput = \"prices.csv\"\n").unwrap();
        assert_eq!(config.run.input, PathBuf::from("prices.csv"));
        assert_eq!(config.run.period, 14);
        assert_eq!(config.output.dir, PathBuf::from("results"));
        assert_eq!(config.output.formats, vec![OutputFormat::Csv]);
        assert!(config.verify.is_none());
    }

    #[test]
    fn full_config_parses() {
        let toml = r#"
            [run]
            input = "data/prices.parquet"
            period = 10

            [output]
            dir = "out"
            formats = ["csv", "parquet", "json"]

            [verify]
            reference = "data/expected.csv"
            tolerance = 1e-6
            columns = ["adx", "+DI14"]
        "#;
        let config = RunConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.run.period, 10);
        assert_eq!(config.output.formats.len(), 3);
        let verify = config.verify.unwrap();
        assert_eq!(verify.tolerance, 1e-6);
        assert_eq!(
            verify.output_columns().unwrap(),
            vec![OutputColumn::Adx, OutputColumn::PlusDi14]
        );
    }

    #[test]
    fn verify_section_defaults_to_every_column() {
        let toml = "[run]\ninput = \"a.csv\"\n[verify]\nreference = \"b.csv\"\n";
        let verify = RunConfig::from_toml_str(toml).unwrap().verify.unwrap();
        assert_eq!(verify.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(verify.output_columns().unwrap(), OutputColumn::ALL.to_vec());
    }

    #[test]
    fn zero_period_is_invalid() {
        let result = RunConfig::from_toml_str("[run]\ninput = \"a.csv\"\nperiod = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_format_is_parse_error() {
        let toml = "[run]\ninput = \"a.csv\"\n[output]\nformats = [\"xlsx\"]\n";
        assert!(matches!(
            RunConfig::from_toml_str(toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn empty_formats_is_invalid() {
        let toml = "[run]\ninput = \"a.csv\"\n[output]\nformats = []\n";
        assert!(matches!(
            RunConfig::from_toml_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_column_is_invalid() {
        let toml = "[run]\ninput = \"a.csv\"\n[verify]\nreference = \"b.csv\"\ncolumns = [\"RSI\"]\n";
        let err = RunConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("RSI"));
    }

    #[test]
    fn negative_tolerance_is_invalid() {
        let config = RunConfig::new("a.csv", 14).with_verify(VerifySection {
            tolerance: -1.0,
            ..VerifySection::new("b.csv")
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_input_is_parse_error() {
        assert!(matches!(
            RunConfig::from_toml_str("[run]\nperiod = 14\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = RunConfig::from_file(Path::new("/nonexistent/adxlab.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn config_hash_deterministic() {
        let config = RunConfig::new("prices.csv", 14);
        let h1 = config.config_hash().unwrap();
        let h2 = config.clone().config_hash().unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn config_hash_changes_with_period() {
        let a = RunConfig::new("prices.csv", 14).config_hash().unwrap();
        let b = RunConfig::new("prices.csv", 20).config_hash().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("parquet".parse::<OutputFormat>(), Ok(OutputFormat::Parquet));
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
