use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use crate::error::ExtractError;

pub const DEFAULT_Y_THRESHOLD: f64 = 2.5;
pub const DEFAULT_X_THRESHOLD: f64 = 10.0;

/// Which reconstruction algorithm turns entities into tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Cell boundaries come from drawn horizontal and vertical lines.
    #[default]
    Grid,
    /// Rows and columns are inferred from text positions only.
    Cluster,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grid" | "lines" => Ok(Self::Grid),
            "cluster" | "text" => Ok(Self::Cluster),
            other => Err(format!(
                "unknown strategy '{other}', expected 'grid' or 'cluster'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    /// Guesses the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown output format '{other}', expected xlsx, csv or json"
            )),
        }
    }
}

/// Layer names to extract from. DXF layer names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSelection {
    layers: BTreeSet<String>,
}

impl LayerSelection {
    #[must_use]
    pub fn contains(&self, layer: &str) -> bool {
        self.layers.contains(&layer.trim().to_uppercase())
    }
}

impl FromStr for LayerSelection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let layers = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_uppercase)
            .collect::<BTreeSet<_>>();

        if layers.is_empty() {
            return Err("layer selection cannot be empty".to_string());
        }

        Ok(Self { layers })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub strategy: Strategy,
    pub y_threshold: f64,
    pub x_threshold: f64,
    pub layers: Option<LayerSelection>,
    pub include_paper_space: bool,
    pub pad_rows: bool,
    pub delimiter: u8,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Grid,
            y_threshold: DEFAULT_Y_THRESHOLD,
            x_threshold: DEFAULT_X_THRESHOLD,
            layers: None,
            include_paper_space: false,
            pad_rows: false,
            delimiter: b',',
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self) -> Result<(), ExtractError> {
        for (name, value) in [
            ("y_threshold", self.y_threshold),
            ("x_threshold", self.x_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ExtractError::InvalidOption(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if !self.delimiter.is_ascii() {
            return Err(ExtractError::InvalidOption(
                "delimiter must be a single ASCII character".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtractOptions, LayerSelection, OutputFormat, Strategy};
    use std::path::Path;
    use std::str::FromStr;

    #[test]
    fn parse_strategy_names_and_aliases() {
        assert_eq!(Strategy::from_str("grid"), Ok(Strategy::Grid));
        assert_eq!(Strategy::from_str(" Cluster "), Ok(Strategy::Cluster));
        assert_eq!(Strategy::from_str("text"), Ok(Strategy::Cluster));
        let err = Strategy::from_str("ocr").expect_err("unknown strategy should fail");
        assert!(err.contains("unknown strategy"));
    }

    #[test]
    fn infer_output_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/tables.XLSX")),
            Some(OutputFormat::Xlsx)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("tables.csv")),
            Some(OutputFormat::Csv)
        );
        assert_eq!(OutputFormat::from_path(Path::new("tables")), None);
    }

    #[test]
    fn layer_selection_is_case_insensitive() {
        let selection = LayerSelection::from_str("Table, notes ,").expect("selection should parse");
        assert!(selection.contains("TABLE"));
        assert!(selection.contains("Notes"));
        assert!(!selection.contains("0"));
    }

    #[test]
    fn reject_empty_layer_selection() {
        let err = LayerSelection::from_str(" , ").expect_err("empty selection should fail");
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        let options = ExtractOptions {
            x_threshold: f64::NAN,
            ..ExtractOptions::default()
        };
        assert!(options.validate().is_err());

        let options = ExtractOptions {
            y_threshold: -1.0,
            ..ExtractOptions::default()
        };
        assert!(options.validate().is_err());

        assert!(ExtractOptions::default().validate().is_ok());
    }
}
