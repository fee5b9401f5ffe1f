//! # Run Configuration
//!
//! Every path and policy the pipeline depends on lives in `PipelineConfig`, which is
//! handed to `pipeline::run` explicitly. A run with no configuration at all uses the
//! defaults below, which point at the `../data/` layout the catalog is distributed in.
//!
//! Configuration can be read from a TOML file; any field left out keeps its default.

use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::ARCHAIC_SPECIFIC_LABEL;

pub const DEFAULT_SAVS_PATH: &str = "../data/raw_SpliceAI_circadian_SAVs.tsv";
pub const DEFAULT_CIRCADIAN_GENES_PATH: &str = "../data/circadian_genes.list";
pub const DEFAULT_OUTPUT_PATH: &str = "../data/circadian_variants_sav.tsv";

/// Column holding the Vernot et al. allele-origin classification.
pub const VERNOT_ORIGIN_COLUMN: &str = "Vernot_allele_origin";

/// What to do with rows whose chromosome is not one of chr1..chr22, chrX, chrY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownChromosomePolicy {
    /// Keep the rows after chrY, ordered by chromosome name and then Start.
    #[default]
    SortLast,
    /// Remove the rows from the output.
    Drop,
    /// Abort the run.
    Error,
}

/// An allele-origin classification method and the column that carries its labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OriginClassifier {
    pub name: String,
    pub column: String,
}

impl OriginClassifier {
    pub fn new(name: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Genome-wide SAV catalog (TSV).
    pub savs: PathBuf,
    /// Curated circadian gene list (TSV with `GeneName` and `GeneID`).
    pub circadian_genes: PathBuf,
    /// Destination of the interval table. Overwritten if it exists.
    pub output: PathBuf,
    /// Label that marks an allele as archaic-specific.
    pub archaic_label: String,
    /// A row is kept if any of these classifiers assigns it `archaic_label`.
    pub classifiers: Vec<OriginClassifier>,
    pub unknown_chromosomes: UnknownChromosomePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            savs: PathBuf::from(DEFAULT_SAVS_PATH),
            circadian_genes: PathBuf::from(DEFAULT_CIRCADIAN_GENES_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            archaic_label: ARCHAIC_SPECIFIC_LABEL.to_string(),
            // The catalog only ships Vernot labels, so the Browning classifier reads
            // the same column until a dedicated one is supplied.
            classifiers: vec![
                OriginClassifier::new("vernot", VERNOT_ORIGIN_COLUMN),
                OriginClassifier::new("browning", VERNOT_ORIGIN_COLUMN),
            ],
            unknown_chromosomes: UnknownChromosomePolicy::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read configuration file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("At least one allele-origin classifier must be configured.")]
    NoClassifiers,
    #[error("The archaic label must not be empty.")]
    EmptyArchaicLabel,
    #[error("Classifier '{0}' has an empty column name.")]
    EmptyClassifierColumn(String),
}

impl PipelineConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archaic_label.trim().is_empty() {
            return Err(ConfigError::EmptyArchaicLabel);
        }
        if self.classifiers.is_empty() {
            return Err(ConfigError::NoClassifiers);
        }
        if let Some(classifier) = self.classifiers.iter().find(|c| c.column.trim().is_empty()) {
            return Err(ConfigError::EmptyClassifierColumn(classifier.name.clone()));
        }
        Ok(())
    }

    /// The label column of each classifier, in classifier order. May repeat.
    pub fn classifier_columns(&self) -> Vec<&str> {
        self.classifiers.iter().map(|c| c.column.as_str()).collect()
    }
}
