// ========================================================================================
//
//                       TABLE LOADING, VALIDATION, AND OUTPUT
//
// ========================================================================================
//
// This module is the airlock between delimited text on disk and the typed records the
// pipeline works on. Both input tables are read with Polars, validated against a strict
// schema, and converted into owned records. The output table is written through a
// staging file so a failed run never leaves a truncated result behind.
//
//   - Strict schema: column names are not configurable except for the allele-origin
//     classifier columns. A missing column is a user error named in the message.
//   - Raw values: every column is read as text. Presence flags keep whatever spelling
//     the catalog used; interpreting them is the projector's job.

use log::{debug, info};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

use crate::types::{CircadianGene, Genome, IntervalRecord, PerGenome, SavRecord};

pub const CHROM_COLUMN: &str = "chrom";
pub const POS_COLUMN: &str = "pos";
pub const REF_ALLELE_COLUMN: &str = "ref_allele";
pub const ALT_ALLELE_COLUMN: &str = "alt_allele";
pub const ANNOTATION_COLUMN: &str = "annotation";
pub const GENE_NAME_COLUMN: &str = "GeneName";
pub const GENE_ID_COLUMN: &str = "GeneID";

/// Errors raised while reading either input table.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Could not open '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Error from the underlying Polars DataFrame library while reading '{}': {source}", .path.display())]
    Polars {
        path: PathBuf,
        source: PolarsError,
    },
    #[error(
        "The required column '{column}' was not found in '{}'. Please check spelling and case.",
        .path.display()
    )]
    ColumnNotFound { path: PathBuf, column: String },
    #[error(
        "Missing value in the required column '{column}' of '{}' at data row {row}.",
        .path.display()
    )]
    MissingValues {
        path: PathBuf,
        column: String,
        row: usize,
    },
    #[error(
        "Invalid position '{value}' in column 'pos' of '{}' at data row {row}. Positions must be 1-based integers.",
        .path.display()
    )]
    InvalidPosition {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

/// Errors raised while writing the output table.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Could not write output table '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not serialize output table '{}': {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

// ========================================================================================
//                                      LOADING
// ========================================================================================

/// Loads the SAV catalog.
///
/// `classifier_columns` holds one label column per configured classifier. The same
/// column may appear more than once; each classifier still gets its own label slot in
/// `SavRecord::origin_labels`.
pub fn load_sav_table(
    path: &Path,
    classifier_columns: &[&str],
) -> Result<Vec<SavRecord>, DataError> {
    let mut required: Vec<&str> = vec![
        CHROM_COLUMN,
        POS_COLUMN,
        REF_ALLELE_COLUMN,
        ALT_ALLELE_COLUMN,
        ANNOTATION_COLUMN,
    ];
    required.extend_from_slice(classifier_columns);
    for genome in Genome::ALL {
        required.push(genome.source_column());
    }

    let table = TextTable::read(path, &required)?;

    let chromosomes = table.required(CHROM_COLUMN)?;
    let positions = table.required(POS_COLUMN)?;
    let ref_alleles = table.optional(REF_ALLELE_COLUMN)?;
    let alt_alleles = table.optional(ALT_ALLELE_COLUMN)?;
    let annotations = table.required(ANNOTATION_COLUMN)?;
    let labels = classifier_columns
        .iter()
        .map(|column| table.optional(column))
        .collect::<Result<Vec<_>, _>>()?;
    let presence_columns =
        PerGenome::try_from_fn(|genome| table.optional(genome.source_column()))?;

    let mut records = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        let position = parse_position(path, row, positions[row])?;
        records.push(SavRecord {
            chromosome: chromosomes[row].to_string(),
            position,
            ref_allele: ref_alleles[row].unwrap_or_default().to_string(),
            alt_allele: alt_alleles[row].unwrap_or_default().to_string(),
            gene_annotation: annotations[row].to_string(),
            origin_labels: labels
                .iter()
                .map(|column| column[row].map(str::to_string))
                .collect(),
            presence: presence_columns.map(|column| column[row].map(str::to_string)),
        });
    }

    info!(
        "Loaded {} SAV records from '{}'.",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Loads the circadian gene list.
pub fn load_circadian_genes(path: &Path) -> Result<Vec<CircadianGene>, DataError> {
    let table = TextTable::read(path, &[GENE_NAME_COLUMN, GENE_ID_COLUMN])?;
    let names = table.required(GENE_NAME_COLUMN)?;
    let ids = table.required(GENE_ID_COLUMN)?;

    let genes: Vec<CircadianGene> = names
        .into_iter()
        .zip(ids)
        .map(|(name, id)| CircadianGene {
            gene_name: name.to_string(),
            gene_id: id.to_string(),
        })
        .collect();

    info!(
        "Loaded {} circadian genes from '{}'.",
        genes.len(),
        path.display()
    );
    Ok(genes)
}

/// A tab-separated table held as text columns, restricted to the columns a caller needs.
struct TextTable<'p> {
    path: &'p Path,
    df: DataFrame,
}

impl<'p> TextTable<'p> {
    fn read(path: &'p Path, required: &[&str]) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // An inference window of zero rows reads every column as a string.
        let df = CsvReader::new(file)
            .with_options(
                CsvReadOptions::default()
                    .with_has_header(true)
                    .with_infer_schema_length(Some(0))
                    .with_parse_options(CsvParseOptions::default().with_separator(b'\t')),
            )
            .finish()
            .map_err(|source| DataError::Polars {
                path: path.to_path_buf(),
                source,
            })?;

        let present: HashSet<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let mut projection: Vec<&str> = Vec::with_capacity(required.len());
        for &column in required {
            if !present.contains(column) {
                return Err(DataError::ColumnNotFound {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                });
            }
            if !projection.contains(&column) {
                projection.push(column);
            }
        }
        debug!(
            "'{}': {} rows, keeping columns {:?}",
            path.display(),
            df.height(),
            projection
        );

        let df = df
            .select(projection.iter().copied())
            .map_err(|source| DataError::Polars {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { path, df })
    }

    fn height(&self) -> usize {
        self.df.height()
    }

    /// Raw cell values of `column`. Null and blank cells are `None`.
    fn optional(&self, column: &str) -> Result<Vec<Option<&str>>, DataError> {
        let values = self
            .df
            .column(column)
            .and_then(|series| series.str())
            .map_err(|source| DataError::Polars {
                path: self.path.to_path_buf(),
                source,
            })?;
        Ok(values
            .into_iter()
            .map(|value| value.filter(|text| !text.trim().is_empty()))
            .collect())
    }

    /// Cell values of a column that must be filled on every row.
    fn required(&self, column: &str) -> Result<Vec<&str>, DataError> {
        self.optional(column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(text) => Ok(text.trim()),
                None => Err(DataError::MissingValues {
                    path: self.path.to_path_buf(),
                    column: column.to_string(),
                    row: row + 1,
                }),
            })
            .collect()
    }
}

fn parse_position(path: &Path, row: usize, raw: &str) -> Result<u64, DataError> {
    match raw.parse::<u64>() {
        Ok(position) if position >= 1 => Ok(position),
        _ => Err(DataError::InvalidPosition {
            path: path.to_path_buf(),
            row: row + 1,
            value: raw.to_string(),
        }),
    }
}

// ========================================================================================
//                                      WRITING
// ========================================================================================

/// Writes the interval table as TSV with a header row, replacing any existing file.
///
/// Rows go to a temporary file in the destination directory, which is renamed over
/// `path` only once every row has been written. A replaced file keeps its permissions;
/// a new one gets the umask-governed mode of any freshly created file.
pub fn write_interval_table(path: &Path, records: &[IntervalRecord]) -> Result<(), WriteError> {
    let io_error = |source: std::io::Error| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source: csv::Error| WriteError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(io_error)?;

    let staging = staging_file(path, directory).map_err(io_error)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(staging.as_file());
        writer
            .write_record(IntervalRecord::header())
            .map_err(csv_error)?;
        for record in records {
            writer.write_record(record.fields()).map_err(csv_error)?;
        }
        writer.flush().map_err(io_error)?;
    }
    staging
        .persist(path)
        .map_err(|persist| io_error(persist.error))?;

    info!("Wrote {} rows to '{}'.", records.len(), path.display());
    Ok(())
}

fn staging_file(path: &Path, directory: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let staging = builder.tempfile_in(directory)?;

    // Anything other than a regular file at `path` is left for `persist` to report.
    if let Some(existing) = fs::metadata(path).ok().filter(|meta| meta.is_file()) {
        staging.as_file().set_permissions(existing.permissions())?;
    }
    Ok(staging)
}
