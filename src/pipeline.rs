// ========================================================================================
//
//                          THE EXTRACTION PIPELINE CONDUCTOR
//
// ========================================================================================
//
// Drives one batch run: load both tables, filter to archaic-specific variants, reshape
// them into intervals, join gene identifiers, project and encode the output columns,
// sort in karyotype order, and write the table. Every stage error aborts the run before
// anything is written.
//
// `extract` is the in-memory core and performs no I/O; `run` wraps it with the loader
// and writer.

use log::{debug, info};
use thiserror::Error;

use crate::config::{ConfigError, PipelineConfig};
use crate::filter::ArchaicFilter;
use crate::io::{self, DataError, WriteError};
use crate::join::{GeneIndex, join_gene_ids};
use crate::normalize::normalize_all;
use crate::project::{genome_counts, project_all};
use crate::sort::{SortError, sort_intervals};
use crate::types::{CircadianGene, IntervalRecord, PerGenome, SavRecord};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Sort(#[from] SortError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Row counts after each stage of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub loaded_variants: usize,
    pub circadian_genes: usize,
    pub archaic_variants: usize,
    pub joined_rows: usize,
    pub written_rows: usize,
    /// Output rows carrying each archaic genome.
    pub genome_rows: PerGenome<usize>,
}

/// The sorted output rows together with the counts that produced them.
#[derive(Debug)]
pub struct Extraction {
    pub records: Vec<IntervalRecord>,
    pub summary: RunSummary,
}

/// Runs the full pipeline described by `config` and writes its output.
pub fn run(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    debug!("Running with configuration: {config:?}");

    let savs = io::load_sav_table(&config.savs, &config.classifier_columns())?;
    let genes = io::load_circadian_genes(&config.circadian_genes)?;

    let Extraction { records, summary } = extract(savs, genes, config)?;
    io::write_interval_table(&config.output, &records)?;
    Ok(summary)
}

/// Transforms loaded tables into sorted output rows.
pub fn extract(
    savs: Vec<SavRecord>,
    genes: Vec<CircadianGene>,
    config: &PipelineConfig,
) -> Result<Extraction, SortError> {
    let loaded_variants = savs.len();
    let circadian_genes = genes.len();

    let archaic = ArchaicFilter::from_config(config).apply(savs);
    let archaic_variants = archaic.len();

    let intervals = normalize_all(archaic);
    let index = GeneIndex::new(genes);
    let joined = join_gene_ids(intervals, &index);
    let joined_rows = joined.len();

    let projected = project_all(joined);
    let records = sort_intervals(projected, config.unknown_chromosomes)?;

    let genome_rows = genome_counts(&records);
    for (genome, count) in genome_rows.iter() {
        info!("{genome}: {count} of {} rows", records.len());
    }

    let summary = RunSummary {
        loaded_variants,
        circadian_genes,
        archaic_variants,
        joined_rows,
        written_rows: records.len(),
        genome_rows,
    };
    Ok(Extraction { records, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownChromosomePolicy;
    use crate::types::Genome;

    fn sav(chrom: &str, pos: u64, gene: &str, origin: &str, altai: &str) -> SavRecord {
        SavRecord {
            chromosome: chrom.to_string(),
            position: pos,
            ref_allele: "A".to_string(),
            alt_allele: "G".to_string(),
            gene_annotation: gene.to_string(),
            origin_labels: vec![Some(origin.to_string()), Some(origin.to_string())],
            presence: PerGenome::from_fn(|genome| {
                Some(if genome == Genome::Altai { altai } else { "False" }.to_string())
            }),
        }
    }

    fn gene(name: &str, id: &str) -> CircadianGene {
        CircadianGene {
            gene_name: name.to_string(),
            gene_id: id.to_string(),
        }
    }

    #[test]
    fn per2_scenario_produces_expected_row() {
        let Extraction { records, summary } = extract(
            vec![sav("chr2", 501, "PER2", "archaic-specific", "True")],
            vec![gene("PER2", "ENSG00000132326")],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].fields().join("\t"),
            "chr2\t500\t501\tA/G\tENSG00000132326\tPER2\t1\t0\t0\t0"
        );
        assert_eq!(summary.written_rows, 1);
        assert_eq!(summary.genome_rows[Genome::Altai], 1);
    }

    #[test]
    fn shared_and_non_circadian_rows_are_excluded() {
        let Extraction { records, summary } = extract(
            vec![
                sav("chr2", 501, "PER2", "shared", "True"),
                sav("chr13", 32_315_474, "BRCA2", "archaic-specific", "True"),
                sav("chr4", 55_435_202, "CLOCK", "archaic-specific", "False"),
            ],
            vec![
                gene("PER2", "ENSG00000132326"),
                gene("CLOCK", "ENSG00000134852"),
            ],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(summary.loaded_variants, 3);
        assert_eq!(summary.archaic_variants, 2);
        assert_eq!(summary.joined_rows, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gene_name, "CLOCK");
        assert_eq!(records[0].gene_id, "ENSG00000134852");
    }

    #[test]
    fn output_is_in_karyotype_order() {
        let genes = vec![
            gene("PER1", "ENSG00000179094"),
            gene("NR1D2", "ENSG00000174738"),
        ];
        let savs = vec![
            sav("chrX", 1000, "PER1", "archaic-specific", "True"),
            sav("chr10", 1000, "NR1D2", "archaic-specific", "True"),
            sav("chr2", 1000, "PER1", "archaic-specific", "True"),
            sav("chr1", 1000, "NR1D2", "archaic-specific", "True"),
            sav("chr2", 10, "PER1", "archaic-specific", "True"),
        ];
        let Extraction { records, .. } =
            extract(savs, genes, &PipelineConfig::default()).unwrap();

        let keys: Vec<(&str, u64)> = records.iter().map(|r| (r.chr.as_str(), r.start)).collect();
        assert_eq!(
            keys,
            [
                ("chr1", 999),
                ("chr2", 9),
                ("chr2", 999),
                ("chr10", 999),
                ("chrX", 999)
            ]
        );
    }

    #[test]
    fn nothing_archaic_is_a_valid_empty_result() {
        let Extraction { records, summary } = extract(
            vec![sav("chr2", 501, "PER2", "shared", "True")],
            vec![gene("PER2", "ENSG00000132326")],
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(records.is_empty());
        assert_eq!(summary.archaic_variants, 0);
        assert_eq!(summary.written_rows, 0);
    }

    #[test]
    fn unknown_chromosome_policy_is_honoured() {
        let config = PipelineConfig {
            unknown_chromosomes: UnknownChromosomePolicy::Error,
            ..PipelineConfig::default()
        };
        let result = extract(
            vec![sav("chrM", 3000, "PER2", "archaic-specific", "True")],
            vec![gene("PER2", "ENSG00000132326")],
            &config,
        );
        assert!(matches!(result, Err(SortError::UnknownChromosome { .. })));
    }
}
