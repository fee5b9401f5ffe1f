// ========================================================================================
//
//                     CORE DATA TYPES FOR THE EXTRACTION PIPELINE
//
// ========================================================================================
//
// This module is the canonical dictionary for the records that cross stage boundaries
// (`io`, `filter`, `normalize`, `join`, `project`, `sort`). Each stage owns its logic
// but never its neighbours' types, so the dependency graph stays one-way.
//
// This file is ONLY for types that are shared between files.

use std::fmt;
use std::ops::Index;

/// The label an allele-origin classifier assigns to archaic-specific alleles.
pub const ARCHAIC_SPECIFIC_LABEL: &str = "archaic-specific";

/// Suffix carried by the raw per-genome presence columns of the SAV catalog.
pub const GENOME_FLAG_SUFFIX: &str = "_gt_boolean";

// ========================================================================================
//                                 ARCHAIC GENOMES
// ========================================================================================

/// The four high-coverage archaic genomes reported in the SAV catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genome {
    Altai,
    Vindija,
    Chagyrskaya,
    Denisovan,
}

impl Genome {
    /// Output column order.
    pub const ALL: [Genome; 4] = [
        Genome::Altai,
        Genome::Vindija,
        Genome::Chagyrskaya,
        Genome::Denisovan,
    ];

    /// Name of the raw presence column in the SAV catalog.
    pub const fn source_column(self) -> &'static str {
        match self {
            Genome::Altai => "altai_gt_boolean",
            Genome::Vindija => "vindija_gt_boolean",
            Genome::Chagyrskaya => "chagyrskaya_gt_boolean",
            Genome::Denisovan => "denisovan_gt_boolean",
        }
    }

    /// Name of the encoded column in the output table, e.g. `Altai`.
    pub fn output_column(self) -> String {
        canonical_genome_column(self.source_column())
    }

    const fn slot(self) -> usize {
        match self {
            Genome::Altai => 0,
            Genome::Vindija => 1,
            Genome::Chagyrskaya => 2,
            Genome::Denisovan => 3,
        }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output_column())
    }
}

/// Strips the presence-column suffix and capitalizes what remains.
///
/// `"altai_gt_boolean"` becomes `"Altai"`. Only the first character is upper-cased;
/// the rest is lower-cased, so `"VINDIJA_gt_boolean"` also becomes `"Vindija"`.
pub fn canonical_genome_column(raw: &str) -> String {
    let stem = raw.strip_suffix(GENOME_FLAG_SUFFIX).unwrap_or(raw);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// One value per archaic genome, stored in `Genome::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerGenome<T>([T; 4]);

impl<T> PerGenome<T> {
    /// Builds the container by asking `f` for each genome in output order.
    pub fn from_fn(mut f: impl FnMut(Genome) -> T) -> Self {
        PerGenome(Genome::ALL.map(&mut f))
    }

    /// Like `from_fn`, stopping at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Genome) -> Result<T, E>) -> Result<Self, E> {
        let [altai, vindija, chagyrskaya, denisovan] = Genome::ALL;
        Ok(PerGenome([
            f(altai)?,
            f(vindija)?,
            f(chagyrskaya)?,
            f(denisovan)?,
        ]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerGenome<U> {
        PerGenome::from_fn(|genome| f(&self[genome]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Genome, &T)> {
        Genome::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Genome> for PerGenome<T> {
    type Output = T;

    fn index(&self, genome: Genome) -> &T {
        &self.0[genome.slot()]
    }
}

// ========================================================================================
//                                  PIPELINE RECORDS
// ========================================================================================

/// A single row of the genome-wide SAV catalog, as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavRecord {
    pub chromosome: String,
    /// 1-based position; the loader guarantees it is at least 1.
    pub position: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    /// Gene symbol the variant was annotated with.
    pub gene_annotation: String,
    /// One label per configured allele-origin classifier, in classifier order.
    pub origin_labels: Vec<Option<String>>,
    /// Raw presence values, untouched until the projector encodes them.
    pub presence: PerGenome<Option<String>>,
}

/// A row of the curated circadian gene list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircadianGene {
    pub gene_name: String,
    pub gene_id: String,
}

/// A variant reshaped into a half-open `[start, end)` interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVariant {
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub ref_alt: String,
    pub gene_name: String,
    pub presence: PerGenome<Option<String>>,
}

/// A normalized variant that matched a circadian gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedVariant {
    pub variant: NormalizedVariant,
    pub gene_id: String,
}

/// A fully projected output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub ref_alt: String,
    pub gene_id: String,
    pub gene_name: String,
    /// Always exactly 0 or 1.
    pub flags: PerGenome<u8>,
}

impl IntervalRecord {
    /// Header of the output table, in column order.
    pub fn header() -> Vec<String> {
        let mut columns: Vec<String> = ["Chr", "Start", "End", "Ref/Alt", "GeneID", "GeneName"]
            .into_iter()
            .map(str::to_string)
            .collect();
        columns.extend(Genome::ALL.into_iter().map(Genome::output_column));
        columns
    }

    /// Field values in the same order as `header`.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.chr.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.ref_alt.clone(),
            self.gene_id.clone(),
            self.gene_name.clone(),
        ];
        fields.extend(self.flags.iter().map(|(_, flag)| flag.to_string()));
        fields
    }
}

// ========================================================================================
//                                CHROMOSOME ORDERING
// ========================================================================================

/// Number of chromosomes with a defined sort position: chr1..chr22, chrX, chrY.
pub const KNOWN_CHROMOSOMES: u8 = 24;

/// Position of a chromosome in the order chr1, chr2, ..., chr22, chrX, chrY.
///
/// Returns `None` for anything outside that vocabulary, including unprefixed names
/// (`"2"`), zero-padded numbers (`"chr02"`), and other contigs (`"chrM"`).
pub fn chromosome_rank(name: &str) -> Option<u8> {
    let label = name.strip_prefix("chr")?;
    match label {
        "X" => Some(22),
        "Y" => Some(23),
        _ => {
            if label.is_empty()
                || label.starts_with('0')
                || !label.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }
            let number: u8 = label.parse().ok()?;
            (1..=22).contains(&number).then(|| number - 1)
        }
    }
}
