//! Attaches stable gene identifiers by inner-joining on gene symbol.
//!
//! Variants whose symbol is not in the circadian list are dropped; this is what
//! restricts the genome-wide catalog to circadian genes. A symbol listed more than
//! once yields one row per listing.

use ahash::AHashMap;
use log::{info, warn};

use crate::types::{CircadianGene, JoinedVariant, NormalizedVariant};

/// Gene symbol to gene ids, in gene-list order.
#[derive(Debug, Default)]
pub struct GeneIndex {
    ids_by_name: AHashMap<String, Vec<String>>,
}

impl GeneIndex {
    pub fn new(genes: Vec<CircadianGene>) -> Self {
        let mut ids_by_name: AHashMap<String, Vec<String>> = AHashMap::new();
        for gene in genes {
            ids_by_name
                .entry(gene.gene_name)
                .or_default()
                .push(gene.gene_id);
        }
        let index = Self { ids_by_name };

        let duplicated = index.duplicated_symbols();
        if !duplicated.is_empty() {
            warn!(
                "{} gene symbols appear more than once in the circadian list; matching variants will be emitted once per entry: {}",
                duplicated.len(),
                duplicated.join(", ")
            );
        }
        index
    }

    pub fn gene_ids(&self, gene_name: &str) -> &[String] {
        self.ids_by_name
            .get(gene_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Symbols with more than one entry, sorted.
    pub fn duplicated_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self
            .ids_by_name
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn len(&self) -> usize {
        self.ids_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_name.is_empty()
    }
}

/// Inner join of `variants` against `index` on gene symbol. Variant order is preserved.
pub fn join_gene_ids(variants: Vec<NormalizedVariant>, index: &GeneIndex) -> Vec<JoinedVariant> {
    let total = variants.len();
    let mut joined = Vec::with_capacity(total);
    for variant in variants {
        for gene_id in index.gene_ids(&variant.gene_name) {
            joined.push(JoinedVariant {
                variant: variant.clone(),
                gene_id: gene_id.clone(),
            });
        }
    }

    if index.is_empty() && total > 0 {
        warn!("The circadian gene list is empty; all {total} archaic-specific variants are dropped.");
    } else if joined.is_empty() && total > 0 {
        warn!(
            "None of the {total} archaic-specific variants fall in a circadian gene; the output will be empty."
        );
    } else {
        info!(
            "Gene join matched {} rows from {total} variants across {} circadian genes.",
            joined.len(),
            index.len()
        );
    }
    joined
}
