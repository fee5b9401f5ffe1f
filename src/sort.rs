//! Karyotype-order sorting.
//!
//! Rows are ordered by chromosome in the sequence chr1..chr22, chrX, chrY (never
//! lexicographically, which would put chr10 before chr2) and then by Start. Each row
//! gets a rank from `chromosome_rank` and the `(rank, Start)` pairs go through a stable
//! sort, so ties keep their input order.

use log::warn;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::UnknownChromosomePolicy;
use crate::types::{IntervalRecord, KNOWN_CHROMOSOMES, chromosome_rank};

#[derive(Error, Debug)]
pub enum SortError {
    #[error(
        "Chromosome '{chr}' (gene {gene_name}, Start {start}) is outside the supported order chr1..chr22, chrX, chrY."
    )]
    UnknownChromosome {
        chr: String,
        gene_name: String,
        start: u64,
    },
}

/// Sorts `records` by `(chromosome rank, Start)`, applying `policy` to chromosomes
/// without a rank.
pub fn sort_intervals(
    records: Vec<IntervalRecord>,
    policy: UnknownChromosomePolicy,
) -> Result<Vec<IntervalRecord>, SortError> {
    let mut unknown: BTreeSet<String> = BTreeSet::new();
    let mut dropped = 0usize;
    let mut ranked: Vec<(u8, IntervalRecord)> = Vec::with_capacity(records.len());

    for record in records {
        let rank = match chromosome_rank(&record.chr) {
            Some(rank) => rank,
            None => match policy {
                UnknownChromosomePolicy::Error => {
                    return Err(SortError::UnknownChromosome {
                        chr: record.chr,
                        gene_name: record.gene_name,
                        start: record.start,
                    });
                }
                UnknownChromosomePolicy::Drop => {
                    unknown.insert(record.chr);
                    dropped += 1;
                    continue;
                }
                UnknownChromosomePolicy::SortLast => {
                    unknown.insert(record.chr.clone());
                    KNOWN_CHROMOSOMES
                }
            },
        };
        ranked.push((rank, record));
    }

    if !unknown.is_empty() {
        let names: Vec<&str> = unknown.iter().map(String::as_str).collect();
        match policy {
            UnknownChromosomePolicy::Drop => warn!(
                "Dropped {dropped} rows on chromosomes outside chr1..chr22, chrX, chrY: {}",
                names.join(", ")
            ),
            _ => warn!(
                "Placing rows on unrecognised chromosomes after chrY: {}",
                names.join(", ")
            ),
        }
    }

    // Known ranks map to exactly one name, so the name comparison only separates
    // unrecognised chromosomes sharing the trailing rank.
    ranked.sort_by(|(rank_a, a), (rank_b, b)| {
        rank_a
            .cmp(rank_b)
            .then_with(|| a.chr.cmp(&b.chr))
            .then(a.start.cmp(&b.start))
    });

    Ok(ranked.into_iter().map(|(_, record)| record).collect())
}
