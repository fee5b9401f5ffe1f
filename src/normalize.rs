//! Reshapes catalog rows into BED-style half-open intervals.
//!
//! A 1-based point annotation at `pos` becomes `[pos - 1, pos)`; the alleles are
//! folded into a single `REF/ALT` field.

use crate::types::{NormalizedVariant, SavRecord};

pub fn normalize(record: SavRecord) -> NormalizedVariant {
    let SavRecord {
        chromosome,
        position,
        ref_allele,
        alt_allele,
        gene_annotation,
        presence,
        ..
    } = record;

    NormalizedVariant {
        chr: chromosome,
        start: position.saturating_sub(1),
        end: position,
        ref_alt: format!("{ref_allele}/{alt_allele}"),
        gene_name: gene_annotation,
        presence,
    }
}

pub fn normalize_all(records: Vec<SavRecord>) -> Vec<NormalizedVariant> {
    records.into_iter().map(normalize).collect()
}
