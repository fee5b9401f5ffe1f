//! Projects joined variants onto the fixed output schema and encodes genome presence.
//!
//! Presence values arrive exactly as the catalog spelled them. They are encoded with
//! a total truthiness rule: a value is 1 iff, once trimmed, it is one of `true`, `t`,
//! `yes`, `y` (any case) or a finite non-zero number. Everything else, including an
//! empty or absent value, is 0.

use crate::types::{IntervalRecord, JoinedVariant, PerGenome};

/// The truthiness rule described in the module docs.
pub fn is_truthy(raw: Option<&str>) -> bool {
    let Some(value) = raw.map(str::trim) else {
        return false;
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => true,
        other => other
            .parse::<f64>()
            .is_ok_and(|number| number.is_finite() && number != 0.0),
    }
}

pub fn encode_flag(raw: Option<&str>) -> u8 {
    u8::from(is_truthy(raw))
}

pub fn project(joined: JoinedVariant) -> IntervalRecord {
    let JoinedVariant { variant, gene_id } = joined;
    IntervalRecord {
        flags: variant.presence.map(|raw| encode_flag(raw.as_deref())),
        chr: variant.chr,
        start: variant.start,
        end: variant.end,
        ref_alt: variant.ref_alt,
        gene_id,
        gene_name: variant.gene_name,
    }
}

pub fn project_all(rows: Vec<JoinedVariant>) -> Vec<IntervalRecord> {
    rows.into_iter().map(project).collect()
}

/// Number of rows carrying each genome, for the run summary.
pub fn genome_counts(records: &[IntervalRecord]) -> PerGenome<usize> {
    PerGenome::from_fn(|genome| {
        records
            .iter()
            .filter(|record| record.flags[genome] == 1)
            .count()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Genome, NormalizedVariant};

    #[test]
    fn true_like_values_encode_to_one() {
        for raw in ["True", "true", "TRUE", " t ", "Yes", "y", "1", "1.0", "2", "-1"] {
            assert_eq!(encode_flag(Some(raw)), 1, "{raw:?} should encode to 1");
        }
    }

    #[test]
    fn everything_else_encodes_to_zero() {
        for raw in ["False", "false", "F", "0", "0.0", "-0", "", "  ", "NA", "nan", "inf", "no", "maybe"] {
            assert_eq!(encode_flag(Some(raw)), 0, "{raw:?} should encode to 0");
        }
        assert_eq!(encode_flag(None), 0);
    }

    fn joined(presence: [Option<&str>; 4]) -> JoinedVariant {
        let mut values = presence.into_iter();
        JoinedVariant {
            variant: NormalizedVariant {
                chr: "chr2".to_string(),
                start: 500,
                end: 501,
                ref_alt: "A/G".to_string(),
                gene_name: "PER2".to_string(),
                presence: PerGenome::from_fn(|_| values.next().flatten().map(str::to_string)),
            },
            gene_id: "ENSG00000132326".to_string(),
        }
    }

    #[test]
    fn projects_to_ten_output_fields() {
        let record = project(joined([Some("True"), Some("False"), Some("False"), None]));
        assert_eq!(
            record.fields(),
            ["chr2", "500", "501", "A/G", "ENSG00000132326", "PER2", "1", "0", "0", "0"]
        );
        assert_eq!(record.fields().len(), IntervalRecord::header().len());
    }

    #[test]
    fn flags_are_always_binary() {
        let records = project_all(vec![
            joined([Some("True"), Some("1"), Some("yes"), Some("bogus")]),
            joined([None, Some(""), Some("False"), Some("0")]),
        ]);
        for record in &records {
            assert!(record.flags.iter().all(|(_, flag)| *flag <= 1));
        }
        let counts = genome_counts(&records);
        assert_eq!(counts[Genome::Altai], 1);
        assert_eq!(counts[Genome::Chagyrskaya], 1);
        assert_eq!(counts[Genome::Denisovan], 0);
    }
}
