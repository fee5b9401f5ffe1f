//! Archaic-origin filtering.
//!
//! A catalog row survives if ANY configured allele-origin classifier labels it
//! archaic-specific. Classifiers that read the same column are allowed (the shipped
//! catalog carries only Vernot labels) but are reported, since the OR then adds
//! nothing.

use log::{debug, info, warn};

use crate::config::{OriginClassifier, PipelineConfig};
use crate::types::SavRecord;

pub struct ArchaicFilter<'a> {
    classifiers: &'a [OriginClassifier],
    label: &'a str,
}

impl<'a> ArchaicFilter<'a> {
    pub fn new(classifiers: &'a [OriginClassifier], label: &'a str) -> Self {
        for (first, second) in redundant_classifiers(classifiers) {
            warn!(
                "Classifiers '{}' and '{}' both read column '{}'; the second adds no rows. Supply a dedicated column to combine two classification methods.",
                first.name, second.name, first.column
            );
        }
        Self { classifiers, label }
    }

    pub fn from_config(config: &'a PipelineConfig) -> Self {
        Self::new(&config.classifiers, &config.archaic_label)
    }

    /// True if any classifier labels the record archaic-specific.
    pub fn matches(&self, record: &SavRecord) -> bool {
        record
            .origin_labels
            .iter()
            .any(|label| self.is_archaic(label.as_deref()))
    }

    /// Keeps the matching records, preserving their order.
    pub fn apply(&self, records: Vec<SavRecord>) -> Vec<SavRecord> {
        let total = records.len();
        for (slot, classifier) in self.classifiers.iter().enumerate() {
            let hits = records
                .iter()
                .filter(|record| {
                    self.is_archaic(record.origin_labels.get(slot).and_then(|l| l.as_deref()))
                })
                .count();
            debug!(
                "Classifier '{}' ({}) marks {hits} of {total} rows as '{}'.",
                classifier.name, classifier.column, self.label
            );
        }

        let kept: Vec<SavRecord> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();

        if kept.is_empty() {
            warn!(
                "No SAV rows are labelled '{}' by any classifier; the output will be empty.",
                self.label
            );
        } else {
            info!("Archaic filter kept {} of {total} rows.", kept.len());
        }
        kept
    }

    fn is_archaic(&self, label: Option<&str>) -> bool {
        label.is_some_and(|value| value.trim() == self.label)
    }
}

/// Pairs of classifiers that read an identical label column.
pub fn redundant_classifiers(
    classifiers: &[OriginClassifier],
) -> Vec<(&OriginClassifier, &OriginClassifier)> {
    let mut pairs = Vec::new();
    for (i, first) in classifiers.iter().enumerate() {
        for second in &classifiers[i + 1..] {
            if first.column == second.column {
                pairs.push((first, second));
            }
        }
    }
    pairs
}
