use crate::features::FeatureTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRecord {
    /// Full header line, including the leading '>'
    pub id: String,
    pub sequence: String,
    pub label: Option<String>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn residues(&self) -> &[u8] {
        self.sequence.as_bytes()
    }

    /// Header without the marker, e.g. `seq1` for `>seq1`
    pub fn name(&self) -> &str {
        self.id.trim_start_matches('>').trim()
    }
}

impl fmt::Display for SequenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sequence)
    }
}

/// Records of one population together with their feature columns.
///
/// Every column in `features` has exactly one row per record, in record order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<SequenceRecord>,
    pub features: FeatureTable,
}

impl Dataset {
    pub fn new(records: Vec<SequenceRecord>) -> Self {
        let features = FeatureTable::new(records.len());
        Self { records, features }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    pub fn labels(&self) -> Vec<Option<&str>> {
        self.records.iter().map(|r| r.label.as_deref()).collect()
    }

    pub fn max_len(&self) -> usize {
        self.records.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Record count per label; unlabeled records are skipped
    pub fn class_balance(&self) -> BTreeMap<String, usize> {
        let mut balance = BTreeMap::new();
        for label in self.records.iter().filter_map(|r| r.label.as_ref()) {
            *balance.entry(label.clone()).or_insert(0) += 1;
        }
        balance
    }
}

/// Clamped sub-slice `[start, start + len)`; never fails on short input.
pub fn window(seq: &[u8], start: usize, len: usize) -> &[u8] {
    let start = start.min(seq.len());
    let end = start.saturating_add(len).min(seq.len());
    &seq[start..end]
}

/// First `len` residues, or the whole sequence if it is shorter
pub fn window_first(seq: &[u8], len: usize) -> &[u8] {
    window(seq, 0, len)
}

/// Last `len` residues, or the whole sequence if it is shorter
pub fn window_last(seq: &[u8], len: usize) -> &[u8] {
    window(seq, seq.len().saturating_sub(len), len)
}
