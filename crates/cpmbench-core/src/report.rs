//! Final counter report assembled from every layer of a stack.

use std::fmt;

/// One labelled counter value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReportEntry {
    /// Counter name, e.g. `pc reads`.
    pub label: String,
    /// Accumulated value.
    pub value: u64,
}

/// Ordered counter rows, outermost layer first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a counter row.
    pub fn push(&mut self, label: impl Into<String>, value: u64) {
        self.entries.push(ReportEntry {
            label: label.into(),
            value,
        });
    }

    /// Returns the first value recorded under `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find_map(|entry| (entry.label == label).then_some(entry.value))
    }

    /// Returns every row in report order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|entry| entry.label.len())
            .max()
            .unwrap_or(0);
        for entry in &self.entries {
            writeln!(f, "{:>width$}: {:>10}", entry.label, entry.value)?;
        }
        Ok(())
    }
}
