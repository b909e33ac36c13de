//! Ordered in-memory report list.
//!
//! Order is exactly what the server returned, repeats included. Lookups are a
//! linear scan.

use std::collections::HashSet;
use tracing::warn;

use crate::model::{ReportId, ReportRecord};

/// Outcome of [`ReportStore::replace_by_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Changed(usize),
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportStore {
    records: Vec<ReportRecord>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards everything and takes `records` verbatim, in the given order.
    ///
    /// A repeated id is kept as sent and logged; id lookups then resolve to
    /// its first occurrence.
    pub fn replace_all(&mut self, records: Vec<ReportRecord>) {
        let mut seen = HashSet::with_capacity(records.len());
        let repeated = records.iter().filter(|r| !seen.insert(r.id)).count();
        if repeated > 0 {
            warn!(repeated, "report list contains duplicate ids");
        }

        self.records = records;
    }

    /// Swaps in `record` at the position of the entry with the same id.
    pub fn replace_by_id(&mut self, record: ReportRecord) -> StoreChange {
        match self.position(record.id) {
            Some(index) => {
                self.records[index] = record;
                StoreChange::Changed(index)
            }
            None => StoreChange::NotFound,
        }
    }

    pub fn position(&self, id: ReportId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn get(&self, id: ReportId) -> Option<&ReportRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReportStore {
    type Item = &'a ReportRecord;
    type IntoIter = std::slice::Iter<'a, ReportRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
