// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::fmt;

use crate::contact::Contact;

/// The per-record bulk operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    Create,
    Replace,
    Delete,
}

impl BulkOperation {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }

    /// Verb used in progress and summary lines.
    #[must_use]
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "Created",
            Self::Replace => "Updated",
            Self::Delete => "Deleted",
        }
    }

    #[must_use]
    pub fn progressive(&self) -> &'static str {
        match self {
            Self::Create => "Creating",
            Self::Replace => "Updating",
            Self::Delete => "Deleting",
        }
    }
}

impl fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record the batch gave up on.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the batch (input order, or server order for deletes)
    pub index: usize,
    pub record: Contact,
    pub reason: String,
}

/// Outcome of a bulk operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub operation: BulkOperation,
    /// Display name of the scope ("company account" / "account 42")
    pub scope: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl BatchReport {
    #[must_use]
    pub fn new(operation: BulkOperation, scope: String) -> Self {
        Self {
            operation,
            scope,
            attempted: 0,
            succeeded: 0,
            skipped: Vec::new(),
        }
    }

    /// True when nothing was skipped.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} contact(s) in {}",
            self.operation.past_tense(),
            self.succeeded,
            self.attempted,
            self.scope
        )?;
        if !self.skipped.is_empty() {
            write!(f, " ({} skipped)", self.skipped.len())?;
        }
        Ok(())
    }
}
