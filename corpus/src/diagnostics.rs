use catan::{ActionKind, ActionType, TranslationError};
use log::{debug, warn};
use std::collections::BTreeMap;
use thiserror::Error;

use super::task::Task;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DiagnosticKind {
    #[error("translation failed: {0}")]
    Translation(#[from] TranslationError),
    #[error("state row {0} is missing from the log")]
    MissingRow(usize),
    #[error("action row {0} is missing from the log")]
    MissingAction(usize),
    #[error("chance outcome unresolved, stochastic slots zeroed: {0}")]
    UnresolvedChance(TranslationError),
    #[error("no legal action matches the logged {0:?}; unmodelled trade or corrupt log")]
    NoMatch(ActionType),
    #[error("logged {0:?} has no simulator action type")]
    UnmodelledType(ActionType),
    #[error("chosen type {chosen} is not among the legal types {legal:?}")]
    IllegalType {
        chosen: ActionKind,
        legal: Vec<ActionKind>,
    },
}

impl DiagnosticKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::Translation(_) => "translation",
            DiagnosticKind::MissingRow(_) => "missing row",
            DiagnosticKind::MissingAction(_) => "missing action",
            DiagnosticKind::UnresolvedChance(_) => "unresolved chance",
            DiagnosticKind::NoMatch(_) => "no match",
            DiagnosticKind::UnmodelledType(_) => "unmodelled type",
            DiagnosticKind::IllegalType { .. } => "illegal type",
        }
    }
}

/// A sample that could not be reconstructed, or was reconstructed with a caveat.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub game_id: u64,
    pub row_id: usize,
    pub task: Task,
    pub kind: DiagnosticKind,
}

/// Collects the diagnostics raised while processing games.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, game_id: u64, row_id: usize, task: Task, kind: DiagnosticKind) {
        match &kind {
            DiagnosticKind::NoMatch(_) | DiagnosticKind::IllegalType { .. } => warn!(
                "Missed {} sample in game {} at row {}: {}",
                task, game_id, row_id, kind
            ),
            _ => debug!(
                "Skipped {} sample in game {} at row {}: {}",
                task, game_id, row_id, kind
            ),
        }

        self.entries.push(Diagnostic {
            game_id,
            row_id,
            task,
            kind,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, predicate: impl Fn(&DiagnosticKind) -> bool) -> usize {
        self.entries.iter().filter(|d| predicate(&d.kind)).count()
    }

    /// Number of diagnostics per kind label.
    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        let mut summary = BTreeMap::new();
        for diagnostic in &self.entries {
            *summary.entry(diagnostic.kind.label()).or_insert(0) += 1;
        }

        summary
    }
}
