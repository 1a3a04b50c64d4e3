use anyhow::Result;
use catan::{ActionRow, ActionType, LoggedSnapshot, TranslationError};
use features::LayoutError;

use super::diagnostics::DiagnosticKind;
use super::storage::GameLog;

/// Why a sample was not produced. Skips become diagnostics; fatal errors stop the game.
#[derive(Debug)]
pub enum Failure {
    Skip(DiagnosticKind),
    Fatal(anyhow::Error),
}

pub type Attempt<T> = std::result::Result<T, Failure>;

impl From<DiagnosticKind> for Failure {
    fn from(kind: DiagnosticKind) -> Self {
        Failure::Skip(kind)
    }
}

impl From<TranslationError> for Failure {
    fn from(err: TranslationError) -> Self {
        Failure::Skip(DiagnosticKind::Translation(err))
    }
}

impl From<LayoutError> for Failure {
    fn from(err: LayoutError) -> Self {
        Failure::Fatal(err.into())
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Fatal(err)
    }
}

/// One game of a [`GameLog`].
pub struct LoggedGame<'a, L: GameLog + ?Sized> {
    log: &'a L,
    id: u64,
}

impl<'a, L: GameLog + ?Sized> LoggedGame<'a, L> {
    pub fn new(log: &'a L, id: u64) -> Self {
        Self { log, id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn table_size(&self) -> Result<usize> {
        self.log.table_size(self.id)
    }

    pub fn action_table_size(&self) -> Result<usize> {
        self.log.action_table_size(self.id)
    }

    pub fn find_row(&self, row_id: usize) -> Result<Option<LoggedSnapshot>> {
        self.log.select_logged_row(self.id, row_id)
    }

    pub fn find_action(&self, row_id: usize) -> Result<Option<ActionRow>> {
        self.log.select_action(self.id, row_id)
    }

    pub fn action_type(&self, row_id: usize) -> Result<Option<ActionType>> {
        Ok(self.find_action(row_id)?.map(|a| a.action_type))
    }

    /// A row the current sample cannot do without.
    pub fn row(&self, row_id: usize) -> Attempt<LoggedSnapshot> {
        self.find_row(row_id)?
            .ok_or(Failure::Skip(DiagnosticKind::MissingRow(row_id)))
    }

    /// Id of the first ROLL action, if the game has one.
    pub fn first_roll(&self) -> Result<Option<usize>> {
        for id in 1..=self.action_table_size()? {
            if self.action_type(id)? == Some(ActionType::Roll) {
                return Ok(Some(id));
            }
        }

        Ok(None)
    }
}

/// Actions recorded as normal-play decisions: ending the turn, trading, building, and buying or
/// playing a development card once the dice are rolled.
pub fn is_normal_play(action_type: ActionType, dice: i32) -> bool {
    action_type == ActionType::EndTurn
        || (action_type >= ActionType::BuyDevCard && action_type < ActionType::Win && dice > 0)
        || action_type == ActionType::Trade
        || (action_type > ActionType::Build && action_type < ActionType::MoveRobber)
}
