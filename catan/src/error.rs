use thiserror::Error;

/// Failures raised while mapping logged data onto the simulator model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslationError {
    #[error("hex layout must have {expected} entries, found {found}")]
    LayoutLength { expected: usize, found: usize },
    #[error("unknown hex type code {0}")]
    UnknownHexType(i32),
    #[error("hex id {0:#04x} is not on the board")]
    UnknownHex(i32),
    #[error("vertex coordinate {0:#04x} is not on the board")]
    UnknownVertex(i32),
    #[error("edge coordinate {0:#04x} is not on the board")]
    UnknownEdge(i32),
    #[error("robber hex {0:#04x} is not a land hex")]
    RobberOffBoard(i32),
    #[error("game state {0} has no simulator step")]
    UnknownState(String),
    #[error("player {0} is not a seat at the table")]
    UnknownPlayer(usize),
}
