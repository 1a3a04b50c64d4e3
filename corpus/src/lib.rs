//! Rebuilds the decisions recorded in logged Catan games as training samples and writes them
//! out as a text corpus.

pub mod diagnostics;
pub mod game;
pub mod labels;
pub mod legal;
pub mod matcher;
pub mod options;
pub mod reconstructor;
pub mod sample;
pub mod stats;
pub mod storage;
pub mod task;
pub mod writer;

pub use diagnostics::*;
pub use legal::*;
pub use matcher::*;
pub use options::*;
pub use reconstructor::*;
pub use sample::*;
pub use stats::*;
pub use storage::*;
pub use task::*;
pub use writer::*;
