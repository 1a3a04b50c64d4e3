pub mod action;
pub mod board;
pub mod bridge;
pub mod coords;
pub mod dice;
pub mod error;
pub mod fixtures;
pub mod logged;
pub mod longest_road;
pub mod odds;
pub mod resource;
pub mod rules;
pub mod state;

pub use action::*;
pub use board::*;
pub use bridge::*;
pub use dice::*;
pub use error::*;
pub use logged::*;
pub use resource::*;
pub use rules::*;
pub use state::*;
