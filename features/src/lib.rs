//! Fixed-width vector encodings of Catan positions and of the changes actions make to them.

pub mod action_encoder;
pub mod encoder;
pub mod expectation;
pub mod layout;
pub mod logged_view;
pub mod options;
pub mod quantizer;
pub mod simulated_view;
pub mod vector;
pub mod view;

pub use action_encoder::*;
pub use encoder::*;
pub use expectation::*;
pub use layout::*;
pub use options::*;
pub use vector::*;
pub use view::*;
