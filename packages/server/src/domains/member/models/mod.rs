pub mod member;
pub mod patch;

pub use member::*;
pub use patch::*;
