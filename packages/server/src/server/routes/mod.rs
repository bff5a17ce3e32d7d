// HTTP routes
pub mod members;

pub use members::*;
