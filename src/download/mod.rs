//! Media acquisition: streaming downloads and track merging

pub mod fetch;
pub mod merge;

pub use fetch::*;
pub use merge::*;
