//! Host UI output: result items and the query listing that produces them

pub mod item;
pub mod listing;

pub use item::{ItemList, ModItem, ResultItem};
pub use listing::{Launcher, QueryOutcome, ResolutionSummary};
