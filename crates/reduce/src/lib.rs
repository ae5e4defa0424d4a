//! Pure reducers: raw sheet rows in, derived artifact values out.
//!
//! Nothing in this crate performs I/O or reads the clock. Every function is
//! deterministic in its inputs, so the same rows always produce the same
//! artifact bytes.

pub mod announce;
pub mod error;
pub mod live;
mod rows;
pub mod schedule;
pub mod score;

pub use announce::latest_announcement;
pub use error::ParseError;
pub use live::select_live;
pub use schedule::parse_schedule;
pub use score::{tally_scores, zeroed_ledger};
