//! Row acquisition: the `RowSource` seam and its Google Sheets client.

pub mod client;
pub mod source;

pub use client::{SheetsClient, SheetsCredential, ValueRange, DEFAULT_BASE_URL};
pub use source::{FetchError, RowSource};
