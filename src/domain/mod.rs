//! Sales domain types.
//! Framework-agnostic representation of an inbound sale and the row stored for it.

pub mod sale;

pub use sale::{SalesRecord, TransactionRequest};
