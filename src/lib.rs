//! tp: a command line client for Targetprocess
//!
//! Lists and shows work items from a Targetprocess account. Filter tokens
//! typed on the command line become remote queries, and configurable field
//! templates turn the returned entities into table rows.

pub mod api;
pub mod cli;
pub mod core;
