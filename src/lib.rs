//! Polls online marketplaces for a search query, remembers what each source
//! already reported, and raises one coalesced notification whenever genuinely
//! new listings show up.

pub mod core;
pub mod crawler;
pub mod monitoring;
pub mod notify;
pub mod sources;
