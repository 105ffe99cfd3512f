//! HTTP API: one in-memory wallet ledger per session, exposed as JSON.

pub mod app;
pub mod config;
