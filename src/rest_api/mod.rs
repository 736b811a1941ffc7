//! HTTP endpoints for probes and scraping
//!
//! Serves the liveness endpoint and the Prometheus metrics of the operator.

mod handlers;
mod server;

pub use server::{router, run_server};
