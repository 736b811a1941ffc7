//! Pingdom operator
//!
//! Reconciles `HttpCheck` custom resources against Pingdom so that every
//! resource is backed by exactly one Pingdom HTTP check, and reports the
//! outcome in the resource status.

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod pingdom;
pub mod rest_api;
