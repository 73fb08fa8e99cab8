//! Core domain + application logic for the Discord relay bot.
//!
//! This crate is intentionally framework-agnostic. The Discord gateway and
//! REST API live behind ports (traits) implemented in the adapter crate.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod router;
pub mod session;

pub use errors::{Error, Result};
