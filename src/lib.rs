pub mod cli;
pub mod configuration;
pub mod db;
pub mod domain;
pub mod engine;
pub mod fetcher;
pub mod schema;
pub mod telemetry;

pub use domain::error::{Error, ErrorKind, Result};
