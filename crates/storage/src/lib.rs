pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::EngineConfig;
pub use database::{Database, Snapshot};

#[cfg(test)]
pub(crate) mod test_support;
