pub mod config;
pub mod db;
pub mod derive;
pub mod error;
pub mod explore;
pub mod loader;
pub mod merge;
pub mod metrics;
pub mod outputs;
pub mod pipeline;
pub mod queries;
pub mod schema;
pub mod seed;
