pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod readings;
pub mod services;
pub mod stats;
pub mod store;
pub mod summaries;
pub mod units;
