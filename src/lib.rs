pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod extract;
pub mod fetch;
pub mod geo;
pub mod output;
pub mod types;
