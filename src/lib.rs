pub mod api;
pub mod cli;
pub mod config;
pub mod data_models;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod patterns;
pub mod pdf;
pub mod query_planner;
pub mod report;
pub mod researcher;
pub mod search;
pub mod vendor;
pub mod website;
