//! oeeview: Pareto analysis and live polling for an OEE production backend.

pub mod analytics;
pub mod cli;
pub mod client;
pub mod config;
pub mod pareto;
pub mod payload;
pub mod poller;
pub mod summary;
pub mod views;
pub mod web;
