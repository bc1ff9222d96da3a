//! Shared types for deepl-scraper.

pub mod config;
pub mod errors;
pub mod requests;
pub mod responses;
