//! HTTP daemon serving project stages and downloads from JSON files.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
