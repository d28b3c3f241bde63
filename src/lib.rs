//! Climaplan Library
//!
//! Weekly weather calendar built from OpenWeatherMap data: samples grouped
//! into local days, a representative condition per day and an advisory.
//! The modules are public for use by the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod forecast;
