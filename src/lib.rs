//! Normalization and categorization of planned transit service-change alerts.

pub mod cli;
pub mod config;
pub mod data;
pub mod errors;
pub mod logging;
pub mod nlp;
pub mod schedule;
pub mod signals;
