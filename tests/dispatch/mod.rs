//! Dispatcher integration test modules

pub mod properties;
pub mod scenarios;
