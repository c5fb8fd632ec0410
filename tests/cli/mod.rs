//! CLI Integration Test Modules

pub mod binary;
