//! Common test utilities and helpers

pub mod recording;
