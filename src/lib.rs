pub mod app;
pub mod core;
pub mod dispatch;
pub mod message;

pub use crate::core::version::get_api_version;
