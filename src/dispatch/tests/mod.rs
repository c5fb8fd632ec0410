//! Test modules for the dispatcher
