//! Core modules for apizza's cache and session lifecycle.
//!
//! Storage, the order data model, settings and shared output helpers live here.

pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod schemas;
pub mod session;
pub mod settings;
