//! Command subsystems built on top of the cache.

pub mod cart;
pub mod config;
pub mod menu;
pub mod order;
pub mod service;
