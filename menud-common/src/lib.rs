//! Shared types for the menud services
//!
//! Common error and configuration handling used by the restaurant import
//! microservice.

pub mod config;
pub mod error;

pub use error::{Error, Result};
