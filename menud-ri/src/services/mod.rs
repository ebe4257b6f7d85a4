//! Business services for menud-ri

pub mod import_service;

pub use import_service::ImportService;
