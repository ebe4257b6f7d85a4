//! Asynchronous jobs for menud-ri

pub mod import_job;

pub use import_job::run_import_job;
