//! Intake and retrieval services behind the HTTP handlers

pub mod intake;
pub mod retrieval;

pub use intake::{IntakeOutcome, IntakeService};
pub use retrieval::{CsvDownload, RetrievalService};
