//! Lead enrichment core.
//!
//! Turns a job-posting lead into a validated decision-maker contact, a phone
//! number where one can be found, and company intelligence. Every data source
//! is a collaborator behind a trait in [`workflows::enrichment`]; this crate
//! only decides what to do with what they return.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
