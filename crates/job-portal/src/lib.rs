//! Job board core: users, job postings, and applications behind role-scoped access rules.

pub mod config;
pub mod error;
pub mod portal;
pub mod telemetry;
