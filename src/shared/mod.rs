//! Shared, dependency-light pieces: configuration and the JSON:API envelope.

pub mod config;
pub mod jsonapi;
