//! Infrastructure adapters. Implement ports.
//!
//! HTTP gateway and console UI. Map errors to DomainError.

pub mod http;
pub mod ui;
