//! Networking modules for the REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` performs the login round trip and `types` defines the wire schema
//! shared with the `asili` server.

pub mod api;
pub mod types;
