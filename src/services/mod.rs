//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod anomaly;
pub mod metrics;
pub mod mpesa;
pub mod password;
pub mod token;
pub mod users;
