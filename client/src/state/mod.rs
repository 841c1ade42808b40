//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`session`, `metrics`) so components can depend
//! on small focused models.

pub mod metrics;
pub mod session;
