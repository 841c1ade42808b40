//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the landing-page cards and report results to their
//! parent page through callbacks instead of touching storage directly.

pub mod login_form;
pub mod sdg_dashboard;
