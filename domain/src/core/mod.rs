//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: execution models a schedule routes to
//! - [`error::OrchestrationError`]: signaled pipeline and consultation failures

pub mod error;
pub mod model;
