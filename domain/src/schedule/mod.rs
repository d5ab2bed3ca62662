//! Schedule catalog, orchestration modes and model routing.

pub mod catalog;
pub mod mode;
pub mod router;
