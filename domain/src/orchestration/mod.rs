//! Pipeline orchestration domain
//!
//! This module contains the run state, the flow-code trace, the pure
//! pipeline state machine and the project-rule consultation policy.

pub mod flow_code;
pub mod pipeline;
pub mod policy;
pub mod state;
