//! Model session concepts shared with the inference gateway port.

pub mod stream;
