//! Application services: board state, backend seam and response plumbing.

pub mod board;
pub mod error;
pub mod remote;
pub mod stream;
