//! View models and askama templates.

pub mod board;
pub mod views;
