//! Single-screen blog front-end over a REST posts backend.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
