//! Escalation Service library
//!
//! The engine module holds the cascade state machine; everything else
//! is the HTTP surface and wiring around it.

pub mod api;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod engine;
pub mod error;
pub mod render;
pub mod routes;

pub use error::{EscSrvError, Result};
