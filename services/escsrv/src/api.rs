//! HTTP API handlers

pub mod alert_handlers;
pub mod config_handlers;
pub mod health_handlers;
pub mod history_handlers;
pub mod voice_handlers;
