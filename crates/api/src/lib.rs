//! Library boundary for an external transport: request DTOs, JSON payloads
//! and structured error bodies over the layout services.

pub mod app;
pub mod context;
