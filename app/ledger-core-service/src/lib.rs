//! Library half of the service: everything `main.rs` and
//! `bin/openapi_dump.rs` share. The binary wires this up against a real
//! pool/event bus; the dump tool only ever touches `openapi::ApiDoc`.

pub mod command;
pub mod config;
pub mod dto;
pub mod error;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
