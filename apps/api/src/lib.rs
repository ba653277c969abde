//! Office Cube API Library
//!
//! This library provides the core functionality for the Office Cube API:
//! the agent orchestrator, task persistence, configuration and the HTTP layer.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
