//! Server-driven toast notifications and destructive-action confirmation
//! gating, exercised by a small in-memory item inventory.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
