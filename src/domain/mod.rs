//! Domain layer types and invariants.

pub mod confirm;
pub mod error;
pub mod items;
pub mod toasts;
