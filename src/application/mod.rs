//! Application services layer.

pub mod error;
pub mod gate;
pub mod hub;
pub mod items;
pub mod stream;
