//! View structs and template rendering helpers.

pub mod views;
