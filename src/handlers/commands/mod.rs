//! Command handlers module

pub mod admin;
pub mod donate;
pub mod help;
pub mod info;
pub mod start;
