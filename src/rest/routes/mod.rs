//! Route handlers for the REST API.

pub mod health;
pub mod scenario;
pub mod steps;
pub mod tabs;
pub mod terminal;
