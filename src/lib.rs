//! learning-ui: step catalog, check runner and terminal bridge behind a
//! small HTTP API for browser-based hands-on labs.

pub mod check;
pub mod config;
pub mod env_vars;
pub mod logging;
pub mod remote;
pub mod rest;
pub mod scenario;
pub mod steps;
pub mod terminal;
