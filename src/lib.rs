//! Library exports for the TinyApp URL shortener
//!
//! This module exposes internal components for testing and potential library usage.

pub mod auth;
pub mod error;
pub mod handler;
pub mod model;
pub mod route;
pub mod store;
