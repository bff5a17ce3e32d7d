// Chess Club Member API - Core
//
// This crate provides the backend REST API for managing club members.
// Data access lives with each domain's models; HTTP handlers live in server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
