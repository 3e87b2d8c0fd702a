#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "Contains the domain models, dual-token authentication and session"]
#![doc = "machinery, ownership-scoped route handlers, cascade deletion, and"]
#![doc = "error handling for the tasknest API. The binary (`main.rs`) wires"]
#![doc = "these into a running server."]

pub mod auth;
pub mod cascade;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
