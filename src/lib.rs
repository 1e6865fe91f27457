// Tealium Gateway - Library root for testing

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod operations;
pub mod routes;
pub mod store;
