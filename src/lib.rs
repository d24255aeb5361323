pub mod access;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod resource;
pub mod schema;
pub mod server;
pub mod table;
pub mod types;

#[cfg(test)]
pub mod testing;
