pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod posts;
pub mod repo;
pub mod schema;
pub mod state;
pub mod users;
