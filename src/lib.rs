pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod resolver;
pub mod routes;
pub mod slug;
pub mod state;
