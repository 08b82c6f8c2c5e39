// HTTP Server modules
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;
pub mod state;

// PostgreSQL persistence
pub mod db;

// LLM abstraction layer and the services built on it
pub mod llm;
pub mod services;
