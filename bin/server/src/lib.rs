//! careline HTTP API server.
//!
//! This crate provides the thin plumbing around the conversation engine:
//! request routing, the API-key check, environment configuration, and the
//! PostgreSQL repositories behind the storage traits.

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
