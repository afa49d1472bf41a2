//! Fraud Score API Library
//!
//! This library provides the core functionality for the fraud scoring service:
//! transaction scoring (model-backed or heuristic), the flat-file snapshot
//! store, and the HTTP handlers that expose them.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `features`: Feature schema and value coercion.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request/response data models.
//! - `predictor`: Model artifact loading.
//! - `routes`: Router and middleware stack.
//! - `scoring`: Fraud scoring engine.
//! - `snapshot_store`: Users/predictions JSON documents.

pub mod api;
pub mod core;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod errors;
pub mod features;
pub mod handlers;
pub mod models;
pub mod predictor;
pub mod routes;
pub mod scoring;
pub mod snapshot_store;
