//! Leadscout API Library
//!
//! This library provides the core functionality for the leadscout partner
//! discovery API: the Gemini gateway integration, the lead save/dedup and
//! scoring pipelines, data access, and HTTP handlers.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `discovery`: Discovery pipeline and candidate normalization.
//! - `errors`: Error handling types.
//! - `gateway_client`: Gemini gateway client.
//! - `handlers`: HTTP request handlers.
//! - `lead_service`: Save/dedup and scoring pipelines.
//! - `lead_store`: Lead storage operations.
//! - `list_store`: Prospect list storage operations.
//! - `models`: Core data models.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod db;
pub mod discovery;
pub mod errors;
pub mod gateway_client;
pub mod handlers;
pub mod lead_service;
pub mod lead_store;
pub mod list_store;
pub mod models;
