//! # LeadStack API Server Library
//!
//! This library provides the HTTP layer of the LeadStack lead-management
//! backend.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, and the cookie auth middleware
//! - `config`: Configuration management
//! - `cookies`: Auth cookie building and parsing
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod routes;
