//! blocksmith - A strict, schema-aware block content engine
//!
//! Mediates between an AI agent and a CMS block model: layered schema
//! resolution, a recursive tree validator with path-addressed errors,
//! the block identifier lifecycle, and deterministic markup formatting.

pub mod api;
pub mod cli;
pub mod config;
pub mod definitions;
pub mod formatter;
pub mod host;
pub mod identity;
pub mod observability;
pub mod schema;
pub mod validator;
