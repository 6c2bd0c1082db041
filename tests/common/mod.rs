//! Common test utilities and helpers
//!
//! Shared fixtures and in-memory stand-ins for the HTTP transport and
//! provider clients, used across the integration tests.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_fixtures;
