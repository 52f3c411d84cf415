//! HILLIA governance backend.
//!
//! Public intake for questionnaires, contact requests and analytics events,
//! plus an admin API behind HTTP Basic auth with per-username lockout.

pub mod auth;
pub mod config;
pub mod stats;
pub mod store;
pub mod web;
