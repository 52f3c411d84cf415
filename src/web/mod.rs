//! The web module for handling the Axum API.
//! This file declares the other files in this directory as sub-modules.

pub mod admin;
pub mod api;
pub mod auth;
pub mod error;
pub mod models;
