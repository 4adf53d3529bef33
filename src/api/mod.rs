//! # API Module
//!
//! HTTP endpoints for the temporary local callback server that backs the
//! OAuth flow.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the authorization code from Spotify's
//!   authorization server and completes the PKCE token exchange.
//! - [`health`] - Health check returning application status and version.
//!
//! The module is built on [Axum](https://docs.rs/axum); each endpoint is an
//! async handler wired into the router in [`crate::server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
