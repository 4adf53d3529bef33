//! # Spotify Integration Module
//!
//! The integration layer between spotifuse and the Spotify Web API. It covers
//! everything between the CLI and the wire: the OAuth 2.0 PKCE flow, the
//! bearer-authenticated request client with its single reactive token
//! refresh, and the resource endpoints the fusion pipeline depends on.
//!
//! ## Core Modules
//!
//! - [`auth`] - OAuth 2.0 PKCE flow: authorization redirect, code exchange
//!   and token refresh against the accounts service.
//! - [`client`] - [`client::ApiClient`], which attaches the current access
//!   token to every outgoing request and performs at most one transparent
//!   refresh-and-retry when a request comes back unauthorized.
//! - [`albums`] - Album search and ordered album track listings.
//! - [`playlist`] - Current-user lookup, playlist creation and batched track
//!   insertion (at most 100 track URIs per call, a provider-imposed ceiling).
//!
//! ## Authentication Strategy
//!
//! The PKCE flow binds the authorization code to a client-generated secret,
//! so no client secret is ever stored or transmitted:
//!
//! 1. A cryptographically random code verifier is generated and persisted
//!    for the duration of the attempt.
//! 2. The SHA-256 challenge derived from it is sent with the authorization
//!    redirect, which opens in the user's browser.
//! 3. A temporary local HTTP server receives the callback and exchanges the
//!    authorization code plus the original verifier for a token pair.
//! 4. The resulting session is persisted for future runs; the verifier is
//!    erased so the single-use code cannot be redeemed twice.
//!
//! Token refresh is purely reactive: nothing is refreshed until a request
//! actually fails with an unauthorized status.

pub mod albums;
pub mod auth;
pub mod client;
pub mod playlist;
