//! # CLI Module
//!
//! User-facing command implementations for spotifuse. Each command delegates
//! to the spotify integration layer and the fuse orchestrator while handling
//! user interaction, progress feedback and error presentation.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the OAuth 2.0 PKCE authentication flow
//! - [`search`] - Searches the catalog for albums and prints a result table
//! - [`fuse`] - Creates a playlist from the tracks of the given albums
//! - [`logout`] - Clears the persisted session
//!
//! ## Typical session
//!
//! ```bash
//! spotifuse auth
//! spotifuse search "in rainbows"
//! spotifuse fuse --name "Mix" --album 4Uv86qWpGTxf7fU7lG5X6F --album 2fGCAYUMssLKiUAoNdxGLx
//! ```

mod auth;
mod fuse;
mod logout;
mod search;

pub use auth::auth;
pub use fuse::fuse;
pub use logout::logout;
pub use search::search;
