//! client - typed API client for the Medbook reservation backend.
//!
//! The UI talks to [`ReservationService`], which wraps the raw HTTP client
//! with a session-scoped cache: reads serve from cache, mutations invalidate
//! it after success. The session context is passed in explicitly; there is
//! no process-wide current-user state.

pub mod api;
pub mod cache;
pub mod error;
pub mod service;
pub mod session;

pub use api::ApiClient;
pub use error::{ClientError, Result};
pub use service::ReservationService;
pub use session::Session;
