//! Shared library for Medbook Lambda functions.
//!
//! This crate provides common utilities, types, and clients used across all Lambda functions.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod store;

pub use auth::{extract_user, AuthenticatedUser};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    CreateReservationRequest, DocumentAction, DocumentRequest, DocumentSlot, Reservation,
    ReservationDocument, ReservationStatus,
};
pub use store::ReservationStore;
