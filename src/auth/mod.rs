//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Social login via Google, Apple and Kakao credentials
//! - Session token issuing and validation
//! - The canonical user directory
//! - AuthedUser extractor for protected routes

pub mod directory;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod platform;
pub mod routes;
pub mod service;
pub mod token;
pub mod verifier;


pub use extractors::AuthedUser;
pub use models::{Provider, UserRecord};
pub use routes::auth_routes;
pub use service::AuthService;
