//! Module for user profile and management API endpoints.
//!
//! This module handles functionalities related to user information that is
//! distinct from the core authentication process, such as retrieving the
//! current account or updating profile details.

pub mod handlers;
pub mod routes;
