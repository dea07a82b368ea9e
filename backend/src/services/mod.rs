//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business
//! operations and orchestrate interactions with external systems, such as
//! staging and uploading client-submitted media.

pub mod media_manager;

pub use media_manager::{MediaError, MediaManager, StagedFile};
