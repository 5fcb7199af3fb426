//! Service layer for business logic.
//!
//! Separates business logic from UI handlers for better testability and maintainability.

pub mod navigation_service;
pub mod tagging_service;
pub mod trash_service;

pub use navigation_service::{BrokenItem, NavigationService, OpenOutcome, OpenedCurrent};
pub use tagging_service::{TaggingService, score_for_key};
pub use trash_service::{SystemTrash, TrashService};
