//! Application layer for Wandalf.
//!
//! This crate provides the use case that coordinates the session store,
//! preview host and collaborator services.

pub mod in_flight;
pub mod workbench;

pub use workbench::{TurnOutcome, Workbench, is_image_prompt};
