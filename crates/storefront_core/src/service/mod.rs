//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into change-form level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod catalog_service;
pub mod order_admin_service;
