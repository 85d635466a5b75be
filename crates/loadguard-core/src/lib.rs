// ABOUTME: Core types and constants for the loadguard training-load engine
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

#![deny(unsafe_code)]

//! # Loadguard Core
//!
//! Foundation crate providing shared types and constants for the training-load
//! risk engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **constants**: Engine defaults organized by domain
//! - **models**: Athletes, ledger records, weekly metrics, and risk assessments

/// Unified error handling system with standard error codes
pub mod errors;

/// Engine constants and default values organized by domain
pub mod constants;

/// Core data models (athletes, session loads, weekly metrics, assessments)
pub mod models;
