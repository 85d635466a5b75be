// ABOUTME: Athlete reference data read by the batch driver
// ABOUTME: Identity, display name, and the active flag gating recomputation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An athlete whose training load is monitored
///
/// Owned by the roster system; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Only active athletes are recomputed
    pub active: bool,
}
