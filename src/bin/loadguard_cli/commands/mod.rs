// ABOUTME: Re-exports command modules for loadguard-cli
// ABOUTME: Provides recompute, lookup, and demo seeding commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

pub mod lookup;
pub mod recompute;
pub mod seed;
