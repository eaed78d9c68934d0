// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for civic assistant integration tests.
//!
//! Provides a scripted chat backend and a harness with temp SQLite storage
//! for fast, deterministic tests without a live webhook.
//!
//! # Components
//!
//! - [`MockBackend`] - Chat backend replaying queued replies and recording requests
//! - [`TestHarness`] - Config, mock backend, and initialized storage in a temp dir

pub mod harness;
pub mod mock_backend;

pub use harness::TestHarness;
pub use mock_backend::MockBackend;
