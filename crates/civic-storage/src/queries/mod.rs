// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the stored entities.

pub mod conversations;
pub mod dashboard;
pub mod feedback;
pub mod messages;
pub mod stats;

/// Current time in the format every table stores.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
pub(crate) async fn test_db() -> (crate::Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = crate::Database::open(path.to_str().unwrap(), true)
        .await
        .unwrap();
    (db, dir)
}
