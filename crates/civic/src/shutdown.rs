// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stop signals for `civic serve`.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The signal that ended a `civic serve` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    pub fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
///
/// If the SIGTERM handler cannot be installed only Ctrl+C stops the server.
#[cfg(unix)]
pub async fn wait_for_stop() -> StopSignal {
    use tokio::signal::unix::{SignalKind, signal};
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable, stop with Ctrl+C");
            let _ = tokio::signal::ctrl_c().await;
            return StopSignal::Interrupt;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => StopSignal::Interrupt,
        _ = terminate.recv() => StopSignal::Terminate,
    }
}

/// Resolves on Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_stop() -> StopSignal {
    let _ = tokio::signal::ctrl_c().await;
    StopSignal::Interrupt
}

/// Token the serve loop parks on until a stop signal arrives.
///
/// Cancelling the token from elsewhere also ends the background watcher.
pub fn stop_token() -> CancellationToken {
    let token = CancellationToken::new();
    let watched = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            signal = wait_for_stop() => {
                info!(signal = signal.name(), "stop requested, draining gateway");
                watched.cancel();
            }
            () = watched.cancelled() => debug!("stop watcher released"),
        }
    });
    token
}
