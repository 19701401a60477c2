// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deciding which watch events are genuine secret changes

use crate::restart::Restart;
use crate::types::{VersionToken, WatchTarget};
use crate::watch::session::{EventKind, SecretEvent};
use futures::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// Last secret revision that triggered (or seeded) the detector
#[derive(Debug, Default)]
struct WatchState {
    last_seen: Option<VersionToken>,
}

impl WatchState {
    /// Record `version`, returning false when it was already the last one seen
    fn advance(&mut self, version: &VersionToken) -> bool {
        if self.last_seen.as_ref() == Some(version) {
            return false;
        }
        self.last_seen = Some(version.clone());
        true
    }
}

/// What the detector did with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not a modification
    Ignored,
    /// A modification without a usable resourceVersion
    Malformed,
    /// Same version as the last one processed
    Duplicate,
    /// First known version, adopted as the baseline without a restart
    Seeded,
    Restarted,
    RestartFailed,
}

/// Turns the secret watch stream into restart calls, at most one per
/// distinct secret revision.
pub struct ChangeDetector<R> {
    target: WatchTarget,
    restarter: R,
    state: WatchState,
}

impl<R: Restart> ChangeDetector<R> {
    pub fn new(target: WatchTarget, restarter: R) -> Self {
        Self {
            target,
            restarter,
            state: WatchState::default(),
        }
    }

    /// Consume events until the stream ends
    pub async fn run<S>(&mut self, mut events: S)
    where
        S: Stream<Item = SecretEvent> + Unpin,
    {
        while let Some(event) = events.next().await {
            self.handle(event).await;
        }
        info!(
            "Watch stream for secret {}/{} ended",
            self.target.namespace, self.target.secret_name
        );
    }

    pub async fn handle(&mut self, event: SecretEvent) -> EventOutcome {
        match event.kind {
            EventKind::Modified => {}
            EventKind::Added | EventKind::Deleted => {
                info!(
                    "Ignoring {:?} event for secret {}",
                    event.kind, self.target.secret_name
                );
                return EventOutcome::Ignored;
            }
            EventKind::Error | EventKind::Unknown => {
                debug!("Ignoring {:?} watch event", event.kind);
                return EventOutcome::Ignored;
            }
        }

        let Some(version) = event.version() else {
            warn!(
                "Modified event for secret {} carries no resourceVersion, ignoring",
                self.target.secret_name
            );
            return EventOutcome::Malformed;
        };

        self.observe(version).await
    }

    /// Adopt a version read directly from the API server after a reconnect.
    ///
    /// Before anything was observed the version is taken as the baseline;
    /// afterwards a different version means a change was missed while
    /// disconnected and triggers a restart.
    pub async fn reseed(&mut self, version: VersionToken) -> EventOutcome {
        if self.state.last_seen.is_none() {
            debug!("Seeding secret version {}", version);
            self.state.last_seen = Some(version);
            return EventOutcome::Seeded;
        }
        self.observe(version).await
    }

    async fn observe(&mut self, version: VersionToken) -> EventOutcome {
        if !self.state.advance(&version) {
            debug!(
                "Secret {} still at resourceVersion {}, nothing to do",
                self.target.secret_name, version
            );
            return EventOutcome::Duplicate;
        }

        info!(
            "Secret '{}' has been updated (resourceVersion: {})",
            self.target.secret_name, version
        );

        match self.restarter.restart().await {
            Ok(()) => EventOutcome::Restarted,
            Err(e) => {
                error!("Failed to restart workload: {}", e);
                EventOutcome::RestartFailed
            }
        }
    }
}
