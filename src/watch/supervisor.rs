// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Owns the watch session and decides what happens when it ends

use crate::config::Config;
use crate::constants::reconnect::{INITIAL_BACKOFF_SECS, MIN_HEALTHY_SESSION_SECS};
use crate::error::Result;
use crate::restart::Restart;
use crate::types::WatchTarget;
use crate::watch::detector::ChangeDetector;
use crate::watch::session::WatchSession;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Watches the configured secret and restarts the workload on every change.
pub struct SecretMonitor<R> {
    secrets: Api<Secret>,
    target: WatchTarget,
    detector: ChangeDetector<R>,
    reconnect: bool,
    max_backoff: Duration,
    watch_timeout_secs: u32,
}

impl<R: Restart> SecretMonitor<R> {
    pub fn new(client: Client, config: &Config, restarter: R) -> Self {
        Self {
            secrets: Api::namespaced(client, &config.watch.namespace),
            target: config.watch.clone(),
            detector: ChangeDetector::new(config.watch.clone(), restarter),
            reconnect: config.reconnect,
            max_backoff: config.reconnect_max_backoff,
            watch_timeout_secs: config.watch_timeout_secs,
        }
    }

    /// Run until the watch stream ends (or forever when reconnecting).
    ///
    /// Failing to open the first subscription, or the server refusing it
    /// before it delivered anything, is returned as an error.
    pub async fn run(mut self) -> Result<()> {
        let min_lifetime = Duration::from_secs(MIN_HEALTHY_SESSION_SECS);
        let initial = Duration::from_secs(INITIAL_BACKOFF_SECS);
        let mut backoff = initial;
        let mut first = true;

        let mut session =
            WatchSession::open(&self.secrets, &self.target, self.watch_timeout_secs).await?;

        loop {
            self.detector.run(session.events()).await;
            let failure = session.take_failure();
            let healthy = session.was_healthy(min_lifetime);
            drop(session);

            if let Some(err) = failure {
                if first && !healthy {
                    return Err(err);
                }
                warn!("{}", err);
            }
            first = false;

            if !self.reconnect {
                info!("Watch stream closed and reconnect is disabled, stopping");
                return Ok(());
            }

            if healthy {
                backoff = initial;
            } else {
                warn!(
                    "Watch stream closed without delivering events, resubscribing in {} seconds...",
                    backoff.as_secs()
                );
                sleep(backoff).await;
                backoff = (backoff * 2).min(self.max_backoff);
            }

            session = self.reconnect_with_backoff(&mut backoff).await;
        }
    }

    /// Re-subscribe until it succeeds, growing `backoff` on every failure
    async fn reconnect_with_backoff(&mut self, backoff: &mut Duration) -> WatchSession {
        loop {
            match self.resubscribe().await {
                Ok(session) => return session,
                Err(e) => {
                    warn!(
                        "Failed to re-establish secret watch: {}, retrying in {} seconds...",
                        e,
                        backoff.as_secs()
                    );
                }
            }

            sleep(*backoff).await;

            // Exponential backoff with max cap
            *backoff = (*backoff * 2).min(self.max_backoff);
        }
    }

    /// Open a fresh session and reseed the detector from the listed secret
    #[instrument(skip(self), fields(secret = %format!("{}/{}", self.target.namespace, self.target.secret_name)))]
    async fn resubscribe(&mut self) -> Result<WatchSession> {
        let session =
            WatchSession::open(&self.secrets, &self.target, self.watch_timeout_secs).await?;

        match session.snapshot_version() {
            Some(version) => {
                self.detector.reseed(version).await;
            }
            None => warn!("Secret not found while reconnecting, watching for it to appear"),
        }

        Ok(session)
    }
}
