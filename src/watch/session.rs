// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Raw watch subscription on the single configured secret

use crate::constants::watch::FROM_NOW;
use crate::error::{ReloaderError, Result};
use crate::types::{VersionToken, WatchTarget};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{ListParams, WatchEvent, WatchParams};
use kube::Api;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Kind of a watch event as seen by the change detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
    Error,
    Unknown,
}

/// One event delivered by the watch stream
#[derive(Debug, Clone)]
pub struct SecretEvent {
    pub kind: EventKind,
    pub payload: Option<Secret>,
}

impl SecretEvent {
    pub fn new(kind: EventKind, payload: Option<Secret>) -> Self {
        Self { kind, payload }
    }

    /// Version of the secret carried by this event, if any
    pub fn version(&self) -> Option<VersionToken> {
        self.payload.as_ref().and_then(VersionToken::of)
    }
}

impl From<kube::Result<WatchEvent<Secret>>> for SecretEvent {
    fn from(item: kube::Result<WatchEvent<Secret>>) -> Self {
        match item {
            Ok(WatchEvent::Added(secret)) => Self::new(EventKind::Added, Some(secret)),
            Ok(WatchEvent::Modified(secret)) => Self::new(EventKind::Modified, Some(secret)),
            Ok(WatchEvent::Deleted(secret)) => Self::new(EventKind::Deleted, Some(secret)),
            Ok(WatchEvent::Bookmark(_)) => Self::new(EventKind::Unknown, None),
            Ok(WatchEvent::Error(err)) => {
                warn!("Watch stream reported an error: {:?}", err);
                Self::new(EventKind::Error, None)
            }
            Err(e) => {
                warn!("Failed to decode watch event: {}", e);
                Self::new(EventKind::Error, None)
            }
        }
    }
}

/// An open watch on one secret.
///
/// The underlying connection lives exactly as long as the session; dropping
/// it on any path closes the subscription.
pub struct WatchSession {
    target: WatchTarget,
    /// The secret as listed right before the watch was opened
    snapshot: Option<Secret>,
    stream: BoxStream<'static, kube::Result<WatchEvent<Secret>>>,
    opened_at: Instant,
    delivered: usize,
    failure: Option<kube::Error>,
}

impl WatchSession {
    /// List the target secret, then subscribe to its changes from the
    /// resourceVersion of that list.
    ///
    /// The list is what surfaces authorization and namespace errors: the
    /// watch request itself only reports them inside the stream.
    #[instrument(skip(api, target), fields(secret = %format!("{}/{}", target.namespace, target.secret_name)))]
    pub async fn open(
        api: &Api<Secret>,
        target: &WatchTarget,
        timeout_secs: u32,
    ) -> Result<Self> {
        let failed = |source: kube::Error| ReloaderError::WatchFailed {
            namespace: target.namespace.clone(),
            name: target.secret_name.clone(),
            source,
        };

        let listed = api
            .list(&ListParams::default().fields(&target.field_selector()))
            .await
            .map_err(failed)?;
        let snapshot = listed.items.into_iter().next();
        let resume_from = listed
            .metadata
            .resource_version
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| FROM_NOW.to_string());

        let params = WatchParams::default()
            .fields(&target.field_selector())
            .timeout(timeout_secs);
        let stream = api
            .watch(&params, &resume_from)
            .await
            .map_err(failed)?
            .boxed();

        info!("Watching secret from resourceVersion {}", resume_from);

        Ok(Self {
            target: target.clone(),
            snapshot,
            stream,
            opened_at: Instant::now(),
            delivered: 0,
            failure: None,
        })
    }

    /// Version of the secret at the time the session was opened, `None` when
    /// it did not exist
    pub fn snapshot_version(&self) -> Option<VersionToken> {
        self.snapshot.as_ref().and_then(VersionToken::of)
    }

    /// Next event in server order, `None` once the stream is over.
    ///
    /// An API status in place of an event means the server refused the
    /// watch; it is kept as the session failure and ends the stream.
    pub async fn next_event(&mut self) -> Option<SecretEvent> {
        if self.failure.is_some() {
            return None;
        }

        match self.stream.next().await? {
            Err(source @ kube::Error::Api(_)) => {
                warn!(
                    "Watch on secret {}/{} rejected: {}",
                    self.target.namespace, self.target.secret_name, source
                );
                self.failure = Some(source);
                None
            }
            item => {
                let event = SecretEvent::from(item);
                if event.kind != EventKind::Error {
                    self.delivered += 1;
                }
                Some(event)
            }
        }
    }

    /// Events in the order the API server sends them; ends when the server
    /// closes or rejects the stream
    pub fn events(&mut self) -> impl Stream<Item = SecretEvent> + Unpin + '_ {
        Box::pin(stream::unfold(self, |session| async move {
            let event = session.next_event().await?;
            Some((event, session))
        }))
    }

    /// Why the server ended the stream, if it refused it
    pub fn take_failure(&mut self) -> Option<ReloaderError> {
        self.failure.take().map(|source| ReloaderError::WatchFailed {
            namespace: self.target.namespace.clone(),
            name: self.target.secret_name.clone(),
            source,
        })
    }

    /// Whether the session delivered an event or stayed open for at least
    /// `min_lifetime`
    pub fn was_healthy(&self, min_lifetime: Duration) -> bool {
        self.delivered > 0 || self.opened_at.elapsed() >= min_lifetime
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        debug!(
            "Closing watch on secret {}/{}",
            self.target.namespace, self.target.secret_name
        );
    }
}
