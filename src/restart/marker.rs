// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Unique restart marker values

use crate::constants::annotations;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Annotation written into a pod template to force a rollout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartMarker {
    pub key: &'static str,
    pub value: String,
}

/// Issues strictly increasing wall-clock timestamps.
///
/// Two markers requested within the same clock tick are still distinct: the
/// second one is moved one nanosecond past the first.
#[derive(Debug, Default)]
pub struct MarkerClock {
    last_nanos: AtomicI64,
}

impl MarkerClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next marker based on the current wall-clock time
    pub fn next_marker(&self) -> RestartMarker {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        self.marker_at(now)
    }

    fn marker_at(&self, now_nanos: i64) -> RestartMarker {
        let previous = self
            .last_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_nanos.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        let issued = now_nanos.max(previous.saturating_add(1));

        RestartMarker {
            key: annotations::SECRET_RELOAD,
            value: DateTime::from_timestamp_nanos(issued)
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }
}
