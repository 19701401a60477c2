// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret watch pipeline: session, change detection and supervision.

pub mod detector;
pub mod session;
pub mod supervisor;

pub use detector::{ChangeDetector, EventOutcome};
pub use session::{EventKind, SecretEvent, WatchSession};
pub use supervisor::SecretMonitor;
