// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Restarting the dependent workload when the secret changes.

pub mod marker;
pub mod trigger;

pub use marker::{MarkerClock, RestartMarker};
pub use trigger::{restart_workload, Restart, WorkloadRestarter};
