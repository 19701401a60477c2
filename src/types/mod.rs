// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Plain data types shared by the watch and restart halves of the pipeline.

pub mod target;
pub mod version;

pub use target::{RestartTarget, WatchTarget, WorkloadKind};
pub use version::VersionToken;
