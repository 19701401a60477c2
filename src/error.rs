// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::WorkloadKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReloaderError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to watch secret {namespace}/{name}: {source}")]
    WatchFailed {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("{kind} {namespace}/{name} not found")]
    WorkloadNotFound {
        kind: WorkloadKind,
        namespace: String,
        name: String,
    },

    #[error("Failed to get {kind} {namespace}/{name}: {source}")]
    FetchFailed {
        kind: WorkloadKind,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Conflict updating {kind} {namespace}/{name}: {source}")]
    Conflict {
        kind: WorkloadKind,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to update {kind} {namespace}/{name}: {source}")]
    UpdateFailed {
        kind: WorkloadKind,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("{kind} {namespace}/{name} has no spec")]
    MissingSpec {
        kind: WorkloadKind,
        namespace: String,
        name: String,
    },
}

pub type Result<T> = std::result::Result<T, ReloaderError>;
