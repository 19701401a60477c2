// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::str::FromStr;

/// The single secret whose changes are watched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub namespace: String,
    pub secret_name: String,
}

impl WatchTarget {
    /// Server-side field selector matching only the watched secret
    pub fn field_selector(&self) -> String {
        format!("metadata.name={}", self.secret_name)
    }
}

/// Workload kinds that can be restarted by touching their pod template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadKind::Deployment => f.write_str("Deployment"),
            WorkloadKind::StatefulSet => f.write_str("StatefulSet"),
        }
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deployment" => Ok(WorkloadKind::Deployment),
            "statefulset" => Ok(WorkloadKind::StatefulSet),
            other => Err(format!(
                "unknown workload kind '{}', expected 'deployment' or 'statefulset'",
                other
            )),
        }
    }
}

/// The workload restarted whenever the watched secret changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartTarget {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
}
