// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::Secret;
use std::fmt;

/// Opaque per-revision identifier of the watched secret.
///
/// Only equality is meaningful: two unequal tokens are two different
/// revisions, nothing is implied about which one is newer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Extract the resourceVersion of a secret, if it carries a non-empty one
    pub fn of(secret: &Secret) -> Option<Self> {
        secret
            .metadata
            .resource_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
