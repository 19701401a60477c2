// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as vars, reconnect, watch};
use crate::types::{RestartTarget, WatchTarget, WorkloadKind};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Reloader configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret whose changes trigger a restart
    pub watch: WatchTarget,
    /// Workload restarted on every change
    pub restart: RestartTarget,
    /// Re-subscribe when the watch stream ends instead of exiting
    pub reconnect: bool,
    pub reconnect_max_backoff: Duration,
    /// Extra update attempts after an optimistic concurrency conflict
    pub conflict_retries: u32,
    pub watch_timeout_secs: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = required(&lookup, vars::NAMESPACE)?;
        let secret_name = required(&lookup, vars::SECRET_NAME)?;
        let deploy_name = required(&lookup, vars::DEPLOY_NAME)?;

        // Anything but an explicit statefulset has always meant a deployment
        let kind = match optional(&lookup, vars::DEPLOY_TYPE) {
            Some(value) => WorkloadKind::from_str(&value)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("Invalid {}", vars::DEPLOY_TYPE))?,
            None => WorkloadKind::Deployment,
        };

        let reconnect_on_end: bool = parsed(&lookup, vars::RECONNECT, true)?;
        let max_backoff_secs: u64 = parsed(
            &lookup,
            vars::RECONNECT_MAX_BACKOFF_SECS,
            reconnect::DEFAULT_MAX_BACKOFF_SECS,
        )?;
        let conflict_retries: u32 = parsed(&lookup, vars::CONFLICT_RETRIES, 0)?;
        let watch_timeout_secs: u32 =
            parsed(&lookup, vars::WATCH_TIMEOUT_SECS, watch::DEFAULT_TIMEOUT_SECS)?;

        if watch_timeout_secs == 0 || watch_timeout_secs >= watch::MAX_TIMEOUT_SECS {
            bail!(
                "{} must be between 1 and {}, got {}",
                vars::WATCH_TIMEOUT_SECS,
                watch::MAX_TIMEOUT_SECS - 1,
                watch_timeout_secs
            );
        }

        Ok(Config {
            watch: WatchTarget {
                namespace: namespace.clone(),
                secret_name,
            },
            restart: RestartTarget {
                kind,
                namespace,
                name: deploy_name,
            },
            reconnect: reconnect_on_end,
            reconnect_max_backoff: Duration::from_secs(
                max_backoff_secs.max(reconnect::INITIAL_BACKOFF_SECS),
            ),
            conflict_retries,
            watch_timeout_secs,
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).with_context(|| format!("{} environment variable not set", key))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(lookup, key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", value, key)),
        None => Ok(default),
    }
}
