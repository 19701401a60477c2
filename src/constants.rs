// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Pod template annotation keys written by the reloader
pub mod annotations {
    /// Bumped on every detected secret change to force a rolling restart
    pub const SECRET_RELOAD: &str = "secret-reload";
}

/// Environment variable names read by `Config::from_env`
pub mod env {
    pub const NAMESPACE: &str = "NAMESPACE";
    pub const SECRET_NAME: &str = "SECRET_NAME";
    pub const DEPLOY_TYPE: &str = "DEPLOY_TYPE";
    pub const DEPLOY_NAME: &str = "DEPLOY_NAME";
    pub const RECONNECT: &str = "RECONNECT";
    pub const RECONNECT_MAX_BACKOFF_SECS: &str = "RECONNECT_MAX_BACKOFF_SECS";
    pub const CONFLICT_RETRIES: &str = "CONFLICT_RETRIES";
    pub const WATCH_TIMEOUT_SECS: &str = "WATCH_TIMEOUT_SECS";
}

/// Watch stream configuration
pub mod watch {
    /// Resource version that starts a watch at the most recent state
    pub const FROM_NOW: &str = "0";
    /// Default server-side watch timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u32 = 290;
    /// The API server rejects watch timeouts at or above this value
    pub const MAX_TIMEOUT_SECS: u32 = 295;
}

/// Reconnect backoff configuration
pub mod reconnect {
    /// Initial delay in seconds before re-subscribing after a failed attempt
    pub const INITIAL_BACKOFF_SECS: u64 = 1;
    /// Default maximum delay in seconds (exponential backoff cap)
    pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 60;
    /// A watch that delivered nothing and closed sooner than this is treated
    /// as a failed subscription and backed off
    pub const MIN_HEALTHY_SESSION_SECS: u64 = 10;
}
