// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Forcing a rolling restart by stamping the pod template

use crate::error::{ReloaderError, Result};
use crate::kubernetes::{set_template_annotation, RestartableWorkload};
use crate::restart::marker::MarkerClock;
use crate::types::{RestartTarget, WorkloadKind};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use kube::{api::PostParams, Api, Client};
use std::future::Future;
use tracing::{debug, info, instrument, warn};

/// Something that can restart the configured workload.
pub trait Restart {
    fn restart(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Restarts a Deployment or StatefulSet through the API server.
pub struct WorkloadRestarter {
    client: Client,
    target: RestartTarget,
    conflict_retries: u32,
    clock: MarkerClock,
}

impl WorkloadRestarter {
    pub fn new(client: Client, target: RestartTarget, conflict_retries: u32) -> Self {
        Self {
            client,
            target,
            conflict_retries,
            clock: MarkerClock::new(),
        }
    }
}

impl Restart for WorkloadRestarter {
    #[instrument(skip(self), fields(kind = %self.target.kind, workload = %format!("{}/{}", self.target.namespace, self.target.name)))]
    async fn restart(&self) -> Result<()> {
        match self.target.kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> =
                    Api::namespaced(self.client.clone(), &self.target.namespace);
                restart_workload(&api, &self.target, &self.clock, self.conflict_retries).await?;
            }
            WorkloadKind::StatefulSet => {
                let api: Api<StatefulSet> =
                    Api::namespaced(self.client.clone(), &self.target.namespace);
                restart_workload(&api, &self.target, &self.clock, self.conflict_retries).await?;
            }
        }
        Ok(())
    }
}

/// Fetch the workload, stamp a fresh restart marker on its pod template and
/// replace the whole object. A conflict is retried with a fresh read at most
/// `conflict_retries` times, then returned as-is.
pub async fn restart_workload<K: RestartableWorkload>(
    api: &Api<K>,
    target: &RestartTarget,
    clock: &MarkerClock,
    conflict_retries: u32,
) -> Result<K> {
    let mut attempt = 0;

    loop {
        let mut workload = fetch_workload(api, target).await?;

        let marker = clock.next_marker();
        let template = workload
            .pod_template_mut()
            .ok_or_else(|| ReloaderError::MissingSpec {
                kind: K::KIND,
                namespace: target.namespace.clone(),
                name: target.name.clone(),
            })?;
        debug!("Setting {}={} on pod template", marker.key, marker.value);
        set_template_annotation(template, marker.key, marker.value);

        match replace_workload(api, target, &workload).await {
            Ok(updated) => {
                info!(
                    "Triggered rolling restart of {} {}/{}",
                    K::KIND,
                    target.namespace,
                    target.name
                );
                return Ok(updated);
            }
            Err(err @ ReloaderError::Conflict { .. }) if attempt < conflict_retries => {
                attempt += 1;
                warn!(
                    "{}, refetching (retry {}/{})",
                    err, attempt, conflict_retries
                );
            }
            Err(err) => return Err(err),
        }
    }
}

async fn fetch_workload<K: RestartableWorkload>(api: &Api<K>, target: &RestartTarget) -> Result<K> {
    api.get(&target.name).await.map_err(|e| match e {
        kube::Error::Api(err) if err.code == 404 => ReloaderError::WorkloadNotFound {
            kind: K::KIND,
            namespace: target.namespace.clone(),
            name: target.name.clone(),
        },
        source => ReloaderError::FetchFailed {
            kind: K::KIND,
            namespace: target.namespace.clone(),
            name: target.name.clone(),
            source,
        },
    })
}

async fn replace_workload<K: RestartableWorkload>(
    api: &Api<K>,
    target: &RestartTarget,
    workload: &K,
) -> Result<K> {
    api.replace(&target.name, &PostParams::default(), workload)
        .await
        .map_err(|source| {
            let kind = K::KIND;
            let namespace = target.namespace.clone();
            let name = target.name.clone();
            if matches!(&source, kube::Error::Api(err) if err.code == 409) {
                ReloaderError::Conflict {
                    kind,
                    namespace,
                    name,
                    source,
                }
            } else {
                ReloaderError::UpdateFailed {
                    kind,
                    namespace,
                    name,
                    source,
                }
            }
        })
}
