// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workload kinds whose pod template can be touched to force a rollout

use crate::types::WorkloadKind;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ObjectMeta;
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A namespaced workload that owns a pod template.
///
/// Both implementations differ only in where the template lives, so the
/// fetch, stamp and replace sequence is written once against this trait.
pub trait RestartableWorkload:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
    const KIND: WorkloadKind;

    fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec>;

    fn pod_template(&self) -> Option<&PodTemplateSpec>;
}

impl RestartableWorkload for Deployment {
    const KIND: WorkloadKind = WorkloadKind::Deployment;

    fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec> {
        self.spec.as_mut().map(|s| &mut s.template)
    }

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}

impl RestartableWorkload for StatefulSet {
    const KIND: WorkloadKind = WorkloadKind::StatefulSet;

    fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec> {
        self.spec.as_mut().map(|s| &mut s.template)
    }

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}

/// Set an annotation on a pod template, creating metadata and the
/// annotation map when the template has none yet
pub fn set_template_annotation(template: &mut PodTemplateSpec, key: &str, value: String) {
    template
        .metadata
        .get_or_insert_with(ObjectMeta::default)
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(key.to_string(), value);
}

/// Read the annotations of a workload's pod template
pub fn template_annotations<K: RestartableWorkload>(workload: &K) -> Option<&BTreeMap<String, String>> {
    workload
        .pod_template()
        .and_then(|t| t.metadata.as_ref())
        .and_then(|m| m.annotations.as_ref())
}
