// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes resource helpers for the workloads that get restarted.

pub mod workload;

pub use workload::{set_template_annotation, template_annotations, RestartableWorkload};
