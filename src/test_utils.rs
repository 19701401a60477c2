// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::time::Instant;
use tower::Service;

type ResponseKey = (String, String);

/// A request received by the mock API server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Vec<u8>,
    pub at: Instant,
}

impl RecordedRequest {
    pub fn is_watch(&self) -> bool {
        self.query
            .as_deref()
            .is_some_and(|q| q.split('&').any(|pair| pair == "watch=true"))
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Several responses registered for the same method and path are served in
/// order; the last one is repeated once the others are used up. Watch
/// requests use the `on_watch` responses and fall back to `on_get` ones.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<ResponseKey, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PUT requests matching the path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Add a response for watch requests (`GET ...?watch=true`) on the path
    pub fn on_watch(self, path: &str, status: u16, body: &str) -> Self {
        self.on(WATCH, path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for an exact method and path
    pub fn requests_matching(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Watch subscriptions opened on a collection path
    pub fn watch_requests(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests_matching("GET", path)
            .into_iter()
            .filter(RecordedRequest::is_watch)
            .collect()
    }

    /// Plain GET requests (get or list, not watch) on a path
    pub fn read_requests(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests_matching("GET", path)
            .into_iter()
            .filter(|r| !r.is_watch())
            .collect()
    }

    fn next_response(&self, method: &str, path: &str, watch: bool) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();

        let key = watch
            .then(|| find_key(&responses, WATCH, path))
            .flatten()
            .or_else(|| find_key(&responses, method, path))?;

        let queue = responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

const WATCH: &str = "WATCH";

/// Exact match first, then the longest registered prefix
fn find_key(
    responses: &HashMap<ResponseKey, VecDeque<(u16, String)>>,
    method: &str,
    path: &str,
) -> Option<ResponseKey> {
    let key = (method.to_string(), path.to_string());
    if responses.contains_key(&key) {
        return Some(key);
    }
    responses
        .keys()
        .filter(|(m, p)| m == method && path.starts_with(p.as_str()))
        .max_by_key(|(_, p)| p.len())
        .cloned()
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes().to_vec();
            let method = parts.method.to_string();
            let path = parts.uri.path().to_string();

            let recorded = RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                query: parts.uri.query().map(str::to_string),
                body,
                at: Instant::now(),
            };
            let watch = recorded.is_watch();
            this.requests.lock().unwrap().push(recorded);

            let (status, body) = this
                .next_response(&method, &path, watch)
                .unwrap_or_else(|| (404, not_found_json("resource", &path)));

            Ok::<_, tower::BoxError>(
                Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap(),
            )
        })
    }
}

fn template_json(annotations: Option<&[(&str, &str)]>) -> serde_json::Value {
    let mut metadata = serde_json::json!({ "labels": { "app": "test" } });
    if let Some(annotations) = annotations {
        let map: serde_json::Map<String, serde_json::Value> = annotations
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        metadata["annotations"] = serde_json::Value::Object(map);
    }
    serde_json::json!({
        "metadata": metadata,
        "spec": { "containers": [{ "name": "app", "image": "nginx:1.27" }] }
    })
}

/// Create a mock Deployment JSON response
pub fn deployment_json(name: &str, annotations: Option<&[(&str, &str)]>) -> String {
    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": "apps",
            "resourceVersion": "100"
        },
        "spec": {
            "selector": { "matchLabels": { "app": "test" } },
            "template": template_json(annotations)
        }
    })
    .to_string()
}

/// Create a mock StatefulSet JSON response
pub fn statefulset_json(name: &str, annotations: Option<&[(&str, &str)]>) -> String {
    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "StatefulSet",
        "metadata": {
            "name": name,
            "namespace": "apps",
            "resourceVersion": "200"
        },
        "spec": {
            "serviceName": name,
            "selector": { "matchLabels": { "app": "test" } },
            "template": template_json(annotations)
        }
    })
    .to_string()
}

/// Create a mock Secret JSON response
pub fn secret_json(name: &str, resource_version: &str) -> String {
    secret_value(name, resource_version).to_string()
}

fn secret_value(name: &str, resource_version: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": "apps",
            "resourceVersion": resource_version
        },
        "data": { "password": "c2VjcmV0MTIz" },
        "type": "Opaque"
    })
}

/// Create a mock SecretList JSON response; `items` are `(name, resourceVersion)`
pub fn secret_list_json(list_version: &str, items: &[(&str, &str)]) -> String {
    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|(name, resource_version)| secret_value(name, resource_version))
        .collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "SecretList",
        "metadata": { "resourceVersion": list_version },
        "items": items
    })
    .to_string()
}

/// Create a 403 forbidden response
pub fn forbidden_json(message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": "Forbidden",
        "code": 403
    })
    .to_string()
}

/// Newline-delimited watch stream body with one event per `(type, resourceVersion)`
pub fn watch_body(secret_name: &str, events: &[(&str, &str)]) -> String {
    events
        .iter()
        .map(|(event_type, resource_version)| {
            let line = serde_json::json!({
                "type": event_type,
                "object": secret_value(secret_name, resource_version)
            });
            format!("{}\n", line)
        })
        .collect()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a 409 optimistic concurrency conflict response
pub fn conflict_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!(
            "Operation cannot be fulfilled on {} \"{}\": the object has been modified; please apply your changes to the latest version and try again",
            resource, name
        ),
        "reason": "Conflict",
        "code": 409
    })
    .to_string()
}
