// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: mocked Kubernetes API responses and in-memory foreign fakes.

use crate::error::FarsideError;
use crate::foreign::{ForeignCache, ForeignClient, ReflectedKind};
use crate::reflection::key::reflection_key;
use crate::reflection::{
    CleanupCoordinator, Reflection, ReflectionEngine, ReflectorRegistry, RetryPolicy,
    TeardownFence,
};
use crate::reflectors::SecretReflector;
use crate::translation::StaticNamespaceTable;
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::Secret;
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("POST".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for PUT requests matching the path prefix
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("PUT".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for DELETE requests matching the path prefix
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("DELETE".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
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
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            match response {
                Some((status, body)) => Ok(Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap()),
                None => {
                    // Default 404 for unmatched requests
                    let body = status_json(404, "NotFound", "not found");
                    Ok(Response::builder()
                        .status(404)
                        .header("content-type", "application/json")
                        .body(Body::from(body.into_bytes()))
                        .unwrap())
                }
            }
        })
    }
}

/// Create a mock secret JSON response
pub fn secret_json(namespace: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        },
        "type": "Opaque"
    })
    .to_string()
}

/// Create a Status failure response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    status_json(
        409,
        "AlreadyExists",
        &format!("{} \"{}\" already exists", resource, name),
    )
}

/// Failure a `FakeForeignClient` answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    AlreadyExists,
    NotFound,
    Remote,
}

impl FakeFailure {
    fn to_error(self, name: &str) -> FarsideError {
        match self {
            FakeFailure::AlreadyExists => FarsideError::AlreadyExists(name.to_string()),
            FakeFailure::NotFound => FarsideError::NotFound(name.to_string()),
            FakeFailure::Remote => FarsideError::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: "etcd unavailable".to_string(),
                reason: "InternalError".to_string(),
                code: 500,
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Update,
    Delete,
}

/// A call received by a `FakeForeignClient`
#[derive(Debug, Clone)]
pub struct RecordedCall<K> {
    pub op: Op,
    pub namespace: String,
    pub name: String,
    pub object: Option<K>,
}

/// In-memory `ForeignClient` recording every call
pub struct FakeForeignClient<K> {
    calls: Mutex<Vec<RecordedCall<K>>>,
    /// (op, name) -> (failure, remaining times)
    failures: Mutex<HashMap<(Op, String), (FakeFailure, usize)>>,
}

impl<K: Clone> FakeForeignClient<K> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Fail `op` on `name` for the next `times` calls
    pub fn fail(self, op: Op, name: &str, failure: FakeFailure, times: usize) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((op, name.to_string()), (failure, times));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall<K>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, op: Op) -> Vec<RecordedCall<K>> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    fn record(&self, op: Op, namespace: &str, name: &str, object: Option<&K>) -> crate::error::Result<()> {
        self.calls.lock().unwrap().push(RecordedCall {
            op,
            namespace: namespace.to_string(),
            name: name.to_string(),
            object: object.cloned(),
        });

        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&(op, name.to_string())) {
            Some((failure, remaining)) if *remaining > 0 => {
                *remaining -= 1;
                Err(failure.to_error(name))
            }
            _ => Ok(()),
        }
    }
}

impl<K: Clone> Default for FakeForeignClient<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: ReflectedKind> ForeignClient<K> for FakeForeignClient<K> {
    async fn create(&self, namespace: &str, object: &K) -> crate::error::Result<()> {
        self.record(Op::Create, namespace, &object.name_any(), Some(object))
    }

    async fn update(&self, namespace: &str, object: &K) -> crate::error::Result<()> {
        self.record(Op::Update, namespace, &object.name_any(), Some(object))
    }

    async fn delete(&self, namespace: &str, name: &str) -> crate::error::Result<()> {
        self.record(Op::Delete, namespace, name, None)
    }
}

/// In-memory `ForeignCache`
pub struct FakeForeignCache<K> {
    objects: Mutex<HashMap<String, Vec<K>>>,
    fail_resync: bool,
    resyncs: Mutex<Vec<String>>,
}

impl<K: ReflectedKind> FakeForeignCache<K> {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_resync: false,
            resyncs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_object(self, object: K) -> Self {
        let namespace = object.namespace().unwrap_or_default();
        self.objects
            .lock()
            .unwrap()
            .entry(namespace)
            .or_default()
            .push(object);
        self
    }

    /// Insert or replace an object, as a foreign watch event would
    pub fn put(&self, object: K) {
        let namespace = object.namespace().unwrap_or_default();
        let name = object.name_any();
        let mut objects = self.objects.lock().unwrap();
        let entries = objects.entry(namespace).or_default();
        entries.retain(|o| o.name_any() != name);
        entries.push(object);
    }

    pub fn failing_resync(mut self) -> Self {
        self.fail_resync = true;
        self
    }

    pub fn resyncs(&self) -> Vec<String> {
        self.resyncs.lock().unwrap().clone()
    }
}

impl<K: ReflectedKind> Default for FakeForeignCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: ReflectedKind> ForeignCache<K> for FakeForeignCache<K> {
    async fn resync(&self, namespace: &str) -> crate::error::Result<()> {
        self.resyncs.lock().unwrap().push(namespace.to_string());
        if self.fail_resync {
            return Err(FakeFailure::Remote.to_error(namespace));
        }
        Ok(())
    }

    fn list(&self, namespace: &str) -> Vec<K> {
        self.objects
            .lock()
            .unwrap()
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }

    fn get_by_key(&self, namespace: &str, key: &str) -> crate::error::Result<K> {
        self.list(namespace)
            .into_iter()
            .find(|o| reflection_key(namespace, &o.name_any()) == key)
            .ok_or_else(|| FarsideError::CacheMiss(key.to_string()))
    }
}

/// Namespace table mapping `default` to `ns-remote-123`
pub fn default_translator() -> Arc<StaticNamespaceTable> {
    Arc::new(
        StaticNamespaceTable::new(BTreeMap::from([(
            "default".to_string(),
            "ns-remote-123".to_string(),
        )]))
        .unwrap(),
    )
}

/// Registry holding a single Secret reflection wired to the given fakes
pub fn secret_registry(
    client: Arc<FakeForeignClient<Secret>>,
    cache: Arc<FakeForeignCache<Secret>>,
) -> ReflectorRegistry {
    let translator = default_translator();
    let fence = TeardownFence::new();
    let engine = ReflectionEngine::new(
        SecretReflector::new(translator.clone(), cache.clone()),
        client.clone(),
        fence.clone(),
    );
    let cleanup = CleanupCoordinator::<Secret>::new(translator, cache, client, fence)
        .with_retry(RetryPolicy::none());

    let mut registry = ReflectorRegistry::new();
    registry.register(Reflection::new(engine, cleanup));
    registry
}
