// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry of reflected kinds, so events are routed to one generic engine per kind

use super::cleanup::{CleanupCoordinator, SweepReport};
use super::engine::ReflectionEngine;
use super::event::{kind_key, kind_key_of, RawEvent};
use super::key::key_for_raw;
use super::reflector::ResourceReflector;
use async_trait::async_trait;
use kube::api::{ApiResource, DynamicObject};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;

/// Kind-erased view of an engine and its cleanup coordinator
#[async_trait]
pub trait KindReflection: Send + Sync {
    fn api_resource(&self) -> ApiResource;

    /// Reflection key of a raw object; empty if it is not of this kind
    fn keyer(&self, object: &DynamicObject, target_namespace: &str) -> String;

    async fn handle_raw(&self, event: RawEvent);

    async fn cleanup_namespace(&self, home_namespace: &str) -> SweepReport;
}

/// Engine plus cleanup for one concrete reflector
pub struct Reflection<R: ResourceReflector> {
    engine: ReflectionEngine<R>,
    cleanup: CleanupCoordinator<R::Kind>,
}

impl<R: ResourceReflector> Reflection<R> {
    pub fn new(engine: ReflectionEngine<R>, cleanup: CleanupCoordinator<R::Kind>) -> Self {
        Self { engine, cleanup }
    }
}

#[async_trait]
impl<R: ResourceReflector> KindReflection for Reflection<R> {
    fn api_resource(&self) -> ApiResource {
        ApiResource::erase::<R::Kind>(&())
    }

    fn keyer(&self, object: &DynamicObject, target_namespace: &str) -> String {
        key_for_raw::<R::Kind>(object, target_namespace)
    }

    async fn handle_raw(&self, event: RawEvent) {
        self.engine.handle_raw(event).await;
    }

    async fn cleanup_namespace(&self, home_namespace: &str) -> SweepReport {
        self.cleanup.cleanup_namespace(home_namespace).await
    }
}

/// `apiVersion/Kind` -> reflection
#[derive(Default)]
pub struct ReflectorRegistry {
    kinds: BTreeMap<String, Arc<dyn KindReflection>>,
}

impl ReflectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reflection, replacing any previous one for the same kind
    pub fn register<R: ResourceReflector>(&mut self, reflection: Reflection<R>) -> &mut Self {
        self.kinds
            .insert(kind_key_of::<R::Kind>(), Arc::new(reflection));
        self
    }

    pub fn get(&self, api_version: &str, kind: &str) -> Option<Arc<dyn KindReflection>> {
        self.kinds.get(&kind_key(api_version, kind)).cloned()
    }

    pub fn reflections(&self) -> impl Iterator<Item = &Arc<dyn KindReflection>> {
        self.kinds.values()
    }

    /// Route a raw event to the reflection for its kind
    pub async fn dispatch(&self, event: RawEvent) {
        let Some(types) = event.object.types.as_ref() else {
            error!("Dropping event for untyped object");
            return;
        };

        match self.get(&types.api_version, &types.kind) {
            Some(reflection) => reflection.handle_raw(event).await,
            None => error!(
                "Dropping event, no reflector registered for {}",
                kind_key(&types.api_version, &types.kind)
            ),
        }
    }

    /// Run the cleanup sweep of every registered kind
    pub async fn cleanup_namespace(&self, home_namespace: &str) -> Vec<(String, SweepReport)> {
        let sweeps = self.kinds.iter().map(|(kind, reflection)| async move {
            (kind.clone(), reflection.cleanup_namespace(home_namespace).await)
        });
        futures::future::join_all(sweeps).await
    }
}
