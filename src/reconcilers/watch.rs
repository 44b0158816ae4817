// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watches every registered kind in every mapped home namespace

use super::events::EventClassifier;
use crate::reflection::ReflectorRegistry;
use futures::StreamExt;
use kube::{
    api::{ApiResource, DynamicObject},
    core::TypeMeta,
    runtime::{watcher, WatchStreamExt},
    Api, Client,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Feeds home-cluster watch events to the registered reflections.
/// Each (kind, namespace) stream is handled by a single worker, so events
/// for the same object are processed in order.
pub struct ReflectionWatcher {
    client: Client,
    registry: Arc<ReflectorRegistry>,
    namespaces: Vec<String>,
}

impl ReflectionWatcher {
    pub fn new(client: Client, registry: Arc<ReflectorRegistry>, namespaces: Vec<String>) -> Self {
        Self {
            client,
            registry,
            namespaces,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let resources: Vec<ApiResource> = self
            .registry
            .reflections()
            .map(|reflection| reflection.api_resource())
            .collect();

        let (client, registry, namespaces) = (&self.client, &self.registry, &self.namespaces);
        let feeds = resources.iter().flat_map(|resource| {
            namespaces.iter().map(move |namespace| {
                feed(
                    client.clone(),
                    Arc::clone(registry),
                    resource.clone(),
                    namespace.clone(),
                )
            })
        });

        futures::future::join_all(feeds).await;
        warn!("All reflection watches stopped");
        Ok(())
    }
}

#[instrument(skip(client, registry, resource), fields(kind = %resource.kind))]
async fn feed(
    client: Client,
    registry: Arc<ReflectorRegistry>,
    resource: ApiResource,
    namespace: String,
) {
    let api: Api<DynamicObject> = Api::namespaced_with(client, &namespace, &resource);
    let mut classifier = EventClassifier::new(TypeMeta {
        api_version: resource.api_version.clone(),
        kind: resource.kind.clone(),
    });

    info!("Watching {} in namespace {}", resource.plural, namespace);

    let mut stream = watcher::watcher(api, watcher::Config::default())
        .default_backoff()
        .boxed();

    while let Some(event) = stream.next().await {
        match event {
            Ok(event) => {
                for raw in classifier.classify(event) {
                    registry.dispatch(raw).await;
                }
            }
            Err(e) => warn!("Watch error: {}", e),
        }
    }
}
