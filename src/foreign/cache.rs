// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Indexed cache of engine-managed foreign objects

use super::ReflectedKind;
use crate::constants::labels;
use crate::error::{FarsideError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use kube::{
    api::ListParams,
    runtime::{
        reflector::{store::Writer, ObjectRef, Store},
        watcher::{self, Event},
        WatchStreamExt,
    },
    Api, Client, ResourceExt,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Read-through cache of foreign objects, keyed by reflection key.
/// Reads must be safe from any number of concurrent reflectors.
#[async_trait]
pub trait ForeignCache<K>: Send + Sync {
    /// Refresh the namespace from the foreign API
    async fn resync(&self, namespace: &str) -> Result<()>;

    /// Snapshot of every cached object in the namespace
    fn list(&self, namespace: &str) -> Vec<K>;

    /// Look up an object by its reflection key
    fn get_by_key(&self, namespace: &str, key: &str) -> Result<K>;
}

/// Reflector store of one foreign namespace
struct NamespaceStore<K: ReflectedKind> {
    reader: Store<K>,
    writer: Mutex<Writer<K>>,
}

impl<K: ReflectedKind> NamespaceStore<K> {
    fn new() -> Self {
        let writer = Writer::default();
        Self {
            reader: writer.as_reader(),
            writer: Mutex::new(writer),
        }
    }

    fn writer(&self) -> MutexGuard<'_, Writer<K>> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `ForeignCache` backed by one reflector store per foreign namespace,
/// fed by a label-filtered watch and periodic list calls
pub struct KubeForeignCache<K: ReflectedKind> {
    client: Client,
    stores: Mutex<HashMap<String, Arc<NamespaceStore<K>>>>,
}

impl<K: ReflectedKind> KubeForeignCache<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            stores: Mutex::new(HashMap::new()),
        }
    }

    fn store(&self, namespace: &str) -> Arc<NamespaceStore<K>> {
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            stores
                .entry(namespace.to_string())
                .or_insert_with(|| Arc::new(NamespaceStore::new())),
        )
    }

    fn reader(&self, namespace: &str) -> Option<Store<K>> {
        self.stores
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(namespace)
            .map(|store| store.reader.clone())
    }

    fn apply_event(&self, namespace: &str, event: Event<K>) {
        if let Some(event) = managed(event) {
            self.store(namespace).writer().apply_watcher_event(&event);
        }
    }

    /// Watch every namespace and resync them all on `interval`
    pub async fn run(self: Arc<Self>, namespaces: Vec<String>, interval: Duration) -> anyhow::Result<()> {
        info!("Foreign cache started for {} namespaces", namespaces.len());

        let watches = namespaces
            .iter()
            .map(|ns| Arc::clone(&self).watch_namespace(ns.clone()));

        tokio::join!(
            futures::future::join_all(watches),
            Arc::clone(&self).resync_periodically(namespaces.clone(), interval)
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn watch_namespace(self: Arc<Self>, namespace: String) {
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        let config = watcher::Config::default().labels(&labels::reflected_selector());
        let mut stream = watcher::watcher(api, config).default_backoff().boxed();

        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => self.apply_event(&namespace, event),
                Err(e) => warn!("Foreign watch error: {}", e),
            }
        }
    }

    async fn resync_periodically(self: Arc<Self>, namespaces: Vec<String>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        // The watch performs the initial listing
        ticker.tick().await;

        loop {
            ticker.tick().await;
            for namespace in &namespaces {
                if let Err(e) = self.resync(namespace).await {
                    warn!("Failed to resync foreign namespace {}: {}", namespace, e);
                }
            }
        }
    }
}

#[async_trait]
impl<K: ReflectedKind> ForeignCache<K> for KubeForeignCache<K> {
    #[instrument(skip(self))]
    async fn resync(&self, namespace: &str) -> Result<()> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(&labels::reflected_selector());
        let list = api.list(&params).await?;
        debug!("Resynced {} foreign objects", list.items.len());

        // Applied as a diff so a relist in progress on the watch keeps its buffer
        let store = self.store(namespace);
        let mut writer = store.writer();
        let mut listed = HashSet::new();
        for object in list.items.into_iter().filter(is_reflected) {
            listed.insert(object.name_any());
            writer.apply_watcher_event(&Event::Apply(object));
        }
        for stale in store.reader.state() {
            if !listed.contains(&stale.name_any()) {
                writer.apply_watcher_event(&Event::Delete(K::clone(&stale)));
            }
        }
        Ok(())
    }

    fn list(&self, namespace: &str) -> Vec<K> {
        self.reader(namespace)
            .map(|reader| reader.state().iter().map(|o| K::clone(o)).collect())
            .unwrap_or_default()
    }

    fn get_by_key(&self, namespace: &str, key: &str) -> Result<K> {
        let name = key
            .strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('/'));

        name.zip(self.reader(namespace))
            .and_then(|(name, reader)| reader.get(&ObjectRef::new(name).within(namespace)))
            .map(|o| K::clone(&o))
            .ok_or_else(|| FarsideError::CacheMiss(key.to_string()))
    }
}

fn is_reflected<K: ReflectedKind>(object: &K) -> bool {
    object
        .labels()
        .get(labels::REFLECTED_KEY)
        .is_some_and(|v| v == labels::REFLECTED_VALUE)
}

/// Drop objects that lost the reflected marker; they are no longer ours
fn managed<K: ReflectedKind>(event: Event<K>) -> Option<Event<K>> {
    match event {
        Event::Apply(o) if !is_reflected(&o) => Some(Event::Delete(o)),
        Event::InitApply(o) if !is_reflected(&o) => None,
        event => Some(event),
    }
}
