// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace reconciler - sweeps foreign mirrors when a mapped home namespace terminates.

use crate::error::{FarsideError, Result};
use crate::reflection::ReflectorRegistry;
use crate::translation::NamespaceTranslator;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    runtime::{controller::Action, reflector::Store, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct NamespaceReconciler {
    client: Client,
    registry: Arc<ReflectorRegistry>,
    translator: Arc<dyn NamespaceTranslator>,
    /// UIDs of namespaces already swept
    swept: Mutex<HashSet<String>>,
    /// Namespaces known to the controller, used to forget swept UIDs
    live: Option<Store<Namespace>>,
}

impl NamespaceReconciler {
    pub fn new(
        client: Client,
        registry: Arc<ReflectorRegistry>,
        translator: Arc<dyn NamespaceTranslator>,
    ) -> Self {
        Self {
            client,
            registry,
            translator,
            swept: Mutex::new(HashSet::new()),
            live: None,
        }
    }

    fn track(mut self, live: Store<Namespace>) -> Self {
        self.live = Some(live);
        self
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let controller = Controller::new(namespaces, watcher::Config::default());
        let context = Arc::new(self.track(controller.store()));

        controller
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled namespace: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Returns false when the namespace was already swept
    fn mark_swept(&self, uid: &str) -> bool {
        self.swept
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uid.to_string())
    }

    /// Drop swept UIDs of namespaces that no longer exist
    fn prune_swept(&self) {
        let Some(live) = &self.live else {
            return;
        };
        let uids: HashSet<String> = live.state().iter().filter_map(|ns| ns.uid()).collect();
        self.swept
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|uid| uids.contains(uid));
    }

    fn forget(&self, uid: &str) {
        self.swept
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uid);
    }
}

async fn reconcile(namespace: Arc<Namespace>, ctx: Arc<NamespaceReconciler>) -> Result<Action> {
    let name = namespace.name_any();
    ctx.prune_swept();

    if namespace.metadata.deletion_timestamp.is_none() {
        return Ok(Action::await_change());
    }

    if ctx.translator.translate(&name, false).is_err() {
        debug!("Namespace {} is not reflected, skipping", name);
        return Ok(Action::await_change());
    }

    let uid = namespace.uid().unwrap_or_else(|| name.clone());
    if !ctx.mark_swept(&uid) {
        debug!("Namespace {} already cleaned up", name);
        return Ok(Action::await_change());
    }

    info!("Namespace {} is terminating, removing foreign mirrors", name);

    let mut aborted = false;
    for (kind, report) in ctx.registry.cleanup_namespace(&name).await {
        if report.aborted {
            warn!("Cleanup of {} in {} was aborted", kind, name);
            aborted = true;
        }
    }

    if aborted {
        ctx.forget(&uid);
        return Ok(Action::requeue(Duration::from_secs(60)));
    }

    Ok(Action::await_change())
}

fn error_policy(
    _namespace: Arc<Namespace>,
    error: &FarsideError,
    _ctx: Arc<NamespaceReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}
