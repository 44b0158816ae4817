// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace-scoped removal of foreign mirrors

use super::fence::TeardownFence;
use super::retry::RetryPolicy;
use crate::foreign::{ForeignCache, ForeignClient, ReflectedKind};
use crate::translation::NamespaceTranslator;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument, Span};

/// Per-object results of one sweep. A sweep is best-effort: one failing
/// object never stops the others from being deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: Vec<String>,
    /// Delete answered NotFound
    pub already_gone: Vec<String>,
    /// Retry budget exhausted
    pub failed: Vec<String>,
    /// Translation or resync failed, nothing was listed
    pub aborted: bool,
}

impl SweepReport {
    fn aborted() -> Self {
        Self {
            aborted: true,
            ..Default::default()
        }
    }
}

/// Removes every foreign mirror of a home namespace being torn down
pub struct CleanupCoordinator<K> {
    translator: Arc<dyn NamespaceTranslator>,
    cache: Arc<dyn ForeignCache<K>>,
    client: Arc<dyn ForeignClient<K>>,
    fence: Arc<TeardownFence>,
    retry: RetryPolicy,
    span: Span,
}

impl<K: ReflectedKind> CleanupCoordinator<K> {
    pub fn new(
        translator: Arc<dyn NamespaceTranslator>,
        cache: Arc<dyn ForeignCache<K>>,
        client: Arc<dyn ForeignClient<K>>,
        fence: Arc<TeardownFence>,
    ) -> Self {
        Self {
            translator,
            cache,
            client,
            fence,
            retry: RetryPolicy::default_backoff(),
            span: info_span!("cleanup", kind = %K::kind(&())),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resync, list, then delete every mirror of `home_namespace`
    pub async fn cleanup_namespace(&self, home_namespace: &str) -> SweepReport {
        let span = info_span!(parent: &self.span, "cleanup_namespace", namespace = %home_namespace);
        self.sweep(home_namespace).instrument(span).await
    }

    async fn sweep(&self, home_namespace: &str) -> SweepReport {
        let foreign_namespace = match self.translator.translate(home_namespace, false) {
            Ok(ns) => ns,
            Err(e) => {
                error!("Cannot clean up namespace: {}", e);
                return SweepReport::aborted();
            }
        };

        // Waits for admitted writes, so the listing below includes them
        let _fence = self.fence.raise(&foreign_namespace).await;

        // The listing must reflect the foreign API, not a stale cache
        if let Err(e) = self.cache.resync(&foreign_namespace).await {
            error!(
                "Error while resyncing foreign cache for {}: {}",
                foreign_namespace, e
            );
            return SweepReport::aborted();
        }

        let objects = self.cache.list(&foreign_namespace);
        info!(
            "Deleting {} remote objects in {}",
            objects.len(),
            foreign_namespace
        );

        let mut report = SweepReport::default();
        for object in objects {
            let name = object.name_any();
            let (ns, n) = (foreign_namespace.as_str(), name.as_str());

            match self.retry.run(move || self.client.delete(ns, n)).await {
                Ok(()) => {
                    debug!("Deleted remote object {}/{}", ns, n);
                    report.deleted.push(name);
                }
                Err(e) if e.is_not_found() => {
                    debug!("Remote object {}/{} already deleted", ns, n);
                    report.already_gone.push(name);
                }
                Err(e) => {
                    error!("Error while deleting remote object {}/{}: {}", ns, n, e);
                    report.failed.push(name);
                }
            }
        }

        info!(
            "Cleanup of {} done: {} deleted, {} already gone, {} failed",
            foreign_namespace,
            report.deleted.len(),
            report.already_gone.len(),
            report.failed.len()
        );
        report
    }
}
