// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic dispatcher turning watch events into foreign API calls

use super::event::{EventType, RawEvent, WatchEvent};
use super::fence::TeardownFence;
use super::reflector::ResourceReflector;
use super::retry::RetryPolicy;
use crate::error::{FarsideError, Result};
use crate::foreign::ForeignClient;
use kube::{Resource, ResourceExt};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

/// What a single event resulted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Filtered out by the reflector, no API call issued
    Excluded,
    /// Target namespace is being torn down, write skipped
    Fenced,
    Created,
    /// Create answered AlreadyExists; counts as created
    AlreadyExisted,
    Updated,
    Deleted,
    /// Delete answered NotFound; counts as deleted
    AlreadyGone,
}

/// Reflects events of one kind into the foreign cluster.
///
/// `handle_event` is fire-and-forget: failures are logged and the event is
/// dropped, relying on later events or a resync to converge. It must be fed
/// from a single worker per key.
pub struct ReflectionEngine<R: ResourceReflector> {
    reflector: R,
    client: Arc<dyn ForeignClient<R::Kind>>,
    fence: Arc<TeardownFence>,
    retry: RetryPolicy,
    span: Span,
}

impl<R: ResourceReflector> ReflectionEngine<R> {
    pub fn new(
        reflector: R,
        client: Arc<dyn ForeignClient<R::Kind>>,
        fence: Arc<TeardownFence>,
    ) -> Self {
        let span = info_span!("reflection", kind = %<R::Kind as Resource>::kind(&()));
        Self {
            reflector,
            client,
            fence,
            retry: RetryPolicy::none(),
            span,
        }
    }

    /// Process one event, logging the outcome
    pub async fn handle_event(&self, event: WatchEvent<R::Kind>) {
        let span = info_span!(
            parent: &self.span,
            "handle_event",
            event = %event.type_,
            object = %format!("{}/{}", event.object.namespace().unwrap_or_default(), event.object.name_any())
        );

        async move {
            debug!("Received event");
            match self.reflect(event).await {
                Ok(outcome) => log_outcome(outcome),
                Err(e) => log_failure(&e),
            }
        }
        .instrument(span)
        .await
    }

    /// Cast a raw event to this engine's kind and process it
    pub async fn handle_raw(&self, event: RawEvent) {
        match event.cast::<R::Kind>() {
            Ok(event) => self.handle_event(event).await,
            Err(e) => self.span.in_scope(|| log_failure(&e)),
        }
    }

    /// Apply the reflector hooks and issue the foreign call
    pub async fn reflect(&self, event: WatchEvent<R::Kind>) -> Result<Outcome> {
        let object = event.object;
        if !self.reflector.is_allowed(&object) {
            return Ok(Outcome::Excluded);
        }

        match event.type_ {
            EventType::Added => {
                let remote = self.reflector.pre_add(&object)?;
                let namespace = remote.namespace().unwrap_or_default();
                // Held until the write lands, so a sweep cannot list in between
                let Some(_permit) = self.fence.enter(&namespace) else {
                    return Ok(Outcome::Fenced);
                };

                let (ns, obj) = (namespace.as_str(), &remote);
                match self.retry.run(move || self.client.create(ns, obj)).await {
                    Ok(()) => Ok(Outcome::Created),
                    Err(FarsideError::AlreadyExists(_)) => Ok(Outcome::AlreadyExisted),
                    Err(e) => Err(e),
                }
            }
            EventType::Modified => {
                let remote = self.reflector.pre_update(&object, None)?;
                let namespace = remote.namespace().unwrap_or_default();
                let Some(_permit) = self.fence.enter(&namespace) else {
                    return Ok(Outcome::Fenced);
                };

                let (ns, obj) = (namespace.as_str(), &remote);
                self.retry.run(move || self.client.update(ns, obj)).await?;
                Ok(Outcome::Updated)
            }
            EventType::Deleted => {
                let remote = self.reflector.pre_delete(&object)?;
                let namespace = remote.namespace().unwrap_or_default();
                let name = remote.name_any();

                let (ns, name) = (namespace.as_str(), name.as_str());
                match self.retry.run(move || self.client.delete(ns, name)).await {
                    Ok(()) => Ok(Outcome::Deleted),
                    Err(FarsideError::NotFound(_)) => Ok(Outcome::AlreadyGone),
                    Err(e) => Err(e),
                }
            }
        }
    }
}

fn log_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Excluded => debug!("Object excluded from reflection"),
        Outcome::Fenced => info!("Foreign namespace is being cleaned up, skipping write"),
        Outcome::Created => info!("Remote object correctly created"),
        Outcome::AlreadyExisted => debug!("Remote object already exists"),
        Outcome::Updated => info!("Remote object correctly updated"),
        Outcome::Deleted => info!("Remote object correctly deleted"),
        Outcome::AlreadyGone => debug!("Remote object already deleted"),
    }
}

fn log_failure(err: &FarsideError) {
    match err {
        FarsideError::CastError { .. } => error!("Dropping malformed event: {}", err),
        FarsideError::NamespaceTranslationError(_) => {
            warn!("Cannot translate namespace, dropping event: {}", err)
        }
        FarsideError::CacheMiss(_) => {
            warn!("Previous remote object unknown, dropping update: {}", err)
        }
        _ => error!("Error while reflecting object, dropping event: {}", err),
    }
}
