// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reflection hooks

use crate::constants::secrets;
use crate::error::Result;
use crate::foreign::ForeignCache;
use crate::reflection::reflector::{merge_maps, stamp_marker, ResourceReflector};
use crate::translation::NamespaceTranslator;
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ObjectMeta, ResourceExt};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Reflects Secrets into the foreign cluster
pub struct SecretReflector {
    translator: Arc<dyn NamespaceTranslator>,
    cache: Arc<dyn ForeignCache<Secret>>,
}

impl SecretReflector {
    pub fn new(
        translator: Arc<dyn NamespaceTranslator>,
        cache: Arc<dyn ForeignCache<Secret>>,
    ) -> Self {
        Self { translator, cache }
    }

    fn foreign_namespace(&self, secret: &Secret) -> Result<String> {
        self.translator
            .translate(&secret.namespace().unwrap_or_default(), false)
    }
}

impl ResourceReflector for SecretReflector {
    type Kind = Secret;

    #[instrument(skip(self, secret), fields(secret = %format!("{}/{}", secret.namespace().unwrap_or_default(), secret.name_any())))]
    fn pre_add(&self, secret: &Secret) -> Result<Secret> {
        let foreign_namespace = self.foreign_namespace(secret)?;

        let mut labels = merge_maps(None, secret.metadata.labels.as_ref());
        stamp_marker(&mut labels);

        let mut remote = Secret {
            metadata: ObjectMeta {
                name: secret.metadata.name.clone(),
                namespace: Some(foreign_namespace),
                labels: Some(labels),
                annotations: Some(merge_maps(None, secret.metadata.annotations.as_ref())),
                ..Default::default()
            },
            data: secret.data.clone(),
            string_data: secret.string_data.clone(),
            type_: secret.type_.clone(),
            immutable: None,
        };
        retype_service_account_token(&mut remote);

        debug!("PreAdd completed");
        Ok(remote)
    }

    #[instrument(skip(self, secret, _old), fields(secret = %format!("{}/{}", secret.namespace().unwrap_or_default(), secret.name_any())))]
    fn pre_update(&self, secret: &Secret, _old: Option<&Secret>) -> Result<Secret> {
        let foreign_namespace = self.foreign_namespace(secret)?;
        let key = self.keyer(secret, &foreign_namespace);
        let previous = self.cache.get_by_key(&foreign_namespace, &key)?;

        let mut labels = merge_maps(
            previous.metadata.labels.as_ref(),
            secret.metadata.labels.as_ref(),
        );
        stamp_marker(&mut labels);

        let mut remote = Secret {
            metadata: ObjectMeta {
                name: secret.metadata.name.clone(),
                namespace: Some(foreign_namespace),
                resource_version: previous.metadata.resource_version.clone(),
                uid: previous.metadata.uid.clone(),
                labels: Some(labels),
                annotations: Some(merge_maps(
                    previous.metadata.annotations.as_ref(),
                    secret.metadata.annotations.as_ref(),
                )),
                ..Default::default()
            },
            data: secret.data.clone(),
            string_data: secret.string_data.clone(),
            type_: secret.type_.clone(),
            immutable: None,
        };
        retype_service_account_token(&mut remote);

        debug!("PreUpdate completed");
        Ok(remote)
    }

    fn pre_delete(&self, secret: &Secret) -> Result<Secret> {
        let mut remote = secret.clone();
        remote.metadata.namespace = Some(self.foreign_namespace(secret)?);
        Ok(remote)
    }
}

/// Service account token secrets cannot be created through the API server.
/// They are mirrored as Opaque, labelled with the originating service account,
/// and stripped of the service account annotations.
fn retype_service_account_token(secret: &mut Secret) {
    if secret.type_.as_deref() != Some(secrets::TYPE_SERVICE_ACCOUNT_TOKEN) {
        return;
    }

    secret.type_ = Some(secrets::TYPE_OPAQUE.to_string());

    let annotations = secret.metadata.annotations.get_or_insert_with(Default::default);
    let account = annotations
        .remove(secrets::SERVICE_ACCOUNT_NAME)
        .unwrap_or_default();
    annotations.remove(secrets::SERVICE_ACCOUNT_UID);

    secret
        .metadata
        .labels
        .get_or_insert_with(Default::default)
        .insert(secrets::SERVICE_ACCOUNT_NAME.to_string(), account);
}
