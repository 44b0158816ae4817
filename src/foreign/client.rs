// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace-scoped write operations against the foreign API

use super::ReflectedKind;
use crate::error::{FarsideError, Result};
use async_trait::async_trait;
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, ResourceExt,
};
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// Writes mirrors into the foreign cluster. Errors are classified
/// into `AlreadyExists`, `NotFound` or anything else.
#[async_trait]
pub trait ForeignClient<K>: Send + Sync {
    async fn create(&self, namespace: &str, object: &K) -> Result<()>;
    async fn update(&self, namespace: &str, object: &K) -> Result<()>;
    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

/// `ForeignClient` backed by a kube `Client` for the foreign cluster
pub struct KubeForeignClient<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeForeignClient<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: ReflectedKind> ForeignClient<K> for KubeForeignClient<K> {
    #[instrument(skip(self, object), fields(name = %object.name_any()))]
    async fn create(&self, namespace: &str, object: &K) -> Result<()> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), object)
            .await
            .map_err(FarsideError::from_api)?;
        debug!("Created {}/{}", namespace, object.name_any());
        Ok(())
    }

    #[instrument(skip(self, object), fields(name = %object.name_any()))]
    async fn update(&self, namespace: &str, object: &K) -> Result<()> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.replace(&object.name_any(), &PostParams::default(), object)
            .await
            .map_err(FarsideError::from_api)?;
        debug!("Replaced {}/{}", namespace, object.name_any());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default())
            .await
            .map_err(FarsideError::from_api)?;
        debug!("Deleted {}/{}", namespace, name);
        Ok(())
    }
}
