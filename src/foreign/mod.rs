// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Access to the foreign cluster: API client and indexed cache.

pub mod cache;
pub mod client;

pub use cache::{ForeignCache, KubeForeignCache};
pub use client::{ForeignClient, KubeForeignClient};

use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Bounds every reflected, namespaced resource kind satisfies
pub trait ReflectedKind:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> ReflectedKind for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}
