// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch events consumed by the reflection engine

use crate::error::{FarsideError, Result};
use crate::foreign::ReflectedKind;
use kube::api::DynamicObject;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Added => "ADDED",
            EventType::Modified => "MODIFIED",
            EventType::Deleted => "DELETED",
        };
        f.write_str(name)
    }
}

/// A watch event carrying an object of kind `K`
#[derive(Debug, Clone)]
pub struct WatchEvent<K> {
    pub type_: EventType,
    pub object: K,
}

impl<K> WatchEvent<K> {
    pub fn new(type_: EventType, object: K) -> Self {
        Self { type_, object }
    }
}

/// An event as delivered by the watch source, before the kind is known
pub type RawEvent = WatchEvent<DynamicObject>;

impl RawEvent {
    /// Check the payload once at the boundary and convert it to `K`
    pub fn cast<K: ReflectedKind>(self) -> Result<WatchEvent<K>> {
        Ok(WatchEvent {
            type_: self.type_,
            object: cast_object(self.object)?,
        })
    }
}

/// `apiVersion/Kind` identifier used to route events
pub fn kind_key(api_version: &str, kind: &str) -> String {
    format!("{}/{}", api_version, kind)
}

pub fn kind_key_of<K: ReflectedKind>() -> String {
    kind_key(&K::api_version(&()), &K::kind(&()))
}

pub fn cast_object<K: ReflectedKind>(object: DynamicObject) -> Result<K> {
    let expected = kind_key_of::<K>();
    let found = object
        .types
        .as_ref()
        .map(|t| kind_key(&t.api_version, &t.kind))
        .unwrap_or_else(|| "untyped object".to_string());

    if found != expected {
        return Err(FarsideError::CastError { expected, found });
    }

    serde_json::to_value(&object)
        .and_then(serde_json::from_value)
        .map_err(|e| FarsideError::CastError {
            expected,
            found: format!("malformed payload: {}", e),
        })
}
