// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reflection key derivation

use super::event::cast_object;
use crate::foreign::ReflectedKind;
use kube::{api::DynamicObject, ResourceExt};

/// Cache key of a foreign object: `namespace/name`
pub fn reflection_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

/// Key for a raw object expected to be a `K`; empty when it is not one
pub fn key_for_raw<K: ReflectedKind>(object: &DynamicObject, target_namespace: &str) -> String {
    match cast_object::<K>(object.clone()) {
        Ok(o) => reflection_key(target_namespace, &o.name_any()),
        Err(_) => String::new(),
    }
}
