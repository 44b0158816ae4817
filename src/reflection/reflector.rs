// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-kind hook contract used by the reflection engine

use super::key::reflection_key;
use crate::constants::{annotations, labels};
use crate::error::Result;
use crate::foreign::ReflectedKind;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// Filtering and transformation hooks for one resource kind.
///
/// Transform hooks return the object to send to the foreign cluster. An `Err`
/// means the object cannot be reflected for this event and is logged by the engine.
pub trait ResourceReflector: Send + Sync + 'static {
    type Kind: ReflectedKind;

    /// Whether the object takes part in reflection at all
    fn is_allowed(&self, object: &Self::Kind) -> bool {
        !is_excluded(object)
    }

    /// Build the foreign object for a newly added home object
    fn pre_add(&self, object: &Self::Kind) -> Result<Self::Kind>;

    /// Build the replacement for an existing foreign object.
    /// The previous home object is not needed by the built-in reflectors.
    fn pre_update(&self, object: &Self::Kind, old: Option<&Self::Kind>) -> Result<Self::Kind>;

    /// Translate the object so the foreign delete can address it
    fn pre_delete(&self, object: &Self::Kind) -> Result<Self::Kind>;

    fn keyer(&self, object: &Self::Kind, target_namespace: &str) -> String {
        reflection_key(target_namespace, &object.name_any())
    }
}

/// True when the home object opts out of reflection
pub fn is_excluded<K: Resource>(object: &K) -> bool {
    object
        .meta()
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::NOT_REFLECT))
        .is_some_and(|v| v == "true")
}

/// Overlay `overlay` on top of `base`
pub fn merge_maps(
    base: Option<&BTreeMap<String, String>>,
    overlay: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let mut merged = base.cloned().unwrap_or_default();
    if let Some(overlay) = overlay {
        merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

/// Stamp the reflection marker, replacing any home label with the same key
pub fn stamp_marker(target: &mut BTreeMap<String, String>) {
    target.insert(
        labels::REFLECTED_KEY.to_string(),
        labels::REFLECTED_VALUE.to_string(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Secret;
    use kube::api::ObjectMeta;

    fn make_secret(annotations: Option<BTreeMap<String, String>>) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some("db-cred".to_string()),
                namespace: Some("default".to_string()),
                annotations,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_is_excluded_true() {
        let secret = make_secret(Some(BTreeMap::from([(
            annotations::NOT_REFLECT.to_string(),
            "true".to_string(),
        )])));
        assert!(is_excluded(&secret));
    }

    #[test]
    fn test_is_excluded_other_value() {
        let secret = make_secret(Some(BTreeMap::from([(
            annotations::NOT_REFLECT.to_string(),
            "yes".to_string(),
        )])));
        assert!(!is_excluded(&secret));
    }

    #[test]
    fn test_is_excluded_no_annotations() {
        assert!(!is_excluded(&make_secret(None)));
    }

    #[test]
    fn test_merge_maps_overlay_wins() {
        let base = BTreeMap::from([
            ("a".to_string(), "base".to_string()),
            ("b".to_string(), "base".to_string()),
        ]);
        let overlay = BTreeMap::from([("b".to_string(), "overlay".to_string())]);

        let merged = merge_maps(Some(&base), Some(&overlay));
        assert_eq!(merged.get("a").unwrap(), "base");
        assert_eq!(merged.get("b").unwrap(), "overlay");
    }

    #[test]
    fn test_merge_maps_empty() {
        assert!(merge_maps(None, None).is_empty());
    }

    #[test]
    fn test_stamp_marker_overrides_home_label() {
        let mut home = BTreeMap::from([(labels::REFLECTED_KEY.to_string(), "false".to_string())]);
        stamp_marker(&mut home);
        assert_eq!(home.get(labels::REFLECTED_KEY).unwrap(), labels::REFLECTED_VALUE);
    }
}
