// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turns kube-runtime watcher events into Added/Modified/Deleted events

use crate::reflection::key::reflection_key;
use crate::reflection::{EventType, RawEvent, WatchEvent};
use kube::api::DynamicObject;
use kube::core::TypeMeta;
use kube::runtime::watcher::Event;
use kube::ResourceExt;
use std::collections::{HashMap, HashSet};

/// Tracks the keys seen on one watch stream.
///
/// An apply for an unseen key is `Added`, for a known key `Modified`. After a
/// relist, keys that did not come back are reported as `Deleted`.
pub struct EventClassifier {
    types: TypeMeta,
    known: HashMap<String, DynamicObject>,
    relisted: Option<HashSet<String>>,
}

impl EventClassifier {
    /// `types` is stamped on objects that arrive without it (list items)
    pub fn new(types: TypeMeta) -> Self {
        Self {
            types,
            known: HashMap::new(),
            relisted: None,
        }
    }

    pub fn classify(&mut self, event: Event<DynamicObject>) -> Vec<RawEvent> {
        match event {
            Event::Apply(object) => vec![self.apply(object)],
            Event::Delete(object) => {
                let object = self.typed(object);
                self.known.remove(&object_key(&object));
                vec![WatchEvent::new(EventType::Deleted, object)]
            }
            Event::Init => {
                self.relisted = Some(HashSet::new());
                Vec::new()
            }
            Event::InitApply(object) => {
                self.relisted
                    .get_or_insert_with(HashSet::new)
                    .insert(object_key(&object));
                vec![self.apply(object)]
            }
            Event::InitDone => {
                let seen = self.relisted.take().unwrap_or_default();
                let gone: Vec<String> = self
                    .known
                    .keys()
                    .filter(|k| !seen.contains(*k))
                    .cloned()
                    .collect();

                gone.iter()
                    .filter_map(|k| self.known.remove(k))
                    .map(|o| WatchEvent::new(EventType::Deleted, o))
                    .collect()
            }
        }
    }

    fn apply(&mut self, object: DynamicObject) -> RawEvent {
        let object = self.typed(object);
        let type_ = match self.known.insert(object_key(&object), object.clone()) {
            Some(_) => EventType::Modified,
            None => EventType::Added,
        };
        WatchEvent::new(type_, object)
    }

    fn typed(&self, mut object: DynamicObject) -> DynamicObject {
        if object.types.is_none() {
            object.types = Some(self.types.clone());
        }
        object
    }
}

fn object_key(object: &DynamicObject) -> String {
    reflection_key(&object.namespace().unwrap_or_default(), &object.name_any())
}
