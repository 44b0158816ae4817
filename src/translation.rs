// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Home <-> foreign namespace translation

use crate::error::{FarsideError, Result};
use std::collections::BTreeMap;

/// Maps home namespaces to foreign namespaces and back.
/// Implementations must be safe for concurrent reads.
pub trait NamespaceTranslator: Send + Sync {
    /// Translate `namespace`; with `reverse` set, translate foreign -> home
    fn translate(&self, namespace: &str, reverse: bool) -> Result<String>;
}

/// Fixed one-to-one namespace table
#[derive(Debug, Clone, Default)]
pub struct StaticNamespaceTable {
    forward: BTreeMap<String, String>,
    reverse: BTreeMap<String, String>,
}

impl StaticNamespaceTable {
    pub fn new(mappings: BTreeMap<String, String>) -> Result<Self> {
        let mut reverse = BTreeMap::new();
        for (home, foreign) in &mappings {
            if reverse.insert(foreign.clone(), home.clone()).is_some() {
                return Err(FarsideError::ConfigError(format!(
                    "foreign namespace {} is mapped more than once",
                    foreign
                )));
            }
        }

        Ok(Self {
            forward: mappings,
            reverse,
        })
    }
}

impl NamespaceTranslator for StaticNamespaceTable {
    fn translate(&self, namespace: &str, reverse: bool) -> Result<String> {
        let table = if reverse { &self.reverse } else { &self.forward };
        table
            .get(namespace)
            .cloned()
            .ok_or_else(|| FarsideError::NamespaceTranslationError(namespace.to_string()))
    }
}
