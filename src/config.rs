// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{DEFAULT_KUBECONFIG_KEY, DEFAULT_RESYNC_INTERVAL_SECS};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

/// Where the kubeconfig for the foreign cluster comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignKubeconfig {
    /// A secret in the home cluster
    Secret {
        namespace: String,
        name: String,
        key: String,
    },
    /// A kubeconfig file on disk
    File(String),
    /// Infer from the environment (testing only)
    Inferred,
}

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Home namespace -> foreign namespace
    pub namespace_mappings: BTreeMap<String, String>,
    pub foreign_kubeconfig: ForeignKubeconfig,
    pub resync_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mappings = env::var("NAMESPACE_MAPPINGS")
            .context("NAMESPACE_MAPPINGS environment variable not set")?;
        let namespace_mappings = parse_namespace_mappings(&mappings)?;

        // For testing, uses the KUBECONFIG env var for the foreign client as well
        let testing_mode: bool = env::var("TESTING_MODE").unwrap_or("false".to_string()).parse().unwrap_or(false);

        let foreign_kubeconfig = if testing_mode {
            ForeignKubeconfig::Inferred
        } else if let Ok(reference) = env::var("FOREIGN_KUBECONFIG_SECRET") {
            let key = env::var("FOREIGN_KUBECONFIG_KEY")
                .unwrap_or_else(|_| DEFAULT_KUBECONFIG_KEY.to_string());
            parse_secret_reference(&reference, key)?
        } else if let Ok(path) = env::var("FOREIGN_KUBECONFIG") {
            ForeignKubeconfig::File(path)
        } else {
            bail!("either FOREIGN_KUBECONFIG_SECRET or FOREIGN_KUBECONFIG must be set");
        };

        let resync_interval_secs = match env::var("RESYNC_INTERVAL_SECS") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("RESYNC_INTERVAL_SECS is not a number: {}", v))?,
            Err(_) => DEFAULT_RESYNC_INTERVAL_SECS,
        };

        Ok(Config {
            namespace_mappings,
            foreign_kubeconfig,
            resync_interval: Duration::from_secs(resync_interval_secs),
        })
    }

    pub fn home_namespaces(&self) -> Vec<String> {
        self.namespace_mappings.keys().cloned().collect()
    }

    pub fn foreign_namespaces(&self) -> Vec<String> {
        self.namespace_mappings.values().cloned().collect()
    }
}

/// Parse `home=foreign,home2=foreign2`, rejecting duplicates on either side
pub fn parse_namespace_mappings(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut mappings = BTreeMap::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((home, foreign)) = entry.split_once('=') else {
            bail!("invalid namespace mapping '{}', expected home=foreign", entry);
        };
        let (home, foreign) = (home.trim(), foreign.trim());
        if home.is_empty() || foreign.is_empty() {
            bail!("invalid namespace mapping '{}', empty namespace", entry);
        }
        if mappings.contains_key(home) {
            bail!("home namespace '{}' is mapped more than once", home);
        }
        if mappings.values().any(|f| f == foreign) {
            bail!("foreign namespace '{}' is mapped more than once", foreign);
        }
        mappings.insert(home.to_string(), foreign.to_string());
    }

    if mappings.is_empty() {
        bail!("NAMESPACE_MAPPINGS contains no mappings");
    }

    Ok(mappings)
}

fn parse_secret_reference(reference: &str, key: String) -> Result<ForeignKubeconfig> {
    match reference.split_once('/') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
            Ok(ForeignKubeconfig::Secret {
                namespace: namespace.to_string(),
                name: name.to_string(),
                key,
            })
        }
        _ => bail!(
            "FOREIGN_KUBECONFIG_SECRET must be namespace/name, got '{}'",
            reference
        ),
    }
}
