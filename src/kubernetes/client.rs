// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Foreign cluster client creation and kubeconfig utilities

use crate::config::{Config, ForeignKubeconfig};
use crate::error::{FarsideError, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{config::KubeConfigOptions, Api, Client, Config as KConfig};
use tracing::{info, instrument};

/// Create a Kubernetes client for the foreign cluster
#[instrument(skip(home_client, config))]
pub async fn create_foreign_client(home_client: &Client, config: &Config) -> Result<Client> {
    match &config.foreign_kubeconfig {
        ForeignKubeconfig::Inferred => create_testing_client().await,
        ForeignKubeconfig::Secret {
            namespace,
            name,
            key,
        } => {
            let kubeconfig = get_foreign_kubeconfig(home_client, namespace, name, key).await?;
            create_client_from_kubeconfig(&kubeconfig).await
        }
        ForeignKubeconfig::File(path) => {
            info!("Reading foreign kubeconfig from {}", path);
            let kubeconfig = tokio::fs::read_to_string(path).await.map_err(|e| {
                FarsideError::KubeconfigError(format!("Failed to read {}: {}", path, e))
            })?;
            create_client_from_kubeconfig(&kubeconfig).await
        }
    }
}

/// Create a client for testing mode (home and foreign are the same cluster)
async fn create_testing_client() -> Result<Client> {
    let c = KConfig::infer()
        .await
        .map_err(|e| FarsideError::KubeconfigError(format!("Failed to infer config: {}", e)))?;

    Client::try_from(c)
        .map_err(|e| FarsideError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Get the foreign kubeconfig stored in a home-cluster secret
#[instrument(skip(client))]
async fn get_foreign_kubeconfig(
    client: &Client,
    namespace: &str,
    name: &str,
    key: &str,
) -> Result<String> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    info!("Getting foreign kubeconfig secret '{}/{}'...", namespace, name);

    let secret = secrets.get(name).await.map_err(|e| {
        FarsideError::KubeconfigError(format!(
            "Failed to get kubeconfig secret {}/{}: {}",
            namespace, name, e
        ))
    })?;

    kubeconfig_from_secret(&secret, key)
}

fn kubeconfig_from_secret(secret: &Secret, key: &str) -> Result<String> {
    let name = secret.metadata.name.clone().unwrap_or_default();

    let Some(data) = secret.data.as_ref() else {
        return Err(FarsideError::KubeconfigError(format!(
            "Kubeconfig secret {} has no data",
            name
        )));
    };

    let Some(kubeconfig_data) = data.get(key) else {
        return Err(FarsideError::KubeconfigError(format!(
            "Kubeconfig secret {} does not contain '{}' key",
            name, key
        )));
    };

    String::from_utf8(kubeconfig_data.0.clone()).map_err(|e| {
        FarsideError::KubeconfigError(format!(
            "Failed to decode kubeconfig in secret {}: {}",
            name, e
        ))
    })
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    use kube::config::Kubeconfig;

    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| FarsideError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                FarsideError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| FarsideError::KubeconfigError(format!("Failed to create client: {}", e)))
}
