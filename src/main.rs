// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};

use farside::config::Config;
use farside::foreign::{KubeForeignCache, KubeForeignClient};
use farside::kubernetes::create_foreign_client;
use farside::reconcilers::{NamespaceReconciler, ReflectionWatcher};
use farside::reflection::{
    CleanupCoordinator, Reflection, ReflectionEngine, ReflectorRegistry, TeardownFence,
};
use farside::reflectors::SecretReflector;
use farside::translation::{NamespaceTranslator, StaticNamespaceTable};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Farside reflector");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: {} namespace mappings, resync every {:?}",
        config.namespace_mappings.len(),
        config.resync_interval
    );

    // Create Kubernetes clients
    let home_client = Client::try_default().await?;
    info!("Connected to home cluster");
    let foreign_client = create_foreign_client(&home_client, &config).await?;
    info!("Connected to foreign cluster");

    let translator: Arc<dyn NamespaceTranslator> =
        Arc::new(StaticNamespaceTable::new(config.namespace_mappings.clone())?);
    let fence = TeardownFence::new();

    // Secrets
    let secret_cache = Arc::new(KubeForeignCache::<Secret>::new(foreign_client.clone()));
    let secret_client = Arc::new(KubeForeignClient::<Secret>::new(foreign_client.clone()));
    let secret_engine = ReflectionEngine::new(
        SecretReflector::new(translator.clone(), secret_cache.clone()),
        secret_client.clone(),
        fence.clone(),
    );
    let secret_cleanup = CleanupCoordinator::<Secret>::new(
        translator.clone(),
        secret_cache.clone(),
        secret_client,
        fence,
    );

    let mut registry = ReflectorRegistry::new();
    registry.register(Reflection::new(secret_engine, secret_cleanup));
    let registry = Arc::new(registry);

    let watcher = ReflectionWatcher::new(
        home_client.clone(),
        registry.clone(),
        config.home_namespaces(),
    );
    let namespace_reconciler = NamespaceReconciler::new(home_client, registry, translator);

    info!("Starting reflection...");

    // Run the foreign cache, the reflection watches and the teardown reconciler concurrently
    tokio::try_join!(
        secret_cache.run(config.foreign_namespaces(), config.resync_interval),
        watcher.run(),
        namespace_reconciler.run()
    )?;

    // This should never be reached as the loops run forever
    warn!("All reflection loops stopped unexpectedly");
    Ok(())
}
