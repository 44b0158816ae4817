// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by Farside
pub mod annotations {
    /// When set to "true" on a home object, the object is never reflected
    pub const NOT_REFLECT: &str = "farside.geeko.me/not-reflect";
}

/// Labels stamped on foreign mirrors
pub mod labels {
    /// Marks a foreign object as managed by the reflection engine
    pub const REFLECTED_KEY: &str = "farside.geeko.me/reflected";
    pub const REFLECTED_VALUE: &str = "true";

    /// Label selector matching every engine-managed foreign object
    pub fn reflected_selector() -> String {
        format!("{}={}", REFLECTED_KEY, REFLECTED_VALUE)
    }
}

/// Secret types and service account keys
pub mod secrets {
    pub const TYPE_OPAQUE: &str = "Opaque";
    /// Cannot be created directly through the API server
    pub const TYPE_SERVICE_ACCOUNT_TOKEN: &str = "kubernetes.io/service-account-token";
    pub const SERVICE_ACCOUNT_NAME: &str = "kubernetes.io/service-account.name";
    pub const SERVICE_ACCOUNT_UID: &str = "kubernetes.io/service-account.uid";
}

/// Retry schedule for namespace cleanup deletions
pub mod retry {
    pub const STEPS: u32 = 4;
    pub const INITIAL_DELAY_MILLIS: u64 = 10;
    pub const FACTOR: f64 = 5.0;
}

/// Default interval between full foreign cache resyncs
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

/// Data key holding the foreign kubeconfig in its secret
pub const DEFAULT_KUBECONFIG_KEY: &str = "kubeconfig";
