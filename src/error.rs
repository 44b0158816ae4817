// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FarsideError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Cannot cast object to {expected}: {found}")]
    CastError { expected: String, found: String },

    #[error("No namespace mapping for {0}")]
    NamespaceTranslationError(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object {0} not found in foreign cache")]
    CacheMiss(String),
}

impl FarsideError {
    /// Classify an API error returned by the foreign cluster
    pub fn from_api(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
                FarsideError::AlreadyExists(resp.message)
            }
            kube::Error::Api(resp) if resp.code == 404 => FarsideError::NotFound(resp.message),
            e => FarsideError::KubeError(e),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FarsideError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, FarsideError::AlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, FarsideError>;
