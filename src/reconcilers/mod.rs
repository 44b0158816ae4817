// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Home-cluster watch loops feeding the reflection engines.

pub mod events;
pub mod namespace;
pub mod watch;

pub use events::EventClassifier;
pub use namespace::NamespaceReconciler;
pub use watch::ReflectionWatcher;
