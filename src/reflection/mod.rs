// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Outgoing reflection: events in, foreign API calls out.

pub mod cleanup;
pub mod engine;
pub mod event;
pub mod fence;
pub mod key;
pub mod reflector;
pub mod registry;
pub mod retry;

pub use cleanup::{CleanupCoordinator, SweepReport};
pub use engine::{Outcome, ReflectionEngine};
pub use event::{EventType, RawEvent, WatchEvent};
pub use fence::TeardownFence;
pub use reflector::ResourceReflector;
pub use registry::{KindReflection, Reflection, ReflectorRegistry};
pub use retry::RetryPolicy;
