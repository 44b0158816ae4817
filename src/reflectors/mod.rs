// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Hook sets for the reflected resource kinds.

pub mod secret;

pub use secret::SecretReflector;
