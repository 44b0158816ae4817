// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for connecting to the foreign cluster.

pub mod client;

pub use client::create_foreign_client;
