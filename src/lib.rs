// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod foreign;
pub mod kubernetes;
pub mod reconcilers;
pub mod reflection;
pub mod reflectors;
pub mod translation;

#[cfg(test)]
pub mod test_utils;
