// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Launch Scout server: HTTP surface, Chromium driver and settings for the
//! `launch-scout` binary.
//!
//! This library crate exposes the modules for integration testing.

pub mod chromium;
pub mod rest;
pub mod settings;
