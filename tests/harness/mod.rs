// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for throttle behaviour.
//!
//! Provides scripted submitters that record when they were called, and
//! generators for document batches.

#![allow(dead_code)]

pub mod generators;
pub mod submitters;
