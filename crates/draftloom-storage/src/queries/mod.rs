// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions. Each takes `&Database` and runs through the
//! single tokio-rusqlite connection.

pub mod records;
pub mod settings;
