// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Thalassa: a sequence-diagram editor core.
//!
//! Mermaid sequence markup and a structured grid are kept in sync: text edits are parsed into a
//! [`model::SequenceModel`], grid edits ([`ops`]) mutate the model and regenerate canonical
//! markup, and the [`activation`] engine keeps lifeline activations balanced throughout.

pub mod activation;
pub mod config;
pub mod format;
pub mod grid;
pub mod model;
pub mod ops;
pub mod server;
pub mod store;
pub mod sync;
