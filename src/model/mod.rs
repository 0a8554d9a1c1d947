// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A sequence diagram is a list of participants, an ordered list of items (messages and notes)
//! and a small set of rendering flags.

pub mod arrow;
pub mod ids;
pub mod seq_model;

pub use arrow::{ArrowHead, ArrowKind};
pub use ids::{DiagramId, GroupId, Id, IdError, VersionId};
pub use seq_model::{
    Activation, DiagramConfig, Item, MessageItem, NoteItem, NotePosition, Participant,
    ParticipantId, ParticipantKind, SequenceModel,
};
