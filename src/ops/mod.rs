// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structured (grid) edits of a [`SequenceModel`].
//!
//! Ops are applied to a working copy and committed only when every op succeeded, so a rejected
//! batch leaves the model untouched. Ops that can unbalance activations are followed by
//! [`auto_correct`](crate::activation::auto_correct).

use serde::{Deserialize, Serialize};

use crate::activation::{auto_correct, can_apply_override, is_active_at, ActivationOverride};
use crate::format::mermaid::{
    normalize_note_target, validate_participant_ident, ParticipantIdentError,
};
use crate::model::{
    Activation, ArrowKind, Item, MessageItem, NoteItem, NotePosition, Participant,
    ParticipantId, ParticipantKind, SequenceModel,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum GridOp {
    AddParticipant,
    UpdateParticipant { index: usize, patch: ParticipantPatch },
    RemoveParticipant { index: usize },
    MoveParticipant { from: usize, to: usize },
    AddMessage,
    AddNote { position: NotePosition, target: String, content: String },
    UpdateMessage { index: usize, patch: MessagePatch },
    UpdateNote { index: usize, patch: NotePatch },
    SetActivation {
        index: usize,
        #[serde(default)]
        activate: Option<bool>,
        #[serde(default)]
        deactivate: Option<bool>,
    },
    SwapEndpoints { index: usize },
    MoveItem { from: usize, to: usize },
    RemoveItem { index: usize },
    SetAutonumber { enabled: bool },
}

impl GridOp {
    /// Whether the op can change activation balance (and is therefore followed by auto-correct).
    pub fn affects_balance(&self) -> bool {
        match self {
            Self::SetActivation { .. }
            | Self::SwapEndpoints { .. }
            | Self::MoveItem { .. }
            | Self::RemoveItem { .. } => true,
            Self::UpdateMessage { patch, .. } => patch.source.is_some() || patch.target.is_some(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticipantPatch {
    pub logical_id: Option<String>,
    pub name: Option<String>,
    pub kind: Option<ParticipantKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePatch {
    pub source: Option<ParticipantId>,
    pub target: Option<ParticipantId>,
    pub arrow: Option<ArrowKind>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotePatch {
    pub position: Option<NotePosition>,
    pub target: Option<String>,
    pub content: Option<String>,
}

/// What applying a batch did, beyond the model mutation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOutcome {
    pub applied: usize,
    /// Auto-correct cleared at least one flag.
    pub autocorrected: bool,
    /// Rows or participants were added, removed or reordered.
    pub structural: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("item index {index} out of range (len={len})")]
    ItemOutOfRange { index: usize, len: usize },
    #[error("participant index {index} out of range (len={len})")]
    ParticipantOutOfRange { index: usize, len: usize },
    #[error("item {index} is not a message")]
    NotAMessage { index: usize },
    #[error("item {index} is not a note")]
    NotANote { index: usize },
    #[error("invalid participant id '{logical_id}': {reason}")]
    InvalidParticipantId { logical_id: String, reason: ParticipantIdentError },
    #[error("participant id '{logical_id}' is already used")]
    DuplicateParticipant { logical_id: String },
    #[error("activation toggle on item {index} would unbalance '{participant}'")]
    UnsafeActivationToggle { index: usize, participant: ParticipantId },
}

pub fn apply_grid_op(model: &mut SequenceModel, op: &GridOp) -> Result<GridOutcome, ApplyError> {
    apply_grid_ops(model, std::slice::from_ref(op))
}

pub fn apply_grid_ops(
    model: &mut SequenceModel,
    ops: &[GridOp],
) -> Result<GridOutcome, ApplyError> {
    if ops.is_empty() {
        return Ok(GridOutcome::default());
    }

    let mut working = model.clone();
    let mut outcome = GridOutcome { applied: ops.len(), ..GridOutcome::default() };

    for op in ops {
        outcome.structural |= apply_one(&mut working, op)?;
        if op.affects_balance() {
            outcome.autocorrected |= auto_correct(&mut working);
        }
    }

    *model = working;
    Ok(outcome)
}

// Per-op mutation helpers.
include!("ops_impl.rs");
