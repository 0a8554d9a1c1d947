// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Applies one op in place. Returns whether it was structural.
fn apply_one(model: &mut SequenceModel, op: &GridOp) -> Result<bool, ApplyError> {
    match op {
        GridOp::AddParticipant => {
            let id = next_participant_id(model);
            let name = format!("Participant {id}");
            model
                .participants_mut()
                .push(Participant::new(id, name, ParticipantKind::Participant));
            Ok(true)
        }
        GridOp::UpdateParticipant { index, patch } => {
            check_participant_index(model, *index)?;
            if let Some(logical_id) = &patch.logical_id {
                validate_participant_ident(logical_id).map_err(|reason| {
                    ApplyError::InvalidParticipantId { logical_id: logical_id.clone(), reason }
                })?;
                let taken = model
                    .participants()
                    .iter()
                    .enumerate()
                    .any(|(idx, p)| idx != *index && p.logical_id() == logical_id);
                if taken {
                    return Err(ApplyError::DuplicateParticipant {
                        logical_id: logical_id.clone(),
                    });
                }
            }

            let participant = &mut model.participants_mut()[*index];
            if let Some(logical_id) = &patch.logical_id {
                participant.set_logical_id(logical_id.as_str());
            }
            if let Some(name) = &patch.name {
                participant.set_name(name.clone());
            }
            if let Some(kind) = patch.kind {
                participant.set_kind(kind);
            }
            Ok(false)
        }
        GridOp::RemoveParticipant { index } => {
            check_participant_index(model, *index)?;
            // Items that still reference the participant are kept; they render as raw ids.
            model.participants_mut().remove(*index);
            Ok(true)
        }
        GridOp::MoveParticipant { from, to } => {
            check_participant_index(model, *from)?;
            check_participant_index(model, *to)?;
            move_within(model.participants_mut(), *from, *to);
            Ok(from != to)
        }
        GridOp::AddMessage => {
            let participants = model.participants();
            let source = participants.first().map(|p| p.id().clone()).unwrap_or_else(|| "A".into());
            let target = participants.get(1).map(|p| p.id().clone()).unwrap_or_else(|| "B".into());
            model
                .items_mut()
                .push(MessageItem::new(source, target, ArrowKind::SolidArrow, "Message").into());
            Ok(true)
        }
        GridOp::AddNote { position, target, content } => {
            let note = NoteItem::new(*position, normalize_note_target(target), content.clone());
            model.items_mut().push(note.into());
            Ok(true)
        }
        GridOp::UpdateMessage { index, patch } => {
            let message = message_mut(model, *index)?;
            let source_changed = patch.source.as_ref().is_some_and(|s| s != message.source());
            let target_changed = patch.target.as_ref().is_some_and(|t| t != message.target());
            if source_changed || target_changed {
                message.set_activation(Activation::NONE);
            }
            if let Some(source) = &patch.source {
                message.set_source(source.clone());
            }
            if let Some(target) = &patch.target {
                message.set_target(target.clone());
            }
            if let Some(arrow) = patch.arrow {
                message.set_arrow_kind(arrow);
            }
            if let Some(content) = &patch.content {
                message.set_content(content.clone());
            }
            Ok(false)
        }
        GridOp::UpdateNote { index, patch } => {
            let len = model.items().len();
            let Some(item) = model.items_mut().get_mut(*index) else {
                return Err(ApplyError::ItemOutOfRange { index: *index, len });
            };
            let Item::Note(note) = item else {
                return Err(ApplyError::NotANote { index: *index });
            };
            if let Some(position) = patch.position {
                note.set_position(position);
            }
            if let Some(target) = &patch.target {
                note.set_target(normalize_note_target(target));
            }
            if let Some(content) = &patch.content {
                note.set_content(content.clone());
            }
            Ok(false)
        }
        GridOp::SetActivation { index, activate, deactivate } => {
            let override_flags = ActivationOverride { activate: *activate, deactivate: *deactivate };
            check_activation_toggle(model, *index, override_flags)?;
            let message = message_mut(model, *index)?;
            let current = message.activation();
            message.set_activation(Activation {
                activate: activate.unwrap_or(current.activate),
                deactivate: deactivate.unwrap_or(current.deactivate),
            });
            Ok(false)
        }
        GridOp::SwapEndpoints { index } => {
            let message = message_mut(model, *index)?;
            message.swap_endpoints();
            message.set_activation(Activation::NONE);
            Ok(true)
        }
        GridOp::MoveItem { from, to } => {
            check_item_index(model, *from)?;
            check_item_index(model, *to)?;
            move_within(model.items_mut(), *from, *to);
            Ok(from != to)
        }
        GridOp::RemoveItem { index } => {
            check_item_index(model, *index)?;
            model.items_mut().remove(*index);
            Ok(true)
        }
        GridOp::SetAutonumber { enabled } => {
            model.config_mut().autonumber = *enabled;
            Ok(false)
        }
    }
}

/// Rejects toggles the grid would have shown as disabled.
///
/// Enabling `deactivate` needs an open activation on the source and must keep the source's
/// stream balanced; disabling `activate` must keep the target's stream balanced. Enabling
/// `activate` and disabling `deactivate` are always safe.
fn check_activation_toggle(
    model: &SequenceModel,
    index: usize,
    override_flags: ActivationOverride,
) -> Result<(), ApplyError> {
    let message = message_at(model, index)?;
    let current = message.activation();

    if override_flags.deactivate == Some(true) && !current.deactivate {
        let source = message.source();
        let safe = is_active_at(model, index, source)
            && can_apply_override(model, index, override_flags, source);
        if !safe {
            return Err(ApplyError::UnsafeActivationToggle { index, participant: source.clone() });
        }
    }

    if override_flags.activate == Some(false) && current.activate {
        let target = message.target();
        if !can_apply_override(model, index, override_flags, target) {
            return Err(ApplyError::UnsafeActivationToggle { index, participant: target.clone() });
        }
    }

    Ok(())
}

/// `P<n+1>` where `n` is the participant count, bumped past ids already in use.
fn next_participant_id(model: &SequenceModel) -> String {
    let taken = |candidate: &str| {
        model
            .participants()
            .iter()
            .any(|p| p.id() == candidate || p.logical_id() == candidate)
    };
    let mut n = model.participants().len() + 1;
    loop {
        let candidate = format!("P{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn check_participant_index(model: &SequenceModel, index: usize) -> Result<(), ApplyError> {
    let len = model.participants().len();
    if index >= len {
        return Err(ApplyError::ParticipantOutOfRange { index, len });
    }
    Ok(())
}

fn check_item_index(model: &SequenceModel, index: usize) -> Result<(), ApplyError> {
    let len = model.items().len();
    if index >= len {
        return Err(ApplyError::ItemOutOfRange { index, len });
    }
    Ok(())
}

fn message_at(model: &SequenceModel, index: usize) -> Result<&MessageItem, ApplyError> {
    check_item_index(model, index)?;
    model.items()[index].as_message().ok_or(ApplyError::NotAMessage { index })
}

fn message_mut(model: &mut SequenceModel, index: usize) -> Result<&mut MessageItem, ApplyError> {
    check_item_index(model, index)?;
    model.items_mut()[index].as_message_mut().ok_or(ApplyError::NotAMessage { index })
}

/// Drag-and-drop semantics: remove at `from`, insert at `to`.
fn move_within<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}
