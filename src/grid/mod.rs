// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model → grid projection.
//!
//! The grid is a read-only view: every row carries what a presentation layer needs to draw it
//! (labels, control states, lifeline guides). Edits go back through [`crate::ops`].

use serde::Serialize;

use crate::activation::{
    activation_brackets, brackets_at, can_apply_override, is_active_at, ActivationBracket,
    ActivationOverride,
};
use crate::model::{
    ArrowKind, Item, MessageItem, NoteItem, NotePosition, Participant, ParticipantId,
    ParticipantKind, SequenceModel,
};

pub const HINT_DEACTIVATE: &str = "Deactivate source";
pub const HINT_NOTHING_TO_DEACTIVATE: &str = "Nothing to deactivate";
pub const HINT_DEACTIVATE_BREAKS_LATER: &str = "Cannot deactivate (breaks later rows)";
pub const HINT_ACTIVATE: &str = "Activate target";
pub const HINT_ACTIVATE_REQUIRED: &str = "Cannot disable (required by a later deactivate)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridView {
    pub participants: Vec<ParticipantRow>,
    pub rows: Vec<GridRow>,
    pub autonumber: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRow {
    pub index: usize,
    pub id: ParticipantId,
    pub logical_id: String,
    pub name: String,
    pub kind: ParticipantKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GridRow {
    Message(MessageRow),
    Note(NoteRow),
}

impl GridRow {
    pub fn index(&self) -> usize {
        match self {
            Self::Message(row) => row.index,
            Self::Note(row) => row.index,
        }
    }

    pub fn as_message(&self) -> Option<&MessageRow> {
        match self {
            Self::Message(row) => Some(row),
            Self::Note(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
    pub index: usize,
    /// 1-based row number as shown in the grid's first column.
    pub number: usize,
    pub source: ParticipantId,
    pub source_label: String,
    pub target: ParticipantId,
    pub target_label: String,
    pub arrow_kind: ArrowKind,
    pub arrow_notation: &'static str,
    pub content: String,
    pub deactivate: ControlState,
    pub activate: ControlState,
    pub guides: Vec<BracketGuide>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRow {
    pub index: usize,
    pub number: usize,
    pub position: NotePosition,
    pub target: String,
    pub content: String,
    pub guides: Vec<BracketGuide>,
}

/// One activation toggle as the grid shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub active: bool,
    pub enabled: bool,
    pub hint: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuideShape {
    /// Bracket opens and closes on this row.
    Single,
    Start,
    Middle,
    End,
}

/// The slice of a closed activation bracket drawn beside one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketGuide {
    pub level: usize,
    pub shape: GuideShape,
}

fn guides_for(brackets: &[ActivationBracket], row: usize) -> Vec<BracketGuide> {
    brackets_at(brackets, row)
        .into_iter()
        .map(|bracket| {
            let shape = match (bracket.start == row, bracket.end == row) {
                (true, true) => GuideShape::Single,
                (true, false) => GuideShape::Start,
                (false, true) => GuideShape::End,
                (false, false) => GuideShape::Middle,
            };
            BracketGuide { level: bracket.level, shape }
        })
        .collect()
}

/// State of the source-side `deactivate` toggle at `row`.
///
/// A set flag can always be cleared. Setting it needs an open activation on the source and
/// must not break any later row.
pub fn deactivate_control(model: &SequenceModel, row: usize, message: &MessageItem) -> ControlState {
    let active = message.activation().deactivate;
    let source_active = is_active_at(model, row, message.source());
    let safe = active
        || can_apply_override(model, row, ActivationOverride::deactivate(true), message.source());

    let hint = if !source_active {
        HINT_NOTHING_TO_DEACTIVATE
    } else if !safe {
        HINT_DEACTIVATE_BREAKS_LATER
    } else {
        HINT_DEACTIVATE
    };

    ControlState { active, enabled: active || (source_active && safe), hint }
}

/// State of the target-side `activate` toggle at `row`.
///
/// Setting it is always allowed; clearing it is refused when a later deactivate depends on it.
pub fn activate_control(model: &SequenceModel, row: usize, message: &MessageItem) -> ControlState {
    let active = message.activation().activate;
    let safe_to_clear = !active
        || can_apply_override(model, row, ActivationOverride::activate(false), message.target());

    let hint = if active && !safe_to_clear { HINT_ACTIVATE_REQUIRED } else { HINT_ACTIVATE };
    ControlState { active, enabled: safe_to_clear, hint }
}

fn participant_row(index: usize, participant: &Participant) -> ParticipantRow {
    ParticipantRow {
        index,
        id: participant.id().clone(),
        logical_id: participant.logical_id().to_owned(),
        name: participant.name().to_owned(),
        kind: participant.kind(),
        label: participant.label(),
    }
}

fn message_row(
    model: &SequenceModel,
    brackets: &[ActivationBracket],
    index: usize,
    message: &MessageItem,
) -> MessageRow {
    MessageRow {
        index,
        number: index + 1,
        source: message.source().clone(),
        source_label: model.endpoint_label(message.source()),
        target: message.target().clone(),
        target_label: model.endpoint_label(message.target()),
        arrow_kind: message.arrow_kind(),
        arrow_notation: message.arrow_kind().notation(),
        content: message.content().to_owned(),
        deactivate: deactivate_control(model, index, message),
        activate: activate_control(model, index, message),
        guides: guides_for(brackets, index),
    }
}

fn note_row(brackets: &[ActivationBracket], index: usize, note: &NoteItem) -> NoteRow {
    NoteRow {
        index,
        number: index + 1,
        position: note.position(),
        target: note.target().to_owned(),
        content: note.content().to_owned(),
        guides: guides_for(brackets, index),
    }
}

pub fn project_grid(model: &SequenceModel) -> GridView {
    let brackets = activation_brackets(model);

    let participants = model
        .participants()
        .iter()
        .enumerate()
        .map(|(index, participant)| participant_row(index, participant))
        .collect();

    let rows = model
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Item::Message(message) => GridRow::Message(message_row(model, &brackets, index, message)),
            Item::Note(note) => GridRow::Note(note_row(&brackets, index, note)),
        })
        .collect();

    GridView { participants, rows, autonumber: model.config().autonumber }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        project_grid, BracketGuide, ControlState, GridRow, GuideShape, HINT_ACTIVATE,
        HINT_ACTIVATE_REQUIRED, HINT_DEACTIVATE, HINT_DEACTIVATE_BREAKS_LATER,
        HINT_NOTHING_TO_DEACTIVATE,
    };
    use crate::format::mermaid::parse_sequence_diagram;

    const CALL_AND_RETURN: &str = "\
participant A as Alice
actor B
A->>+B: call
Note over B: work
B-->>-A: return
B->>Ghost: lost";

    #[test]
    fn projects_participants_and_rows() {
        let view = project_grid(&parse_sequence_diagram(CALL_AND_RETURN));

        assert_eq!(view.participants.len(), 2);
        assert_eq!(view.participants[0].label, "[A] Alice");
        assert_eq!(view.participants[1].label, "[B] B");
        assert_eq!(view.rows.len(), 4);
        assert!(matches!(view.rows[1], GridRow::Note(ref note) if note.number == 2));

        let lost = view.rows[3].as_message().expect("message row");
        assert_eq!(lost.target_label, "Ghost");
        assert_eq!(lost.arrow_notation, "->>");
        assert_eq!(lost.number, 4);
    }

    #[test]
    fn controls_reflect_balance() {
        let view = project_grid(&parse_sequence_diagram(CALL_AND_RETURN));

        let call = view.rows[0].as_message().expect("message row");
        assert_eq!(
            call.activate,
            ControlState { active: true, enabled: false, hint: HINT_ACTIVATE_REQUIRED }
        );
        assert_eq!(
            call.deactivate,
            ControlState { active: false, enabled: false, hint: HINT_NOTHING_TO_DEACTIVATE }
        );

        let ret = view.rows[2].as_message().expect("message row");
        assert_eq!(ret.deactivate, ControlState { active: true, enabled: true, hint: HINT_DEACTIVATE });
        assert_eq!(ret.activate, ControlState { active: false, enabled: true, hint: HINT_ACTIVATE });

        let lost = view.rows[3].as_message().expect("message row");
        assert!(!lost.deactivate.enabled);
    }

    #[test]
    fn deactivate_that_would_steal_a_later_match_is_disabled() {
        let view = project_grid(&parse_sequence_diagram("A->>+B: call\nB->>A: early\nB-->>-A: return"));
        let early = view.rows[1].as_message().expect("message row");
        assert_eq!(
            early.deactivate,
            ControlState { active: false, enabled: false, hint: HINT_DEACTIVATE_BREAKS_LATER }
        );
    }

    #[rstest]
    #[case(0, vec![BracketGuide { level: 0, shape: GuideShape::Start }])]
    #[case(1, vec![BracketGuide { level: 0, shape: GuideShape::Middle }])]
    #[case(2, vec![BracketGuide { level: 0, shape: GuideShape::End }])]
    #[case(3, vec![])]
    fn rows_carry_bracket_guides(#[case] row: usize, #[case] expected: Vec<BracketGuide>) {
        let view = project_grid(&parse_sequence_diagram(CALL_AND_RETURN));
        let guides = match &view.rows[row] {
            GridRow::Message(message) => &message.guides,
            GridRow::Note(note) => &note.guides,
        };
        assert_eq!(guides, &expected);
    }

    #[test]
    fn view_serializes_for_the_presentation_layer() {
        let view = project_grid(&parse_sequence_diagram("autonumber\nA->>+A: self"));
        let json = serde_json::to_value(&view).expect("json");
        assert_eq!(json["autonumber"], true);
        assert_eq!(json["rows"][0]["type"], "message");
        assert_eq!(json["rows"][0]["arrowKind"], "solid-arrow");
        assert_eq!(json["rows"][0]["activate"]["active"], true);
        assert_eq!(json["rows"][0]["guides"], serde_json::json!([]));
    }
}
