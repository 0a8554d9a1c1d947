// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::arrow::ArrowKind;

/// Internal participant identifier referenced by message endpoints.
///
/// Endpoints are raw markup tokens, so an id may name a participant that was never declared.
pub type ParticipantId = SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    #[default]
    Participant,
    Actor,
}

impl ParticipantKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Actor => "actor",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("participant") {
            Some(Self::Participant)
        } else if keyword.eq_ignore_ascii_case("actor") {
            Some(Self::Actor)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    id: ParticipantId,
    logical_id: SmolStr,
    name: String,
    kind: ParticipantKind,
}

impl Participant {
    /// A participant whose logical id equals its internal id.
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>, kind: ParticipantKind) -> Self {
        let id = id.into();
        Self { logical_id: id.clone(), id, name: name.into(), kind }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn set_logical_id(&mut self, logical_id: impl Into<SmolStr>) {
        self.logical_id = logical_id.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ParticipantKind) {
        self.kind = kind;
    }

    /// `[logicalId] name`, the label shown in endpoint pickers.
    pub fn label(&self) -> String {
        let name = if self.name.is_empty() { self.logical_id.as_str() } else { &self.name };
        format!("[{}] {name}", self.logical_id)
    }
}

/// Lifeline activation flags carried by a message.
///
/// `activate` applies to the message target, `deactivate` to the message source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Activation {
    pub activate: bool,
    pub deactivate: bool,
}

impl Activation {
    pub const NONE: Activation = Activation { activate: false, deactivate: false };

    pub fn is_none(&self) -> bool {
        !self.activate && !self.deactivate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageItem {
    source: ParticipantId,
    target: ParticipantId,
    arrow_kind: ArrowKind,
    content: String,
    #[serde(default)]
    activation: Activation,
}

impl MessageItem {
    pub fn new(
        source: impl Into<ParticipantId>,
        target: impl Into<ParticipantId>,
        arrow_kind: ArrowKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            arrow_kind,
            content: content.into(),
            activation: Activation::NONE,
        }
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn source(&self) -> &ParticipantId {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<ParticipantId>) {
        self.source = source.into();
    }

    pub fn target(&self) -> &ParticipantId {
        &self.target
    }

    pub fn set_target(&mut self, target: impl Into<ParticipantId>) {
        self.target = target.into();
    }

    pub fn swap_endpoints(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }

    pub fn arrow_kind(&self) -> ArrowKind {
        self.arrow_kind
    }

    pub fn set_arrow_kind(&mut self, arrow_kind: ArrowKind) {
        self.arrow_kind = arrow_kind;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn activation_mut(&mut self) -> &mut Activation {
        &mut self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotePosition {
    #[default]
    RightOf,
    LeftOf,
    Over,
}

impl NotePosition {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::RightOf => "right of",
            Self::LeftOf => "left of",
            Self::Over => "over",
        }
    }

    /// Case-insensitive; inner whitespace between `right`/`left` and `of` may be any run.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let normalized = keyword.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "right of" => Some(Self::RightOf),
            "left of" => Some(Self::LeftOf),
            "over" => Some(Self::Over),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteItem {
    position: NotePosition,
    target: String,
    content: String,
}

impl NoteItem {
    /// `target` names one participant, or several joined by `,` (e.g. `A,B` for `over A,B`).
    pub fn new(position: NotePosition, target: impl Into<String>, content: impl Into<String>) -> Self {
        Self { position, target: target.into(), content: content.into() }
    }

    pub fn position(&self) -> NotePosition {
        self.position
    }

    pub fn set_position(&mut self, position: NotePosition) {
        self.position = position;
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

/// One event in the diagram's ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Message(MessageItem),
    Note(NoteItem),
}

impl Item {
    pub fn as_message(&self) -> Option<&MessageItem> {
        match self {
            Self::Message(message) => Some(message),
            Self::Note(_) => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut MessageItem> {
        match self {
            Self::Message(message) => Some(message),
            Self::Note(_) => None,
        }
    }

    pub fn as_note(&self) -> Option<&NoteItem> {
        match self {
            Self::Note(note) => Some(note),
            Self::Message(_) => None,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message(_))
    }
}

impl From<MessageItem> for Item {
    fn from(message: MessageItem) -> Self {
        Self::Message(message)
    }
}

impl From<NoteItem> for Item {
    fn from(note: NoteItem) -> Self {
        Self::Note(note)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub autonumber: bool,
}

/// The structured form of a sequence diagram: lanes, ordered events, rendering flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceModel {
    participants: Vec<Participant>,
    items: Vec<Item>,
    config: DiagramConfig,
}

impl SequenceModel {
    pub fn new(participants: Vec<Participant>, items: Vec<Item>, config: DiagramConfig) -> Self {
        Self { participants, items, config }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participants_mut(&mut self) -> &mut Vec<Participant> {
        &mut self.participants
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }

    pub fn config(&self) -> DiagramConfig {
        self.config
    }

    pub fn config_mut(&mut self) -> &mut DiagramConfig {
        &mut self.config
    }

    pub fn messages(&self) -> impl Iterator<Item = &MessageItem> + '_ {
        self.items.iter().filter_map(Item::as_message)
    }

    /// Position of the item among message items only (`None` for notes or out of range).
    pub fn message_ordinal(&self, item_index: usize) -> Option<usize> {
        if !self.items.get(item_index)?.is_message() {
            return None;
        }
        Some(self.items[..item_index].iter().filter(|item| item.is_message()).count())
    }

    /// Inverse of [`Self::message_ordinal`].
    pub fn item_index_of_message(&self, ordinal: usize) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_message())
            .nth(ordinal)
            .map(|(idx, _)| idx)
    }

    /// Label for an endpoint id: the participant label, or the raw id when undeclared.
    pub fn endpoint_label(&self, id: &str) -> String {
        self.participant(id).map(Participant::label).unwrap_or_else(|| id.to_owned())
    }
}
