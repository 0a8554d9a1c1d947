// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text ↔ model synchronization.
//!
//! A [`SyncController`] owns the raw text buffer and the model. Text edits are debounced and then
//! re-parsed wholesale (text is authoritative); grid edits mutate the model and regenerate the
//! text (model is authoritative). Each transition returns a [`SyncOutput`] for the presentation
//! layer. The controller itself is synchronous; [`driver`] runs it on a tokio task.

use std::fmt;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::format::mermaid::{generate_sequence_diagram, parse_sequence_diagram, sanitize_markup};
use crate::grid::{project_grid, GridView};
use crate::model::{DiagramId, SequenceModel};
use crate::ops::{apply_grid_ops, ApplyError, GridOp};
use crate::store::{KvBackend, NewDiagram, Repository};

pub mod debounce;
pub mod driver;
pub mod highlight;
pub mod render;

pub use debounce::Debouncer;
pub use driver::{spawn_editor, EditorCommand, EditorHandle, EditorSnapshot};
pub use highlight::VisualElement;
pub use render::{
    Graphic, RenderError, RenderOutcome, RenderRequest, RenderTicket, Renderer,
};

use render::RenderSequencer;

/// Markup a fresh diagram starts with.
pub const DEFAULT_DIAGRAM: &str = "sequenceDiagram
    participant A as Alice
    participant B as Bob

    A ->> B: Hello Bob, how are you ?
    B ->> A : Great!
";

/// A user-visible, non-fatal message produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Notice {
    /// Auto-correct cleared activation flags after a structural edit.
    ActivationsCleared,
    /// A grid edit was refused and the model left unchanged.
    EditRejected { message: String },
    Saved { diagram_id: DiagramId },
    StoreFailed { message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActivationsCleared => {
                f.write_str("Some activation flags were cleared to keep lifelines balanced")
            }
            Self::EditRejected { message } => write!(f, "Edit rejected: {message}"),
            Self::Saved { diagram_id } => write!(f, "Saved {diagram_id}"),
            Self::StoreFailed { message } => write!(f, "Storage error: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutput {
    pub text: String,
    /// Whether the transition rewrote the text buffer.
    pub text_changed: bool,
    pub model: SequenceModel,
    pub grid: GridView,
    pub render: Option<RenderRequest>,
    pub notices: Vec<Notice>,
}

#[derive(Debug)]
pub struct SyncController {
    text: String,
    model: SequenceModel,
    debounce: Debouncer,
    renders: RenderSequencer,
    notices: Vec<Notice>,
}

impl SyncController {
    /// Loads `initial_text` (sanitized, then parsed).
    pub fn new(config: EditorConfig, initial_text: &str) -> Self {
        let text = sanitize_markup(initial_text).into_owned();
        let model = parse_sequence_diagram(&text);
        Self {
            text,
            model,
            debounce: Debouncer::new(config.debounce),
            renders: RenderSequencer::default(),
            notices: Vec::new(),
        }
    }

    pub fn new_diagram(config: EditorConfig) -> Self {
        Self::new(config, DEFAULT_DIAGRAM)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn model(&self) -> &SequenceModel {
        &self.model
    }

    pub fn grid(&self) -> GridView {
        project_grid(&self.model)
    }

    pub fn graphic(&self) -> Option<&Graphic> {
        self.renders.graphic()
    }

    /// Message of the last failed render, cleared by the next successful one.
    pub fn render_error(&self) -> Option<&str> {
        self.renders.error()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn has_pending_input(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Notices raised outside a transition (persistence), drained.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ---- text-authoritative ----

    /// Replaces the buffer and (re)arms the debounce timer. The model is left as is.
    pub fn on_text_input(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.debounce.arm(now);
    }

    /// Runs the pending re-parse once the quiet interval has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SyncOutput> {
        self.debounce.fire_if_due(now).then(|| self.sync_from_text())
    }

    /// Runs the pending re-parse immediately.
    pub fn flush(&mut self) -> Option<SyncOutput> {
        if !self.debounce.is_armed() {
            return None;
        }
        self.debounce.cancel();
        Some(self.sync_from_text())
    }

    /// Re-derives everything from the current buffer, pending input or not.
    pub fn resync(&mut self) -> SyncOutput {
        self.debounce.cancel();
        self.sync_from_text()
    }

    fn sync_from_text(&mut self) -> SyncOutput {
        let sanitized = sanitize_markup(&self.text).into_owned();
        self.model = parse_sequence_diagram(&sanitized);
        let render = self.renders.issue(&sanitized);
        debug!(
            items = self.model.items().len(),
            participants = self.model.participants().len(),
            ticket = render.ticket.get(),
            "text sync"
        );
        self.output(false, Some(render))
    }

    // ---- grid-authoritative ----

    pub fn apply_grid_op(&mut self, op: &GridOp) -> Result<SyncOutput, ApplyError> {
        self.apply_grid_ops(std::slice::from_ref(op))
    }

    /// Applies a batch of grid edits, regenerates the text and requests a render if it changed.
    ///
    /// A pending text re-parse is dropped: the grid edit supersedes it.
    pub fn apply_grid_ops(&mut self, ops: &[GridOp]) -> Result<SyncOutput, ApplyError> {
        let outcome = apply_grid_ops(&mut self.model, ops)?;
        self.debounce.cancel();

        if outcome.autocorrected {
            warn!(ops = ops.len(), "auto-correct cleared activation flags");
            self.notices.push(Notice::ActivationsCleared);
        }

        let generated = generate_sequence_diagram(&self.model);
        let text_changed = generated != self.text;
        let render = if text_changed {
            self.text = generated;
            Some(self.renders.issue(&self.text))
        } else {
            None
        };
        debug!(
            ops = ops.len(),
            structural = outcome.structural,
            text_changed,
            "grid sync"
        );
        Ok(self.output(text_changed, render))
    }

    fn output(&mut self, text_changed: bool, render: Option<RenderRequest>) -> SyncOutput {
        SyncOutput {
            text: self.text.clone(),
            text_changed,
            model: self.model.clone(),
            grid: self.grid(),
            render,
            notices: self.take_notices(),
        }
    }

    // ---- rendering ----

    pub fn latest_render(&self) -> Option<RenderTicket> {
        self.renders.latest()
    }

    pub fn complete_render(
        &mut self,
        ticket: RenderTicket,
        result: Result<Graphic, RenderError>,
    ) -> RenderOutcome {
        let outcome = self.renders.complete(ticket, result);
        match &outcome {
            RenderOutcome::Applied => debug!(ticket = ticket.get(), "render applied"),
            RenderOutcome::Failed { message } => {
                warn!(ticket = ticket.get(), error = %message, "render failed");
            }
            RenderOutcome::Stale => debug!(ticket = ticket.get(), "stale render discarded"),
        }
        outcome
    }

    // ---- highlighting ----

    pub fn message_ordinal(&self, item_index: usize) -> Option<usize> {
        self.model.message_ordinal(item_index)
    }

    pub fn item_for_visual(&self, visual_index: usize, elements: &[VisualElement]) -> Option<usize> {
        highlight::item_for_visual(&self.model, visual_index, elements)
    }

    pub fn visual_for_item(&self, item_index: usize, elements: &[VisualElement]) -> Option<usize> {
        highlight::visual_for_item(&self.model, item_index, elements)
    }

    // ---- persistence ----

    /// Loads stored text, repairing it with the sanitizer, and syncs immediately.
    pub fn load_version_text(&mut self, code: &str) -> SyncOutput {
        self.text = sanitize_markup(code).into_owned();
        self.resync()
    }

    /// Loads the latest version of a stored diagram. Failures become notices.
    pub fn open<B: KvBackend>(
        &mut self,
        repo: &Repository<B>,
        diagram_id: &DiagramId,
    ) -> Option<SyncOutput> {
        match repo.current_code(diagram_id) {
            Ok(code) => Some(self.load_version_text(&code)),
            Err(err) => {
                warn!(diagram_id = %diagram_id, error = %err, "cannot load diagram");
                self.notices.push(Notice::StoreFailed { message: err.to_string() });
                None
            }
        }
    }

    /// Stores the buffer: a new version of `diagram_id`, or a new diagram titled
    /// `note_or_title`. Returns the diagram id on success; failures become notices.
    pub fn save<B: KvBackend>(
        &mut self,
        repo: &Repository<B>,
        diagram_id: Option<&DiagramId>,
        author: &str,
        note_or_title: &str,
    ) -> Option<DiagramId> {
        let label = note_or_title.trim();
        let result = match diagram_id {
            Some(id) => repo
                .store_code(id, &self.text, author, (!label.is_empty()).then_some(label))
                .map(|_| id.clone()),
            None => repo
                .create_diagram(NewDiagram {
                    title: label.to_owned(),
                    code: self.text.clone(),
                    author: author.to_owned(),
                    ..NewDiagram::default()
                })
                .map(|diagram| diagram.id),
        };

        match result {
            Ok(id) => {
                self.notices.push(Notice::Saved { diagram_id: id.clone() });
                Some(id)
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.notices.push(Notice::StoreFailed { message: err.to_string() });
                None
            }
        }
    }
}
