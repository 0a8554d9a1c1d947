// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Activation balance engine.
//!
//! Activation flags behave like one bracket stream per participant: `activate` pushes on the
//! message target, `deactivate` pops on the message source. Within one message the deactivate
//! is applied before the activate. A stream is balanced when no pop happens at depth zero.
//!
//! Everything here is a pure scan over the item sequence; only [`auto_correct`] mutates.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Activation, Item, MessageItem, ParticipantId, SequenceModel};

/// Hypothetical replacement for one row's flags. `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivationOverride {
    pub activate: Option<bool>,
    pub deactivate: Option<bool>,
}

impl ActivationOverride {
    pub fn activate(value: bool) -> Self {
        Self { activate: Some(value), deactivate: None }
    }

    pub fn deactivate(value: bool) -> Self {
        Self { activate: None, deactivate: Some(value) }
    }

    fn apply_to(self, current: Activation) -> Activation {
        Activation {
            activate: self.activate.unwrap_or(current.activate),
            deactivate: self.deactivate.unwrap_or(current.deactivate),
        }
    }
}

fn messages_with_rows(model: &SequenceModel) -> impl Iterator<Item = (usize, &MessageItem)> + '_ {
    model
        .items()
        .iter()
        .enumerate()
        .filter_map(|(row, item)| item.as_message().map(|message| (row, message)))
}

/// Whether `participant` has an open activation just before `row`.
///
/// Only rows strictly before `row` are considered. Rows past the end see the whole sequence.
pub fn is_active_at(model: &SequenceModel, row: usize, participant: &str) -> bool {
    let mut depth = 0i64;
    for (_, message) in messages_with_rows(model).take_while(|(idx, _)| *idx < row) {
        let activation = message.activation();
        if activation.deactivate && message.source() == participant {
            depth -= 1;
        }
        if activation.activate && message.target() == participant {
            depth += 1;
        }
    }
    depth > 0
}

/// Whether `participant`'s stream stays balanced over the whole sequence when the flags at
/// `row` are replaced by `override_flags`.
///
/// An override at a row that is not a message changes nothing.
pub fn can_apply_override(
    model: &SequenceModel,
    row: usize,
    override_flags: ActivationOverride,
    participant: &str,
) -> bool {
    let mut depth = 0i64;
    for (idx, message) in messages_with_rows(model) {
        let activation = if idx == row {
            override_flags.apply_to(message.activation())
        } else {
            message.activation()
        };
        if activation.deactivate && message.source() == participant {
            if depth <= 0 {
                return false;
            }
            depth -= 1;
        }
        if activation.activate && message.target() == participant {
            depth += 1;
        }
    }
    true
}

/// Clears every `deactivate` flag whose source has nothing open at that point.
///
/// Single forward pass; returns whether any flag was cleared. Running it again on its own
/// output is a no-op.
pub fn auto_correct(model: &mut SequenceModel) -> bool {
    let mut depths: HashMap<ParticipantId, i64> = HashMap::new();
    let mut changed = false;

    for item in model.items_mut().iter_mut() {
        let Some(message) = item.as_message_mut() else {
            continue;
        };
        if message.activation().deactivate {
            let depth = depths.entry(message.source().clone()).or_default();
            if *depth <= 0 {
                message.activation_mut().deactivate = false;
                changed = true;
            } else {
                *depth -= 1;
            }
        }
        if message.activation().activate {
            *depths.entry(message.target().clone()).or_default() += 1;
        }
    }

    changed
}

/// A deactivate with nothing open for its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationViolation {
    pub row: usize,
    pub participant: ParticipantId,
}

pub fn first_violation(model: &SequenceModel) -> Option<ActivationViolation> {
    let mut depths: HashMap<&str, i64> = HashMap::new();
    for (row, message) in messages_with_rows(model) {
        let activation = message.activation();
        if activation.deactivate {
            let depth = depths.entry(message.source().as_str()).or_default();
            if *depth <= 0 {
                return Some(ActivationViolation { row, participant: message.source().clone() });
            }
            *depth -= 1;
        }
        if activation.activate {
            *depths.entry(message.target().as_str()).or_default() += 1;
        }
    }
    None
}

pub fn invariant_holds(model: &SequenceModel) -> bool {
    first_violation(model).is_none()
}

/// One activation span as drawn beside the grid.
///
/// `level` is the nesting depth at which the span was opened (0 = outermost). Open spans have
/// `closed == false` and run to the last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationBracket {
    pub start: usize,
    pub end: usize,
    pub level: usize,
    pub closed: bool,
}

impl ActivationBracket {
    pub fn spans(&self, row: usize) -> bool {
        self.start <= row && row <= self.end
    }
}

/// Bracket structure over all rows, using a single stack shared by every participant.
///
/// Closed brackets come first in closing order, then still-open ones from innermost outwards.
pub fn activation_brackets(model: &SequenceModel) -> Vec<ActivationBracket> {
    struct Open {
        start: usize,
        level: usize,
    }

    let mut stack: Vec<Open> = Vec::new();
    let mut brackets = Vec::new();

    for (row, item) in model.items().iter().enumerate() {
        let Item::Message(message) = item else {
            continue;
        };
        let activation = message.activation();
        if activation.deactivate {
            if let Some(open) = stack.pop() {
                brackets.push(ActivationBracket {
                    start: open.start,
                    end: row,
                    level: open.level,
                    closed: true,
                });
            }
        }
        if activation.activate {
            stack.push(Open { start: row, level: stack.len() });
        }
    }

    let last_row = model.items().len().saturating_sub(1);
    while let Some(open) = stack.pop() {
        brackets.push(ActivationBracket {
            start: open.start,
            end: last_row,
            level: open.level,
            closed: false,
        });
    }

    brackets
}

/// Closed brackets that span `row`, outermost first.
pub fn brackets_at(brackets: &[ActivationBracket], row: usize) -> Vec<ActivationBracket> {
    let mut spanning: Vec<ActivationBracket> =
        brackets.iter().filter(|b| b.closed && b.spans(row)).copied().collect();
    spanning.sort_by_key(|b| b.level);
    spanning
}

#[cfg(test)]
mod tests;
