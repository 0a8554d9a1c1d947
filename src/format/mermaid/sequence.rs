// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{
    Activation, ArrowKind, DiagramConfig, Item, MessageItem, NoteItem, NotePosition, Participant,
    ParticipantKind, SequenceModel,
};

const HEADER: &str = "sequenceDiagram";
const AUTONUMBER: &str = "autonumber";
const INDENT: &str = "    ";

/// A line the parser did not recognize. Not an error: unsupported constructs are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_no: usize,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseReport {
    pub model: SequenceModel,
    pub skipped: Vec<SkippedLine>,
}

fn participant_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(participant|actor)\s+(\S+)(?:\s+as\s+(.+))?$")
            .expect("participant regex is valid")
    })
}

// `<<`-prefixed bidirectional arrows are tried before the dash-prefixed forms; source and
// target are lazy so `A->>B` splits without spaces.
fn message_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\S+?)\s*(<<-+>>?|-+(?:>>?|x|\)))\s*([+-])?\s*(\S+?)\s*(?::\s*(.*))?$",
        )
        .expect("message regex is valid")
    })
}

fn note_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^note\s+(right\s+of|left\s+of|over)\s+([^:]+?)\s*:\s*(.*)$")
            .expect("note regex is valid")
    })
}

fn deactivate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^deactivate\s+(\S+)$").expect("deactivate regex is valid"))
}

fn ordinal_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("ordinal regex is valid"))
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("%%")
}

/// Strips a leading `N. ` left behind by a previous autonumbered render.
fn strip_ordinal(content: &str) -> String {
    ordinal_prefix_regex().replace(content.trim(), "").into_owned()
}

/// Canonical form of a note target: comma-separated parts, each trimmed, joined by `,`.
///
/// `over A, B` and `over A,B` name the same span, so both become `A,B`.
pub fn normalize_note_target(target: &str) -> String {
    target.split(',').map(str::trim).collect::<Vec<_>>().join(",")
}

fn unquote(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(name)
}

/// Parse `sequenceDiagram` markup into a [`SequenceModel`].
///
/// Never fails. Recognized lines (after trimming):
/// - `sequenceDiagram` (dropped), `autonumber` (sets the flag), `%%` comments (dropped)
/// - `participant|actor <id> [as <name>]` (first declaration of an id wins)
/// - `<source><arrow>[+|-]<target>[: <content>]`
/// - `Note <right of|left of|over> <target>: <content>`
/// - `deactivate <id>` directly after a message from `<id>` (sets that message's flag)
///
/// Everything else is skipped.
pub fn parse_sequence_diagram(input: &str) -> SequenceModel {
    parse_sequence_diagram_with_report(input).model
}

/// Like [`parse_sequence_diagram`], but also reports which lines were skipped.
pub fn parse_sequence_diagram_with_report(input: &str) -> ParseReport {
    let mut participants = Vec::<Participant>::new();
    let mut items = Vec::<Item>::new();
    let mut config = DiagramConfig::default();
    let mut skipped = Vec::new();

    // Index of the message parsed on the previous non-blank line, if any.
    let mut previous_message: Option<usize> = None;

    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || is_comment_line(trimmed) {
            continue;
        }

        let just_parsed = previous_message.take();

        if trimmed == HEADER {
            continue;
        }
        if trimmed == AUTONUMBER {
            config.autonumber = true;
            continue;
        }

        if let Some(caps) = participant_regex().captures(trimmed) {
            let kind = ParticipantKind::from_keyword(&caps[1]).unwrap_or_default();
            let id = &caps[2];
            let name = caps.get(3).map(|m| unquote(m.as_str())).unwrap_or(id);
            if !participants.iter().any(|p| p.id() == id) {
                participants.push(Participant::new(id, name, kind));
            }
            continue;
        }

        if let Some(caps) = message_regex().captures(trimmed) {
            let arrow_kind = ArrowKind::normalize(&caps[2]);
            let activation = match caps.get(3).map(|m| m.as_str()) {
                Some("+") => Activation { activate: true, deactivate: false },
                Some("-") => Activation { activate: false, deactivate: true },
                _ => Activation::NONE,
            };
            let content = caps.get(5).map(|m| strip_ordinal(m.as_str())).unwrap_or_default();
            let message = MessageItem::new(&caps[1], &caps[4], arrow_kind, content)
                .with_activation(activation);
            items.push(message.into());
            previous_message = Some(items.len() - 1);
            continue;
        }

        if let Some(caps) = note_regex().captures(trimmed) {
            let position = NotePosition::from_keyword(&caps[1]).unwrap_or_default();
            let target = normalize_note_target(&caps[2]);
            let content = strip_ordinal(&caps[3]);
            items.push(NoteItem::new(position, target, content).into());
            continue;
        }

        if let Some(caps) = deactivate_regex().captures(trimmed) {
            let attached = just_parsed
                .and_then(|index| items.get_mut(index))
                .and_then(Item::as_message_mut)
                .filter(|message| {
                    message.source().as_str() == &caps[1] && !message.activation().deactivate
                })
                .map(|message| message.activation_mut().deactivate = true)
                .is_some();
            if attached {
                continue;
            }
        }

        skipped.push(SkippedLine { line_no, line: trimmed.to_owned() });
    }

    ParseReport { model: SequenceModel::new(participants, items, config), skipped }
}

// Edge quotes are wrapped too, since the parser strips one pair.
fn quote_alias(name: &str) -> String {
    if name.chars().any(char::is_whitespace) || name.starts_with('"') || name.ends_with('"') {
        format!("\"{name}\"")
    } else {
        name.to_owned()
    }
}

fn single_line(text: &str) -> String {
    text.trim().replace("\r\n", "<br/>").replace(['\n', '\r'], "<br/>")
}

/// Markup name for an endpoint: the participant's logical id, or the raw id when undeclared.
fn markup_name<'a>(model: &'a SequenceModel, id: &'a str) -> &'a str {
    model.participant(id).map(Participant::logical_id).unwrap_or(id)
}

fn note_target(model: &SequenceModel, target: &str) -> String {
    target
        .split(',')
        .map(|part| markup_name(model, part.trim()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Generate canonical `sequenceDiagram` markup from a model.
///
/// Output is deterministic and preserves participant and item order:
/// header, optional `autonumber`, one `as`-form declaration per participant, a blank line, then
/// one line per item. A message carrying both activation flags gets a trailing
/// `deactivate <source>` line.
pub fn generate_sequence_diagram(model: &SequenceModel) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    if model.config().autonumber {
        let _ = writeln!(out, "{INDENT}{AUTONUMBER}");
    }

    for participant in model.participants() {
        let alias = if participant.name().trim().is_empty() {
            participant.logical_id()
        } else {
            participant.name().trim()
        };
        let _ = writeln!(
            out,
            "{INDENT}{} {} as {}",
            participant.kind().keyword(),
            participant.logical_id(),
            quote_alias(&single_line(alias))
        );
    }

    out.push('\n');

    for item in model.items() {
        match item {
            Item::Message(message) => {
                // Re-normalize so a hand-built kind can never emit a notation the renderer rejects.
                let arrow = ArrowKind::normalize(message.arrow_kind().notation());
                let activation = message.activation();
                let marker = if activation.activate {
                    "+"
                } else if activation.deactivate {
                    "-"
                } else {
                    ""
                };
                let source = markup_name(model, message.source());
                let target = markup_name(model, message.target());
                let _ = writeln!(
                    out,
                    "{INDENT}{source} {arrow} {marker}{target}: {}",
                    single_line(message.content())
                );
                if activation.activate && activation.deactivate {
                    let _ = writeln!(out, "{INDENT}deactivate {source}");
                }
            }
            Item::Note(note) => {
                let _ = writeln!(
                    out,
                    "{INDENT}Note {} {}: {}",
                    note.position().keyword(),
                    note_target(model, note.target()),
                    single_line(note.content())
                );
            }
        }
    }

    out
}
