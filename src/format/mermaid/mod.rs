// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaid `sequenceDiagram` parsing, generation, cleanup and completion.

mod ident;
mod sanitize;
pub mod sequence;
pub mod suggest;

pub use ident::{validate_participant_ident, ParticipantIdentError};
pub use sanitize::sanitize_markup;
pub use sequence::{
    generate_sequence_diagram, normalize_note_target, parse_sequence_diagram,
    parse_sequence_diagram_with_report, ParseReport, SkippedLine,
};
pub use suggest::{apply_suggestion, suggest, Suggestion, SuggestionKind};
