// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Why a logical participant id cannot appear in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParticipantIdentError {
    #[error("must not be empty")]
    Empty,
    #[error("must not contain whitespace")]
    ContainsWhitespace,
    #[error("must not contain '{ch}' (reserved by arrow syntax)")]
    ArrowChar { ch: char },
    #[error("contains invalid character: '{ch}'")]
    InvalidChar { ch: char },
}

/// Checks that `ident` survives a generate/parse cycle as a single endpoint token.
///
/// Letters, digits and `_` only. Arrow characters (`-`, `<`, `>`, `+`) and `:` would split the
/// token when the message line is parsed back.
pub fn validate_participant_ident(ident: &str) -> Result<(), ParticipantIdentError> {
    if ident.is_empty() {
        return Err(ParticipantIdentError::Empty);
    }
    if ident.chars().any(char::is_whitespace) {
        return Err(ParticipantIdentError::ContainsWhitespace);
    }
    if let Some(ch) = ident.chars().find(|c| matches!(c, '-' | '<' | '>' | '+')) {
        return Err(ParticipantIdentError::ArrowChar { ch });
    }
    if let Some(ch) = ident.chars().find(|c| !c.is_alphanumeric() && *c != '_') {
        return Err(ParticipantIdentError::InvalidChar { ch });
    }
    Ok(())
}
