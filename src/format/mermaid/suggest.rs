// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rule-based completions for the text editor.
//!
//! Only the current line up to the cursor is inspected. A trailing `-` or `<` offers the arrow
//! vocabulary; a trailing word of two or more characters offers the keywords it prefixes.

use serde::Serialize;

use crate::model::ArrowKind;

/// Shortest trailing word that triggers keyword completion.
pub const MIN_KEYWORD_PREFIX: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Arrow,
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    /// Text shown in the list.
    pub label: &'static str,
    /// Text inserted in place of the trigger.
    pub value: &'static str,
    pub info: &'static str,
}

const fn keyword(label: &'static str, value: &'static str, info: &'static str) -> Suggestion {
    Suggestion { kind: SuggestionKind::Keyword, label, value, info }
}

pub const KEYWORDS: [Suggestion; 9] = [
    keyword("participant", "participant ", "Define a participant"),
    keyword("actor", "actor ", "Define an actor symbol"),
    keyword("Note right of", "Note right of ", "Add a note"),
    keyword("Note left of", "Note left of ", "Add a note"),
    keyword("Note over", "Note over ", "Note spanning participants"),
    keyword("loop", "loop ", "Loop block"),
    keyword("alt", "alt ", "Alternative path"),
    keyword("opt", "opt ", "Optional path"),
    keyword("rect", "rect rgb(0,0,0)", "Background color block"),
];

fn arrow_suggestions() -> Vec<Suggestion> {
    ArrowKind::ALL
        .iter()
        .map(|kind| Suggestion {
            kind: SuggestionKind::Arrow,
            label: kind.notation(),
            value: kind.notation(),
            info: kind.label(),
        })
        .collect()
}

fn current_line(prefix: &str) -> &str {
    prefix.rsplit('\n').next().unwrap_or(prefix)
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn trailing_word(line: &str) -> &str {
    let start = line
        .char_indices()
        .rev()
        .take_while(|(_, ch)| is_word_char(*ch))
        .last()
        .map_or(line.len(), |(idx, _)| idx);
    &line[start..]
}

fn is_arrow_trigger(line: &str) -> bool {
    line.ends_with('-') || line.ends_with('<')
}

/// Completions for the text before the cursor. Empty when nothing applies.
pub fn suggest(prefix: &str) -> Vec<Suggestion> {
    let line = current_line(prefix);
    if is_arrow_trigger(line) {
        return arrow_suggestions();
    }

    let word = trailing_word(line);
    if word.len() < MIN_KEYWORD_PREFIX {
        return Vec::new();
    }
    let word = word.to_ascii_lowercase();
    KEYWORDS
        .iter()
        .filter(|keyword| keyword.label.to_ascii_lowercase().starts_with(&word))
        .copied()
        .collect()
}

/// `prefix` with the trigger replaced by `suggestion.value`.
///
/// Arrows replace the whole trailing run of `-`/`<` so `A--` plus `-->>` yields `A-->>`.
pub fn apply_suggestion(prefix: &str, suggestion: &Suggestion) -> String {
    let kept = match suggestion.kind {
        SuggestionKind::Arrow => prefix.trim_end_matches(['-', '<']),
        SuggestionKind::Keyword => {
            let line = current_line(prefix);
            &prefix[..prefix.len() - trailing_word(line).len()]
        }
    };
    format!("{kept}{}", suggestion.value)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{apply_suggestion, suggest, SuggestionKind, KEYWORDS};
    use crate::model::ArrowKind;

    fn labels(prefix: &str) -> Vec<&'static str> {
        suggest(prefix).into_iter().map(|s| s.label).collect()
    }

    #[rstest]
    #[case("A-")]
    #[case("A --")]
    #[case("    Alice<")]
    #[case("sequenceDiagram\nB-")]
    fn dash_or_angle_offers_every_arrow(#[case] prefix: &str) {
        let suggestions = suggest(prefix);
        assert_eq!(suggestions.len(), ArrowKind::ALL.len());
        assert!(suggestions.iter().all(|s| s.kind == SuggestionKind::Arrow));
        assert_eq!(suggestions[0].value, "->>");
        assert_eq!(suggestions[0].info, "Solid arrow");
    }

    #[rstest]
    #[case("pa", vec!["participant"])]
    #[case("  AC", vec!["actor"])]
    #[case("no", vec!["Note right of", "Note left of", "Note over"])]
    #[case("A->>B: lo", vec!["loop"])]
    #[case("al", vec!["alt"])]
    #[case("re", vec!["rect"])]
    #[case("participant A\nop", vec!["opt"])]
    fn trailing_word_matches_keyword_prefixes(#[case] prefix: &str, #[case] expected: Vec<&str>) {
        assert_eq!(labels(prefix), expected);
    }

    #[rstest]
    #[case("")]
    #[case("p")]
    #[case("A->>B")]
    #[case("xyz")]
    #[case("Note over ")]
    #[case("alt\n")]
    fn nothing_is_offered_without_a_trigger(#[case] prefix: &str) {
        assert!(suggest(prefix).is_empty(), "{prefix:?}");
    }

    #[test]
    fn keyword_table_carries_info_text() {
        assert!(KEYWORDS.iter().all(|k| !k.info.is_empty()));
        assert_eq!(KEYWORDS[8].value, "rect rgb(0,0,0)");
    }

    #[rstest]
    #[case("A-", 0, "A->>")]
    #[case("A--", 1, "A-->>")]
    #[case("A<", 8, "A<<->>")]
    fn arrows_replace_the_trigger_run(
        #[case] prefix: &str,
        #[case] pick: usize,
        #[case] expected: &str,
    ) {
        let suggestion = suggest(prefix)[pick];
        assert_eq!(apply_suggestion(prefix, &suggestion), expected);
    }

    #[test]
    fn keywords_replace_the_typed_word() {
        let prefix = "sequenceDiagram\n    par";
        let suggestion = suggest(prefix)[0];
        assert_eq!(apply_suggestion(prefix, &suggestion), "sequenceDiagram\n    participant ");
    }
}
