// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn over_dashed_arrow_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"---+(>>?|x|\)|>)").expect("sanitizer regex is valid"))
}

/// Collapses arrows with three or more dashes (`--->>`, `----x`, ...) to their two-dash form.
///
/// Everything else is returned untouched, so the result borrows when nothing matched.
/// Idempotent: the output never contains a run of three dashes followed by an arrow head.
pub fn sanitize_markup(text: &str) -> Cow<'_, str> {
    over_dashed_arrow_regex().replace_all(text, "--$1")
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use rstest::rstest;

    use super::sanitize_markup;

    #[rstest]
    #[case("A--->>B: hi", "A-->>B: hi")]
    #[case("A----x B", "A--x B")]
    #[case("A---) B", "A--) B")]
    #[case("A---> B", "A--> B")]
    #[case("A<<--->>B", "A<<-->>B")]
    fn collapses_over_dashed_arrows(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_markup(input), expected);
    }

    #[test]
    fn untouched_text_is_borrowed() {
        let text = "sequenceDiagram\n    A ->> B: ok\n    %% ---\n";
        assert!(matches!(sanitize_markup(text), Cow::Borrowed(_)));
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let once = sanitize_markup("A------>>B\nB---xA").into_owned();
        assert_eq!(sanitize_markup(&once), once.as_str());
    }
}
