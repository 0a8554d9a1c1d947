// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arrow notation registry.
//!
//! Mermaid documents ten message arrows. Each [`ArrowKind`] maps to exactly one canonical
//! notation string; that string is the contract with the external renderer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The terminal shape of an arrow, independent of its line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowHead {
    Arrow,
    Open,
    Line,
    Cross,
    Bidirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowKind {
    #[default]
    SolidArrow,
    DottedArrow,
    SolidOpen,
    DottedOpen,
    SolidLine,
    DottedLine,
    SolidCross,
    DottedCross,
    SolidBidirectional,
    DottedBidirectional,
}

impl ArrowKind {
    /// All kinds in arrow-menu order.
    pub const ALL: [ArrowKind; 10] = [
        Self::SolidArrow,
        Self::DottedArrow,
        Self::SolidOpen,
        Self::DottedOpen,
        Self::SolidLine,
        Self::DottedLine,
        Self::SolidCross,
        Self::DottedCross,
        Self::SolidBidirectional,
        Self::DottedBidirectional,
    ];

    pub fn notation(self) -> &'static str {
        match self {
            Self::SolidArrow => "->>",
            Self::DottedArrow => "-->>",
            Self::SolidOpen => "-)",
            Self::DottedOpen => "--)",
            Self::SolidLine => "->",
            Self::DottedLine => "-->",
            Self::SolidCross => "-x",
            Self::DottedCross => "--x",
            Self::SolidBidirectional => "<<->>",
            Self::DottedBidirectional => "<<-->>",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SolidArrow => "Solid arrow",
            Self::DottedArrow => "Dotted arrow",
            Self::SolidOpen => "Solid open arrow (async)",
            Self::DottedOpen => "Dotted open arrow (async)",
            Self::SolidLine => "Solid line",
            Self::DottedLine => "Dotted line",
            Self::SolidCross => "Solid cross",
            Self::DottedCross => "Dotted cross",
            Self::SolidBidirectional => "Solid bidirectional",
            Self::DottedBidirectional => "Dotted bidirectional",
        }
    }

    pub fn is_dotted(self) -> bool {
        matches!(
            self,
            Self::DottedArrow
                | Self::DottedOpen
                | Self::DottedLine
                | Self::DottedCross
                | Self::DottedBidirectional
        )
    }

    pub fn head(self) -> ArrowHead {
        match self {
            Self::SolidArrow | Self::DottedArrow => ArrowHead::Arrow,
            Self::SolidOpen | Self::DottedOpen => ArrowHead::Open,
            Self::SolidLine | Self::DottedLine => ArrowHead::Line,
            Self::SolidCross | Self::DottedCross => ArrowHead::Cross,
            Self::SolidBidirectional | Self::DottedBidirectional => ArrowHead::Bidirectional,
        }
    }

    fn from_parts(dotted: bool, head: ArrowHead) -> Self {
        match (head, dotted) {
            (ArrowHead::Arrow, false) => Self::SolidArrow,
            (ArrowHead::Arrow, true) => Self::DottedArrow,
            (ArrowHead::Open, false) => Self::SolidOpen,
            (ArrowHead::Open, true) => Self::DottedOpen,
            (ArrowHead::Line, false) => Self::SolidLine,
            (ArrowHead::Line, true) => Self::DottedLine,
            (ArrowHead::Cross, false) => Self::SolidCross,
            (ArrowHead::Cross, true) => Self::DottedCross,
            (ArrowHead::Bidirectional, false) => Self::SolidBidirectional,
            (ArrowHead::Bidirectional, true) => Self::DottedBidirectional,
        }
    }

    /// Exact lookup of a canonical notation string.
    pub fn from_notation(notation: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.notation() == notation)
    }

    /// Maps any arrow-ish token onto the nearest kind.
    ///
    /// - `<<`-prefixed tokens are bidirectional; they are dotted when they contain `--`.
    /// - Otherwise a leading `--` means dotted, and the trailing token picks the head:
    ///   `>>` arrow, `)` open, `x` cross, anything else a plain line.
    /// - Tokens shorter than two characters fall back to a solid arrow.
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.chars().count() < 2 {
            return Self::SolidArrow;
        }

        if raw.starts_with("<<") {
            return Self::from_parts(raw.contains("--"), ArrowHead::Bidirectional);
        }

        let dotted = raw.starts_with("--");
        let head = if raw.ends_with(">>") {
            ArrowHead::Arrow
        } else if raw.ends_with(')') {
            ArrowHead::Open
        } else if raw.ends_with('x') {
            ArrowHead::Cross
        } else {
            ArrowHead::Line
        };
        Self::from_parts(dotted, head)
    }
}

impl fmt::Display for ArrowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}
