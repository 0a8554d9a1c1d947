// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The renderer seam and render sequencing.
//!
//! Renders may complete out of order. Every request carries a ticket and only the newest issued
//! ticket may replace the displayed graphic; older completions are reported as stale.

use serde::Serialize;

/// Opaque rendered output (typically SVG markup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graphic {
    markup: String,
}

impl Graphic {
    pub fn new(markup: impl Into<String>) -> Self {
        Self { markup: markup.into() }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The renderer rejected the markup.
    #[error("{message}")]
    Syntax { message: String },
    /// The renderer could not run at all.
    #[error("renderer unavailable: {message}")]
    Unavailable { message: String },
}

/// Turns canonical markup into a graphic.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, text: &str) -> Result<Graphic, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&str) -> Result<Graphic, RenderError> + Send + Sync + 'static,
{
    fn render(&self, text: &str) -> Result<Graphic, RenderError> {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    pub ticket: RenderTicket,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RenderOutcome {
    Applied,
    /// The previous graphic stays visible.
    Failed { message: String },
    /// A newer request was issued after this one.
    Stale,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct RenderSequencer {
    issued: u64,
    graphic: Option<Graphic>,
    error: Option<String>,
}

impl RenderSequencer {
    pub(crate) fn issue(&mut self, text: &str) -> RenderRequest {
        self.issued += 1;
        RenderRequest { ticket: RenderTicket(self.issued), text: text.to_owned() }
    }

    pub(crate) fn latest(&self) -> Option<RenderTicket> {
        (self.issued > 0).then_some(RenderTicket(self.issued))
    }

    pub(crate) fn complete(
        &mut self,
        ticket: RenderTicket,
        result: Result<Graphic, RenderError>,
    ) -> RenderOutcome {
        if ticket.0 != self.issued {
            return RenderOutcome::Stale;
        }
        match result {
            Ok(graphic) => {
                self.graphic = Some(graphic);
                self.error = None;
                RenderOutcome::Applied
            }
            Err(err) => {
                let message = err.to_string();
                self.error = Some(message.clone());
                RenderOutcome::Failed { message }
            }
        }
    }

    pub(crate) fn graphic(&self) -> Option<&Graphic> {
        self.graphic.as_ref()
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{Graphic, RenderError, RenderOutcome, RenderSequencer};

    #[test]
    fn tickets_increase_monotonically() {
        let mut sequencer = RenderSequencer::default();
        assert_eq!(sequencer.latest(), None);
        let first = sequencer.issue("a");
        let second = sequencer.issue("b");
        assert!(second.ticket > first.ticket);
        assert_eq!(sequencer.latest(), Some(second.ticket));
        assert_eq!(second.text, "b");
    }

    #[test]
    fn slow_earlier_render_cannot_overwrite_newer_one() {
        let mut sequencer = RenderSequencer::default();
        let old = sequencer.issue("old");
        let new = sequencer.issue("new");

        assert_eq!(sequencer.complete(new.ticket, Ok(Graphic::new("<svg>new</svg>"))), RenderOutcome::Applied);
        assert_eq!(sequencer.complete(old.ticket, Ok(Graphic::new("<svg>old</svg>"))), RenderOutcome::Stale);
        assert_eq!(sequencer.graphic().map(Graphic::markup), Some("<svg>new</svg>"));
    }

    #[test]
    fn failure_keeps_previous_graphic_and_success_clears_error() {
        let mut sequencer = RenderSequencer::default();
        let ok = sequencer.issue("ok");
        sequencer.complete(ok.ticket, Ok(Graphic::new("<svg/>")));

        let bad = sequencer.issue("bad");
        let outcome = sequencer.complete(
            bad.ticket,
            Err(RenderError::Syntax { message: "Parse error on line 2".to_owned() }),
        );
        assert_eq!(outcome, RenderOutcome::Failed { message: "Parse error on line 2".to_owned() });
        assert_eq!(sequencer.graphic().map(Graphic::markup), Some("<svg/>"));
        assert_eq!(sequencer.error(), Some("Parse error on line 2"));

        let fixed = sequencer.issue("fixed");
        sequencer.complete(fixed.ticket, Ok(Graphic::new("<svg>2</svg>")));
        assert_eq!(sequencer.error(), None);
    }
}
