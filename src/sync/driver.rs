// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Async editing session.
//!
//! [`spawn_editor`] moves a [`SyncController`] onto a tokio task. Commands arrive over an mpsc
//! channel, the debounce deadline is awaited with `sleep_until`, and renders run on the blocking
//! pool one at a time: while one is in flight only the newest further request is queued.
//! Every processed event publishes an [`EditorSnapshot`] on a watch channel.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use super::render::{Graphic, RenderError, RenderRequest, RenderTicket, Renderer};
use super::{Notice, SyncController, SyncOutput};
use crate::grid::GridView;
use crate::model::SequenceModel;
use crate::ops::GridOp;

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Raw text edit; debounced.
    Input(String),
    /// Re-parse pending input now.
    Flush,
    Grid(GridOp),
    /// Replace the buffer with stored text.
    Load(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    /// Bumped on every publish.
    pub revision: u64,
    pub text: String,
    pub model: SequenceModel,
    pub grid: GridView,
    pub graphic: Option<Graphic>,
    pub error: Option<String>,
    /// Notices raised since the previous snapshot.
    pub notices: Vec<Notice>,
    pub pending_input: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("editor session has shut down")]
pub struct EditorClosed;

#[derive(Debug)]
pub struct EditorHandle {
    commands: mpsc::Sender<EditorCommand>,
    snapshots: watch::Receiver<EditorSnapshot>,
    task: JoinHandle<()>,
}

impl EditorHandle {
    pub async fn send(&self, command: EditorCommand) -> Result<(), EditorClosed> {
        self.commands.send(command).await.map_err(|_| EditorClosed)
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EditorSnapshot> {
        self.snapshots.clone()
    }

    /// Closes the command channel and waits for the task to finish.
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.task.await;
    }
}

/// Starts an editing session. Must be called inside a tokio runtime.
pub fn spawn_editor<R: Renderer>(mut controller: SyncController, renderer: R) -> EditorHandle {
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let initial = controller.resync();
    let (snapshots_tx, snapshots_rx) = watch::channel(snapshot_of(&controller, 0, Vec::new()));

    let session = Session {
        controller,
        renderer: Arc::new(renderer),
        renders: JoinSet::new(),
        in_flight: None,
        queued: None,
        revision: 0,
        notices: Vec::new(),
        snapshots: snapshots_tx,
    };
    let task = tokio::spawn(session.run(commands_rx, initial));

    EditorHandle { commands: commands_tx, snapshots: snapshots_rx, task }
}

fn snapshot_of(controller: &SyncController, revision: u64, notices: Vec<Notice>) -> EditorSnapshot {
    EditorSnapshot {
        revision,
        text: controller.text().to_owned(),
        model: controller.model().clone(),
        grid: controller.grid(),
        graphic: controller.graphic().cloned(),
        error: controller.render_error().map(str::to_owned),
        notices,
        pending_input: controller.has_pending_input(),
    }
}

type RenderResult = (RenderTicket, Result<Graphic, RenderError>);

struct Session<R> {
    controller: SyncController,
    renderer: Arc<R>,
    renders: JoinSet<RenderResult>,
    in_flight: Option<RenderTicket>,
    queued: Option<RenderRequest>,
    revision: u64,
    notices: Vec<Notice>,
    snapshots: watch::Sender<EditorSnapshot>,
}

impl<R: Renderer> Session<R> {
    async fn run(mut self, mut commands: mpsc::Receiver<EditorCommand>, initial: SyncOutput) {
        self.absorb(initial);

        loop {
            let deadline = self.controller.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                () = sleep_until_some(deadline) => {
                    if let Some(output) = self.controller.poll(Instant::now()) {
                        self.absorb(output);
                    }
                }
                Some(joined) = self.renders.join_next(), if !self.renders.is_empty() => {
                    self.finish_render(joined);
                }
            }
            self.publish();
        }

        debug!("editor session closed");
    }

    fn handle(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::Input(text) => self.controller.on_text_input(text, Instant::now()),
            EditorCommand::Flush => {
                if let Some(output) = self.controller.flush() {
                    self.absorb(output);
                }
            }
            EditorCommand::Grid(op) => match self.controller.apply_grid_op(&op) {
                Ok(output) => self.absorb(output),
                Err(err) => {
                    debug!(error = %err, "grid edit rejected");
                    self.notices.push(Notice::EditRejected { message: err.to_string() });
                }
            },
            EditorCommand::Load(code) => {
                let output = self.controller.load_version_text(&code);
                self.absorb(output);
            }
        }
    }

    fn absorb(&mut self, output: SyncOutput) {
        self.notices.extend(output.notices);
        if let Some(request) = output.render {
            self.request_render(request);
        }
    }

    fn request_render(&mut self, request: RenderRequest) {
        if self.in_flight.is_some() {
            self.queued = Some(request);
            return;
        }
        self.in_flight = Some(request.ticket);
        let renderer = Arc::clone(&self.renderer);
        self.renders.spawn_blocking(move || {
            let result = renderer.render(&request.text);
            (request.ticket, result)
        });
    }

    fn finish_render(&mut self, joined: Result<RenderResult, tokio::task::JoinError>) {
        let in_flight = self.in_flight.take();
        let (ticket, result) = match joined {
            Ok(done) => done,
            Err(err) => {
                let Some(ticket) = in_flight else {
                    return;
                };
                let message = format!("render task failed: {err}");
                (ticket, Err(RenderError::Unavailable { message }))
            }
        };
        self.controller.complete_render(ticket, result);

        if let Some(next) = self.queued.take() {
            self.request_render(next);
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.notices.extend(self.controller.take_notices());
        let notices = std::mem::take(&mut self.notices);
        self.snapshots.send_replace(snapshot_of(&self.controller, self.revision, notices));
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
