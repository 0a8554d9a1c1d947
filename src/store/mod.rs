// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for diagrams, their version history and folder groups.
//!
//! A [`Repository`] keeps each collection as one JSON document in a [`KvBackend`]: an in-memory
//! map for tests, or a folder with one file per key for the local server.

use std::io;
use std::path::PathBuf;

use crate::model::{DiagramId, GroupId, Id, IdError, VersionId};

pub mod backend;
pub mod repository;

pub use backend::{FolderBackend, KvBackend, MemoryBackend, WriteDurability};
pub use repository::{
    system_clock_ms, Clock, Diagram, DiagramFilter, Group, NewDiagram, Repository, User, Version,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("diagram not found: {id}")]
    DiagramNotFound { id: DiagramId },
    #[error("version not found: {id}")]
    VersionNotFound { id: VersionId },
    #[error("group not found: {id}")]
    GroupNotFound { id: GroupId },
    #[error("cannot delete the only version of diagram {diagram_id}")]
    LastVersion { diagram_id: DiagramId },
    #[error("moving group {group_id} under {parent_id} would create a cycle")]
    GroupCycle { group_id: GroupId, parent_id: GroupId },
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json error in '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {field} '{value}': {source}")]
    InvalidId {
        field: &'static str,
        value: String,
        #[source]
        source: IdError,
    },
    #[error("refusing to write through symlink at {path:?}")]
    SymlinkRefused { path: PathBuf },
    #[error("invalid store key '{key}'")]
    InvalidKey { key: String },
}

impl StoreError {
    /// Whether the error names a missing entity (as opposed to a storage failure).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DiagramNotFound { .. } | Self::VersionNotFound { .. } | Self::GroupNotFound { .. }
        )
    }
}

/// Parses an externally supplied id (URL segment, request body) into a typed id.
pub fn parse_id<T>(field: &'static str, value: &str) -> Result<Id<T>, StoreError> {
    Id::new(value.to_owned()).map_err(|source| StoreError::InvalidId {
        field,
        value: value.to_owned(),
        source,
    })
}
