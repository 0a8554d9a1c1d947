// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{KvBackend, StoreError};
use crate::model::{DiagramId, GroupId, VersionId};

pub const KEY_DIAGRAMS: &str = "diagrams";
pub const KEY_VERSIONS: &str = "versions";
pub const KEY_GROUPS: &str = "groups";
pub const KEY_USER: &str = "user";

pub const DEFAULT_USER_NAME: &str = "Guest";
pub const INITIAL_VERSION_NOTE: &str = "Initial creation";
pub const DEFAULT_UPDATE_NOTE: &str = "Update";

/// Unix time in milliseconds.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

pub fn system_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: DiagramId,
    pub title: String,
    pub created_by: String,
    pub created_at: u64,
    pub updated_by: String,
    pub updated_at: u64,
    pub latest_version_id: VersionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: VersionId,
    pub diagram_id: DiagramId,
    pub code: String,
    pub author_name: String,
    pub timestamp: u64,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<u64>,
}

impl Default for User {
    fn default() -> Self {
        Self { name: DEFAULT_USER_NAME.to_owned(), last_seen: None }
    }
}

/// Parameters for [`Repository::create_diagram`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDiagram {
    pub title: String,
    pub code: String,
    pub author: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DiagramFilter {
    #[default]
    All,
    Ungrouped,
    InGroup(GroupId),
}

impl DiagramFilter {
    fn admits(&self, diagram: &Diagram) -> bool {
        match self {
            Self::All => true,
            Self::Ungrouped => diagram.group_id.is_none(),
            Self::InGroup(group_id) => diagram.group_id.as_ref() == Some(group_id),
        }
    }
}

pub struct Repository<B> {
    backend: B,
    clock: Clock,
}

impl<B: fmt::Debug> fmt::Debug for Repository<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").field("backend", &self.backend).finish_non_exhaustive()
    }
}

impl<B: KvBackend> Repository<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, Arc::new(system_clock_ms))
    }

    pub fn with_clock(backend: B, clock: Clock) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn now(&self) -> u64 {
        (self.clock)()
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json { key: key.to_owned(), source })
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|source| StoreError::Json { key: key.to_owned(), source })?;
        self.backend.put(key, &raw)
    }

    fn diagrams(&self) -> Result<Vec<Diagram>, StoreError> {
        Ok(self.load(KEY_DIAGRAMS)?.unwrap_or_default())
    }

    fn versions(&self) -> Result<Vec<Version>, StoreError> {
        Ok(self.load(KEY_VERSIONS)?.unwrap_or_default())
    }

    /// Writes `versions`, then `diagrams`. If the second write fails the previous `versions`
    /// document is put back, so no version outlives a failed diagram write.
    fn save_history(&self, versions: &[Version], diagrams: &[Diagram]) -> Result<(), StoreError> {
        let previous = self.backend.get(KEY_VERSIONS)?;
        self.save(KEY_VERSIONS, versions)?;
        if let Err(err) = self.save(KEY_DIAGRAMS, diagrams) {
            let restored = match &previous {
                Some(raw) => self.backend.put(KEY_VERSIONS, raw),
                None => self.backend.delete(KEY_VERSIONS),
            };
            if let Err(rollback) = restored {
                warn!(error = %rollback, "cannot restore versions after failed diagram write");
            }
            return Err(err);
        }
        Ok(())
    }

    fn groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.load(KEY_GROUPS)?.unwrap_or_default())
    }

    // ---- user ----

    pub fn current_user(&self) -> Result<User, StoreError> {
        Ok(self.load(KEY_USER)?.unwrap_or_default())
    }

    pub fn save_user(&self, name: &str) -> Result<User, StoreError> {
        let user = User { name: name.to_owned(), last_seen: Some(self.now()) };
        self.save(KEY_USER, &user)?;
        debug!(user = %user.name, "saved user");
        Ok(user)
    }

    // ---- diagrams ----

    /// Creates a diagram with its initial version. New diagrams are listed first.
    pub fn create_diagram(&self, new: NewDiagram) -> Result<Diagram, StoreError> {
        if let Some(group_id) = &new.group_id {
            self.get_group(group_id)?;
        }

        let now = self.now();
        let diagram_id = DiagramId::generate("d");
        let version = Version {
            id: VersionId::generate("v"),
            diagram_id: diagram_id.clone(),
            code: new.code,
            author_name: new.author.clone(),
            timestamp: now,
            note: INITIAL_VERSION_NOTE.to_owned(),
        };

        let mut versions = self.versions()?;
        let latest_version_id = version.id.clone();
        versions.push(version);

        let diagram = Diagram {
            id: diagram_id,
            title: new.title,
            created_by: new.author.clone(),
            created_at: now,
            updated_by: new.author,
            updated_at: now,
            latest_version_id,
            group_id: new.group_id,
            thumbnail: new.thumbnail,
        };
        let mut diagrams = self.diagrams()?;
        diagrams.insert(0, diagram.clone());
        self.save_history(&versions, &diagrams)?;

        debug!(diagram_id = %diagram.id, title = %diagram.title, "created diagram");
        Ok(diagram)
    }

    /// Appends a version and refreshes the diagram's update metadata.
    ///
    /// `note` defaults to "Update"; a `None` thumbnail keeps the previous one.
    pub fn update_diagram(
        &self,
        id: &DiagramId,
        code: &str,
        author: &str,
        note: Option<&str>,
        thumbnail: Option<String>,
    ) -> Result<Diagram, StoreError> {
        let mut diagrams = self.diagrams()?;
        let Some(diagram) = diagrams.iter_mut().find(|d| &d.id == id) else {
            return Err(StoreError::DiagramNotFound { id: id.clone() });
        };

        let now = self.now();
        let version = Version {
            id: VersionId::generate("v"),
            diagram_id: id.clone(),
            code: code.to_owned(),
            author_name: author.to_owned(),
            timestamp: now,
            note: note.unwrap_or(DEFAULT_UPDATE_NOTE).to_owned(),
        };

        diagram.updated_at = now;
        diagram.updated_by = author.to_owned();
        diagram.latest_version_id = version.id.clone();
        if thumbnail.is_some() {
            diagram.thumbnail = thumbnail;
        }
        let updated = diagram.clone();

        let mut versions = self.versions()?;
        debug!(diagram_id = %id, version_id = %version.id, "appended version");
        versions.push(version);
        self.save_history(&versions, &diagrams)?;
        Ok(updated)
    }

    pub fn rename_diagram(&self, id: &DiagramId, title: &str) -> Result<Diagram, StoreError> {
        let updated = self.modify_diagram(id, |diagram| diagram.title = title.to_owned())?;
        debug!(diagram_id = %id, title, "renamed diagram");
        Ok(updated)
    }

    pub fn move_diagram(
        &self,
        id: &DiagramId,
        group_id: Option<GroupId>,
    ) -> Result<Diagram, StoreError> {
        if let Some(group_id) = &group_id {
            self.get_group(group_id)?;
        }
        let updated = self.modify_diagram(id, |diagram| diagram.group_id = group_id)?;
        debug!(diagram_id = %id, group_id = ?updated.group_id, "moved diagram");
        Ok(updated)
    }

    fn modify_diagram(
        &self,
        id: &DiagramId,
        edit: impl FnOnce(&mut Diagram),
    ) -> Result<Diagram, StoreError> {
        let mut diagrams = self.diagrams()?;
        let Some(diagram) = diagrams.iter_mut().find(|d| &d.id == id) else {
            return Err(StoreError::DiagramNotFound { id: id.clone() });
        };
        edit(diagram);
        let updated = diagram.clone();
        self.save(KEY_DIAGRAMS, &diagrams)?;
        Ok(updated)
    }

    /// Removes the diagram and its whole version history.
    pub fn delete_diagram(&self, id: &DiagramId) -> Result<(), StoreError> {
        let mut diagrams = self.diagrams()?;
        let before = diagrams.len();
        diagrams.retain(|d| &d.id != id);
        if diagrams.len() == before {
            return Err(StoreError::DiagramNotFound { id: id.clone() });
        }

        let mut versions = self.versions()?;
        versions.retain(|v| &v.diagram_id != id);
        self.save_history(&versions, &diagrams)?;
        debug!(diagram_id = %id, "deleted diagram");
        Ok(())
    }

    pub fn get_diagram(&self, id: &DiagramId) -> Result<Diagram, StoreError> {
        self.diagrams()?
            .into_iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| StoreError::DiagramNotFound { id: id.clone() })
    }

    pub fn list_diagrams(&self, filter: &DiagramFilter) -> Result<Vec<Diagram>, StoreError> {
        let mut diagrams = self.diagrams()?;
        diagrams.retain(|d| filter.admits(d));
        Ok(diagrams)
    }

    // ---- versions ----

    /// Versions of one diagram, newest first. Equal timestamps list the later save first.
    pub fn list_versions(&self, diagram_id: &DiagramId) -> Result<Vec<Version>, StoreError> {
        self.get_diagram(diagram_id)?;
        Ok(newest_first(self.versions()?, diagram_id))
    }

    pub fn get_version(&self, id: &VersionId) -> Result<Version, StoreError> {
        self.versions()?
            .into_iter()
            .find(|v| &v.id == id)
            .ok_or_else(|| StoreError::VersionNotFound { id: id.clone() })
    }

    pub fn rename_version(&self, id: &VersionId, note: &str) -> Result<Version, StoreError> {
        let mut versions = self.versions()?;
        let Some(version) = versions.iter_mut().find(|v| &v.id == id) else {
            return Err(StoreError::VersionNotFound { id: id.clone() });
        };
        version.note = note.to_owned();
        let updated = version.clone();
        self.save(KEY_VERSIONS, &versions)?;
        debug!(version_id = %id, "renamed version");
        Ok(updated)
    }

    /// Deletes one version. The last remaining version of a diagram cannot be deleted.
    pub fn delete_version(&self, id: &VersionId) -> Result<(), StoreError> {
        let mut versions = self.versions()?;
        let Some(position) = versions.iter().position(|v| &v.id == id) else {
            return Err(StoreError::VersionNotFound { id: id.clone() });
        };
        let diagram_id = versions[position].diagram_id.clone();
        let siblings = versions.iter().filter(|v| v.diagram_id == diagram_id).count();
        if siblings <= 1 {
            return Err(StoreError::LastVersion { diagram_id });
        }
        versions.remove(position);

        let newest = newest_first(versions.clone(), &diagram_id).into_iter().next();
        let mut diagrams = self.diagrams()?;
        if let (Some(newest), Some(diagram)) =
            (newest, diagrams.iter_mut().find(|d| d.id == diagram_id))
        {
            diagram.latest_version_id = newest.id;
        }

        self.save_history(&versions, &diagrams)?;
        debug!(version_id = %id, diagram_id = %diagram_id, "deleted version");
        Ok(())
    }

    // ---- groups ----

    pub fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        self.groups()
    }

    pub fn get_group(&self, id: &GroupId) -> Result<Group, StoreError> {
        self.groups()?
            .into_iter()
            .find(|g| &g.id == id)
            .ok_or_else(|| StoreError::GroupNotFound { id: id.clone() })
    }

    pub fn create_group(&self, name: &str, parent_id: Option<GroupId>) -> Result<Group, StoreError> {
        let mut groups = self.groups()?;
        if let Some(parent_id) = &parent_id {
            if !groups.iter().any(|g| &g.id == parent_id) {
                return Err(StoreError::GroupNotFound { id: parent_id.clone() });
            }
        }
        let group = Group { id: GroupId::generate("g"), name: name.to_owned(), parent_id };
        groups.push(group.clone());
        self.save(KEY_GROUPS, &groups)?;
        debug!(group_id = %group.id, name, "created group");
        Ok(group)
    }

    pub fn rename_group(&self, id: &GroupId, name: &str) -> Result<Group, StoreError> {
        let mut groups = self.groups()?;
        let Some(group) = groups.iter_mut().find(|g| &g.id == id) else {
            return Err(StoreError::GroupNotFound { id: id.clone() });
        };
        group.name = name.to_owned();
        let updated = group.clone();
        self.save(KEY_GROUPS, &groups)?;
        debug!(group_id = %id, name, "renamed group");
        Ok(updated)
    }

    /// Re-parents a group. A group cannot be moved under itself or one of its descendants.
    pub fn move_group(&self, id: &GroupId, parent_id: Option<GroupId>) -> Result<Group, StoreError> {
        let mut groups = self.groups()?;
        if !groups.iter().any(|g| &g.id == id) {
            return Err(StoreError::GroupNotFound { id: id.clone() });
        }
        if let Some(parent_id) = &parent_id {
            if !groups.iter().any(|g| &g.id == parent_id) {
                return Err(StoreError::GroupNotFound { id: parent_id.clone() });
            }
            let ancestry = ancestors(&groups, parent_id);
            if parent_id == id || ancestry.iter().any(|g| &g.id == id) {
                return Err(StoreError::GroupCycle {
                    group_id: id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }

        let Some(group) = groups.iter_mut().find(|g| &g.id == id) else {
            return Err(StoreError::GroupNotFound { id: id.clone() });
        };
        group.parent_id = parent_id;
        let updated = group.clone();
        self.save(KEY_GROUPS, &groups)?;
        debug!(group_id = %id, parent_id = ?updated.parent_id, "moved group");
        Ok(updated)
    }

    /// Deletes a group; its child groups and diagrams move up to its parent.
    pub fn delete_group(&self, id: &GroupId) -> Result<(), StoreError> {
        let mut groups = self.groups()?;
        let Some(position) = groups.iter().position(|g| &g.id == id) else {
            return Err(StoreError::GroupNotFound { id: id.clone() });
        };
        let removed = groups.remove(position);

        for child in groups.iter_mut().filter(|g| g.parent_id.as_ref() == Some(id)) {
            child.parent_id = removed.parent_id.clone();
        }

        let mut diagrams = self.diagrams()?;
        for diagram in diagrams.iter_mut().filter(|d| d.group_id.as_ref() == Some(id)) {
            diagram.group_id = removed.parent_id.clone();
        }

        self.save(KEY_DIAGRAMS, &diagrams)?;
        self.save(KEY_GROUPS, &groups)?;
        debug!(group_id = %id, "deleted group");
        Ok(())
    }

    /// Breadcrumb trail from the root group down to `id` (inclusive).
    pub fn group_path(&self, id: &GroupId) -> Result<Vec<Group>, StoreError> {
        let groups = self.groups()?;
        if !groups.iter().any(|g| &g.id == id) {
            return Err(StoreError::GroupNotFound { id: id.clone() });
        }
        let mut path = ancestors(&groups, id);
        path.reverse();
        Ok(path)
    }

    // ---- controller bridge ----

    /// Code of the diagram's latest version.
    pub fn current_code(&self, diagram_id: &DiagramId) -> Result<String, StoreError> {
        let diagram = self.get_diagram(diagram_id)?;
        Ok(self.get_version(&diagram.latest_version_id)?.code)
    }

    pub fn store_code(
        &self,
        diagram_id: &DiagramId,
        code: &str,
        author: &str,
        note: Option<&str>,
    ) -> Result<VersionId, StoreError> {
        Ok(self.update_diagram(diagram_id, code, author, note, None)?.latest_version_id)
    }
}

fn newest_first(versions: Vec<Version>, diagram_id: &DiagramId) -> Vec<Version> {
    let mut matching: Vec<Version> =
        versions.into_iter().filter(|v| &v.diagram_id == diagram_id).collect();
    // Reverse first so the stable sort keeps later inserts ahead on equal timestamps.
    matching.reverse();
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matching
}

/// `id` followed by its parents, nearest first. Stops on a corrupt (cyclic) chain.
fn ancestors(groups: &[Group], id: &GroupId) -> Vec<Group> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = Some(id.clone());
    while let Some(current) = cursor {
        if !seen.insert(current.clone()) {
            break;
        }
        let Some(group) = groups.iter().find(|g| g.id == current) else {
            break;
        };
        cursor = group.parent_id.clone();
        chain.push(group.clone());
    }
    chain
}
