//! Sync planning from a tree diff
//!
//! Planning is pure: it only reads a [`DiffResult`] and never touches the
//! filesystem. Copies always come before deletes, and deletes are only
//! planned in [`SyncMode::Mirror`].

use crate::diff::DiffResult;
use ferrodiff_types::{SyncDirection, SyncMode};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// One filesystem step of a sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "lowercase")]
pub enum SyncAction {
    /// Copy a path from the source root to the target root
    Copy(PathBuf),
    /// Delete a path from the target root
    Delete(PathBuf),
}

impl SyncAction {
    /// Path the action applies to, relative to the roots
    pub fn path(&self) -> &Path {
        match self {
            Self::Copy(path) | Self::Delete(path) => path,
        }
    }

    /// Upper-case label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Copy(_) => "COPY",
            Self::Delete(_) => "DELETE",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.label(), self.path().display())
    }
}

/// Ordered actions bringing one side of a diff up to date with the other
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    /// Which side is the source
    pub direction: SyncDirection,
    /// Copy-only or mirror
    pub mode: SyncMode,
    /// Copies sorted by path, then deletes sorted by path
    pub actions: Vec<SyncAction>,
    /// Mirror deletes dropped because the source copy could not be read
    pub held_back: Vec<PathBuf>,
}

impl SyncPlan {
    /// Root files are copied from, given the roots of `compare(A, B)`
    pub fn source_root<'a>(&self, a_root: &'a Path, b_root: &'a Path) -> &'a Path {
        match self.direction {
            SyncDirection::AToB => a_root,
            SyncDirection::BToA => b_root,
        }
    }

    /// Root files are copied into and deleted from
    pub fn target_root<'a>(&self, a_root: &'a Path, b_root: &'a Path) -> &'a Path {
        match self.direction {
            SyncDirection::AToB => b_root,
            SyncDirection::BToA => a_root,
        }
    }

    /// Whether there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Copy actions
    pub fn copies(&self) -> impl Iterator<Item = &Path> {
        self.actions.iter().filter_map(|action| match action {
            SyncAction::Copy(path) => Some(path.as_path()),
            SyncAction::Delete(_) => None,
        })
    }

    /// Delete actions
    pub fn deletes(&self) -> impl Iterator<Item = &Path> {
        self.actions.iter().filter_map(|action| match action {
            SyncAction::Delete(path) => Some(path.as_path()),
            SyncAction::Copy(_) => None,
        })
    }

    /// Drop the deletes of paths that exist on the source side but were not indexed
    ///
    /// A source file that could not be hashed is missing from the source index,
    /// so its target copy looks like an extra file. `unreadable` holds the keys
    /// of such files; their deletes move to [`SyncPlan::held_back`].
    pub fn hold_back(mut self, unreadable: &BTreeSet<PathBuf>) -> Self {
        let mut held_back = Vec::new();
        self.actions.retain(|action| match action {
            SyncAction::Delete(path) if unreadable.contains(path) => {
                held_back.push(path.clone());
                false
            }
            _ => true,
        });
        self.held_back.extend(held_back);
        self
    }
}

/// Turns a diff into a sync plan
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncPlanner;

impl SyncPlanner {
    /// Plan a sync for `diff = compare(A, B)`
    ///
    /// With [`SyncDirection::AToB`] paths only in A and modified paths are
    /// copied into B, and mirror mode deletes paths only in B. With
    /// [`SyncDirection::BToA`] the roles are swapped.
    pub fn plan(diff: &DiffResult, mode: SyncMode, direction: SyncDirection) -> SyncPlan {
        let (missing_on_target, extra_on_target) = match direction {
            SyncDirection::AToB => (&diff.deletions, &diff.additions),
            SyncDirection::BToA => (&diff.additions, &diff.deletions),
        };

        let copies: BTreeSet<&PathBuf> = missing_on_target
            .iter()
            .chain(diff.modifications.iter())
            .collect();

        let mut actions: Vec<SyncAction> = copies
            .into_iter()
            .map(|path| SyncAction::Copy(path.clone()))
            .collect();

        if mode.deletes() {
            actions.extend(extra_on_target.iter().cloned().map(SyncAction::Delete));
        }

        SyncPlan {
            direction,
            mode,
            actions,
            held_back: Vec::new(),
        }
    }
}
