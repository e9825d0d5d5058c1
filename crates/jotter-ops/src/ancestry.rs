//! Cycle-safe folder relocation.
//!
//! Folders only know their parent, so proving that a move keeps the
//! hierarchy acyclic means walking the candidate parent's ancestor chain one
//! backend lookup at a time. The walk keeps a visited set: corrupt data that
//! already contains a loop is reported instead of spinning forever.

use std::collections::HashSet;

use tracing::{debug, field, instrument, trace, Span};

use jotter_core::defaults::PARENT_FIELDS;
use jotter_core::{logging, CycleViolation, Error, FolderRecord, ItemKind, NoteBackend, Result};

/// Verify that making `candidate_parent` the parent of `folder_id` keeps the
/// folder hierarchy a forest.
///
/// An empty candidate (move to the root) and self-parenting are decided
/// without any backend call. Otherwise the walk issues one lookup per
/// ancestor until it reaches a root.
#[instrument(
    skip(backend),
    fields(subsystem = "ops", component = "ancestry", op = "check_relocation", hop_count = field::Empty)
)]
pub async fn check_relocation<B>(backend: &B, folder_id: &str, candidate_parent: &str) -> Result<()>
where
    B: NoteBackend + ?Sized,
{
    if candidate_parent.is_empty() {
        return Ok(());
    }
    if candidate_parent == folder_id {
        return Err(Error::CircularReference(CycleViolation::SelfParent {
            folder_id: folder_id.to_string(),
        }));
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut current = candidate_parent.to_string();

    loop {
        if visited.contains(&current) {
            return Err(Error::CircularReference(CycleViolation::ExistingCycle {
                folder_id: folder_id.to_string(),
                parent_id: candidate_parent.to_string(),
                repeated_id: current,
            }));
        }
        if current == folder_id {
            return Err(Error::CircularReference(CycleViolation::Descendant {
                folder_id: folder_id.to_string(),
                parent_id: candidate_parent.to_string(),
            }));
        }

        let parent = parent_of(backend, &current).await?;
        trace!(hop = visited.len() + 1, folder = %current, parent = ?parent, "Ancestor hop");
        visited.insert(current);

        match parent {
            Some(next) => current = next,
            None => break,
        }
    }

    Span::current().record(logging::HOP_COUNT, visited.len() as u64);
    debug!(hops = visited.len(), "Relocation keeps hierarchy acyclic");
    Ok(())
}

/// Parent of one folder on the chain; a missing folder breaks the chain.
async fn parent_of<B>(backend: &B, folder_id: &str) -> Result<Option<String>>
where
    B: NoteBackend + ?Sized,
{
    let value = backend
        .fetch_one(ItemKind::Folder, folder_id, PARENT_FIELDS)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                Error::ParentNotFound(folder_id.to_string())
            } else {
                e.for_record(ItemKind::Folder, folder_id)
            }
        })?;
    let record: FolderRecord = serde_json::from_value(value)
        .map_err(|e| Error::from(e).for_record(ItemKind::Folder, folder_id))?;
    Ok(record.parent_id)
}
