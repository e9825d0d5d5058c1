//! Turning typed errors into actionable messages.

use jotter_core::{CycleViolation, Error, ItemKind};

/// Describe a failed operation for the user, naming the offending id and the
/// command that helps fix it.
pub fn describe_error(err: &Error) -> String {
    match err {
        Error::Validation(msg) => format!("Invalid input: {}.", msg),
        Error::NotFound {
            kind: ItemKind::Note,
            id,
        } => format!(
            "Note \"{}\" was not found. Use `jotter list` or `jotter list --search <text>` to find note ids.",
            id
        ),
        Error::NotFound {
            kind: ItemKind::Folder,
            id,
        } => format!(
            "Notebook \"{}\" was not found. Use `jotter tree` to see notebook ids.",
            id
        ),
        Error::ParentNotFound(id) => format!(
            "Notebook \"{}\" on the parent chain no longer exists. Run `jotter tree` to check the hierarchy.",
            id
        ),
        Error::CircularReference(violation) => {
            let detail = match violation {
                CycleViolation::SelfParent { .. } => {
                    "a notebook cannot be its own parent".to_string()
                }
                CycleViolation::Descendant { parent_id, .. } => format!(
                    "notebook \"{}\" is inside it, so the move would create a cycle",
                    parent_id
                ),
                CycleViolation::ExistingCycle { repeated_id, .. } => format!(
                    "the destination's parents already loop back at \"{}\"",
                    repeated_id
                ),
            };
            format!(
                "Cannot move notebook \"{}\": {}. Run `jotter tree` and pick a parent outside its subtree.",
                violation.folder_id(),
                detail
            )
        }
        Error::BackendUnavailable(msg) => format!(
            "The notes service is unreachable ({}). Check that it is running and that JOTTER_API_URL is correct, then retry or run `jotter ping`.",
            msg
        ),
        Error::Backend { .. } => format!(
            "{}. Check the ids with `jotter tree` or `jotter list` and retry.",
            err
        ),
        Error::UnexpectedResponse(msg) => format!(
            "The notes service returned an unexpected response ({}). Run `jotter tree` or `jotter list` to check the current state.",
            msg
        ),
        Error::Config(msg) => format!(
            "Configuration problem: {}. Check the JOTTER_* environment variables.",
            msg
        ),
    }
}
