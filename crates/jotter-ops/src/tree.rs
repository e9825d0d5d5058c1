//! Notebook hierarchy built from the flat folder collection.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use jotter_core::defaults::TREE_INDENT;
use jotter_core::FolderRecord;

/// Stand-in for `[` when comparing titles; sorts just before letters.
const BRACKET_SORT_CHAR: char = '@';

/// Compare two folder titles for display.
///
/// Case-insensitive, with `[` treated as sorting just before `A` so that
/// bracket-prefixed titles (`[0] Inbox`) lead their sibling group. Titles
/// equal under case folding fall back to a case-sensitive comparison.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    fn sort_chars(title: &str) -> impl Iterator<Item = char> + '_ {
        title
            .chars()
            .map(|c| if c == '[' { BRACKET_SORT_CHAR } else { c })
    }

    fn folded(title: &str) -> impl Iterator<Item = char> + '_ {
        sort_chars(title).flat_map(char::to_lowercase)
    }

    folded(a)
        .cmp(folded(b))
        .then_with(|| sort_chars(a).cmp(sort_chars(b)))
}

/// Folders grouped by parent, each sibling group sorted by title.
///
/// Every folder lands in exactly one group. A folder whose parent is not in
/// the collection is grouped with the roots (key `""`).
#[derive(Debug, Default)]
pub struct FolderTree {
    children: HashMap<String, Vec<FolderRecord>>,
    len: usize,
}

impl FolderTree {
    pub fn build(folders: Vec<FolderRecord>) -> Self {
        let known: HashSet<String> = folders.iter().map(|f| f.id.clone()).collect();
        let len = folders.len();

        let mut children: HashMap<String, Vec<FolderRecord>> = HashMap::new();
        for folder in folders {
            let key = match &folder.parent_id {
                Some(parent) if known.contains(parent) => parent.clone(),
                _ => String::new(),
            };
            children.entry(key).or_default().push(folder);
        }

        for group in children.values_mut() {
            group.sort_by(|a, b| compare_titles(&a.title, &b.title).then_with(|| a.id.cmp(&b.id)));
        }

        Self { children, len }
    }

    /// Sorted children of `parent_key` (`""` for the roots).
    pub fn children(&self, parent_key: &str) -> &[FolderRecord] {
        self.children
            .get(parent_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[FolderRecord] {
        self.children("")
    }

    /// Number of folders the tree was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Depth-first walk from the roots, yielding `(depth, folder)`.
    ///
    /// A folder id is visited at most once, so duplicated ids or folders
    /// that sit on a parent cycle cannot make the walk loop. Cycle members
    /// unreachable from a root are not yielded.
    pub fn walk(&self) -> Vec<(usize, &FolderRecord)> {
        let mut out = Vec::with_capacity(self.len);
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(usize, &FolderRecord)> =
            self.roots().iter().rev().map(|f| (0, f)).collect();

        while let Some((depth, folder)) = stack.pop() {
            if !visited.insert(folder.id.as_str()) {
                continue;
            }
            out.push((depth, folder));
            stack.extend(
                self.children(&folder.id)
                    .iter()
                    .rev()
                    .map(|child| (depth + 1, child)),
            );
        }
        out
    }

    /// Render one line per folder, indented by depth.
    pub fn render(&self) -> String {
        self.walk()
            .into_iter()
            .map(|(depth, folder)| {
                format!(
                    "{}Notebook: \"{}\" (notebook_id: \"{}\")\n",
                    " ".repeat(depth * TREE_INDENT),
                    folder.title,
                    folder.id
                )
            })
            .collect()
    }
}
