//! Folder hierarchy rules.
//!
//! Folders form an adjacency tree keyed by id: each record stores its
//! parent's id and the tree is walked by lookup, never by live references.

use std::collections::HashMap;

use serde::Serialize;

/// Identifier of every tenant's root folder.
pub const ROOT_FOLDER_ID: &str = "0";

/// Name of every tenant's root folder.
pub const ROOT_FOLDER_NAME: &str = "All Files";

/// Whether `id` names the root folder.
#[must_use]
pub fn is_root(id: &str) -> bool {
    id == ROOT_FOLDER_ID
}

/// Flat folder record used to assemble a tree.
#[derive(Debug, Clone)]
pub struct FolderNode {
    /// Folder ID.
    pub id: String,
    /// Folder name.
    pub name: String,
    /// Parent folder ID, `None` only for the root.
    pub parent_id: Option<String>,
}

/// Flat file record used to assemble a tree.
#[derive(Debug, Clone, Serialize)]
pub struct FileLeaf {
    /// File ID.
    pub id: String,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Owning folder ID.
    #[serde(skip)]
    pub folder_id: String,
}

/// Nested view of a folder with its files and subfolders.
#[derive(Debug, Clone, Serialize)]
pub struct FolderTree {
    /// Folder ID.
    pub id: String,
    /// Folder name.
    pub name: String,
    /// Files directly inside this folder.
    pub files: Vec<FileLeaf>,
    /// Subfolders.
    pub children: Vec<FolderTree>,
}

impl FolderTree {
    /// Placeholder for a tenant whose root folder is missing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            id: ROOT_FOLDER_ID.to_string(),
            name: "Empty".to_string(),
            files: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Total number of folders in this tree, including itself.
    #[must_use]
    pub fn folder_count(&self) -> usize {
        1 + self.children.iter().map(Self::folder_count).sum::<usize>()
    }

    /// Total number of files anywhere in this tree.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(Self::file_count).sum::<usize>()
    }
}

/// Assemble the tree rooted at `root_id` from flat records.
///
/// Records that are not reachable from the root are left out. Sibling order
/// follows input order.
#[must_use]
pub fn build_tree(root_id: &str, folders: &[FolderNode], files: &[FileLeaf]) -> Option<FolderTree> {
    let mut subfolders: HashMap<&str, Vec<&FolderNode>> = HashMap::new();
    for folder in folders {
        if let Some(parent) = folder.parent_id.as_deref() {
            subfolders.entry(parent).or_default().push(folder);
        }
    }

    let mut contents: HashMap<&str, Vec<&FileLeaf>> = HashMap::new();
    for file in files {
        contents.entry(file.folder_id.as_str()).or_default().push(file);
    }

    let root = folders.iter().find(|f| f.id == root_id)?;
    Some(assemble(root, &subfolders, &contents))
}

fn assemble(
    folder: &FolderNode,
    subfolders: &HashMap<&str, Vec<&FolderNode>>,
    contents: &HashMap<&str, Vec<&FileLeaf>>,
) -> FolderTree {
    let files = contents
        .get(folder.id.as_str())
        .map(|files| files.iter().map(|f| (*f).clone()).collect())
        .unwrap_or_default();

    let children = subfolders
        .get(folder.id.as_str())
        .map(|children| {
            children
                .iter()
                .filter(|child| child.id != folder.id)
                .map(|child| assemble(child, subfolders, contents))
                .collect()
        })
        .unwrap_or_default();

    FolderTree {
        id: folder.id.clone(),
        name: folder.name.clone(),
        files,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn folder(id: &str, name: &str, parent: Option<&str>) -> FolderNode {
        FolderNode {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(str::to_string),
        }
    }

    fn file(id: &str, folder_id: &str) -> FileLeaf {
        FileLeaf {
            id: id.to_string(),
            name: format!("{id}.txt"),
            size: 3,
            folder_id: folder_id.to_string(),
        }
    }

    #[test]
    fn test_is_root() {
        assert!(is_root("0"));
        assert!(!is_root("00"));
        assert!(!is_root(""));
    }

    #[test]
    fn test_build_tree_nests_children_and_files() {
        let folders = vec![
            folder("0", ROOT_FOLDER_NAME, None),
            folder("a", "A", Some("0")),
            folder("b", "B", Some("a")),
            folder("c", "C", Some("0")),
        ];
        let files = vec![file("f1", "b"), file("f2", "0")];

        let tree = build_tree("0", &folders, &files).unwrap();
        assert_eq!(tree.name, "All Files");
        assert_eq!(tree.files.len(), 1);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].id, "a");
        assert_eq!(tree.children[0].children[0].files[0].id, "f1");
        assert_eq!(tree.folder_count(), 4);
        assert_eq!(tree.file_count(), 2);
    }

    #[test]
    fn test_build_tree_skips_unreachable_records() {
        let folders = vec![
            folder("0", ROOT_FOLDER_NAME, None),
            folder("x", "Orphan", Some("missing")),
        ];
        let files = vec![file("f1", "x")];

        let tree = build_tree("0", &folders, &files).unwrap();
        assert_eq!(tree.folder_count(), 1);
        assert_eq!(tree.file_count(), 0);
    }

    #[test]
    fn test_build_tree_without_root() {
        assert!(build_tree("0", &[], &[]).is_none());
        assert_eq!(FolderTree::empty().name, "Empty");
    }

    proptest! {
        #[test]
        fn prop_every_reachable_record_is_counted(
            parents in proptest::collection::vec(any::<prop::sample::Index>(), 0..40),
            placements in proptest::collection::vec(any::<prop::sample::Index>(), 0..40),
        ) {
            let mut folders = vec![folder("0", ROOT_FOLDER_NAME, None)];
            for (i, parent) in parents.iter().enumerate() {
                let parent_id = folders[parent.index(folders.len())].id.clone();
                folders.push(folder(&format!("d{i}"), "D", Some(parent_id.as_str())));
            }
            let files: Vec<FileLeaf> = placements
                .iter()
                .enumerate()
                .map(|(i, at)| file(&format!("f{i}"), &folders[at.index(folders.len())].id))
                .collect();

            let tree = build_tree("0", &folders, &files).unwrap();
            prop_assert_eq!(tree.folder_count(), folders.len());
            prop_assert_eq!(tree.file_count(), files.len());
        }
    }
}
