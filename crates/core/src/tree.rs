//! Page-tree algorithms: descendant walks, cycle guards, and path
//! recomputation.
//!
//! All functions work on [`TreeNode`] projections of a site's pages and
//! never touch storage. Traversals preserve the input slice's sibling
//! order and tolerate corrupt parent links (a stray cycle in stored data
//! must not hang a walk).

use std::collections::{HashMap, HashSet};

use crate::path::child_path;
use crate::slug::normalize_slug;
use crate::types::DocId;

/// Minimal projection of a page used by the tree algorithms.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: DocId,
    pub parent_id: Option<DocId>,
    pub slug: String,
    pub path: String,
}

fn children_index<'a>(nodes: &'a [TreeNode]) -> HashMap<Option<&'a str>, Vec<&'a TreeNode>> {
    let mut index: HashMap<Option<&str>, Vec<&TreeNode>> = HashMap::new();
    for node in nodes {
        index
            .entry(node.parent_id.as_deref())
            .or_default()
            .push(node);
    }
    index
}

/// Ids of every descendant of `root_id`, parents before children,
/// siblings in input order. The root itself is not included.
pub fn descendant_ids(nodes: &[TreeNode], root_id: &str) -> Vec<DocId> {
    let children = children_index(nodes);
    let mut out = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(root_id);

    let mut stack: Vec<&TreeNode> = match children.get(&Some(root_id)) {
        Some(direct) => direct.iter().rev().copied().collect(),
        None => return out,
    };

    while let Some(node) = stack.pop() {
        if !seen.insert(node.id.as_str()) {
            continue;
        }
        out.push(node.id.clone());
        if let Some(grandchildren) = children.get(&Some(node.id.as_str())) {
            stack.extend(grandchildren.iter().rev().copied());
        }
    }

    out
}

/// True when reparenting `page_id` under `candidate_parent_id` would make
/// the parent graph cyclic: the candidate is the page itself or one of
/// its descendants.
pub fn would_create_cycle(nodes: &[TreeNode], page_id: &str, candidate_parent_id: &str) -> bool {
    if page_id == candidate_parent_id {
        return true;
    }
    descendant_ids(nodes, page_id)
        .iter()
        .any(|id| id == candidate_parent_id)
}

/// True when another page under `parent_id` already uses `slug`. Both
/// sides are compared after normalization.
pub fn sibling_slug_taken(
    nodes: &[TreeNode],
    parent_id: Option<&str>,
    slug: &str,
    exclude_page_id: &str,
) -> bool {
    let wanted = normalize_slug(slug);
    nodes.iter().any(|node| {
        node.id != exclude_page_id
            && node.parent_id.as_deref() == parent_id
            && normalize_slug(&node.slug) == wanted
    })
}

/// Number of children under `parent_id`, excluding `exclude_page_id`.
/// The tree manager appends a moved page after these.
pub fn child_count(nodes: &[TreeNode], parent_id: Option<&str>, exclude_page_id: &str) -> usize {
    nodes
        .iter()
        .filter(|node| node.parent_id.as_deref() == parent_id && node.id != exclude_page_id)
        .count()
}

/// Recompute paths for `root_id` and its whole subtree given the path of
/// its (possibly new) parent. Returns only the pages whose stored path
/// actually changes, parents before children so they can be persisted
/// top-down.
pub fn recompute_paths(
    nodes: &[TreeNode],
    root_id: &str,
    new_parent_path: Option<&str>,
) -> Vec<(DocId, String)> {
    let by_id: HashMap<&str, &TreeNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let children = children_index(nodes);

    let Some(root) = by_id.get(root_id) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&TreeNode, Option<String>)> =
        vec![(root, new_parent_path.map(str::to_string))];

    while let Some((node, parent_path)) = stack.pop() {
        if !seen.insert(node.id.as_str()) {
            continue;
        }

        let new_path = child_path(parent_path.as_deref(), &node.slug);
        if new_path != node.path {
            out.push((node.id.clone(), new_path.clone()));
        }

        // Descend even when this node's path is unchanged: a child whose
        // stored path drifted out of sync still gets repaired.
        if let Some(kids) = children.get(&Some(node.id.as_str())) {
            for kid in kids.iter().rev() {
                stack.push((kid, Some(new_path.clone())));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, parent: Option<&str>, slug: &str, path: &str) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            slug: slug.to_string(),
            path: path.to_string(),
        }
    }

    /// docs -> (intro -> setup), about
    fn sample_tree() -> Vec<TreeNode> {
        vec![
            node("docs", None, "docs", "/docs"),
            node("intro", Some("docs"), "intro", "/docs/intro"),
            node("setup", Some("intro"), "setup", "/docs/intro/setup"),
            node("about", None, "about", "/about"),
        ]
    }

    // -- descendants --------------------------------------------------------

    #[test]
    fn collects_descendants_parents_first() {
        let nodes = sample_tree();
        assert_eq!(descendant_ids(&nodes, "docs"), vec!["intro", "setup"]);
        assert_eq!(descendant_ids(&nodes, "intro"), vec!["setup"]);
        assert!(descendant_ids(&nodes, "setup").is_empty());
        assert!(descendant_ids(&nodes, "missing").is_empty());
    }

    #[test]
    fn sibling_order_is_preserved() {
        let nodes = vec![
            node("root", None, "root", "/root"),
            node("b", Some("root"), "b", "/root/b"),
            node("a", Some("root"), "a", "/root/a"),
            node("c", Some("root"), "c", "/root/c"),
        ];
        assert_eq!(descendant_ids(&nodes, "root"), vec!["b", "a", "c"]);
    }

    #[test]
    fn corrupt_cycle_terminates() {
        // a <-> b parent each other; the walk must not hang
        let nodes = vec![
            node("a", Some("b"), "a", "/a"),
            node("b", Some("a"), "b", "/b"),
        ];
        let ids = descendant_ids(&nodes, "a");
        assert_eq!(ids, vec!["b"]);
    }

    // -- cycle guard --------------------------------------------------------

    #[test]
    fn page_cannot_parent_itself() {
        let nodes = sample_tree();
        assert!(would_create_cycle(&nodes, "docs", "docs"));
    }

    #[test]
    fn page_cannot_move_under_descendant() {
        let nodes = sample_tree();
        assert!(would_create_cycle(&nodes, "docs", "setup"));
        assert!(would_create_cycle(&nodes, "docs", "intro"));
    }

    #[test]
    fn unrelated_parent_is_fine() {
        let nodes = sample_tree();
        assert!(!would_create_cycle(&nodes, "docs", "about"));
        assert!(!would_create_cycle(&nodes, "setup", "about"));
    }

    // -- sibling slugs ------------------------------------------------------

    #[test]
    fn detects_sibling_collision_after_normalization() {
        let nodes = sample_tree();
        // "About Us" normalizes to "about-us", no collision with "about"
        assert!(!sibling_slug_taken(&nodes, None, "About Us", "new"));
        // "ABOUT" normalizes to "about", collides
        assert!(sibling_slug_taken(&nodes, None, "ABOUT", "new"));
    }

    #[test]
    fn collision_scoped_to_parent_and_excludes_self() {
        let nodes = sample_tree();
        // "intro" exists under docs, not at root
        assert!(!sibling_slug_taken(&nodes, None, "intro", "new"));
        assert!(sibling_slug_taken(&nodes, Some("docs"), "intro", "new"));
        // a page keeps its own slug
        assert!(!sibling_slug_taken(&nodes, Some("docs"), "intro", "intro"));
    }

    #[test]
    fn counts_children_excluding_moved_page() {
        let nodes = sample_tree();
        assert_eq!(child_count(&nodes, None, "new"), 2);
        assert_eq!(child_count(&nodes, None, "about"), 1);
        assert_eq!(child_count(&nodes, Some("docs"), "new"), 1);
    }

    // -- path recomputation -------------------------------------------------

    #[test]
    fn move_rewrites_subtree_paths_top_down() {
        let nodes = sample_tree();
        // move "intro" (with child "setup") under "about"
        let changes = recompute_paths(&nodes, "intro", Some("/about"));
        assert_eq!(
            changes,
            vec![
                ("intro".to_string(), "/about/intro".to_string()),
                ("setup".to_string(), "/about/intro/setup".to_string()),
            ]
        );
    }

    #[test]
    fn move_to_root_drops_prefix() {
        let nodes = sample_tree();
        let changes = recompute_paths(&nodes, "intro", None);
        assert_eq!(
            changes,
            vec![
                ("intro".to_string(), "/intro".to_string()),
                ("setup".to_string(), "/intro/setup".to_string()),
            ]
        );
    }

    #[test]
    fn unchanged_paths_are_skipped() {
        let nodes = sample_tree();
        // recompute in place: nothing moved, nothing reported
        assert!(recompute_paths(&nodes, "docs", None).is_empty());
    }

    #[test]
    fn drifted_child_path_is_repaired() {
        let mut nodes = sample_tree();
        // stored path of "setup" is stale
        nodes[2].path = "/old/setup".to_string();
        let changes = recompute_paths(&nodes, "docs", None);
        assert_eq!(
            changes,
            vec![("setup".to_string(), "/docs/intro/setup".to_string())]
        );
    }
}
