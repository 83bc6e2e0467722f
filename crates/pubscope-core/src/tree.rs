//! Subject tree built from hierarchical tag paths.
//!
//! Tags like `biology/plants/roots` are read as paths; every prefix becomes a
//! node. Nodes live in an arena owned by the tree and are addressed by
//! [`NodeId`], so two trees never share identifiers.

use std::collections::HashMap;

use crate::domain::Publication;
use crate::sort::natural_cmp;

/// Handle to a node of one [`SubjectTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectNode {
    /// Last path segment, as first seen.
    pub label: String,
    /// Full path from the root, `/`-separated.
    pub path: String,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Dataset indices of records tagged at or below this node.
    pub records: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectTree {
    nodes: Vec<SubjectNode>,
    roots: Vec<NodeId>,
    by_path: HashMap<String, NodeId>,
}

/// Split a tag into trimmed, non-empty path segments.
fn segments(tag: &str) -> Vec<&str> {
    tag.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn path_key(segments: &[&str]) -> String {
    segments.join("/").to_lowercase()
}

impl SubjectTree {
    /// Build from every record of a dataset.
    pub fn from_publications(records: &[Publication]) -> Self {
        let all: Vec<usize> = (0..records.len()).collect();
        Self::from_rows(records, &all)
    }

    /// Build from the records at `rows` (dataset indices, e.g. the visible
    /// rows of a view).
    pub fn from_rows(records: &[Publication], rows: &[usize]) -> Self {
        let mut tree = Self::default();
        for &index in rows {
            let Some(record) = records.get(index) else {
                continue;
            };
            for tag in &record.tags {
                tree.insert_path(&segments(tag), index);
            }
        }
        tree.sort_children();
        tracing::trace!(nodes = tree.len(), records = rows.len(), "subject tree built");
        tree
    }

    fn insert_path(&mut self, parts: &[&str], record: usize) {
        let mut parent: Option<NodeId> = None;
        for depth in 0..parts.len() {
            let key = path_key(&parts[..=depth]);
            let id = match self.by_path.get(&key) {
                Some(&id) => id,
                None => {
                    let id = NodeId(self.nodes.len());
                    let path = match parent {
                        Some(p) => format!("{}/{}", self.nodes[p.0].path, parts[depth]),
                        None => parts[depth].to_string(),
                    };
                    self.nodes.push(SubjectNode {
                        label: parts[depth].to_string(),
                        path,
                        depth,
                        parent,
                        children: Vec::new(),
                        records: Vec::new(),
                    });
                    match parent {
                        Some(p) => self.nodes[p.0].children.push(id),
                        None => self.roots.push(id),
                    }
                    self.by_path.insert(key, id);
                    id
                }
            };

            // Records arrive one at a time, so a repeat is always the last entry.
            let node = &mut self.nodes[id.0];
            if node.records.last() != Some(&record) {
                node.records.push(record);
            }
            parent = Some(id);
        }
    }

    fn sort_children(&mut self) {
        let labels: Vec<String> = self.nodes.iter().map(|n| n.label.clone()).collect();
        let by_label = |a: &NodeId, b: &NodeId| natural_cmp(&labels[a.0], &labels[b.0]);
        self.roots.sort_by(by_label);
        for node in &mut self.nodes {
            node.children.sort_by(by_label);
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&SubjectNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// Look up a node by path, case-insensitively.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(&path_key(&segments(path))).copied()
    }

    /// Ancestors from the root down to the parent.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            result.push(parent);
            current = self.nodes[parent.0].parent;
        }
        result.reverse();
        result
    }

    /// All nodes below `id`, pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.collect_descendants(id, &mut result);
        result
    }

    fn collect_descendants(&self, id: NodeId, result: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            result.push(child);
            self.collect_descendants(child, result);
        }
    }

    /// Number of distinct records tagged at or below `id`.
    pub fn record_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.records.len())
    }

    /// Every node in display order (roots in label order, each followed by
    /// its subtree).
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            result.push(root);
            self.collect_descendants(root, &mut result);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Format as a tree string for display, with record counts.
    pub fn format_tree(&self) -> String {
        let mut output = String::new();
        for &root in &self.roots {
            let node = &self.nodes[root.0];
            output.push_str(&format!("{} ({})\n", node.label, node.records.len()));
            self.format_children(root, "", &mut output);
        }
        output
    }

    fn format_children(&self, id: NodeId, prefix: &str, output: &mut String) {
        let children = self.children(id);
        for (i, &child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            let node = &self.nodes[child.0];
            let connector = if is_last { "└── " } else { "├── " };
            output.push_str(&format!(
                "{}{}{} ({})\n",
                prefix,
                connector,
                node.label,
                node.records.len()
            ));
            let child_prefix = if is_last {
                format!("{}    ", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            self.format_children(child, &child_prefix, output);
        }
    }
}
