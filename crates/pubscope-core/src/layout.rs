//! Layout of a [`SubjectTree`] into positioned nodes and edges.
//!
//! Rendering (arrows, measurement, animation) belongs to whatever draws the
//! result; this module only decides where things go.

use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, SubjectTree};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: usize,
    pub label: String,
    pub depth: usize,
    pub record_count: usize,
    pub x: f64,
    pub y: f64,
}

/// Parent to child connection, by node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
}

impl LayoutResult {
    pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id.index())
    }
}

/// Given a tree, produce positioned nodes and edges.
pub trait TreeLayout {
    fn layout(&self, tree: &SubjectTree) -> LayoutResult;
}

/// Outline layout: one row per node in pre-order, indented by depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndentedLayout {
    pub indent: f64,
    pub row_height: f64,
}

impl Default for IndentedLayout {
    fn default() -> Self {
        Self {
            indent: 24.0,
            row_height: 28.0,
        }
    }
}

impl TreeLayout for IndentedLayout {
    fn layout(&self, tree: &SubjectTree) -> LayoutResult {
        let mut result = LayoutResult::default();
        for (row, id) in tree.pre_order().into_iter().enumerate() {
            let Some(node) = tree.node(id) else {
                continue;
            };
            result.nodes.push(PositionedNode {
                id: id.index(),
                label: node.label.clone(),
                depth: node.depth,
                record_count: node.records.len(),
                x: node.depth as f64 * self.indent,
                y: row as f64 * self.row_height,
            });
            if let Some(parent) = node.parent {
                result.edges.push(Edge {
                    from: parent.index(),
                    to: id.index(),
                });
            }
        }
        result
    }
}
