//! Include graph of a C-style source tree.
//!
//! Every `.c`/`.h` file becomes a node, every `#include "..."` an edge from
//! the including file to the included one. On top of the raw graph:
//!
//! - [`Graph::transitive_reduce`] flags edges implied by a longer path
//! - [`Graph::rank`] assigns layers so every edge points to a lower layer
//! - [`Graph::write_dot`] renders the result for Graphviz
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]; node names are
//! copied into the caller's [`Arena`].

mod dot;
mod read;
mod reduce;


use std::path::PathBuf;

use thiserror::Error;

use crate::arena::Arena;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("include cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// Handle of a node inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Directed edge to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: NodeId,
    /// Implied by a longer path between the same two nodes
    pub transitive: bool,
}

#[derive(Debug)]
pub struct Node<'a> {
    pub name: &'a str,
    /// Source size in lines
    pub size: u32,
    pub rank: u32,
    /// Input-root bucket, only used for presentation
    pub color: u32,
    pub edges: Vec<Edge>,
}

pub struct Graph<'a> {
    arena: &'a Arena,
    nodes: Vec<Node<'a>>,
    rank_count: u32,
    color_ix: u32,
}

impl<'a> Graph<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            nodes: Vec::new(),
            rank_count: 0,
            color_ix: 0,
        }
    }

    /// Get the existing node with `name`, or insert a new one.
    pub fn node(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.find(name) {
            return id;
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: self.arena.alloc_str(name),
            size: 0,
            rank: 0,
            color: 0,
            edges: Vec::new(),
        });
        id
    }

    /// Look up a node by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(|ix| NodeId(ix as u32))
    }

    /// Add a directed edge from `src` to `dst`.
    pub fn link(&mut self, src: NodeId, dst: NodeId) {
        self.nodes[src.index()].edges.push(Edge {
            to: dst,
            transitive: false,
        });
    }

    pub fn get(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<'a>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(ix, node)| (NodeId(ix as u32), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges, transitive ones included.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    pub fn transitive_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| &n.edges)
            .filter(|e| e.transitive)
            .count()
    }

    /// Whether there is a non-transitive edge `src -> dst`.
    #[cfg(test)]
    pub fn has_direct_edge(&self, src: NodeId, dst: NodeId) -> bool {
        self.get(src)
            .edges
            .iter()
            .any(|e| e.to == dst && !e.transitive)
    }

    fn next_color(&mut self) -> u32 {
        let color = self.color_ix;
        self.color_ix += 1;
        color
    }
}
