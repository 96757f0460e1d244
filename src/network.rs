//! The contact-network boundary: the node/edge input contract supplied by a
//! graph-generation collaborator, and the dense adjacency relation the
//! propagation engine runs over.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EpinetError;

/// A node as supplied by the graph-generation collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    /// Whether this node is infected at the start of a run.
    pub infected: bool,
}

/// An undirected edge between two named nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

/// A symmetric boolean adjacency relation over node indices.
///
/// Built fresh from the sampled active links of each trial, then cloned by
/// the propagation engine into a running copy that consumes a node's column
/// once that node is infected. The original is never mutated across runs.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyMatrix {
    n: usize,
    cells: Vec<bool>,
}

impl AdjacencyMatrix {
    /// Creates an edgeless relation over `n` nodes.
    #[must_use]
    pub fn new(n: usize) -> AdjacencyMatrix {
        AdjacencyMatrix {
            n,
            cells: vec![false; n * n],
        }
    }

    /// Builds the relation from named links, resolving names against `nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`EpinetError::UnknownNode`] if a link references a name
    /// absent from `nodes` (the link is never silently dropped), and
    /// [`EpinetError::SelfLoop`] if a link connects a node to itself. A
    /// self-loop would have the node schedule an infection attempt on its
    /// own, already-infected self.
    pub fn from_links(nodes: &[Node], links: &[Link]) -> Result<AdjacencyMatrix, EpinetError> {
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name.as_str(), i))
            .collect();

        let mut adjacency = AdjacencyMatrix::new(nodes.len());
        for link in links {
            let source = *index
                .get(link.source.as_str())
                .ok_or_else(|| EpinetError::UnknownNode(link.source.clone()))?;
            let target = *index
                .get(link.target.as_str())
                .ok_or_else(|| EpinetError::UnknownNode(link.target.clone()))?;
            if source == target {
                return Err(EpinetError::SelfLoop(link.source.clone()));
            }
            adjacency.add_edge(source, target);
        }
        Ok(adjacency)
    }

    /// Adds the undirected edge between `a` and `b`.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        self.cells[a * self.n + b] = true;
        self.cells[b * self.n + a] = true;
    }

    #[must_use]
    pub fn contains_edge(&self, a: usize, b: usize) -> bool {
        self.cells[a * self.n + b]
    }

    /// The indices with a surviving edge in row `i`.
    #[must_use]
    pub fn neighbors_of(&self, i: usize) -> Vec<usize> {
        let row = &self.cells[i * self.n..(i + 1) * self.n];
        row.iter()
            .enumerate()
            .filter_map(|(j, &connected)| connected.then_some(j))
            .collect()
    }

    /// Zeroes out `target`'s column so no later infection looks to re-infect
    /// them. Their row is left alone; it has already been projected from.
    pub fn isolate(&mut self, target: usize) {
        for row in 0..self.n {
            self.cells[row * self.n + target] = false;
        }
    }

    /// The number of nodes the relation is defined over.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}
