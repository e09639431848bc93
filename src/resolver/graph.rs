// src/resolver/graph.rs

//! Directed graph data structures and algorithms
//!
//! Provides graph construction, depth-first search with CLRS discovery and
//! finish times, topological ordering with back-edge detection, and
//! strongly connected components for the changeset solver.
//!
//! Nodes get dense indices on first insertion. Every traversal keeps an
//! explicit work stack, so deep graphs cannot overflow the call stack.

use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

/// Result of a depth-first search
///
/// Times are indexed by node index; `None` means the node was not reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfsResult {
    pub starts: Vec<Option<usize>>,
    pub finishes: Vec<Option<usize>>,
    /// One tree per root, nodes in discovery order
    pub trees: Vec<Vec<usize>>,
}

impl DfsResult {
    /// Node indices in decreasing finish time
    pub fn reverse_finish_order(&self) -> Vec<usize> {
        let mut finished: Vec<(usize, usize)> = self
            .finishes
            .iter()
            .enumerate()
            .filter_map(|(idx, finish)| finish.map(|f| (f, idx)))
            .collect();
        finished.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        finished.into_iter().map(|(_, idx)| idx).collect()
    }

    fn is_back_edge(&self, from: usize, to: usize) -> bool {
        match (
            self.starts[from],
            self.finishes[from],
            self.starts[to],
            self.finishes[to],
        ) {
            (Some(s_from), Some(f_from), Some(s_to), Some(f_to)) => {
                s_from > s_to && f_from < f_to
            }
            _ => false,
        }
    }
}

/// Directed graph over hashable nodes with an edge payload `E`
#[derive(Debug, Clone)]
pub struct DirectedGraph<T, E = ()> {
    nodes: IndexSet<T>,
    /// Outgoing edges per node index
    edges: Vec<IndexMap<usize, E>>,
}

impl<T, E> Default for DirectedGraph<T, E> {
    fn default() -> Self {
        Self {
            nodes: IndexSet::new(),
            edges: Vec::new(),
        }
    }
}

impl<T, E> DirectedGraph<T, E>
where
    T: Eq + Hash + Clone + Debug,
{
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its index (existing nodes keep theirs)
    pub fn add_node(&mut self, node: T) -> usize {
        let (idx, inserted) = self.nodes.insert_full(node);
        if inserted {
            self.edges.push(IndexMap::new());
        }
        idx
    }

    /// Add an edge with a payload, creating missing nodes
    ///
    /// A repeated edge keeps the latest payload.
    pub fn add_edge_with(&mut self, from: T, to: T, payload: E) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.edges[from].insert(to, payload);
    }

    pub fn add_edge(&mut self, from: T, to: T)
    where
        E: Default,
    {
        self.add_edge_with(from, to, E::default());
    }

    /// Remove an edge, returning its payload
    pub fn delete_edge(&mut self, from: &T, to: &T) -> Option<E> {
        let from = self.nodes.get_index_of(from)?;
        let to = self.nodes.get_index_of(to)?;
        self.edges[from].shift_remove(&to)
    }

    pub fn has_node(&self, node: &T) -> bool {
        self.nodes.contains(node)
    }

    pub fn has_edge(&self, from: &T, to: &T) -> bool {
        match (self.nodes.get_index_of(from), self.nodes.get_index_of(to)) {
            (Some(from), Some(to)) => self.edges[from].contains_key(&to),
            _ => false,
        }
    }

    pub fn edge_payload(&self, from: &T, to: &T) -> Option<&E> {
        let from = self.nodes.get_index_of(from)?;
        let to = self.nodes.get_index_of(to)?;
        self.edges[from].get(&to)
    }

    pub fn index_of(&self, node: &T) -> Option<usize> {
        self.nodes.get_index_of(node)
    }

    pub fn node(&self, idx: usize) -> Option<&T> {
        self.nodes.get_index(idx)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|children| children.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every edge as (from, to, payload)
    pub fn edges(&self) -> impl Iterator<Item = (&T, &T, &E)> {
        self.edges.iter().enumerate().flat_map(move |(from, children)| {
            children
                .iter()
                .map(move |(to, payload)| (&self.nodes[from], &self.nodes[*to], payload))
        })
    }

    /// Direct successors of a node
    pub fn children(&self, node: &T) -> Vec<&T> {
        self.nodes
            .get_index_of(node)
            .map(|idx| self.edges[idx].keys().map(|c| &self.nodes[*c]).collect())
            .unwrap_or_default()
    }

    /// Direct predecessors of a node
    pub fn parents(&self, node: &T) -> Vec<&T> {
        let Some(target) = self.nodes.get_index_of(node) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, children)| children.contains_key(&target))
            .map(|(idx, _)| &self.nodes[idx])
            .collect()
    }

    /// A copy of the graph with every edge reversed
    pub fn transpose(&self) -> Self
    where
        E: Clone,
    {
        let mut edges = vec![IndexMap::new(); self.nodes.len()];
        for (from, children) in self.edges.iter().enumerate() {
            for (to, payload) in children {
                edges[*to].insert(from, payload.clone());
            }
        }
        Self {
            nodes: self.nodes.clone(),
            edges,
        }
    }

    fn sorted_indices<F>(&self, indices: impl Iterator<Item = usize>, cmp: &F) -> Vec<usize>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let mut sorted: Vec<usize> = indices.collect();
        sorted.sort_by(|a, b| cmp(&self.nodes[*a], &self.nodes[*b]));
        sorted
    }

    /// Depth-first search in insertion order
    pub fn do_dfs(&self, start: Option<&T>) -> DfsResult {
        self.do_dfs_by(start, |a, b| {
            self.index_of(a).cmp(&self.index_of(b))
        })
    }

    /// Depth-first search visiting roots and children in `cmp` order
    ///
    /// With `start`, only the tree reachable from it is explored.
    pub fn do_dfs_by<F>(&self, start: Option<&T>, cmp: F) -> DfsResult
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let count = self.nodes.len();
        let mut result = DfsResult {
            starts: vec![None; count],
            finishes: vec![None; count],
            trees: Vec::new(),
        };

        let roots: Vec<usize> = match start {
            Some(node) => self.nodes.get_index_of(node).into_iter().collect(),
            None => self.sorted_indices(0..count, &cmp),
        };

        let mut time = 0;
        for root in roots {
            if result.starts[root].is_some() {
                continue;
            }

            let mut tree = Vec::new();
            // (node, whether its children were already pushed)
            let mut stack = vec![(root, false)];
            while let Some((idx, expanded)) = stack.pop() {
                if expanded {
                    result.finishes[idx] = Some(time);
                    time += 1;
                    continue;
                }
                if result.starts[idx].is_some() {
                    continue;
                }

                result.starts[idx] = Some(time);
                time += 1;
                tree.push(idx);
                stack.push((idx, true));

                // Pushed in reverse so the first child in order is popped first
                let children = self.sorted_indices(self.edges[idx].keys().copied(), &cmp);
                for child in children.into_iter().rev() {
                    if result.starts[child].is_none() {
                        stack.push((child, false));
                    }
                }
            }
            result.trees.push(tree);
        }

        result
    }

    /// Topological order in insertion order preference
    pub fn total_ordering(&self) -> Result<Vec<T>> {
        self.total_ordering_by(|a, b| self.index_of(a).cmp(&self.index_of(b)))
    }

    /// Topological order: for every edge `u -> v`, `u` comes before `v`
    ///
    /// Nodes with no constraint between them come out roughly in `cmp`
    /// order. Any cycle is reported as `Error::CycleError`; callers collapse
    /// cycles through `strongly_connected_graph` first.
    pub fn total_ordering_by<F>(&self, cmp: F) -> Result<Vec<T>>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        // Reverse finish order flips the visiting order, so search backwards
        let dfs = self.do_dfs_by(None, |a, b| cmp(b, a));

        for (from, children) in self.edges.iter().enumerate() {
            for to in children.keys() {
                if from == *to || dfs.is_back_edge(from, *to) {
                    return Err(Error::CycleError(format!(
                        "Edge {:?} -> {:?} closes a cycle",
                        self.nodes[from], self.nodes[*to]
                    )));
                }
            }
        }

        Ok(dfs
            .reverse_finish_order()
            .into_iter()
            .map(|idx| self.nodes[idx].clone())
            .collect())
    }

    /// Component index of every node, using Kosaraju's algorithm
    fn component_ids(&self) -> (Vec<usize>, usize) {
        let count = self.nodes.len();
        let finish_order = self.do_dfs(None).reverse_finish_order();

        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (from, children) in self.edges.iter().enumerate() {
            for to in children.keys() {
                parents[*to].push(from);
            }
        }

        let mut component = vec![usize::MAX; count];
        let mut next = 0;
        for root in finish_order {
            if component[root] != usize::MAX {
                continue;
            }
            component[root] = next;
            let mut stack = vec![root];
            while let Some(idx) = stack.pop() {
                for parent in &parents[idx] {
                    if component[*parent] == usize::MAX {
                        component[*parent] = next;
                        stack.push(*parent);
                    }
                }
            }
            next += 1;
        }

        (component, next)
    }

    /// Strongly connected components, members in insertion order
    pub fn strongly_connected_components(&self) -> Vec<Vec<T>> {
        let (component, total) = self.component_ids();
        let mut components = vec![Vec::new(); total];
        for (idx, comp) in component.iter().enumerate() {
            components[*comp].push(self.nodes[idx].clone());
        }
        components
    }

    /// Condensation graph: one node per component, an edge wherever a
    /// member of one component has an edge into another
    pub fn strongly_connected_graph(&self) -> DirectedGraph<Vec<T>> {
        let (component, total) = self.component_ids();
        let mut members = vec![Vec::new(); total];
        for (idx, comp) in component.iter().enumerate() {
            members[*comp].push(self.nodes[idx].clone());
        }

        let mut condensed: DirectedGraph<Vec<T>> = DirectedGraph::new();
        for group in &members {
            condensed.add_node(group.clone());
        }
        for (from, children) in self.edges.iter().enumerate() {
            for to in children.keys() {
                let (a, b) = (component[from], component[*to]);
                if a != b {
                    condensed.add_edge(members[a].clone(), members[b].clone());
                }
            }
        }
        condensed
    }
}
