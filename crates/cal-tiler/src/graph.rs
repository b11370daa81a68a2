//! Longest-path resolution over a directed acyclic adjacency arena.
//!
//! Nodes are integer handles into a [`Graph`]; each node keeps ordered
//! `forward` and `backward` neighbour lists. [`LongestPaths::crawl`] computes,
//! for every node and each direction, the neighbour that starts the longest
//! chain. [`LongestPaths::spines`] then joins the backward chain, the node and
//! the forward chain into one canonical path per node, drops duplicates and
//! sorts the result longest first.
//!
//! The crawl is an explicit-stack post-order DFS with per-direction
//! memoization, so chain depth is bounded by heap rather than call stack.
//! Re-entering a node that is still being expanded means the graph has a
//! cycle, reported as [`TilerError::CyclicGraph`].

use std::collections::HashSet;

use crate::error::{Result, TilerError};

/// Edge direction used when walking the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Default)]
struct Node {
    forward: Vec<usize>,
    backward: Vec<usize>,
}

/// Adjacency arena. Neighbour lists keep insertion order and never hold
/// duplicates.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an isolated node and return its handle.
    pub fn add_node(&mut self) -> usize {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add `from → to`, recording the reverse edge on `to`.
    pub fn link(&mut self, from: usize, to: usize) {
        if !self.nodes[from].forward.contains(&to) {
            self.nodes[from].forward.push(to);
        }
        if !self.nodes[to].backward.contains(&from) {
            self.nodes[to].backward.push(from);
        }
    }

    /// Remove `from → to` and its reverse edge, if present.
    pub fn unlink(&mut self, from: usize, to: usize) {
        self.nodes[from].forward.retain(|&n| n != to);
        self.nodes[to].backward.retain(|&n| n != from);
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.nodes[from].forward.contains(&to)
    }

    pub fn neighbors(&self, node: usize, direction: Direction) -> &[usize] {
        match direction {
            Direction::Forward => &self.nodes[node].forward,
            Direction::Backward => &self.nodes[node].backward,
        }
    }
}

/// Best continuation from a node: the neighbour heading the longest chain and
/// that chain's edge count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LongestPath {
    pub neighbor: Option<usize>,
    pub length: usize,
}

/// Memoized longest chains for every node of a [`Graph`], in both directions.
#[derive(Debug, Clone)]
pub struct LongestPaths {
    forward: Vec<LongestPath>,
    backward: Vec<LongestPath>,
}

impl LongestPaths {
    /// Compute longest forward and backward chains for every node.
    ///
    /// # Errors
    /// Returns `TilerError::CyclicGraph` if either edge direction has a cycle.
    pub fn crawl(graph: &Graph) -> Result<Self> {
        Ok(Self {
            forward: crawl_direction(graph, Direction::Forward)?,
            backward: crawl_direction(graph, Direction::Backward)?,
        })
    }

    pub fn get(&self, node: usize, direction: Direction) -> LongestPath {
        match direction {
            Direction::Forward => self.forward[node],
            Direction::Backward => self.backward[node],
        }
    }

    /// Nodes reached by following best neighbours from `node`, excluding `node`.
    pub fn flatten(&self, node: usize, direction: Direction) -> Vec<usize> {
        let mut path = Vec::new();
        let mut next = self.get(node, direction).neighbor;
        while let Some(n) = next {
            path.push(n);
            next = self.get(n, direction).neighbor;
        }
        path
    }

    /// Backward chain (farthest first), the node itself, then the forward chain.
    pub fn spine(&self, node: usize) -> Vec<usize> {
        let mut path = self.flatten(node, Direction::Backward);
        path.reverse();
        path.push(node);
        path.extend(self.flatten(node, Direction::Forward));
        path
    }

    /// One spine per node in `0..len`, deduplicated and sorted longest first.
    ///
    /// Equal-length spines keep the order of the first node that produced them.
    pub fn spines(&self) -> Vec<Vec<usize>> {
        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        let mut spines = Vec::new();
        for node in 0..self.forward.len() {
            let spine = self.spine(node);
            if seen.insert(spine.clone()) {
                spines.push(spine);
            }
        }
        spines.sort_by(|a, b| b.len().cmp(&a.len()));
        spines
    }
}

fn crawl_direction(graph: &Graph, direction: Direction) -> Result<Vec<LongestPath>> {
    let mut memo: Vec<Option<LongestPath>> = vec![None; graph.len()];
    let mut in_progress = vec![false; graph.len()];

    for root in 0..graph.len() {
        if memo[root].is_some() {
            continue;
        }

        let mut stack = vec![(root, false)];
        while let Some((node, expanded)) = stack.pop() {
            if memo[node].is_some() {
                continue;
            }

            if expanded {
                let mut best = LongestPath::default();
                for &neighbor in graph.neighbors(node, direction) {
                    let length = memo[neighbor].unwrap_or_default().length + 1;
                    if length > best.length {
                        best = LongestPath {
                            neighbor: Some(neighbor),
                            length,
                        };
                    }
                }
                in_progress[node] = false;
                memo[node] = Some(best);
                continue;
            }

            in_progress[node] = true;
            stack.push((node, true));
            // Reverse so the first neighbour is expanded first.
            for &neighbor in graph.neighbors(node, direction).iter().rev() {
                if in_progress[neighbor] {
                    return Err(TilerError::CyclicGraph { node: neighbor });
                }
                if memo[neighbor].is_none() {
                    stack.push((neighbor, false));
                }
            }
        }
    }

    Ok(memo.into_iter().map(Option::unwrap_or_default).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: usize, edges: &[(usize, usize)]) -> Graph {
        let mut g = Graph::new();
        for _ in 0..nodes {
            g.add_node();
        }
        for &(from, to) in edges {
            g.link(from, to);
        }
        g
    }

    #[test]
    fn link_is_idempotent_and_symmetric() {
        let mut g = graph(2, &[(0, 1), (0, 1)]);
        assert_eq!(g.neighbors(0, Direction::Forward), &[1]);
        assert_eq!(g.neighbors(1, Direction::Backward), &[0]);
        g.unlink(0, 1);
        assert!(!g.has_edge(0, 1));
        assert!(g.neighbors(1, Direction::Backward).is_empty());
    }

    #[test]
    fn first_maximal_neighbor_wins_ties() {
        // 0 → 1, 0 → 2; both leaves.
        let g = graph(3, &[(0, 1), (0, 2)]);
        let paths = LongestPaths::crawl(&g).unwrap();
        assert_eq!(
            paths.get(0, Direction::Forward),
            LongestPath {
                neighbor: Some(1),
                length: 1
            }
        );
    }

    #[test]
    fn cycle_is_reported() {
        let g = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert!(matches!(
            LongestPaths::crawl(&g),
            Err(TilerError::CyclicGraph { .. })
        ));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let g = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let paths = LongestPaths::crawl(&g).unwrap();
        assert_eq!(paths.spine(0), vec![0, 1, 3]);
        assert_eq!(paths.spine(2), vec![0, 2, 3]);
    }
}
