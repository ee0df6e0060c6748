//! Depth-first spanning forest with one designated primary path per tree.
//!
//! The primary path is the backbone a SMILES string is written along; every
//! other tree edge becomes a branch and every non-tree edge a ring closure.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::MolGraph;

/// How a vertex picks which child continues its primary path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimaryPathMode {
    /// The child whose own primary path is strictly longer; earlier children
    /// win ties.
    #[default]
    Longest,
    /// The child with the greatest vertex id.
    Heaviest,
    /// A random incident edge, drawn once per vertex when it is reached.
    Random,
}

/// Where each tree of the forest is rooted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StartingVertexMode {
    /// The vertex passed by the caller while it is unvisited, otherwise the
    /// lowest unvisited vertex.
    Manual,
    /// The highest unvisited vertex.
    #[default]
    Heaviest,
    /// The lowest unvisited vertex.
    Lightest,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanningTreeOptions {
    pub primary_path_mode: PrimaryPathMode,
    pub starting_vertex_mode: StartingVertexMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryPath {
    pub vertices: Vec<usize>,
    pub edges: Vec<usize>,
}

impl PrimaryPath {
    /// Number of edges on the path.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// One connected component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanningTree {
    /// Vertices in discovery order; the first one is the root.
    pub vertices: Vec<usize>,
    /// Tree edges in discovery order.
    pub edges: Vec<usize>,
    pub primary_path: PrimaryPath,
}

impl SpanningTree {
    pub fn root(&self) -> Option<usize> {
        self.vertices.first().copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpanningForest {
    pub trees: Vec<SpanningTree>,
    entry_edge: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    primary: Vec<Option<usize>>,
    tree_edge: Vec<bool>,
}

impl SpanningForest {
    /// Edge the traversal reached `vertex` through, `None` for roots.
    pub fn entry_edge(&self, vertex: usize) -> Option<usize> {
        self.entry_edge[vertex]
    }

    /// Tree edges leading away from `vertex`, in discovery order.
    pub fn child_edges(&self, vertex: usize) -> &[usize] {
        &self.children[vertex]
    }

    /// The child edge continuing the primary path through `vertex`.
    pub fn primary_edge(&self, vertex: usize) -> Option<usize> {
        self.primary[vertex]
    }

    pub fn is_tree_edge(&self, edge: usize) -> bool {
        self.tree_edge[edge]
    }
}

fn pick_start<R: Rng + ?Sized>(
    visited: &[bool],
    requested: Option<usize>,
    mode: StartingVertexMode,
    rng: &mut R,
) -> Option<usize> {
    let mut remaining = (0..visited.len()).filter(|&v| !visited[v]);
    match mode {
        StartingVertexMode::Manual => match requested {
            Some(v) if v < visited.len() && !visited[v] => Some(v),
            _ => remaining.next(),
        },
        StartingVertexMode::Lightest => remaining.next(),
        StartingVertexMode::Heaviest => remaining.last(),
        StartingVertexMode::Random => {
            let all: Vec<usize> = remaining.collect();
            all.choose(rng).copied()
        }
    }
}

/// Builds one spanning tree per connected component of `graph`.
///
/// Traversal is depth first and visits the neighbors of each vertex in bond
/// order. A neighbor already reached through an earlier branch is left as a
/// ring closure. Once all children of a vertex are done, the vertex keeps one
/// child edge as its primary continuation according to
/// `options.primary_path_mode`, and the path is threaded from the root down
/// those continuations.
pub fn build_spanning_forest<R: Rng + ?Sized>(
    graph: &MolGraph,
    start: Option<usize>,
    options: &SpanningTreeOptions,
    rng: &mut R,
) -> SpanningForest {
    let n = graph.vertex_count();
    let mut forest = SpanningForest {
        trees: Vec::new(),
        entry_edge: vec![None; n],
        children: vec![Vec::new(); n],
        primary: vec![None; n],
        tree_edge: vec![false; graph.edge_count()],
    };
    let mut visited = vec![false; n];
    let mut path_len = vec![0usize; n];
    let mut preselected: Vec<Option<usize>> = vec![None; n];

    while let Some(root) = pick_start(&visited, start, options.starting_vertex_mode, rng) {
        let mut tree = SpanningTree::default();
        visited[root] = true;
        tree.vertices.push(root);
        if options.primary_path_mode == PrimaryPathMode::Random {
            preselected[root] = graph.vertices[root].edges.choose(rng).copied();
        }

        // (vertex, position of the next incident edge to try)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(top) = stack.last_mut() {
            let v = top.0;
            if let Some(&e) = graph.vertices[v].edges.get(top.1) {
                top.1 += 1;
                let w = graph.edges[e].other(v);
                if visited[w] {
                    continue;
                }
                visited[w] = true;
                forest.entry_edge[w] = Some(e);
                forest.children[v].push(e);
                forest.tree_edge[e] = true;
                tree.vertices.push(w);
                tree.edges.push(e);
                if options.primary_path_mode == PrimaryPathMode::Random {
                    preselected[w] = graph.vertices[w].edges.choose(rng).copied();
                }
                stack.push((w, 0));
                continue;
            }

            stack.pop();
            path_len[v] = forest.primary[v]
                .map_or(0, |e| path_len[graph.edges[e].other(v)] + 1);
            let (Some(&(parent, _)), Some(e)) = (stack.last(), forest.entry_edge[v]) else {
                continue;
            };
            let take = match forest.primary[parent] {
                None => true,
                Some(current) => {
                    let rival = graph.edges[current].other(parent);
                    match options.primary_path_mode {
                        PrimaryPathMode::Longest => path_len[v] > path_len[rival],
                        PrimaryPathMode::Heaviest => v > rival,
                        PrimaryPathMode::Random => preselected[parent] == Some(e),
                    }
                }
            };
            if take {
                forest.primary[parent] = Some(e);
            }
        }

        let mut v = root;
        tree.primary_path.vertices.push(v);
        while let Some(e) = forest.primary[v] {
            v = graph.edges[e].other(v);
            tree.primary_path.edges.push(e);
            tree.primary_path.vertices.push(v);
        }
        forest.trees.push(tree);
    }

    debug!(
        vertices = n,
        trees = forest.trees.len(),
        mode = ?options.primary_path_mode,
        "spanning forest built"
    );
    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MolBuilder;
    use crate::graph::GraphOptions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn graph_of(b: MolBuilder) -> MolGraph {
        MolGraph::from_mol(&b.build().unwrap(), &GraphOptions::default())
    }

    fn forest(graph: &MolGraph, start: Option<usize>, options: SpanningTreeOptions) -> SpanningForest {
        build_spanning_forest(graph, start, &options, &mut StdRng::seed_from_u64(7))
    }

    fn opts(path: PrimaryPathMode, start: StartingVertexMode) -> SpanningTreeOptions {
        SpanningTreeOptions {
            primary_path_mode: path,
            starting_vertex_mode: start,
        }
    }

    #[test]
    fn chain_is_one_path() {
        let g = graph_of(MolBuilder::chain("CCCC"));
        let f = forest(&g, None, SpanningTreeOptions::default());
        assert_eq!(f.trees.len(), 1);
        let tree = &f.trees[0];
        assert_eq!(tree.root(), Some(3));
        assert_eq!(tree.primary_path.vertices, vec![3, 2, 1, 0]);
        assert_eq!(tree.primary_path.len(), 3);
    }

    #[test]
    fn ring_leaves_one_closure() {
        let g = graph_of(MolBuilder::ring("cccccc"));
        let f = forest(&g, None, SpanningTreeOptions::default());
        let tree = &f.trees[0];
        assert_eq!(tree.edges.len(), 5);
        let closures: Vec<usize> = (0..g.edge_count()).filter(|&e| !f.is_tree_edge(e)).collect();
        assert_eq!(closures.len(), 1);
        assert_eq!(tree.primary_path.vertices, vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn longest_branch_becomes_primary() {
        // 0-1-2 with a longer arm 1-3-4-5
        let mut b = MolBuilder::chain("CCC");
        let arm = b.atoms("CCC");
        b.single(1, arm[0]).single(arm[0], arm[1]).single(arm[1], arm[2]);
        let g = graph_of(b);
        let f = forest(&g, Some(0), opts(PrimaryPathMode::Longest, StartingVertexMode::Manual));
        assert_eq!(f.trees[0].primary_path.vertices, vec![0, 1, 3, 4, 5]);
        assert_eq!(f.child_edges(1).len(), 2);
    }

    #[test]
    fn longest_ties_keep_the_first_child() {
        // isobutane rooted at a methyl: both other methyls are one edge away
        let mut b = MolBuilder::chain("CCC");
        let c = b.atom("C");
        b.single(1, c);
        let g = graph_of(b);
        let f = forest(&g, Some(0), opts(PrimaryPathMode::Longest, StartingVertexMode::Manual));
        assert_eq!(f.trees[0].primary_path.vertices, vec![0, 1, 2]);
    }

    #[test]
    fn heaviest_prefers_later_vertices() {
        // 0-1-2 with a longer arm 1-3-4; vertex 3 outweighs vertex 2
        let mut b = MolBuilder::chain("CCC");
        let arm = b.atoms("CC");
        b.single(1, arm[0]).single(arm[0], arm[1]);
        let g = graph_of(b);
        let f = forest(&g, Some(0), opts(PrimaryPathMode::Heaviest, StartingVertexMode::Manual));
        assert_eq!(f.trees[0].primary_path.vertices, vec![0, 1, 3, 4]);
        assert_eq!(f.primary_edge(1), Some(2));
    }

    #[test]
    fn components_get_their_own_trees() {
        let mut b = MolBuilder::chain("CC");
        b.atoms("O");
        let g = graph_of(b);

        let heavy = forest(&g, None, SpanningTreeOptions::default());
        let roots: Vec<_> = heavy.trees.iter().map(|t| t.root()).collect();
        assert_eq!(roots, vec![Some(2), Some(1)]);

        let light = forest(&g, None, opts(PrimaryPathMode::Longest, StartingVertexMode::Lightest));
        let roots: Vec<_> = light.trees.iter().map(|t| t.root()).collect();
        assert_eq!(roots, vec![Some(0), Some(2)]);
    }

    #[test]
    fn manual_start_falls_back_when_visited() {
        let mut b = MolBuilder::chain("CC");
        b.atoms("O");
        let g = graph_of(b);
        let f = forest(&g, Some(1), opts(PrimaryPathMode::Longest, StartingVertexMode::Manual));
        let roots: Vec<_> = f.trees.iter().map(|t| t.root()).collect();
        assert_eq!(roots, vec![Some(1), Some(2)]);
    }

    #[test]
    fn random_mode_covers_every_vertex() {
        let mut b = MolBuilder::ring("cccccc");
        let c = b.atom("C");
        b.single(0, c);
        let g = graph_of(b);
        let options = opts(PrimaryPathMode::Random, StartingVertexMode::Random);
        for seed in 0..20 {
            let f = build_spanning_forest(&g, None, &options, &mut StdRng::seed_from_u64(seed));
            assert_eq!(f.trees.len(), 1);
            let mut seen = f.trees[0].vertices.clone();
            seen.sort_unstable();
            assert_eq!(seen, (0..7).collect::<Vec<_>>());
            assert_eq!(f.trees[0].edges.len(), 6);
            let path = &f.trees[0].primary_path;
            assert_eq!(path.vertices.len(), path.edges.len() + 1);
        }
    }

    #[test]
    fn empty_graph_has_no_trees() {
        let g = graph_of(MolBuilder::new());
        assert!(forest(&g, None, SpanningTreeOptions::default()).trees.is_empty());
    }
}
