use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// A connection table: atoms in node-index order, bonds in edge-index order.
///
/// Stereo flags live on the atoms and bonds themselves and refer to atom
/// indices, so reordering a `Mol` must go through
/// [`renumber`](crate::graph_ops::renumber) to keep them meaningful.
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
        }
    }

    pub fn with_capacity(atoms: usize, bonds: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(atoms, bonds),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Neighbors in petgraph's adjacency order (most recently bonded first).
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Neighbors sorted by ascending atom index.
    pub fn sorted_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        out.sort_unstable();
        out
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The atom at the far end of `bond` as seen from `from`.
    pub fn other_end(&self, bond: EdgeIndex, from: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.graph.edge_endpoints(bond)?;
        if a == from {
            Some(b)
        } else if b == from {
            Some(a)
        } else {
            None
        }
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-sensitive equality: same atoms at the same indices, same bonds with
/// the same endpoints at the same indices.
impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if self.atoms().any(|idx| self.atom(idx) != other.atom(idx)) {
            return false;
        }
        self.bonds().all(|idx| {
            self.bond(idx) == other.bond(idx) && same_endpoints(self, other, idx)
        })
    }
}

fn same_endpoints<A, B>(left: &Mol<A, B>, right: &Mol<A, B>, idx: EdgeIndex) -> bool {
    let normalize = |e: Option<(NodeIndex, NodeIndex)>| e.map(|(a, b)| (a.min(b), a.max(b)));
    normalize(left.bond_endpoints(idx)) == normalize(right.bond_endpoints(idx))
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .finish()
    }
}

/// Returns `true` when `to` is an even permutation of `from`.
///
/// Elements of `from` missing from `to` are treated as fixed points, so
/// callers should check membership first when that matters.
pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> bool {
    let n = from.len();
    if n != to.len() {
        return true;
    }
    let perm: Vec<usize> = from
        .iter()
        .enumerate()
        .map(|(i, f)| to.iter().position(|t| t == f).unwrap_or(i))
        .collect();
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for i in 0..n {
        if visited[i] {
            continue;
        }
        let mut cycle_len = 0;
        let mut j = i;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        swaps += cycle_len - 1;
    }
    swaps % 2 == 0
}
