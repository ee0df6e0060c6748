use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

use crate::atom::{Atom, Radical, StereoParity};
use crate::bond::Bond;
use crate::compare::{atom_key, bond_key, CompareOptions};
use crate::graph::{GraphOptions, MolGraph};
use crate::mol::{permutation_parity, Mol};
use crate::stereo::{double_bond_key_atoms, reference_order, Sibling};

/// Morgan extended connectivity: start from vertex degrees, then replace
/// each value with the sum over its neighbors until the number of distinct
/// values stops growing. Returns the last mapping that still added a class,
/// and the number of summation rounds run.
pub fn extended_connectivity(graph: &MolGraph) -> (Vec<u64>, usize) {
    let mut current: Vec<u64> = (0..graph.vertex_count())
        .map(|v| graph.degree(v) as u64)
        .collect();
    let mut classes = count_distinct(&current);
    let mut rounds = 0;
    loop {
        let next: Vec<u64> = (0..graph.vertex_count())
            .map(|v| {
                graph
                    .neighbors(v)
                    .fold(0u64, |acc, (_, w)| acc.wrapping_add(current[w]))
            })
            .collect();
        rounds += 1;
        let next_classes = count_distinct(&next);
        if next_classes <= classes {
            return (current, rounds);
        }
        current = next;
        classes = next_classes;
    }
}

fn count_distinct<T: Ord + Clone>(values: &[T]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// Rank of each entry: the number of entries strictly smaller than it.
/// Equal values share a rank.
fn ranks_from_values<T: Ord>(values: &[T]) -> Vec<usize> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].cmp(&values[b]));
    let mut ranks = vec![0usize; n];
    for i in 1..n {
        ranks[order[i]] = if values[order[i]] == values[order[i - 1]] {
            ranks[order[i - 1]]
        } else {
            i
        };
    }
    ranks
}

/// Atom key, aromatic flag, radical code.
type Invariant = (u64, bool, u8);

/// Tetrahedral descriptor, then `(rank, bond key, double bond descriptor)`
/// for every neighbor.
type Signature = (u8, Vec<(usize, u64, u8)>);

type Trace = Vec<(Invariant, Signature)>;

// Stereo descriptors: no stored stereo, stereo whose reference atoms are
// still tied, and the two resolved configurations.
const NO_STEREO: u8 = 0;
const UNRESOLVED: u8 = 1;
const FIRST_HAND: u8 = 2;
const SECOND_HAND: u8 = 3;

/// Stored double bond configuration, in vertex ids.
struct DoubleBondStereo {
    ends: [usize; 2],
    /// Highest-indexed neighbor of each end besides the other end.
    keys: [usize; 2],
    cis: bool,
}

struct Context<'a> {
    graph: &'a MolGraph,
    bond_keys: Vec<u64>,
    invariants: Vec<Invariant>,
    /// Reference order and parity of every defined tetrahedral center.
    centers: Vec<Option<(Vec<Sibling>, StereoParity)>>,
    /// Per graph edge.
    double_bonds: Vec<Option<DoubleBondStereo>>,
}

impl Context<'_> {
    /// Handedness of a center with its neighbors listed by rank, the
    /// implicit hydrogen last.
    fn center_descriptor(&self, v: usize, ranks: &[usize]) -> u8 {
        let Some((order, parity)) = &self.centers[v] else {
            return NO_STEREO;
        };
        let rank_of = |s: &Sibling| match s {
            Sibling::Atom(a) => ranks[a.index()],
            Sibling::ImplicitHydrogen => usize::MAX,
        };
        let mut by_rank = order.clone();
        by_rank.sort_by_key(|s| rank_of(s));
        if by_rank.windows(2).any(|w| rank_of(&w[0]) == rank_of(&w[1])) {
            return UNRESOLVED;
        }
        if (*parity == StereoParity::Odd) == permutation_parity(order, &by_rank) {
            FIRST_HAND
        } else {
            SECOND_HAND
        }
    }

    /// Cis or trans between the highest-ranked neighbors of both ends.
    fn bond_descriptor(&self, e: usize, ranks: &[usize]) -> u8 {
        let Some(stereo) = &self.double_bonds[e] else {
            return NO_STEREO;
        };
        let mut flips = 0;
        for side in 0..2 {
            let (end, opposite) = (stereo.ends[side], stereo.ends[1 - side]);
            let mut others: Vec<usize> = self
                .graph
                .neighbors(end)
                .map(|(_, w)| w)
                .filter(|&w| w != opposite)
                .collect();
            others.sort_by_key(|&w| std::cmp::Reverse(ranks[w]));
            match others.as_slice() {
                [best, next, ..] if ranks[*best] == ranks[*next] => return UNRESOLVED,
                [best, ..] => {
                    if *best != stereo.keys[side] {
                        flips += 1;
                    }
                }
                [] => return UNRESOLVED,
            }
        }
        if stereo.cis == (flips % 2 == 0) {
            FIRST_HAND
        } else {
            SECOND_HAND
        }
    }

    fn signature(&self, v: usize, ranks: &[usize]) -> Signature {
        let mut neighbors: Vec<(usize, u64, u8)> = self
            .graph
            .neighbors(v)
            .map(|(e, w)| (ranks[w], self.bond_keys[e], self.bond_descriptor(e, ranks)))
            .collect();
        neighbors.sort_unstable();
        (self.center_descriptor(v, ranks), neighbors)
    }

    /// Splits rank classes by the ranks of neighbors, the bonds to them and
    /// the stereo configurations those ranks resolve, keeping the existing
    /// order between classes, until nothing splits.
    fn refine(&self, ranks: &mut Vec<usize>) {
        let mut classes = count_distinct(ranks.as_slice());
        loop {
            let current: &[usize] = ranks;
            let keyed: Vec<(usize, Signature)> = (0..current.len())
                .map(|v| (current[v], self.signature(v, current)))
                .collect();
            let next = ranks_from_values(&keyed);
            let next_classes = count_distinct(&next);
            if next_classes <= classes {
                return;
            }
            *ranks = next;
            classes = next_classes;
        }
    }

    fn trace(&self, ranks: &[usize]) -> Trace {
        let mut order: Vec<usize> = (0..ranks.len()).collect();
        order.sort_by_key(|&v| ranks[v]);
        order
            .into_iter()
            .map(|v| (self.invariants[v], self.signature(v, ranks)))
            .collect()
    }

    /// Moves `v` to the top of its class and refines.
    fn individualize(&self, ranks: &[usize], v: usize) -> Vec<usize> {
        let size = ranks.iter().filter(|&&r| r == ranks[v]).count();
        let mut trial = ranks.to_vec();
        trial[v] = ranks[v] + size - 1;
        self.refine(&mut trial);
        trial
    }

    /// Discrete ranking reached by always individualizing the first member
    /// of the lowest tied class.
    fn leaf(&self, mut ranks: Vec<usize>) -> Vec<usize> {
        while let Some(tied) = lowest_tied_class(&ranks) {
            let Some(first) = ranks.iter().position(|&r| r == tied) else {
                break;
            };
            ranks = self.individualize(&ranks, first);
        }
        ranks
    }

    /// Individualizes one member of the lowest tied class at a time, keeping
    /// the candidate whose refined ranking gives the smallest trace. Members
    /// with equal traces are interchangeable, so the first one is kept.
    ///
    /// Two candidates whose leaves have equal traces are related by an
    /// automorphism. Members already known to share an orbit with a tried
    /// candidate are skipped.
    fn break_ties(&self, ranks: &mut Vec<usize>) {
        while let Some(tied) = lowest_tied_class(ranks.as_slice()) {
            let members: Vec<usize> = (0..ranks.len()).filter(|&v| ranks[v] == tied).collect();
            trace!(rank = tied, size = members.len(), "breaking tie");

            let mut orbits = Orbits::new(ranks.len());
            let mut tried: Vec<usize> = Vec::new();
            let mut first_leaf: Option<(Trace, Vec<usize>)> = None;
            let mut best: Option<(Trace, Vec<usize>)> = None;
            for &candidate in &members {
                if tried.iter().any(|&t| orbits.same(t, candidate)) {
                    continue;
                }
                tried.push(candidate);
                let trial = self.individualize(ranks, candidate);
                let leaf = self.leaf(trial.clone());
                let leaf_trace = self.trace(&leaf);
                match &first_leaf {
                    None => first_leaf = Some((leaf_trace, leaf)),
                    Some((first_trace, first)) if *first_trace == leaf_trace => {
                        orbits.join_automorphism(first, &leaf)
                    }
                    Some(_) => {}
                }
                let trial_trace = self.trace(&trial);
                if best.as_ref().map_or(true, |(t, _)| trial_trace < *t) {
                    best = Some((trial_trace, trial));
                }
            }
            trace!(rank = tied, tried = tried.len(), "tie broken");
            match best {
                Some((_, trial)) => *ranks = trial,
                None => return,
            }
        }
    }
}

/// Union-find over vertices, joined along discovered automorphisms.
struct Orbits {
    parent: Vec<usize>,
}

impl Orbits {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut v: usize) -> usize {
        while self.parent[v] != v {
            self.parent[v] = self.parent[self.parent[v]];
            v = self.parent[v];
        }
        v
    }

    fn same(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// `from` and `to` are discrete rankings with equal traces; the vertex
    /// holding rank `r` in one maps to the vertex holding `r` in the other.
    fn join_automorphism(&mut self, from: &[usize], to: &[usize]) {
        let mut at_rank = vec![0usize; to.len()];
        for (v, &r) in to.iter().enumerate() {
            at_rank[r] = v;
        }
        for (v, &r) in from.iter().enumerate() {
            let (a, b) = (self.find(v), self.find(at_rank[r]));
            self.parent[a] = b;
        }
    }
}

fn lowest_tied_class(ranks: &[usize]) -> Option<usize> {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}

fn radical_code(radical: Radical) -> u8 {
    match radical {
        Radical::None => 0,
        Radical::Singlet => 1,
        Radical::Doublet => 2,
        Radical::Triplet => 3,
    }
}

fn context<'a>(
    mol: &Mol<Atom, Bond>,
    graph: &'a MolGraph,
    options: &CompareOptions,
) -> Context<'a> {
    let invariants: Vec<Invariant> = graph
        .vertices
        .iter()
        .map(|v| {
            let atom = mol.atom(v.atom);
            (
                atom_key(mol, v.atom, options),
                atom.is_aromatic,
                radical_code(atom.radical),
            )
        })
        .collect();
    let bond_keys: Vec<u64> = graph
        .edges
        .iter()
        .map(|e| bond_key(mol, e.bond, options))
        .collect();
    let centers = graph
        .vertices
        .iter()
        .map(|v| -> Option<(Vec<Sibling>, StereoParity)> {
            let parity = mol.atom(v.atom).parity.filter(|p| p.is_defined())?;
            Some((reference_order(mol, v.atom)?, parity))
        })
        .collect();
    let double_bonds = graph
        .edges
        .iter()
        .map(|e| -> Option<DoubleBondStereo> {
            let bond = mol.bond(e.bond);
            if !bond.has_stereo() {
                return None;
            }
            let [key0, end0, end1, key1] = double_bond_key_atoms(mol, e.bond)?;
            Some(DoubleBondStereo {
                ends: [end0.index(), end1.index()],
                keys: [key0.index(), key1.index()],
                cis: bond.parity == Some(StereoParity::Odd),
            })
        })
        .collect();

    Context {
        graph,
        bond_keys,
        invariants,
        centers,
        double_bonds,
    }
}

/// Canonical rank of every atom: a permutation of `0..atom_count`.
///
/// Atoms are ordered by final extended connectivity, then by comparator
/// key, then refined by the ranks of their neighbors, the bonds to them and
/// stored tetrahedral and double bond configurations read against those
/// ranks. Classes that stay tied are split by trying each member first and
/// keeping the smallest resulting trace.
pub fn morgan_ranks(mol: &Mol<Atom, Bond>, options: &CompareOptions) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }
    let graph = MolGraph::from_mol(mol, &GraphOptions::default());
    let (ec, rounds) = extended_connectivity(&graph);
    let ctx = context(mol, &graph, options);
    let initial: Vec<(u64, Invariant)> = (0..n).map(|v| (ec[v], ctx.invariants[v])).collect();
    let mut ranks = ranks_from_values(&initial);
    ctx.refine(&mut ranks);
    let classes = count_distinct(&ranks);
    ctx.break_ties(&mut ranks);
    debug!(
        atoms = n,
        ec_rounds = rounds,
        refined_classes = classes,
        "morgan ranking done"
    );

    // vertex ids equal atom indices when no hydrogen is folded away
    let mut out = vec![0usize; n];
    for (v, vertex) in graph.vertices.iter().enumerate() {
        out[vertex.atom.index()] = ranks[v];
    }
    out
}

/// Inverse of `ranks`: atoms listed from rank 0 upwards.
pub fn atoms_by_rank(ranks: &[usize]) -> Vec<NodeIndex> {
    let mut atoms: Vec<usize> = (0..ranks.len()).collect();
    atoms.sort_by_key(|&a| ranks[a]);
    atoms.into_iter().map(NodeIndex::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MolBuilder;

    fn ranks_of(mol: &Mol<Atom, Bond>) -> Vec<usize> {
        morgan_ranks(mol, &CompareOptions::default())
    }

    fn is_permutation(ranks: &[usize]) -> bool {
        let mut sorted = ranks.to_vec();
        sorted.sort_unstable();
        sorted == (0..ranks.len()).collect::<Vec<_>>()
    }

    #[test]
    fn empty_molecule() {
        let mol = MolBuilder::new().build().unwrap();
        assert!(ranks_of(&mol).is_empty());
    }

    #[test]
    fn ec_of_propane_stops_early() {
        let mol = MolBuilder::chain("CCC").build().unwrap();
        let g = MolGraph::from_mol(&mol, &GraphOptions::default());
        let (ec, _) = extended_connectivity(&g);
        assert_eq!(ec, vec![1, 2, 1]);
    }

    #[test]
    fn ec_of_butane_branch() {
        // isobutane: centre has degree 3
        let mut b = MolBuilder::chain("CCC");
        let c = b.atom("C");
        b.single(1, c);
        let mol = b.build().unwrap();
        let g = MolGraph::from_mol(&mol, &GraphOptions::default());
        let (ec, _) = extended_connectivity(&g);
        assert_eq!(ec, vec![1, 3, 1, 1]);
    }

    #[test]
    fn ethanol_ranks_distinct() {
        let mol = MolBuilder::chain("CCO").build().unwrap();
        let ranks = ranks_of(&mol);
        assert!(is_permutation(&ranks));
        // the middle carbon has the highest connectivity
        assert!(ranks[1] > ranks[0]);
        assert!(ranks[1] > ranks[2]);
    }

    #[test]
    fn benzene_ranks_are_a_permutation() {
        let mol = MolBuilder::ring("cccccc").build().unwrap();
        assert!(is_permutation(&ranks_of(&mol)));
    }

    #[test]
    fn disconnected_input_ranked_whole() {
        let mut b = MolBuilder::chain("CC");
        b.atoms("O");
        b.atoms("N");
        let mol = b.build().unwrap();
        let ranks = ranks_of(&mol);
        assert!(is_permutation(&ranks));
    }

    #[test]
    fn rank_order_ignores_input_order() {
        let forward = MolBuilder::chain("NCCO").build().unwrap();
        let backward = MolBuilder::chain("OCCN").build().unwrap();
        let f = ranks_of(&forward);
        let b = ranks_of(&backward);
        for i in 0..4 {
            assert_eq!(f[i], b[3 - i]);
        }
    }

    /// Classes left after refinement alone, before any tie is broken.
    fn refined_classes(mol: &Mol<Atom, Bond>) -> usize {
        let graph = MolGraph::from_mol(mol, &GraphOptions::default());
        let (ec, _) = extended_connectivity(&graph);
        let ctx = context(mol, &graph, &CompareOptions::default());
        let initial: Vec<(u64, Invariant)> = (0..mol.atom_count())
            .map(|v| (ec[v], ctx.invariants[v]))
            .collect();
        let mut ranks = ranks_from_values(&initial);
        ctx.refine(&mut ranks);
        count_distinct(&ranks)
    }

    /// CH3-CHCl-CHCl-CH3 with the two centers numbered 1 and 2.
    fn dichlorobutane(first: StereoParity, second: StereoParity) -> Mol<Atom, Bond> {
        let mut b = MolBuilder::chain("CCCC");
        let cl = b.atoms("ClCl");
        b.single(1, cl[0]).single(2, cl[1]);
        b.atom_parity(1, first).atom_parity(2, second);
        b.build().unwrap()
    }

    /// F-CH=CH-CH=CH-F
    fn difluorobutadiene(first: StereoParity, second: StereoParity) -> Mol<Atom, Bond> {
        let mut b = MolBuilder::new();
        b.atoms("FCCCCF");
        b.single(0, 1).double(1, 2).single(2, 3).double(3, 4).single(4, 5);
        b.bond_parity(1, 2, first).bond_parity(3, 4, second);
        b.build().unwrap()
    }

    #[test]
    fn meso_centers_split_during_refinement() {
        let meso = dichlorobutane(StereoParity::Odd, StereoParity::Odd);
        assert_eq!(refined_classes(&meso), 6);
        // the C2-symmetric isomer keeps its halves equivalent
        let chiral = dichlorobutane(StereoParity::Odd, StereoParity::Even);
        assert_eq!(refined_classes(&chiral), 3);
        let flat = dichlorobutane(StereoParity::Unknown, StereoParity::Unknown);
        assert_eq!(refined_classes(&flat), 3);
    }

    #[test]
    fn mixed_double_bonds_split_during_refinement() {
        let ez = difluorobutadiene(StereoParity::Even, StereoParity::Odd);
        assert_eq!(refined_classes(&ez), 6);
        let ee = difluorobutadiene(StereoParity::Even, StereoParity::Even);
        assert_eq!(refined_classes(&ee), 3);
    }

    #[test]
    fn meso_ranks_ignore_input_order() {
        let mol = dichlorobutane(StereoParity::Odd, StereoParity::Odd);
        let flipped = crate::graph_ops::renumber_atoms(&mol, &[3, 2, 1, 0, 5, 4]).unwrap();
        let a = ranks_of(&mol);
        let b = ranks_of(&flipped);
        // renumbering maps old atom i to position new_index[i]
        let new_index = [3, 2, 1, 0, 5, 4];
        for i in 0..6 {
            assert_eq!(a[i], b[new_index[i]], "atom {i}");
        }
    }

    #[test]
    fn automorphisms_join_orbits() {
        let mut orbits = Orbits::new(4);
        // rotation of a square
        orbits.join_automorphism(&[0, 1, 2, 3], &[3, 0, 1, 2]);
        assert!(orbits.same(0, 3));
        assert!(orbits.same(1, 2));
        let mut reflection = Orbits::new(4);
        reflection.join_automorphism(&[0, 1, 2, 3], &[0, 3, 2, 1]);
        assert!(reflection.same(1, 3));
        assert!(!reflection.same(0, 2));
    }

    #[test]
    fn large_ring_is_ranked() {
        let mol = MolBuilder::ring(&"C".repeat(120)).build().unwrap();
        assert!(is_permutation(&ranks_of(&mol)));
    }

    #[test]
    fn atoms_by_rank_inverts() {
        assert_eq!(
            atoms_by_rank(&[2, 0, 1]),
            vec![NodeIndex::new(1), NodeIndex::new(2), NodeIndex::new(0)]
        );
    }
}
