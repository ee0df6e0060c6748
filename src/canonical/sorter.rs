use std::cmp::Reverse;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::compare::{bond_key, CompareOptions};
use crate::mol::Mol;

/// Final atom order: a breadth-first walk that starts at the highest-ranked
/// atom and queues unplaced neighbors highest rank first.
///
/// When a component is exhausted the walk restarts at the highest-ranked
/// atom not yet placed, so disconnected molecules are ordered completely.
pub fn rank_walk(mol: &Mol<Atom, Bond>, ranks: &[usize]) -> Vec<NodeIndex> {
    let n = mol.atom_count();
    let mut by_rank: Vec<NodeIndex> = mol.atoms().collect();
    by_rank.sort_by_key(|a| Reverse(ranks[a.index()]));

    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut cursor = 0;
    while order.len() < n {
        if cursor == order.len() {
            let Some(root) = by_rank.iter().copied().find(|a| !placed[a.index()]) else {
                break;
            };
            placed[root.index()] = true;
            order.push(root);
        }
        let current = order[cursor];
        cursor += 1;

        let mut next: Vec<NodeIndex> = mol
            .neighbors(current)
            .filter(|nb| !placed[nb.index()])
            .collect();
        next.sort_by_key(|nb| Reverse(ranks[nb.index()]));
        next.dedup();
        for nb in next {
            placed[nb.index()] = true;
            order.push(nb);
        }
    }
    order
}

/// Final bond order: by the ascending pair of final atom positions, then
/// by bond key. `position[old atom]` is the atom's place in the new order.
pub fn sort_bonds_by_position(
    mol: &Mol<Atom, Bond>,
    position: &[usize],
    options: &CompareOptions,
) -> Vec<EdgeIndex> {
    const CONNECTED_ATOMS: usize = 2;
    let mut bonds: Vec<EdgeIndex> = mol.bonds().collect();
    bonds.sort_by_cached_key(|&e| {
        let ends = mol
            .bond_endpoints(e)
            .map(|(a, b)| {
                let (pa, pb) = (position[a.index()], position[b.index()]);
                (pa.min(pb), pa.max(pb))
            })
            .unwrap_or((usize::MAX, usize::MAX));
        (ends, Reverse(CONNECTED_ATOMS), bond_key(mol, e, options))
    });
    bonds
}
