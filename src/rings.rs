use petgraph::graph::NodeIndex;

use crate::mol::Mol;

struct Frame {
    node: usize,
    parent_edge: Option<usize>,
    adj: Vec<(usize, usize)>,
    next: usize,
}

/// Per-bond flag, `true` for bonds that lie on at least one cycle.
///
/// Bridge detection with discovery times and low-links, run with an explicit
/// stack so deep chains do not exhaust the call stack.
pub fn ring_bonds<A, B>(mol: &Mol<A, B>) -> Vec<bool> {
    let n = mol.atom_count();
    let mut in_ring = vec![true; mol.bond_count()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut time = 0usize;

    let adjacency = |v: usize| -> Vec<(usize, usize)> {
        let node = NodeIndex::new(v);
        mol.bonds_of(node)
            .filter_map(|e| mol.other_end(e, node).map(|w| (w.index(), e.index())))
            .collect()
    };

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = time;
        low[root] = time;
        time += 1;
        let mut stack = vec![Frame {
            node: root,
            parent_edge: None,
            adj: adjacency(root),
            next: 0,
        }];

        while let Some(top) = stack.last_mut() {
            if top.next < top.adj.len() {
                let (w, e) = top.adj[top.next];
                top.next += 1;
                if Some(e) == top.parent_edge {
                    continue;
                }
                let v = top.node;
                if disc[w] == usize::MAX {
                    disc[w] = time;
                    low[w] = time;
                    time += 1;
                    stack.push(Frame {
                        node: w,
                        parent_edge: Some(e),
                        adj: adjacency(w),
                        next: 0,
                    });
                } else {
                    low[v] = low[v].min(disc[w]);
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            if let (Some(parent), Some(e)) = (stack.last(), done.parent_edge) {
                let p = parent.node;
                low[p] = low[p].min(low[done.node]);
                if low[done.node] > disc[p] {
                    in_ring[e] = false;
                }
            }
        }
    }

    in_ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MolBuilder;

    #[test]
    fn chain_has_no_ring_bonds() {
        let mol = MolBuilder::chain("CCCC").build().unwrap();
        assert_eq!(ring_bonds(&mol), vec![false; 3]);
    }

    #[test]
    fn cyclohexane_all_ring() {
        let mol = MolBuilder::ring("CCCCCC").build().unwrap();
        assert_eq!(ring_bonds(&mol), vec![true; 6]);
    }

    #[test]
    fn toluene_methyl_is_a_bridge() {
        let mut b = MolBuilder::ring("CCCCCC");
        let methyl = b.atom("C");
        b.single(0, methyl);
        let mol = b.build().unwrap();
        let rings = ring_bonds(&mol);
        assert_eq!(rings.iter().filter(|&&r| r).count(), 6);
        assert!(!rings[6]);
    }

    #[test]
    fn spiro_rings() {
        // two triangles sharing atom 0
        let mut b = MolBuilder::new();
        for _ in 0..5 {
            b.atom("C");
        }
        b.single(0, 1).single(1, 2).single(2, 0);
        b.single(0, 3).single(3, 4).single(4, 0);
        let mol = b.build().unwrap();
        assert!(ring_bonds(&mol).iter().all(|&r| r));
    }

    #[test]
    fn two_rings_joined_by_a_bridge() {
        let mut b = MolBuilder::ring("CCC");
        let first = b.atom("C");
        let second = b.atom("C");
        let third = b.atom("C");
        b.single(first, second).single(second, third).single(third, first);
        b.single(0, first);
        let mol = b.build().unwrap();
        let flags = ring_bonds(&mol);
        assert_eq!(flags.iter().filter(|&&r| !r).count(), 1);
        assert!(!flags[6]);
    }
}
