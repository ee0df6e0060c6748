use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::atom::{Atom, Radical};
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Leave out plain hydrogen atoms hanging off a heavier atom; they are
    /// recorded on that atom's vertex instead.
    pub ignore_bonded_hydrogen: bool,
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub atom: NodeIndex,
    /// Incident edge ids, in ascending bond order.
    pub edges: Vec<usize>,
    /// Hydrogen atoms folded into this vertex.
    pub hydrogens: Vec<NodeIndex>,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub bond: EdgeIndex,
    pub ends: [usize; 2],
}

impl Edge {
    pub fn other(&self, vertex: usize) -> usize {
        if self.ends[0] == vertex {
            self.ends[1]
        } else {
            self.ends[0]
        }
    }
}

/// Plain vertex/edge view of a molecule with dense `usize` ids.
///
/// Algorithms keep their per-vertex state in vectors indexed by these ids,
/// so the molecule is only read.
#[derive(Debug, Clone, Default)]
pub struct MolGraph {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    vertex_of_atom: Vec<Option<usize>>,
}

impl MolGraph {
    pub fn from_mol(mol: &Mol<Atom, Bond>, options: &GraphOptions) -> Self {
        let dropped: Vec<Option<NodeIndex>> = mol
            .atoms()
            .map(|a| {
                if options.ignore_bonded_hydrogen {
                    removable_hydrogen_parent(mol, a)
                } else {
                    None
                }
            })
            .collect();

        let mut vertex_of_atom = vec![None; mol.atom_count()];
        let mut vertices = Vec::with_capacity(mol.atom_count());
        for atom in mol.atoms() {
            if dropped[atom.index()].is_none() {
                vertex_of_atom[atom.index()] = Some(vertices.len());
                vertices.push(Vertex {
                    atom,
                    edges: Vec::new(),
                    hydrogens: Vec::new(),
                });
            }
        }
        for atom in mol.atoms() {
            if let Some(parent) = dropped[atom.index()] {
                if let Some(v) = vertex_of_atom[parent.index()] {
                    vertices[v].hydrogens.push(atom);
                }
            }
        }

        let mut edges = Vec::with_capacity(mol.bond_count());
        for bond in mol.bonds() {
            let Some((a, b)) = mol.bond_endpoints(bond) else {
                continue;
            };
            let (Some(va), Some(vb)) = (vertex_of_atom[a.index()], vertex_of_atom[b.index()])
            else {
                continue;
            };
            let id = edges.len();
            edges.push(Edge {
                bond,
                ends: [va, vb],
            });
            vertices[va].edges.push(id);
            if vb != va {
                vertices[vb].edges.push(id);
            }
        }

        Self {
            vertices,
            edges,
            vertex_of_atom,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.vertices[vertex].edges.len()
    }

    pub fn vertex_of(&self, atom: NodeIndex) -> Option<usize> {
        self.vertex_of_atom.get(atom.index()).copied().flatten()
    }

    /// `(edge, neighbor)` pairs of `vertex`, in ascending bond order.
    pub fn neighbors(&self, vertex: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.vertices[vertex]
            .edges
            .iter()
            .map(move |&e| (e, self.edges[e].other(vertex)))
    }
}

/// The heavy atom a plain hydrogen hangs off, if the hydrogen can be folded
/// into it without losing information.
fn removable_hydrogen_parent(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> Option<NodeIndex> {
    let atom = mol.atom(idx);
    let plain = atom.is_hydrogen()
        && atom.isotope == 0
        && atom.formal_charge == 0
        && atom.radical == Radical::None
        && atom.parity.is_none()
        && atom.explicit_hydrogens.unwrap_or(0) == 0;
    if !plain {
        return None;
    }
    let mut bonds = mol.bonds_of(idx);
    let (Some(bond), None) = (bonds.next(), bonds.next()) else {
        return None;
    };
    let b = mol.bond(bond);
    if !b.is_covalent() || b.order != BondOrder::Single || b.parity.is_some() {
        return None;
    }
    let parent = mol.other_end(bond, idx)?;
    (!mol.atom(parent).is_hydrogen()).then_some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MolBuilder;

    #[test]
    fn edges_listed_in_bond_order() {
        let mut b = MolBuilder::chain("CCC");
        b.single(0, 2);
        let mol = b.build().unwrap();
        let g = MolGraph::from_mol(&mol, &GraphOptions::default());
        assert_eq!(g.vertices[0].edges, vec![0, 2]);
        assert_eq!(g.vertices[2].edges, vec![1, 2]);
        let ns: Vec<_> = g.neighbors(2).collect();
        assert_eq!(ns, vec![(1, 1), (2, 0)]);
    }

    #[test]
    fn bonded_hydrogens_fold_into_parent() {
        let mut b = MolBuilder::chain("CO");
        let h1 = b.atom("H");
        let h2 = b.atom("H");
        b.single(0, h1).single(1, h2);
        b.isotope(h2, 2);
        let mol = b.build().unwrap();
        let g = MolGraph::from_mol(
            &mol,
            &GraphOptions {
                ignore_bonded_hydrogen: true,
            },
        );
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.vertices[0].hydrogens, vec![NodeIndex::new(h1)]);
        assert_eq!(g.vertex_of(NodeIndex::new(h1)), None);
        assert_eq!(g.vertex_of(NodeIndex::new(h2)), Some(2));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn hydrogen_molecule_is_kept() {
        let mol = MolBuilder::chain("HH").build().unwrap();
        let g = MolGraph::from_mol(
            &mol,
            &GraphOptions {
                ignore_bonded_hydrogen: true,
            },
        );
        assert_eq!(g.vertex_count(), 2);
    }
}
