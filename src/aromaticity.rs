use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::ring_bonds;

/// Atoms and bonds that belong to aromatic rings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AromaticSets {
    pub atoms: Vec<bool>,
    pub bonds: Vec<bool>,
}

impl AromaticSets {
    pub fn contains_atom(&self, atom: NodeIndex) -> bool {
        self.atoms.get(atom.index()).copied().unwrap_or(false)
    }

    pub fn contains_bond(&self, bond: EdgeIndex) -> bool {
        self.bonds.get(bond.index()).copied().unwrap_or(false)
    }
}

/// Source of aromatic ring membership for the SMILES writer.
pub trait AromaticityPerception {
    fn perceive(&self, mol: &Mol<Atom, Bond>) -> AromaticSets;
}

/// Trusts the flags already on the structure.
///
/// A bond is aromatic when its order is [`BondOrder::Aromatic`], or when it
/// is a single or double ring bond between two atoms flagged aromatic (a
/// Kekulé form of an aromatic ring). An atom is aromatic when flagged or
/// when it carries an aromatic bond.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlaggedAromaticity;

impl AromaticityPerception for FlaggedAromaticity {
    fn perceive(&self, mol: &Mol<Atom, Bond>) -> AromaticSets {
        let in_ring = ring_bonds(mol);
        let mut atoms: Vec<bool> = mol.atoms().map(|a| mol.atom(a).is_aromatic).collect();
        let mut bonds = vec![false; mol.bond_count()];

        for edge in mol.bonds() {
            let Some((a, b)) = mol.bond_endpoints(edge) else {
                continue;
            };
            let bond = mol.bond(edge);
            let aromatic = match bond.order {
                BondOrder::Aromatic => true,
                BondOrder::Single | BondOrder::Double => {
                    in_ring[edge.index()] && atoms[a.index()] && atoms[b.index()]
                }
                _ => false,
            };
            bonds[edge.index()] = aromatic && bond.is_covalent();
        }

        for edge in mol.bonds() {
            if !bonds[edge.index()] {
                continue;
            }
            if let Some((a, b)) = mol.bond_endpoints(edge) {
                atoms[a.index()] = true;
                atoms[b.index()] = true;
            }
        }

        AromaticSets { atoms, bonds }
    }
}
