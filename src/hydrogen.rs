use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Radical};
use crate::bond::Bond;
use crate::element::Element;
use crate::mol::Mol;

/// Bond-order sum of the covalent bonds at `idx`, rounded up to whole bonds.
pub fn bond_order_sum(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u16 {
    mol.bonds_of(idx)
        .map(|e| mol.bond(e))
        .filter(|b| b.is_covalent())
        .map(|b| b.order.half_valence() as u16)
        .sum::<u16>()
        .div_ceil(2)
}

/// Hydrogens implied by the element's default valence.
///
/// The bond-order sum is rounded up to a whole bond, so two aromatic bonds
/// (3 bonds) on a carbon leave one hydrogen. Charges shift the valence: up
/// for the electron-rich elements (N, O, P, S, halogens), down for B and C.
/// Non-element nodes and elements without a default valence get none.
pub fn implicit_hydrogens(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    let atom = mol.atom(idx);
    if !atom.is_element() {
        return 0;
    }
    let Some(element) = Element::from_atomic_num(atom.atomic_num) else {
        return 0;
    };
    let used = bond_order_sum(mol, idx) as i16;
    let shift = valence_shift(atom) - radical_electrons(atom.radical);
    element
        .default_valences()
        .iter()
        .map(|&v| v as i16 + shift)
        .find(|&v| v >= used)
        .map_or(0, |v| (v - used).clamp(0, u8::MAX as i16) as u8)
}

/// Hydrogens attached to the atom without being atoms of the graph.
pub fn total_hydrogens(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    mol.atom(idx)
        .explicit_hydrogens
        .unwrap_or_else(|| implicit_hydrogens(mol, idx))
}

fn valence_shift(atom: &Atom) -> i16 {
    let charge = atom.formal_charge as i16;
    match atom.atomic_num {
        5 | 6 | 14 => -charge.abs(),
        7 | 8 | 9 | 15 | 16 | 17 | 33 | 34 | 35 | 53 => charge,
        _ => 0,
    }
}

fn radical_electrons(radical: Radical) -> i16 {
    match radical {
        Radical::None => 0,
        Radical::Doublet => 1,
        Radical::Singlet | Radical::Triplet => 2,
    }
}
