use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::error::{Error, Result};
use crate::mol::Mol;
use crate::stereo::{remap_atom_parity, remap_bond_parity};

fn validate_permutation(order: &[usize], n: usize) -> Result<()> {
    if order.len() != n {
        return Err(Error::InvalidPermutation {
            expected: n,
            got: order.len(),
        });
    }
    let mut seen = vec![false; n];
    for &i in order {
        if i >= n || seen[i] {
            return Err(Error::InvalidPermutation {
                expected: n,
                got: order.len(),
            });
        }
        seen[i] = true;
    }
    Ok(())
}

/// Rebuilds `mol` with atoms in `atom_order` (`atom_order[new] = old`) and,
/// when given, bonds in `bond_order` (`bond_order[new] = old`).
///
/// Bonds are stored lower position first. Stereo parities are remapped so
/// they describe the same configuration under the new numbering.
pub fn renumber(
    mol: &Mol<Atom, Bond>,
    atom_order: &[usize],
    bond_order: Option<&[usize]>,
) -> Result<Mol<Atom, Bond>> {
    let n = mol.atom_count();
    validate_permutation(atom_order, n)?;
    let identity: Vec<usize>;
    let bond_order = match bond_order {
        Some(order) => {
            validate_permutation(order, mol.bond_count())?;
            order
        }
        None => {
            identity = (0..mol.bond_count()).collect();
            &identity
        }
    };

    let mut new_index = vec![0usize; n];
    for (new_idx, &old_idx) in atom_order.iter().enumerate() {
        new_index[old_idx] = new_idx;
    }

    let mut out = Mol::with_capacity(n, mol.bond_count());
    for &old_idx in atom_order {
        let old = NodeIndex::new(old_idx);
        let mut atom = mol.atom(old).clone();
        atom.parity = remap_atom_parity(mol, old, &new_index);
        out.add_atom(atom);
    }

    for &old_bond in bond_order {
        let edge = EdgeIndex::new(old_bond);
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        let (na, nb) = (new_index[a.index()], new_index[b.index()]);
        let mut bond = mol.bond(edge).clone();
        bond.parity = remap_bond_parity(mol, edge, &new_index);
        out.add_bond(
            NodeIndex::new(na.min(nb)),
            NodeIndex::new(na.max(nb)),
            bond,
        );
    }

    Ok(out)
}

/// [`renumber`] keeping the relative order of the bonds.
pub fn renumber_atoms(mol: &Mol<Atom, Bond>, atom_order: &[usize]) -> Result<Mol<Atom, Bond>> {
    renumber(mol, atom_order, None)
}
