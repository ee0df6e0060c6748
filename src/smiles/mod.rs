//! SMILES output.
//!
//! [`SmilesWriter`] walks a spanning forest of the molecule and writes
//! atoms along each tree's primary path, other tree edges as parenthesized
//! branches and the remaining edges as numbered ring closures. The input is
//! only read; everything the walk needs is kept in per-call tables.

mod writer;

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aromaticity::{AromaticityPerception, FlaggedAromaticity};
use crate::atom::Atom;
use crate::bond::Bond;
use crate::canonical::canonicalize;
use crate::error::Result;
use crate::mol::Mol;
use crate::spanning::{PrimaryPathMode, SpanningTreeOptions, StartingVertexMode};
use crate::stereo::{ParityRotation, RotationHelper};

/// Traversal policy of the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GenerationMode {
    /// Start at the last atom and follow the longest path. Deterministic.
    #[default]
    HeaviestAndLongest,
    /// Start at the last atom and keep continuing through later atoms.
    Heaviest,
    /// Start at the first atom and follow the longest path.
    LightestAndLongest,
    /// Random start and random continuations. See
    /// [`SmilesOptions::random_output_count`].
    Random,
}

impl GenerationMode {
    pub fn spanning_options(self) -> SpanningTreeOptions {
        let (starting_vertex_mode, primary_path_mode) = match self {
            GenerationMode::HeaviestAndLongest => {
                (StartingVertexMode::Heaviest, PrimaryPathMode::Longest)
            }
            GenerationMode::Heaviest => (StartingVertexMode::Heaviest, PrimaryPathMode::Heaviest),
            GenerationMode::LightestAndLongest => {
                (StartingVertexMode::Lightest, PrimaryPathMode::Longest)
            }
            GenerationMode::Random => (StartingVertexMode::Random, PrimaryPathMode::Random),
        };
        SpanningTreeOptions {
            primary_path_mode,
            starting_vertex_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmilesOptions {
    /// Drop all `@`, `@@`, `/` and `\` markers.
    pub ignore_stereo: bool,
    /// Overrides `ignore_stereo` for double bonds when set.
    pub ignore_stereo_bond: Option<bool>,
    /// Overrides `ignore_stereo` for tetrahedral centers when set.
    pub ignore_stereo_atom: Option<bool>,
    /// Treat hydrogen counts stored on atoms as unset.
    pub ignore_explicit_hydrogens: bool,
    /// Never write hydrogens that only follow from valence rules.
    pub ignore_implicit_hydrogens: bool,
    pub generation_mode: GenerationMode,
    /// Number of distinct strings wanted from [`SmilesWriter::write_all`]
    /// in [`GenerationMode::Random`].
    pub random_output_count: usize,
    /// Seed for the random modes; fresh entropy when unset.
    pub random_seed: Option<u64>,
}

impl Default for SmilesOptions {
    fn default() -> Self {
        Self {
            ignore_stereo: false,
            ignore_stereo_bond: None,
            ignore_stereo_atom: None,
            ignore_explicit_hydrogens: false,
            ignore_implicit_hydrogens: false,
            generation_mode: GenerationMode::default(),
            random_output_count: 1,
            random_seed: None,
        }
    }
}

impl SmilesOptions {
    pub fn ignores_bond_stereo(&self) -> bool {
        self.ignore_stereo_bond.unwrap_or(self.ignore_stereo)
    }

    pub fn ignores_atom_stereo(&self) -> bool {
        self.ignore_stereo_atom.unwrap_or(self.ignore_stereo)
    }

    fn rng(&self) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// SMILES writer with pluggable aromaticity perception and tetrahedral
/// rotation helpers.
#[derive(Debug, Clone, Default)]
pub struct SmilesWriter<P = FlaggedAromaticity, R = ParityRotation> {
    options: SmilesOptions,
    aromaticity: P,
    rotation: R,
}

impl SmilesWriter {
    pub fn new(options: SmilesOptions) -> Self {
        Self {
            options,
            aromaticity: FlaggedAromaticity,
            rotation: ParityRotation,
        }
    }
}

impl<P: AromaticityPerception, R: RotationHelper> SmilesWriter<P, R> {
    pub fn with_aromaticity<Q: AromaticityPerception>(self, aromaticity: Q) -> SmilesWriter<Q, R> {
        SmilesWriter {
            options: self.options,
            aromaticity,
            rotation: self.rotation,
        }
    }

    pub fn with_rotation_helper<S: RotationHelper>(self, rotation: S) -> SmilesWriter<P, S> {
        SmilesWriter {
            options: self.options,
            aromaticity: self.aromaticity,
            rotation,
        }
    }

    pub fn options(&self) -> &SmilesOptions {
        &self.options
    }

    /// One SMILES string. Empty for an empty molecule.
    pub fn write(&self, mol: &Mol<Atom, Bond>) -> String {
        let aromatic = self.aromaticity.perceive(mol);
        let spanning = self.options.generation_mode.spanning_options();
        let mut rng = self.options.rng();
        writer::write_structure(mol, &self.options, &spanning, &aromatic, &self.rotation, &mut rng)
    }

    /// In [`GenerationMode::Random`], up to `random_output_count` distinct
    /// strings drawn from at most `round(1.5 * random_output_count)`
    /// traversals. Other modes give the single [`write`](Self::write) result.
    pub fn write_all(&self, mol: &Mol<Atom, Bond>) -> Vec<String> {
        if self.options.generation_mode != GenerationMode::Random {
            return vec![self.write(mol)];
        }
        let wanted = self.options.random_output_count.max(1);
        let attempts = (3 * wanted + 1) / 2;
        let aromatic = self.aromaticity.perceive(mol);
        let spanning = self.options.generation_mode.spanning_options();
        let mut rng = self.options.rng();

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(wanted);
        let mut tried = 0;
        while tried < attempts && out.len() < wanted {
            tried += 1;
            let smiles = writer::write_structure(
                mol,
                &self.options,
                &spanning,
                &aromatic,
                &self.rotation,
                &mut rng,
            );
            if seen.insert(smiles.clone()) {
                out.push(smiles);
            }
        }
        debug!(wanted, attempts = tried, unique = out.len(), "random smiles sampled");
        out
    }
}

/// SMILES for `mol` under `options`, with the default helpers.
pub fn write_smiles(mol: &Mol<Atom, Bond>, options: &SmilesOptions) -> String {
    SmilesWriter::new(options.clone()).write(mol)
}

/// Every string [`SmilesWriter::write_all`] produces under `options`.
pub fn write_smiles_list(mol: &Mol<Atom, Bond>, options: &SmilesOptions) -> Vec<String> {
    SmilesWriter::new(options.clone()).write_all(mol)
}

/// SMILES with default options, in the molecule's own atom order.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    write_smiles(mol, &SmilesOptions::default())
}

/// SMILES of the Morgan-canonical renumbering of `mol`. Isomorphic inputs
/// give the same string.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> Result<String> {
    let canonical = canonicalize(mol)?;
    Ok(to_smiles(&canonical))
}
