pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod builder;
pub mod canonical;
pub mod compare;
pub mod element;
pub mod error;
pub mod graph;
pub mod graph_ops;
pub mod hydrogen;
pub mod mol;
pub mod rings;
pub mod smiles;
pub mod spanning;
pub mod stereo;

pub use aromaticity::{AromaticSets, AromaticityPerception, FlaggedAromaticity};
pub use atom::{Atom, NodeClass, Radical, StereoParity};
pub use bond::{Bond, BondOrder, BondType};
pub use builder::MolBuilder;
pub use canonical::{
    canonical_ordering, canonicalize, CanonicalOrdering, Canonicalizer, Executor, ExecutorId,
    Pipeline,
};
pub use compare::{compare_atoms, compare_bonds, compare_fragments, CompareOptions};
pub use element::Element;
pub use error::{Error, Result};
pub use graph::{GraphOptions, MolGraph};
pub use mol::Mol;
pub use smiles::{
    to_canonical_smiles, to_smiles, write_smiles, write_smiles_list, GenerationMode,
    SmilesOptions, SmilesWriter,
};
pub use spanning::{build_spanning_forest, SpanningForest, SpanningTreeOptions};
pub use stereo::{ParityRotation, RotationDirection, RotationHelper, Sibling};

#[cfg(test)]
mod tests;
