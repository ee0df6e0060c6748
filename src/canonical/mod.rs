//! Canonical atom and bond numbering.
//!
//! A [`Canonicalizer`] holds executors keyed by [`ExecutorId`]. Each
//! executor turns a molecule into a [`CanonicalOrdering`], a permutation
//! that can be applied to a copy ([`CanonicalOrdering::apply`]) or in place.

pub mod indexer;
pub mod sorter;

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::compare::CompareOptions;
use crate::error::{Error, Result};
use crate::graph_ops::renumber;
use crate::mol::Mol;

/// Canonical rank computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Indexer {
    #[default]
    Morgan,
}

/// Turns ranks into the final atom order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeSorter {
    #[default]
    RankWalk,
}

/// Orders bonds once the atom order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectorSorter {
    #[default]
    AtomPosition,
}

/// Indexer, node sorter and connector sorter, run in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub indexer: Indexer,
    pub node_sorter: NodeSorter,
    pub connector_sorter: ConnectorSorter,
    pub compare: CompareOptions,
}

impl Pipeline {
    pub fn run(&self, mol: &Mol<Atom, Bond>) -> CanonicalOrdering {
        let ranks = match self.indexer {
            Indexer::Morgan => indexer::morgan_ranks(mol, &self.compare),
        };
        let atom_order = match self.node_sorter {
            NodeSorter::RankWalk => sorter::rank_walk(mol, &ranks),
        };
        let mut position = vec![0usize; atom_order.len()];
        for (pos, atom) in atom_order.iter().enumerate() {
            position[atom.index()] = pos;
        }
        let bond_order = match self.connector_sorter {
            ConnectorSorter::AtomPosition => {
                sorter::sort_bonds_by_position(mol, &position, &self.compare)
            }
        };
        CanonicalOrdering {
            ranks,
            atom_order,
            bond_order,
        }
    }
}

pub type CustomExecutor = fn(&Mol<Atom, Bond>) -> CanonicalOrdering;

#[derive(Clone)]
pub enum Executor {
    Pipeline(Pipeline),
    /// Computes the whole ordering itself.
    Custom(CustomExecutor),
}

impl Executor {
    pub fn run(&self, mol: &Mol<Atom, Bond>) -> CanonicalOrdering {
        match self {
            Executor::Pipeline(pipeline) => pipeline.run(mol),
            Executor::Custom(f) => f(mol),
        }
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executor::Pipeline(p) => f.debug_tuple("Pipeline").field(p).finish(),
            Executor::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutorId {
    Morgan,
    Named(String),
}

impl From<&str> for ExecutorId {
    fn from(name: &str) -> Self {
        match name {
            "morgan" => ExecutorId::Morgan,
            other => ExecutorId::Named(other.to_string()),
        }
    }
}

/// A canonical numbering of one molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalOrdering {
    /// Canonical rank of each atom, indexed by original atom index.
    pub ranks: Vec<usize>,
    /// Original atom at each new position.
    pub atom_order: Vec<NodeIndex>,
    /// Original bond at each new position.
    pub bond_order: Vec<EdgeIndex>,
}

impl CanonicalOrdering {
    /// Copy of `mol` renumbered into this order.
    pub fn apply(&self, mol: &Mol<Atom, Bond>) -> Result<Mol<Atom, Bond>> {
        let atoms: Vec<usize> = self.atom_order.iter().map(|a| a.index()).collect();
        let bonds: Vec<usize> = self.bond_order.iter().map(|b| b.index()).collect();
        renumber(mol, &atoms, Some(&bonds))
    }

    pub fn apply_in_place(&self, mol: &mut Mol<Atom, Bond>) -> Result<()> {
        *mol = self.apply(mol)?;
        Ok(())
    }
}

/// Registry of canonicalization executors.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    executors: HashMap<ExecutorId, Executor>,
    default_id: Option<ExecutorId>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Canonicalizer {
    /// Registry with the Morgan pipeline registered as default.
    pub fn new() -> Self {
        let mut c = Self::empty();
        c.register_executor(
            ExecutorId::Morgan,
            Executor::Pipeline(Pipeline::default()),
            true,
        );
        c
    }

    pub fn empty() -> Self {
        Self {
            executors: HashMap::new(),
            default_id: None,
        }
    }

    pub fn register_executor(&mut self, id: ExecutorId, executor: Executor, as_default: bool) {
        if as_default {
            self.default_id = Some(id.clone());
        }
        self.executors.insert(id, executor);
    }

    pub fn default_id(&self) -> Option<&ExecutorId> {
        self.default_id.as_ref()
    }

    fn resolve(&self, id: Option<&ExecutorId>) -> Result<&Executor> {
        let id = match id.or(self.default_id.as_ref()) {
            Some(id) => id,
            None => return Err(Error::NoDefaultExecutor),
        };
        debug!(executor = ?id, "resolving canonicalization executor");
        self.executors
            .get(id)
            .ok_or_else(|| Error::ExecutorNotFound(id.clone()))
    }

    /// Ordering computed by executor `id`, or by the default one.
    pub fn canonical_ordering(
        &self,
        mol: &Mol<Atom, Bond>,
        id: Option<&ExecutorId>,
    ) -> Result<CanonicalOrdering> {
        let executor = self.resolve(id)?;
        Ok(executor.run(mol))
    }

    /// Renumbers `mol` in place and returns the ordering that was applied.
    pub fn canonicalize(
        &self,
        mol: &mut Mol<Atom, Bond>,
        id: Option<&ExecutorId>,
    ) -> Result<CanonicalOrdering> {
        let ordering = self.canonical_ordering(mol, id)?;
        ordering.apply_in_place(mol)?;
        Ok(ordering)
    }
}

/// Ordering from the built-in Morgan pipeline.
pub fn canonical_ordering(mol: &Mol<Atom, Bond>) -> CanonicalOrdering {
    Pipeline::default().run(mol)
}

/// Canonically renumbered copy of `mol`.
pub fn canonicalize(mol: &Mol<Atom, Bond>) -> Result<Mol<Atom, Bond>> {
    canonical_ordering(mol).apply(mol)
}
