use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use rand::Rng;
use tracing::{debug, trace};

use super::SmilesOptions;
use crate::aromaticity::AromaticSets;
use crate::atom::{Atom, Radical, StereoParity};
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::graph::{GraphOptions, MolGraph};
use crate::hydrogen::implicit_hydrogens;
use crate::mol::Mol;
use crate::spanning::{build_spanning_forest, SpanningForest, SpanningTreeOptions};
use crate::stereo::{double_bond_key_atoms, RotationDirection, RotationHelper, Sibling};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

impl Direction {
    fn flip(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    fn as_char(self) -> char {
        match self {
            Direction::Up => '/',
            Direction::Down => '\\',
        }
    }
}

/// Incident edges of one vertex, split by the role they play in the text.
#[derive(Debug, Clone, Default)]
struct Layout {
    entry: Option<usize>,
    rings: Vec<usize>,
    branches: Vec<usize>,
    main: Option<usize>,
}

enum Step {
    Vertex(usize),
    Open,
    Close,
}

struct Writer<'a, H: ?Sized> {
    mol: &'a Mol<Atom, Bond>,
    graph: MolGraph,
    forest: SpanningForest,
    aromatic: &'a AromaticSets,
    rotation: &'a H,
    options: &'a SmilesOptions,
    layouts: Vec<Layout>,
    /// Directional bonds: `(vertex, direction)` reads as the symbol written
    /// when the bond is walked away from that vertex.
    directions: HashMap<usize, (usize, Direction)>,
    labels: HashMap<usize, usize>,
    labels_in_use: Vec<bool>,
}

/// Writes one SMILES string for `mol`, drawing traversal choices from `rng`
/// when the spanning options ask for randomness.
pub(crate) fn write_structure<H, R>(
    mol: &Mol<Atom, Bond>,
    options: &SmilesOptions,
    spanning: &SpanningTreeOptions,
    aromatic: &AromaticSets,
    rotation: &H,
    rng: &mut R,
) -> String
where
    H: RotationHelper + ?Sized,
    R: Rng + ?Sized,
{
    if mol.is_empty() {
        return String::new();
    }
    let graph = MolGraph::from_mol(
        mol,
        &GraphOptions {
            ignore_bonded_hydrogen: true,
        },
    );
    let forest = build_spanning_forest(&graph, None, spanning, rng);
    let mut writer = Writer {
        mol,
        graph,
        forest,
        aromatic,
        rotation,
        options,
        layouts: Vec::new(),
        directions: HashMap::new(),
        labels: HashMap::new(),
        labels_in_use: Vec::new(),
    };
    writer.layouts = writer.build_layouts();
    if !options.ignores_bond_stereo() {
        writer.assign_directions();
    }
    writer.write()
}

impl<H: RotationHelper + ?Sized> Writer<'_, H> {
    fn other(&self, edge: usize, vertex: usize) -> usize {
        self.graph.edges[edge].other(vertex)
    }

    fn atom_of(&self, vertex: usize) -> NodeIndex {
        self.graph.vertices[vertex].atom
    }

    fn build_layouts(&self) -> Vec<Layout> {
        (0..self.graph.vertex_count())
            .map(|v| {
                let main = self.forest.primary_edge(v);
                let mut branches: Vec<usize> = self
                    .forest
                    .child_edges(v)
                    .iter()
                    .copied()
                    .filter(|&e| Some(e) != main)
                    .collect();
                let main = match main {
                    Some(e) => Some(e),
                    None if !branches.is_empty() => Some(branches.remove(0)),
                    None => None,
                };
                let rings = self
                    .graph
                    .neighbors(v)
                    .filter(|&(e, w)| w != v && !self.forest.is_tree_edge(e))
                    .map(|(e, _)| e)
                    .collect();
                Layout {
                    entry: self.forest.entry_edge(v),
                    rings,
                    branches,
                    main,
                }
            })
            .collect()
    }

    /// Vertices in the order their atoms appear in the text.
    fn text_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.graph.vertex_count());
        for root in self.forest.trees.iter().filter_map(|t| t.root()) {
            let mut stack = vec![root];
            while let Some(v) = stack.pop() {
                order.push(v);
                let layout = &self.layouts[v];
                if let Some(e) = layout.main {
                    stack.push(self.other(e, v));
                }
                for &e in layout.branches.iter().rev() {
                    stack.push(self.other(e, v));
                }
            }
        }
        order
    }

    /// The vertex a bond is written from: the parent for tree edges, the
    /// opening atom for ring closures.
    fn written_from(&self, edge: usize, position: &[usize]) -> usize {
        let [a, b] = self.graph.edges[edge].ends;
        if self.forest.is_tree_edge(edge) {
            if self.forest.entry_edge(b) == Some(edge) {
                a
            } else {
                b
            }
        } else if position[a] <= position[b] {
            a
        } else {
            b
        }
    }

    /// Sort key giving the place of a bond symbol in the text.
    fn text_slot(&self, edge: usize, position: &[usize]) -> (usize, usize) {
        let from = self.written_from(edge, position);
        if self.forest.is_tree_edge(edge) {
            (position[self.other(edge, from)], 0)
        } else {
            let k = self.layouts[from]
                .rings
                .iter()
                .position(|&e| e == edge)
                .unwrap_or(0);
            (position[from], k + 1)
        }
    }

    fn can_carry_direction(&self, edge: usize) -> bool {
        let bond_idx = self.graph.edges[edge].bond;
        let bond = self.mol.bond(bond_idx);
        bond.is_covalent() && bond.order == BondOrder::Single && !self.aromatic.contains_bond(bond_idx)
    }

    /// Edge from `end` toward the reference atom `key`. If `key` was folded
    /// away as a hydrogen, the remaining substituent stands in for it and the
    /// flag reports that the relation flipped.
    fn reference_edge(&self, end: usize, opposite: usize, key: NodeIndex) -> Option<(usize, bool)> {
        let (edge, flipped) = match self.graph.vertex_of(key) {
            Some(kv) => (self.graph.neighbors(end).find(|&(_, w)| w == kv)?.0, false),
            None => {
                let (e, _) = self
                    .graph
                    .neighbors(end)
                    .filter(|&(_, w)| w != opposite)
                    .max_by_key(|&(_, w)| self.atom_of(w))?;
                (e, true)
            }
        };
        self.can_carry_direction(edge).then_some((edge, flipped))
    }

    fn direction_from(&self, edge: usize, vertex: usize) -> Option<Direction> {
        self.directions
            .get(&edge)
            .map(|&(origin, d)| if origin == vertex { d } else { d.flip() })
    }

    /// Gives the reference bonds of every stereo double bond a `/` or `\`,
    /// in bond order. A stereo bond whose reference bonds already carry
    /// conflicting directions is left unmarked.
    fn assign_directions(&mut self) {
        let order = self.text_order();
        let mut position = vec![0usize; self.graph.vertex_count()];
        for (pos, &v) in order.iter().enumerate() {
            position[v] = pos;
        }

        let mol = self.mol;
        for bond in mol.bonds() {
            let b = mol.bond(bond);
            let (true, Some(parity)) = (b.has_stereo(), b.parity) else {
                continue;
            };
            let Some([ref0, end0, end1, ref1]) = double_bond_key_atoms(mol, bond) else {
                continue;
            };
            let (Some(v0), Some(v1)) = (self.graph.vertex_of(end0), self.graph.vertex_of(end1))
            else {
                continue;
            };
            let (Some((e0, flip0)), Some((e1, flip1))) = (
                self.reference_edge(v0, v1, ref0),
                self.reference_edge(v1, v0, ref1),
            ) else {
                trace!(bond = bond.index(), "stereo bond has no usable reference bond");
                continue;
            };
            // trans references point different ways when read from their ends
            let trans = (parity == StereoParity::Even) ^ flip0 ^ flip1;
            let partner = |d: Direction| if trans { d.flip() } else { d };

            match (self.direction_from(e0, v0), self.direction_from(e1, v1)) {
                (None, None) => {
                    let (first, first_end, second, second_end) =
                        if self.text_slot(e0, &position) <= self.text_slot(e1, &position) {
                            (e0, v0, e1, v1)
                        } else {
                            (e1, v1, e0, v0)
                        };
                    let from = self.written_from(first, &position);
                    self.directions.insert(first, (from, Direction::Up));
                    let d = self.direction_from(first, first_end).unwrap_or(Direction::Up);
                    self.directions.insert(second, (second_end, partner(d)));
                }
                (Some(d0), None) => {
                    self.directions.insert(e1, (v1, partner(d0)));
                }
                (None, Some(d1)) => {
                    self.directions.insert(e0, (v0, partner(d1)));
                }
                (Some(d0), Some(d1)) => {
                    if partner(d0) != d1 {
                        trace!(bond = bond.index(), "conflicting reference directions, skipped");
                    }
                }
            }
        }
    }

    fn write(&mut self) -> String {
        let mut out = String::new();
        let roots: Vec<usize> = self.forest.trees.iter().filter_map(|t| t.root()).collect();
        for (i, &root) in roots.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            self.write_tree(root, &mut out);
        }
        debug!(
            atoms = self.mol.atom_count(),
            components = roots.len(),
            directional_bonds = self.directions.len(),
            "smiles written"
        );
        out
    }

    fn write_tree(&mut self, root: usize, out: &mut String) {
        let mut steps = vec![Step::Vertex(root)];
        while let Some(step) = steps.pop() {
            let v = match step {
                Step::Open => {
                    out.push('(');
                    continue;
                }
                Step::Close => {
                    out.push(')');
                    continue;
                }
                Step::Vertex(v) => v,
            };
            let layout = self.layouts[v].clone();
            if let Some(e) = layout.entry {
                self.push_bond(out, e, self.other(e, v), true);
            }
            self.push_atom(out, v, &layout);
            for &e in &layout.rings {
                self.push_ring_closure(out, e, v);
            }

            if let Some(e) = layout.main {
                steps.push(Step::Vertex(self.other(e, v)));
            }
            for &e in layout.branches.iter().rev() {
                steps.push(Step::Close);
                steps.push(Step::Vertex(self.other(e, v)));
                steps.push(Step::Open);
            }
        }
    }

    /// Writes the label for a ring bond at `vertex`. The first end opens the
    /// closure with the lowest label not in use; the second end writes the
    /// same label and frees it, so later rings may take it again.
    fn push_ring_closure(&mut self, out: &mut String, edge: usize, vertex: usize) {
        if let Some(label) = self.labels.remove(&edge) {
            self.push_bond(out, edge, vertex, false);
            push_ring_label(out, label);
            self.labels_in_use[label] = false;
            return;
        }
        let label = match self.labels_in_use.iter().skip(1).position(|used| !used) {
            Some(free) => free + 1,
            None => self.labels_in_use.len().max(1),
        };
        if label >= self.labels_in_use.len() {
            self.labels_in_use.resize(label + 1, false);
        }
        self.labels_in_use[label] = true;
        self.labels.insert(edge, label);
        trace!(edge, label, "ring closure opened");
        self.push_bond(out, edge, vertex, true);
        push_ring_label(out, label);
    }

    /// Bond symbol for `edge` walked away from `from`.
    fn push_bond(&self, out: &mut String, edge: usize, from: usize, directional: bool) {
        if directional {
            if let Some(d) = self.direction_from(edge, from) {
                out.push(d.as_char());
                return;
            }
        }
        let bond_idx = self.graph.edges[edge].bond;
        let bond = self.mol.bond(bond_idx);
        if !bond.is_covalent() {
            out.push('.');
            return;
        }
        if self.aromatic.contains_bond(bond_idx) {
            return;
        }
        match bond.order {
            BondOrder::Double => out.push('='),
            BondOrder::Triple => out.push('#'),
            BondOrder::Quadruple => out.push('$'),
            BondOrder::Aromatic => out.push(':'),
            BondOrder::Single => {
                let [a, b] = self.graph.edges[edge].ends;
                if self.aromatic.contains_atom(self.atom_of(a))
                    && self.aromatic.contains_atom(self.atom_of(b))
                {
                    out.push('-');
                }
            }
        }
    }

    /// `@` or `@@` for a stereo center, judged over its neighbors in the
    /// order they are written. `own_hydrogens` is the count the bracket
    /// will show before folded hydrogen atoms are added.
    fn chirality(&self, v: usize, layout: &Layout, own_hydrogens: usize) -> Option<&'static str> {
        if self.options.ignores_atom_stereo() {
            return None;
        }
        let center = self.atom_of(v);
        if !self.mol.atom(center).has_stereo() {
            return None;
        }
        let mut written = Vec::with_capacity(4);
        if let Some(e) = layout.entry {
            written.push(Sibling::Atom(self.atom_of(self.other(e, v))));
        }
        written.extend(self.graph.vertices[v].hydrogens.iter().map(|&h| Sibling::Atom(h)));
        if own_hydrogens == 1 {
            written.push(Sibling::ImplicitHydrogen);
        }
        let onward = layout
            .rings
            .iter()
            .chain(&layout.branches)
            .chain(layout.main.as_ref());
        written.extend(onward.map(|&e| Sibling::Atom(self.atom_of(self.other(e, v)))));

        let (&reference, others) = written.split_first()?;
        match self
            .rotation
            .rotation_direction(self.mol, center, reference, others)
        {
            RotationDirection::Clockwise => Some("@@"),
            RotationDirection::Anticlockwise => Some("@"),
            RotationDirection::None => None,
        }
    }

    /// Hydrogen count a reader would give this atom if it were written bare.
    fn implied_hydrogens(&self, v: usize, element: Element, aromatic: bool) -> usize {
        let mut used: usize = 0;
        for (e, _) in self.graph.neighbors(v) {
            let bond_idx = self.graph.edges[e].bond;
            let bond = self.mol.bond(bond_idx);
            if !bond.is_covalent() {
                continue;
            }
            used += if self.aromatic.contains_bond(bond_idx) {
                1
            } else {
                match bond.order {
                    BondOrder::Single | BondOrder::Aromatic => 1,
                    BondOrder::Double => 2,
                    BondOrder::Triple => 3,
                    BondOrder::Quadruple => 4,
                }
            };
        }
        let Some(&target) = element
            .default_valences()
            .iter()
            .find(|&&valence| valence as usize >= used)
        else {
            return 0;
        };
        let h = target as usize - used;
        if aromatic && h > 0 {
            h - 1
        } else {
            h
        }
    }

    fn push_atom(&self, out: &mut String, v: usize, layout: &Layout) {
        let idx = self.atom_of(v);
        let atom = self.mol.atom(idx);
        let aromatic = self.aromatic.contains_atom(idx);
        let element = if atom.is_element() {
            Element::from_atomic_num(atom.atomic_num)
        } else {
            None
        };
        let folded = self.graph.vertices[v].hydrogens.len();
        let explicit = if self.options.ignore_explicit_hydrogens {
            None
        } else {
            atom.explicit_hydrogens
        };
        let own = match explicit {
            Some(h) => h as usize,
            None => implicit_hydrogens(self.mol, idx) as usize,
        };
        let chirality = self.chirality(v, layout, own);

        let hydrogens = match (chirality, explicit) {
            (None, None) if self.options.ignore_implicit_hydrogens => folded,
            _ => own + folded,
        };
        let implied = element.map_or(0, |el| self.implied_hydrogens(v, el, aromatic));
        let hydrogens_match = hydrogens == implied
            || (explicit.is_none() && self.options.ignore_implicit_hydrogens && folded == 0);
        let in_subset = match element {
            Some(el) if aromatic => el.is_aromatic_subset(),
            Some(el) => el.is_organic_subset(),
            None => true,
        };
        let bare = chirality.is_none()
            && atom.formal_charge == 0
            && atom.isotope == 0
            && atom.radical == Radical::None
            && in_subset
            && hydrogens_match;

        let symbol = element.map_or("*", |el| el.symbol());
        if bare {
            push_symbol(out, symbol, aromatic);
            return;
        }

        out.push('[');
        if atom.isotope > 0 {
            out.push_str(&atom.isotope.to_string());
        }
        push_symbol(out, symbol, aromatic);
        if let Some(marker) = chirality {
            out.push_str(marker);
        }
        if hydrogens > 0 {
            out.push('H');
            if hydrogens > 1 {
                out.push_str(&hydrogens.to_string());
            }
        }
        match atom.formal_charge {
            0 => {}
            1 => out.push('+'),
            -1 => out.push('-'),
            c if c > 0 => {
                out.push('+');
                out.push_str(&c.to_string());
            }
            c => out.push_str(&c.to_string()),
        }
        out.push(']');
    }
}

fn push_symbol(out: &mut String, symbol: &str, aromatic: bool) {
    if aromatic {
        out.push_str(&symbol.to_ascii_lowercase());
    } else {
        out.push_str(symbol);
    }
}

fn push_ring_label(out: &mut String, label: usize) {
    match label {
        0..=9 => out.push_str(&label.to_string()),
        10..=99 => {
            out.push('%');
            out.push_str(&label.to_string());
        }
        _ => {
            out.push_str("%(");
            out.push_str(&label.to_string());
            out.push(')');
        }
    }
}
