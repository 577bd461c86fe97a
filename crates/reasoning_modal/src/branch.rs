//! Worlds, branches, and the accessibility relation within a single
//! tableau.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use reasoning_ast::AstId;

pub type WorldId = u64;

/// A formula paired with the truth value it is asserted to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedFormula {
    pub formula: AstId,
    pub sign: bool,
}

impl SignedFormula {
    pub fn new(formula: AstId, sign: bool) -> Self {
        SignedFormula { formula, sign }
    }

    pub fn complement(self) -> Self {
        SignedFormula {
            formula: self.formula,
            sign: !self.sign,
        }
    }
}

/// The formulas placed at one world, plus which of them have already
/// had their tableau rule applied.
#[derive(Debug, Clone, Default)]
pub struct WorldData {
    pub formulas: BTreeSet<SignedFormula>,
    pub expanded: HashSet<SignedFormula>,
}

impl WorldData {
    /// Adds a formula, returning `true` if it was not already present.
    pub fn insert(&mut self, sf: SignedFormula) -> bool {
        self.formulas.insert(sf)
    }

    /// `true` if both polarities of some formula are present at this world.
    pub fn is_contradictory(&self) -> bool {
        self.formulas.iter().any(|sf| self.formulas.contains(&sf.complement()))
    }
}

/// One line of tableau development: a set of worlds, the accessibility
/// edges among them, and whether this branch has closed.
#[derive(Debug, Clone)]
pub struct Branch {
    pub worlds: BTreeMap<WorldId, WorldData>,
    pub relations: BTreeSet<(WorldId, WorldId)>,
    pub closed: bool,
}

impl Branch {
    pub fn new(root: WorldId) -> Self {
        let mut worlds = BTreeMap::new();
        worlds.insert(root, WorldData::default());
        Branch {
            worlds,
            relations: BTreeSet::new(),
            closed: false,
        }
    }

    /// Worlds accessible from `from`, per the current relation set.
    pub fn accessible_from(&self, from: WorldId) -> Vec<WorldId> {
        self.relations
            .iter()
            .filter(|(a, _)| *a == from)
            .map(|(_, b)| *b)
            .collect()
    }

    /// Adds an accessibility edge and checks for contradictions.
    pub fn add_relation(&mut self, from: WorldId, to: WorldId) {
        self.relations.insert((from, to));
    }

    /// Recomputes `closed` from the current world contents.
    pub fn refresh_closed(&mut self) {
        self.closed = self.worlds.values().any(|w| w.is_contradictory());
    }
}
