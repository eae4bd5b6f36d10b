//! OR-choice (`Plan`) and AND-branch (`Outcomes`) containers.

use crate::action::Direction;

/// Possible successor belief states after one action.
///
/// Order carries no meaning but is stable, so seeded sub-sampling is reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcomes<S> {
    states: Vec<S>,
}

impl<S> Outcomes<S> {
    pub fn new(states: Vec<S>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.states.iter()
    }

    pub fn into_states(self) -> Vec<S> {
        self.states
    }
}

impl<S> FromIterator<S> for Outcomes<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One candidate move: a set of equivalent labels and what may happen after it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry<S> {
    actions: Vec<Direction>,
    outcomes: Outcomes<S>,
}

impl<S> PlanEntry<S> {
    /// # Panics
    /// Panics if `actions` is empty.
    pub fn new(actions: Vec<Direction>, outcomes: Outcomes<S>) -> Self {
        assert!(!actions.is_empty(), "plan entry needs at least one action label");
        Self { actions, outcomes }
    }

    pub fn actions(&self) -> &[Direction] {
        &self.actions
    }

    /// The label reported when this entry wins.
    pub fn primary_action(&self) -> Direction {
        self.actions[0]
    }

    /// `Some(d)` when the entry is unambiguous.
    pub fn single_action(&self) -> Option<Direction> {
        match self.actions.as_slice() {
            [d] => Some(*d),
            _ => None,
        }
    }

    pub fn outcomes(&self) -> &Outcomes<S> {
        &self.outcomes
    }
}

/// All candidate moves from one belief state, in a fixed scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<S> {
    entries: Vec<PlanEntry<S>>,
}

impl<S> Plan<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, actions: Vec<Direction>, outcomes: Outcomes<S>) {
        self.entries.push(PlanEntry::new(actions, outcomes));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlanEntry<S>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanEntry<S>> {
        self.entries.iter()
    }
}

impl<S> Default for Plan<S> {
    fn default() -> Self {
        Self::new()
    }
}
