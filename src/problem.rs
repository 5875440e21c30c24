//! A generic problem type that defines ranged constraints and subsets.
//!
//! Complex cover problems (such as polycube assembly) first generate
//! this basic [`Problem`] instance before handing it to a
//! [`CoverSolver`](crate::solver::CoverSolver). The assembly reducer in
//! [`puzzle`](crate::puzzle) is the main producer.

use std::hash::Hash;

use indexmap::IndexMap;

/// Base trait for subset names and set elements.
pub trait Value: Clone + Hash + Eq {}
impl<T: Clone + Hash + Eq> Value for T {}

/// A generalized exact cover problem instance.
///
/// The set elements are of type `E`. Each element forms a constraint
/// together with an occupancy range: a solution must contain between
/// `min` and `max` subsets covering that element. The subsets are
/// identified by names of type `N`.
///
/// # Ordering
///
/// The order of the subsets and the elements is determined by the
/// insertion order ([`IndexMap`] internally). The subset order is also
/// the row order of the generated matrix, so it determines the order of
/// the solutions.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct Problem<N: Value, E: Value> {
    constraints: IndexMap<E, (usize, usize)>,
    subsets: IndexMap<N, Vec<E>>,
}

impl<N: Value, E: Value> Default for Problem<N, E> {
    fn default() -> Problem<N, E> {
        Problem { constraints: Default::default(), subsets: Default::default() }
    }
}

impl<N: Value, E: Value> Problem<N, E> {
    /// Returns a reference to the constraints of the problem.
    pub fn constraints(&self) -> &IndexMap<E, (usize, usize)> { &self.constraints }
    /// Returns a reference to the subsets of the problem.
    pub fn subsets(&self) -> &IndexMap<N, Vec<E>> { &self.subsets }

    /// Adds a subset to the problem.
    ///
    /// If the subset name already exists, it replaces the corresponding
    /// subset.
    pub fn add_subset(&mut self, name: N, subset: Vec<E>) {
        self.subsets.insert(name, subset);
    }

    /// Adds a constraint that has to be covered exactly once.
    pub fn add_constraint(&mut self, elem: E) {
        self.add_ranged_constraint(elem, 1, 1);
    }

    /// Adds several exact constraints.
    pub fn add_constraints<I: IntoIterator<Item = E>>(&mut self, constraints: I) {
        for constraint in constraints {
            self.add_constraint(constraint);
        }
    }

    /// Adds a constraint that may be covered or left alone.
    ///
    /// Optionality is nothing but the `0..=1` range; there is no
    /// separate code path for it.
    pub fn add_optional_constraint(&mut self, elem: E) {
        self.add_ranged_constraint(elem, 0, 1);
    }

    /// Adds a constraint with an occupancy range.
    pub fn add_ranged_constraint(&mut self, elem: E, min: usize, max: usize) {
        self.constraints.insert(elem, (min, max));
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_can_be_created() {
        let mut prob = Problem::default();
        prob.add_constraints(1..=7);
        prob.add_ranged_constraint(8, 0, 2);
        prob.add_subset("A", vec![3, 5, 6]);
        prob.add_subset("B", vec![1, 4, 7, 8]);
        assert_eq!(prob.constraints().len(), 8);
        assert_eq!(prob.subsets().len(), 2);
        assert_eq!(prob.constraints()[&8], (0, 2));
    }
}
