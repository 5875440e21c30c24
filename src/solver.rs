//! A solver that solves a generic [`Problem`].

use log::debug;

use crate::callback::StatusCallback;
use crate::dlx::callback::Callback;
use crate::dlx::matrix::Matrix;
use crate::error::SolverError;
use crate::problem::{Problem, Value};

/// A synchronous solver for a [`Problem`] instance.
///
/// The solver is single-shot: it consumes itself on [`solve`] and
/// reports every solution as the list of chosen subset names, in a
/// search order that is deterministic for a given problem (smallest
/// live column first, ties towards the earlier column, rows in subset
/// insertion order).
///
/// [`solve`]: CoverSolver::solve
pub struct CoverSolver<N: Value, E: Value> {
    problem: Problem<N, E>,
}

/// Adapts the low-level matrix callbacks to [`StatusCallback`] while
/// collecting raw row solutions.
struct CollectCallback<'a, S: StatusCallback> {
    solutions: Vec<Vec<usize>>,
    status: &'a mut S,
}

impl<S: StatusCallback> Callback for CollectCallback<'_, S> {
    fn on_solution(&mut self, sol: Vec<usize>, _mat: &mut Matrix) {
        self.solutions.push(sol);
    }

    fn on_progress(&mut self, fraction: f64, _mat: &mut Matrix) {
        self.status.on_progress(fraction, None);
    }
}

impl<N: Value, E: Value> CoverSolver<N, E> {
    /// Creates a new solver that solves `problem`.
    pub fn new(problem: Problem<N, E>) -> CoverSolver<N, E> {
        CoverSolver { problem }
    }

    /// Generates the cover matrix for a problem.
    ///
    /// Constraint elements become 1-based columns in insertion order;
    /// each subset becomes one row. A subset referencing an element with
    /// no declared constraint is an input-shape error.
    pub fn generate_matrix(problem: &Problem<N, E>) -> Result<Matrix, SolverError> {
        let constraints = problem.constraints();
        let mut mat = Matrix::new(constraints.len());

        for (e, &(min, max)) in constraints {
            let col = constraints.get_index_of(e).unwrap() + 1;
            mat.set_range(col, min, max)?;
        }

        for (idx, subset) in problem.subsets().values().enumerate() {
            let row = subset
                .iter()
                .map(|e| {
                    constraints
                        .get_index_of(e)
                        .map(|i| i + 1)
                        .ok_or(SolverError::UnknownConstraint {
                            subset: format!("#{}", idx + 1),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            mat.add_row(&row)?;
        }
        Ok(mat)
    }

    /// Runs the search and returns every solution.
    pub fn solve(self, status: &mut impl StatusCallback) -> Result<Vec<Vec<N>>, SolverError> {
        let mut mat = Self::generate_matrix(&self.problem)?;
        debug!(
            "cover matrix built: {} columns, {} rows",
            mat.col_cnt(), mat.row_cnt(),
        );

        let mut callback = CollectCallback { solutions: vec![], status };
        mat.solve(&mut callback);

        let subsets = self.problem.subsets();
        let solutions = callback
            .solutions
            .into_iter()
            .map(|sol| {
                sol.iter()
                    .map(|&row| {
                        subsets
                            .get_index(row - 1)
                            .map(|(name, _)| name.clone())
                            .ok_or_else(|| {
                                SolverError::Internal(format!("solver reported unknown row {row}"))
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(solutions)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut solutions: Vec<Vec<&str>>) -> Vec<Vec<&str>> {
        for sol in &mut solutions {
            sol.sort_unstable();
        }
        solutions.sort();
        solutions
    }

    #[test]
    fn solver_can_solve_problem() {
        let mut prob = Problem::default();
        prob.add_constraints(1..=3);
        prob.add_subset("A", vec![1, 2, 3]);
        prob.add_subset("B", vec![1]);
        prob.add_subset("C", vec![2]);
        prob.add_subset("D", vec![3]);
        prob.add_subset("E", vec![1, 2]);
        prob.add_subset("F", vec![2, 3]);

        let solutions = CoverSolver::new(prob).solve(&mut ()).unwrap();
        assert_eq!(
            sorted(solutions),
            vec![
                vec!["A"],
                vec!["B", "C", "D"],
                vec!["B", "F"],
                vec!["D", "E"],
            ],
        );
    }

    #[test]
    fn solver_handles_optional_constraints() {
        let mut prob = Problem::default();
        prob.add_optional_constraint(1);
        prob.add_optional_constraint(2);
        prob.add_subset("B", vec![1]);
        prob.add_subset("C", vec![2]);

        let solutions = CoverSolver::new(prob).solve(&mut ()).unwrap();
        // Nothing is required, so the empty selection is a solution and
        // neither subset is ever forced.
        assert_eq!(solutions.len(), 1);
        assert!(solutions[0].is_empty());
    }

    #[test]
    fn solver_rejects_unknown_elements() {
        let mut prob = Problem::default();
        prob.add_constraint(1);
        prob.add_subset("A", vec![1, 9]);

        let err = CoverSolver::new(prob).solve(&mut ()).unwrap_err();
        assert!(matches!(err, SolverError::UnknownConstraint { .. }));
    }
}
