//! Reduces an [`AssemblyProblem`] to a cover problem and lifts the
//! solver's answers back to geometric placements.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::callback::StatusCallback;
use crate::error::SolverError;
use crate::grid::Grid;
use crate::problem::{Problem, Value};
use crate::puzzle::symmetry::{self, SymmetryInfo};
use crate::puzzle::{AssemblyProblem, AssemblySolution, Piece, Placement};
use crate::solver::CoverSolver;

/// A cover constraint of the assembly reduction.
///
/// Every goal voxel is one constraint; every piece is one constraint
/// shared by all of its instances (hence the ranged columns); every
/// piece group adds one more.
#[derive(PartialEq, Eq, Clone, Hash)]
#[cfg_attr(test, derive(Debug))]
pub enum AssemblyConstraint<N, V> {
    Piece(N),
    Voxel(V),
    Group(usize),
}

/// One legal way to put a piece into the goal.
#[derive(Clone)]
struct Candidate<N, T, V> {
    piece: N,
    rotation: T,
    translation: T,
    voxels: Vec<V>,
}

/// What an assembly run produced: the solutions plus the symmetry
/// reduction applied, if any.
#[cfg_attr(test, derive(Debug))]
pub struct AssemblyOutcome<N, T, V> {
    pub solutions: Vec<AssemblySolution<N, T, V>>,
    pub symmetry: Option<SymmetryInfo<N>>,
}

/// Reduces an assembly problem to exact cover and solves it.
///
/// Single-shot: `solve` consumes the assembler.
pub struct Assembler<'g, G: Grid, N: Value + fmt::Display> {
    grid: &'g G,
    problem: AssemblyProblem<N, G::Voxel>,
}

impl<'g, G: Grid, N: Value + fmt::Display> Assembler<'g, G, N> {
    pub fn new(grid: &'g G, problem: AssemblyProblem<N, G::Voxel>) -> Assembler<'g, G, N> {
        Assembler { grid, problem }
    }

    /// Finds every assembly of the problem.
    pub fn solve(
        self,
        status: &mut impl StatusCallback,
    ) -> Result<AssemblyOutcome<N, G::Transform, G::Voxel>, SolverError> {
        let grid = self.grid;
        let problem = &self.problem;
        let goal = problem.goal();

        self.validate()?;

        // Enumerate placements piece by piece. All feasibility checks
        // run before the first callback fires, so a failure is never
        // observed mid-run.
        let mut placements: IndexMap<N, Vec<Candidate<N, G::Transform, G::Voxel>>> =
            IndexMap::new();
        for (name, counted) in problem.pieces() {
            let cands = if counted.max > 0 {
                enumerate_placements(grid, goal, &counted.piece, name)
            } else {
                vec![]
            };
            if counted.max > 0 {
                if cands.is_empty() && counted.min >= 1 {
                    return Err(SolverError::UnplaceablePiece(name.to_string()));
                }
                if cands.len() < counted.min {
                    return Err(SolverError::PieceMinUnsatisfiable {
                        piece: name.to_string(),
                        min: counted.min,
                        placements: cands.len(),
                    });
                }
            }
            placements.insert(name.clone(), cands);
        }
        for (name, cands) in &placements {
            status.on_log(&format!("piece {}: {} placements", name, cands.len()));
        }

        let symmetry = if problem.removes_symmetries() {
            self.reduce_symmetries(&mut placements, status)
        } else {
            None
        };

        // Build the cover problem: piece columns first, then goal
        // voxels, then groups; one row per placement.
        let mut cover: Problem<usize, AssemblyConstraint<N, G::Voxel>> = Problem::default();

        for (name, counted) in problem.pieces() {
            if !placements[name].is_empty() {
                cover.add_ranged_constraint(
                    AssemblyConstraint::Piece(name.clone()),
                    counted.min,
                    counted.max,
                );
            }
        }
        for voxel in goal.voxels() {
            if goal.is_optional(voxel) {
                cover.add_optional_constraint(AssemblyConstraint::Voxel(voxel.clone()));
            } else {
                cover.add_constraint(AssemblyConstraint::Voxel(voxel.clone()));
            }
        }
        for (index, group) in problem.groups().iter().enumerate() {
            cover.add_ranged_constraint(
                AssemblyConstraint::Group(index),
                group.count,
                group.count,
            );
        }

        let candidates: Vec<Candidate<N, G::Transform, G::Voxel>> =
            placements.into_iter().flat_map(|(_, cands)| cands).collect();
        for (row, cand) in candidates.iter().enumerate() {
            let mut subset = vec![AssemblyConstraint::Piece(cand.piece.clone())];
            subset.extend(cand.voxels.iter().map(|v| AssemblyConstraint::Voxel(v.clone())));
            for (index, group) in problem.groups().iter().enumerate() {
                if group.pieces.contains(&cand.piece) {
                    subset.push(AssemblyConstraint::Group(index));
                }
            }
            cover.add_subset(row, subset);
        }

        status.on_log(&format!(
            "cover problem: {} constraints, {} placements",
            cover.constraints().len(),
            candidates.len(),
        ));

        let row_solutions = CoverSolver::new(cover).solve(status)?;
        debug!("assembly search finished: {} solutions", row_solutions.len());
        status.on_log(&format!("{} assemblies found", row_solutions.len()));

        let solutions = row_solutions
            .into_iter()
            .map(|rows| lift(&candidates, &rows))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssemblyOutcome { solutions, symmetry })
    }

    /// Fail-fast input validation, before any callback fires.
    fn validate(&self) -> Result<(), SolverError> {
        let problem = &self.problem;
        if problem.pieces().is_empty() {
            return Err(SolverError::EmptyProblem);
        }
        if problem.goal().voxels().is_empty() {
            return Err(SolverError::EmptyGoal);
        }
        for (name, counted) in problem.pieces() {
            if counted.piece.voxels().is_empty() {
                return Err(SolverError::EmptyPiece(name.to_string()));
            }
            if !counted.piece.optional().is_empty() {
                return Err(SolverError::OptionalVoxelsUnsupported(name.to_string()));
            }
            if counted.min > counted.max {
                return Err(SolverError::PieceRangeInvalid {
                    piece: name.to_string(),
                    min: counted.min,
                    max: counted.max,
                });
            }
        }
        for (index, group) in problem.groups().iter().enumerate() {
            for piece in &group.pieces {
                if !problem.pieces().contains_key(piece) {
                    return Err(SolverError::UnknownGroupPiece {
                        group: index,
                        piece: piece.to_string(),
                    });
                }
            }
        }

        // Voxel-count sanity check: the pieces must be able to supply a
        // voxel total that the goal can absorb.
        let goal = problem.goal();
        let (goal_min, goal_max) = (goal.required_count(), goal.voxels().len());
        let mut piece_min = 0;
        let mut piece_max = 0;
        for counted in problem.pieces().values() {
            piece_min += counted.min * counted.piece.voxels().len();
            piece_max += counted.max * counted.piece.voxels().len();
        }
        if piece_max < goal_min || piece_min > goal_max {
            return Err(SolverError::VoxelCountMismatch {
                piece_min,
                piece_max,
                goal_min,
                goal_max,
            });
        }
        Ok(())
    }

    /// Restricts one single-use piece to one placement per stabilizer
    /// orbit of the goal.
    fn reduce_symmetries(
        &self,
        placements: &mut IndexMap<N, Vec<Candidate<N, G::Transform, G::Voxel>>>,
        status: &mut impl StatusCallback,
    ) -> Option<SymmetryInfo<N>> {
        let grid = self.grid;
        let stabilizer = symmetry::goal_stabilizer(grid, self.problem.goal().voxels());
        if stabilizer.len() <= 1 {
            status.on_log("goal has no nontrivial symmetry");
            return None;
        }

        // Only a piece used exactly once may be restricted; a shared
        // multi-instance placement list would constrain every instance.
        let candidates: Vec<(N, Vec<Vec<G::Voxel>>)> = self
            .problem
            .pieces()
            .iter()
            .filter(|(_, counted)| counted.min == 1 && counted.max == 1)
            .map(|(name, _)| {
                let voxels = placements[name].iter().map(|c| c.voxels.clone()).collect();
                (name.clone(), voxels)
            })
            .collect();

        let (pos, representatives, factor) =
            match symmetry::choose_breaker(grid, &stabilizer, &candidates) {
                Some(choice) => choice,
                None => {
                    status.on_log(&format!(
                        "goal symmetry of order {} left unbroken: no single-use piece gains",
                        stabilizer.len(),
                    ));
                    return None;
                }
            };

        let piece = candidates[pos].0.clone();
        let kept: IndexSet<usize> = representatives.into_iter().collect();
        let cands = placements.get_mut(&piece).unwrap();
        let total = cands.len();
        let mut index = 0;
        cands.retain(|_| {
            let keep = kept.contains(&index);
            index += 1;
            keep
        });

        status.on_log(&format!(
            "symmetry breaker {}: {} of {} placements kept (group order {}, factor {:.1})",
            piece,
            cands.len(),
            total,
            stabilizer.len(),
            factor,
        ));
        Some(SymmetryInfo { piece, group_order: stabilizer.len(), factor })
    }
}

/// Enumerates every placement of a piece inside the goal: each distinct
/// rotation image, anchored on every goal voxel, kept when all voxels
/// land in the goal.
fn enumerate_placements<G: Grid, N: Value>(
    grid: &G,
    goal: &Piece<G::Voxel>,
    piece: &Piece<G::Voxel>,
    name: &N,
) -> Vec<Candidate<N, G::Transform, G::Voxel>> {
    let goal_set: IndexSet<&G::Voxel> = goal.voxels().iter().collect();
    let mut seen_shapes: IndexSet<Vec<G::Voxel>> = IndexSet::new();
    let mut candidates = Vec::new();

    for rotation in grid.rotations(false) {
        let rotated = grid.apply(&rotation, piece.voxels());
        if !seen_shapes.insert(symmetry::canonical_form(grid, &rotated)) {
            continue; // same image as an earlier rotation
        }
        let anchor = match rotated.iter().min() {
            Some(anchor) => anchor.clone(),
            None => continue,
        };
        for target in goal.voxels() {
            let translation = grid.translation(&anchor, target);
            let voxels = grid.apply(&translation, &rotated);
            if voxels.iter().all(|v| goal_set.contains(v)) {
                candidates.push(Candidate {
                    piece: name.clone(),
                    rotation: rotation.clone(),
                    translation,
                    voxels,
                });
            }
        }
    }
    candidates
}

/// Turns one solver solution into placements, numbering the instances
/// of each piece in solution order.
fn lift<N: Value, T: Clone, V: Clone>(
    candidates: &[Candidate<N, T, V>],
    rows: &[usize],
) -> Result<AssemblySolution<N, T, V>, SolverError> {
    let mut instance_counts: IndexMap<N, usize> = IndexMap::new();
    let mut placements = Vec::with_capacity(rows.len());
    for &row in rows {
        let cand = candidates
            .get(row)
            .ok_or_else(|| SolverError::Internal(format!("solution references row {row}")))?;
        let instance = instance_counts.entry(cand.piece.clone()).or_insert(0);
        *instance += 1;
        placements.push(Placement {
            piece: cand.piece.clone(),
            instance: *instance,
            rotation: cand.rotation.clone(),
            translation: cand.translation.clone(),
            voxels: cand.voxels.clone(),
        });
    }
    Ok(AssemblySolution { placements })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grids::cubic::CubicGrid;
    use crate::vector::Vector3D;

    fn bar(len: i32) -> Piece<Vector3D> {
        Piece::new((0..len).map(|x| Vector3D::new(x, 0, 0)))
    }

    fn solve(
        problem: AssemblyProblem<&'static str, Vector3D>,
    ) -> Result<AssemblyOutcome<&'static str, crate::grids::cubic::CubicTransform, Vector3D>, SolverError>
    {
        Assembler::new(&CubicGrid, problem).solve(&mut ())
    }

    #[test]
    fn one_dimensional_assembly_has_three_solutions() {
        let mut problem = AssemblyProblem::new(bar(3));
        problem.add_piece_range("A", bar(1), 1, 3);
        problem.add_piece_range("B", bar(2), 0, 1);

        let outcome = solve(problem).unwrap();
        assert_eq!(outcome.solutions.len(), 3);

        // One solution uses A three times, with instances numbered off.
        let triple = outcome
            .solutions
            .iter()
            .find(|s| s.placements.len() == 3)
            .unwrap();
        let mut instances: Vec<_> = triple.placements.iter().map(|p| p.instance).collect();
        instances.sort_unstable();
        assert_eq!(instances, vec![1, 2, 3]);
        assert_eq!(triple.placements[2].label(), "A#3");
    }

    #[test]
    fn every_solution_covers_the_goal_exactly() {
        let mut problem = AssemblyProblem::new(bar(3));
        problem.add_piece_range("A", bar(1), 1, 3);
        problem.add_piece_range("B", bar(2), 0, 1);

        let outcome = solve(problem).unwrap();
        for solution in &outcome.solutions {
            let mut covered: Vec<Vector3D> = solution
                .placements
                .iter()
                .flat_map(|p| p.voxels.iter().copied())
                .collect();
            covered.sort();
            assert_eq!(covered, bar(3).voxels());
        }
    }

    #[test]
    fn optional_goal_voxels_may_stay_empty() {
        let mut goal = bar(3);
        goal.set_optional(Vector3D::new(2, 0, 0));
        let mut problem = AssemblyProblem::new(goal);
        problem.add_piece("B", bar(2), 1);

        let outcome = solve(problem).unwrap();
        // B can cover the two required voxels, or the middle plus the
        // optional one -- which would leave a required voxel bare.
        assert_eq!(outcome.solutions.len(), 1);
        assert_eq!(
            outcome.solutions[0].placements[0].voxels,
            vec![Vector3D::new(0, 0, 0), Vector3D::new(1, 0, 0)],
        );
    }

    #[test]
    fn group_constraint_limits_piece_choice() {
        let mut problem = AssemblyProblem::new(bar(2));
        problem.add_piece_range("A", bar(1), 0, 1);
        problem.add_piece_range("B", bar(1), 0, 1);
        problem.add_piece_range("C", bar(1), 0, 1);
        problem.add_group(["A", "B"], 1);

        let outcome = solve(problem).unwrap();
        // Exactly one of A/B, so C fills the other cell: 2 piece pairs
        // times 2 arrangements.
        assert_eq!(outcome.solutions.len(), 4);
        for solution in &outcome.solutions {
            let uses_c = solution.placements.iter().any(|p| p.piece == "C");
            assert!(uses_c);
        }
    }

    #[test]
    fn symmetry_reduction_halves_the_bar_solutions() {
        let build = |remove: bool| {
            let mut problem = AssemblyProblem::new(bar(2));
            problem.add_piece("A", bar(1), 1);
            problem.add_piece("B", bar(1), 1);
            problem.set_remove_symmetries(remove);
            problem
        };

        let plain = solve(build(false)).unwrap();
        assert_eq!(plain.solutions.len(), 2);
        assert!(plain.symmetry.is_none());

        let reduced = solve(build(true)).unwrap();
        assert_eq!(reduced.solutions.len(), 1);
        let info = reduced.symmetry.unwrap();
        assert_eq!(info.group_order, 8);
        assert!((info.factor - 2.0).abs() < 1e-9);
    }

    #[test]
    fn infeasible_configurations_fail_fast() {
        let empty: AssemblyProblem<&str, Vector3D> = AssemblyProblem::new(bar(3));
        assert_eq!(solve(empty).unwrap_err(), SolverError::EmptyProblem);

        let mut no_goal = AssemblyProblem::new(Piece::new([]));
        no_goal.add_piece("A", bar(1), 1);
        assert_eq!(solve(no_goal).unwrap_err(), SolverError::EmptyGoal);

        let mut mismatch = AssemblyProblem::new(bar(3));
        mismatch.add_piece("B", bar(2), 1);
        assert!(matches!(
            solve(mismatch).unwrap_err(),
            SolverError::VoxelCountMismatch { .. },
        ));

        // The corner tricube passes the voxel-count check but cannot
        // lie inside a straight bar in any orientation.
        let corner = Piece::new([
            Vector3D::new(0, 0, 0),
            Vector3D::new(1, 0, 0),
            Vector3D::new(0, 1, 0),
        ]);
        let mut unplaceable = AssemblyProblem::new(bar(3));
        unplaceable.add_piece_range("A", bar(1), 0, 3);
        unplaceable.add_piece("L", corner, 1);
        assert_eq!(
            solve(unplaceable).unwrap_err(),
            SolverError::UnplaceablePiece("L".into()),
        );

        // Four goal voxels but only one adjacent pair, so two copies of
        // the domino pass the voxel-count check yet cannot both fit.
        let scattered = Piece::new([
            Vector3D::new(0, 0, 0),
            Vector3D::new(1, 0, 0),
            Vector3D::new(10, 0, 0),
            Vector3D::new(20, 0, 0),
        ]);
        let mut min_unsat = AssemblyProblem::new(scattered);
        min_unsat.add_piece("B", bar(2), 2);
        assert_eq!(
            solve(min_unsat).unwrap_err(),
            SolverError::PieceMinUnsatisfiable { piece: "B".into(), min: 2, placements: 1 },
        );

        let mut optional_piece = AssemblyProblem::new(bar(3));
        let mut odd = bar(2);
        odd.set_optional(Vector3D::new(1, 0, 0));
        optional_piece.add_piece("A", bar(1), 1);
        optional_piece.add_piece("O", odd, 1);
        assert_eq!(
            solve(optional_piece).unwrap_err(),
            SolverError::OptionalVoxelsUnsupported("O".into()),
        );
    }
}
