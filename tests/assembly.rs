//! End-to-end assembly scenarios on the cubic grid.

use indexmap::IndexSet;
use polycube_solver::grids::CubicGrid;
use polycube_solver::puzzle::assembly::Assembler;
use polycube_solver::puzzle::{AssemblyProblem, Piece};
use polycube_solver::vector::Vector3D;

fn v(x: i32, y: i32, z: i32) -> Vector3D {
    Vector3D::new(x, y, z)
}

fn bar(len: i32) -> Piece<Vector3D> {
    Piece::new((0..len).map(|x| v(x, 0, 0)))
}

fn square() -> Piece<Vector3D> {
    Piece::new([v(0, 0, 0), v(1, 0, 0), v(0, 1, 0), v(1, 1, 0)])
}

#[test]
fn one_dimensional_goal_with_mixed_counts() {
    let mut problem = AssemblyProblem::new(bar(3));
    problem.add_piece_range("A", bar(1), 1, 3);
    problem.add_piece_range("B", bar(2), 0, 1);

    let outcome = Assembler::new(&CubicGrid, problem).solve(&mut ()).unwrap();
    assert_eq!(outcome.solutions.len(), 3);

    // Piece usage across the three solutions: AAA, AB, BA.
    let mut shapes: Vec<Vec<usize>> = outcome
        .solutions
        .iter()
        .map(|s| {
            let mut sizes: Vec<usize> =
                s.placements.iter().map(|p| p.voxels.len()).collect();
            sizes.sort_unstable();
            sizes
        })
        .collect();
    shapes.sort();
    assert_eq!(shapes, vec![vec![1, 1, 1], vec![1, 2], vec![1, 2]]);
}

#[test]
fn two_dominoes_tile_a_square_two_ways() {
    let mut problem = AssemblyProblem::new(square());
    problem.add_piece("D", bar(2), 2);

    let outcome = Assembler::new(&CubicGrid, problem).solve(&mut ()).unwrap();
    // Both horizontal, or both vertical.
    assert_eq!(outcome.solutions.len(), 2);
    for solution in &outcome.solutions {
        assert_eq!(solution.placements.len(), 2);
        assert_eq!(solution.placements[0].piece, "D");
        assert_eq!(solution.placements[1].instance, 2);
    }
}

#[test]
fn solutions_cover_each_goal_voxel_exactly_once() {
    let mut problem = AssemblyProblem::new(square());
    problem.add_piece("D", bar(2), 1);
    problem.add_piece("U", bar(1), 2);

    let outcome = Assembler::new(&CubicGrid, problem).solve(&mut ()).unwrap();
    assert!(!outcome.solutions.is_empty());
    let goal: IndexSet<Vector3D> = square().voxels().iter().copied().collect();
    for solution in &outcome.solutions {
        let mut covered = IndexSet::new();
        for placement in &solution.placements {
            for voxel in &placement.voxels {
                assert!(goal.contains(voxel), "placement outside the goal");
                assert!(covered.insert(*voxel), "voxel covered twice");
            }
        }
        assert_eq!(covered.len(), goal.len());
    }
}

#[test]
fn symmetry_reduction_divides_the_solution_count() {
    let build = |remove: bool| {
        let mut problem = AssemblyProblem::new(square());
        problem.add_piece("D", bar(2), 1);
        problem.add_piece("U", bar(1), 2);
        problem.set_remove_symmetries(remove);
        problem
    };

    let plain = Assembler::new(&CubicGrid, build(false)).solve(&mut ()).unwrap();
    let reduced = Assembler::new(&CubicGrid, build(true)).solve(&mut ()).unwrap();

    let info = reduced.symmetry.expect("a single-use piece should break symmetry");
    assert_eq!(info.piece, "D");
    let ratio = plain.solutions.len() as f64 / reduced.solutions.len() as f64;
    assert!((ratio - info.factor).abs() < 1e-9);
    assert_eq!(plain.solutions.len(), 4);
    assert_eq!(reduced.solutions.len(), 1);
}

#[test]
fn logs_mention_placements_and_results() {
    use polycube_solver::callback::LogCollector;

    let mut problem = AssemblyProblem::new(bar(2));
    problem.add_piece("A", bar(1), 2);

    let mut logs = LogCollector::default();
    let outcome = Assembler::new(&CubicGrid, problem).solve(&mut logs).unwrap();
    assert_eq!(outcome.solutions.len(), 1);
    assert!(logs.lines.iter().any(|l| l.contains("placements")));
    assert!(logs.lines.iter().any(|l| l.contains("assemblies found")));
}
