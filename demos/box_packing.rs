use std::error::Error;
use std::time::Instant;

use polycube_solver::callback::StatusCallback;
use polycube_solver::grids::CubicGrid;
use polycube_solver::puzzle::assembly::Assembler;
use polycube_solver::puzzle::{AssemblyProblem, Piece};
use polycube_solver::vector::Vector3D;

struct PrintLog;

impl StatusCallback for PrintLog {
    fn on_log(&mut self, message: &str) {
        println!("[log] {}", message);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Tile the 2x2x2 cube with four dominoes.
    let mut cube = Vec::new();
    for x in 0..2 {
        for y in 0..2 {
            for z in 0..2 {
                cube.push(Vector3D::new(x, y, z));
            }
        }
    }
    let goal = Piece::new(cube);
    let domino = Piece::new([Vector3D::new(0, 0, 0), Vector3D::new(1, 0, 0)]);

    let mut problem = AssemblyProblem::new(goal);
    problem.add_piece("D", domino, 4);

    let start = Instant::now();
    let outcome = Assembler::new(&CubicGrid, problem).solve(&mut PrintLog)?;
    println!("found {} packings in {:?}", outcome.solutions.len(), start.elapsed());

    for (i, solution) in outcome.solutions.iter().enumerate() {
        println!("packing {}:", i + 1);
        for placement in &solution.placements {
            let cells: Vec<String> = placement
                .voxels
                .iter()
                .map(|v| format!("({},{},{})", v.x, v.y, v.z))
                .collect();
            println!("  {} -> {}", placement.label(), cells.join(" "));
        }
    }
    Ok(())
}
