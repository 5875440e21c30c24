use std::error::Error;

use polycube_solver::grids::CubicGrid;
use polycube_solver::puzzle::assembly::Assembler;
use polycube_solver::puzzle::disassembler::Disassembler;
use polycube_solver::puzzle::{AssemblyProblem, Piece};
use polycube_solver::vector::Vector3D;

fn main() -> Result<(), Box<dyn Error>> {
    // Assemble a 1x1x3 bar from a domino and a cube, then take the
    // first assembly apart again.
    let bar = |len: i32| Piece::new((0..len).map(|x| Vector3D::new(x, 0, 0)));

    let mut problem = AssemblyProblem::new(bar(3));
    problem.add_piece("domino", bar(2), 1);
    problem.add_piece("cube", bar(1), 1);

    let grid = CubicGrid;
    let outcome = Assembler::new(&grid, problem).solve(&mut ())?;
    println!("{} assemblies", outcome.solutions.len());

    let placed = outcome.solutions[0].placed_pieces();
    let mut disassembler = Disassembler::new(&grid, placed);
    for (i, disassembly) in disassembler.disassemble(&mut ())?.iter().enumerate() {
        println!("disassembly {}:", i + 1);
        for step in &disassembly.steps {
            let movers: Vec<String> = step
                .pieces
                .iter()
                .map(|(name, instance)| format!("{}#{}", name, instance))
                .collect();
            println!(
                "  move {} by {:?} x{}{}",
                movers.join("+"),
                step.transform.translation,
                step.repeat,
                if step.separates { " (separates)" } else { "" },
            );
        }
    }
    Ok(())
}
