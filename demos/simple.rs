use polycube_solver::{CoverSolver, Problem};

fn main() {
    let mut prob = Problem::default();
    prob.add_constraint(1);
    prob.add_ranged_constraint(2, 1, 2);
    prob.add_optional_constraint(3);
    prob.add_subset("A", vec![1, 2, 3]);
    prob.add_subset("B", vec![2]);
    prob.add_subset("C", vec![1, 2]);
    prob.add_subset("D", vec![2, 3]);

    let solutions = CoverSolver::new(prob).solve(&mut ()).unwrap();
    println!("{:?}", solutions);
}
