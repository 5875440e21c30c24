//! Basic low-level callback objects to pass to the DLX algorithm.

use crate::dlx::matrix::Matrix;

/// An interface of callback objects to pass to the DLX algorithm.
pub trait Callback {
    fn on_solution(&mut self, _sol: Vec<usize>, _mat: &mut Matrix) {}
    fn on_progress(&mut self, _fraction: f64, _mat: &mut Matrix) {}
    fn on_finish(&mut self) {}
}

/// A simple callback that just collects solutions into a vector.
#[derive(Default)]
pub struct SolutionCallback {
    pub solutions: Vec<Vec<usize>>,
}

impl Callback for SolutionCallback {
    fn on_solution(&mut self, sol: Vec<usize>, _mat: &mut Matrix) {
        self.solutions.push(sol);
    }
}
