//! Assembly and disassembly engines for polycube puzzles, built on
//! Knuth's [dancing links (DLX)] algorithm.
//!
//! [dancing links (DLX)]: https://en.wikipedia.org/wiki/Dancing_Links
//!
//! # Concept
//!
//! Packing a set of polycube pieces into a goal shape is an [exact
//! cover] problem, and this crate solves a generalized form of it:
//! every cover constraint carries an occupancy range `min..=max`, which
//! subsumes optional constraints (`0..=1`) and pieces that may be used
//! several times (a shared column with `max > 1`). On top of the solver
//! sit two geometric engines:
//!
//! - the [`Assembler`](puzzle::assembly::Assembler) reduces an
//!   [`AssemblyProblem`](puzzle::AssemblyProblem) -- a goal shape, a
//!   multiset of pieces, optional voxels, group constraints -- to a
//!   cover [`Problem`] and lifts the answers back into geometric
//!   placements;
//! - the [`Disassembler`](puzzle::disassembler::Disassembler) searches
//!   breadth-first for sequences of rigid moves that take a finished
//!   assembly apart, sharing identical sub-assembly states in a DAG.
//!
//! Grid geometry stays behind the [`Grid`](grid::Grid) trait, so the
//! engines never touch coordinates; [`CubicGrid`](grids::CubicGrid) is
//! the bundled implementation.
//!
//! [exact cover]: https://en.wikipedia.org/wiki/Exact_cover
//!
//! # Basic example
//!
//! ```
//! use polycube_solver::grids::CubicGrid;
//! use polycube_solver::puzzle::assembly::Assembler;
//! use polycube_solver::puzzle::{AssemblyProblem, Piece};
//! use polycube_solver::vector::Vector3D;
//!
//! // Fill a 1x1x3 bar with unit cubes and at most one domino.
//! let bar = |len: i32| Piece::new((0..len).map(|x| Vector3D::new(x, 0, 0)));
//!
//! let mut problem = AssemblyProblem::new(bar(3));
//! problem.add_piece_range("cube", bar(1), 1, 3);
//! problem.add_piece_range("domino", bar(2), 0, 1);
//!
//! let outcome = Assembler::new(&CubicGrid, problem).solve(&mut ()).unwrap();
//! assert_eq!(outcome.solutions.len(), 3);
//! ```

pub mod vector;

pub mod callback;
pub mod error;
pub mod grid;
pub mod grids;

pub mod dlx;
pub mod problem;
pub mod solver;

pub mod puzzle;

pub use callback::StatusCallback;
pub use error::SolverError;
pub use problem::Problem;
pub use solver::CoverSolver;
