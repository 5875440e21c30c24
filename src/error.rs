//! Error kinds surfaced by the solver, reducer, and disassembler.

use thiserror::Error;

/// Errors produced by the crate's engines.
///
/// Infeasibility variants describe expected outcomes under a bad puzzle
/// configuration, not bugs; their messages name the offending piece or
/// counts. Every engine fails fast at the top of the call, before any
/// callback fires.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// A row referenced a column outside the matrix.
    #[error("column index {index} is out of range for a matrix with {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },

    /// A row was added with no columns at all.
    #[error("a row must cover at least one column")]
    EmptyRow,

    /// A column range with min > max.
    #[error("column {column} has an invalid range {min}..={max}")]
    InvalidRange { column: usize, min: usize, max: usize },

    /// A row was added to a column whose range forbids any use.
    #[error("column {0} has max = 0 and cannot appear in a row")]
    UnusableColumn(usize),

    /// A subset referenced an element with no declared constraint.
    #[error("subset {subset} references an unknown constraint element")]
    UnknownConstraint { subset: String },

    /// The problem contains no pieces.
    #[error("the problem contains no pieces")]
    EmptyProblem,

    /// The goal shape has no voxels.
    #[error("the goal shape has no voxels")]
    EmptyGoal,

    /// A piece has no voxels.
    #[error("piece {0} has no voxels")]
    EmptyPiece(String),

    /// A piece usage range with min > max.
    #[error("piece {piece} has an invalid usage range {min}..={max}")]
    PieceRangeInvalid {
        piece: String,
        min: usize,
        max: usize,
    },

    /// A group constraint named a piece the problem does not contain.
    #[error("group #{group} references unknown piece {piece}")]
    UnknownGroupPiece { group: usize, piece: String },

    /// The piece multiset cannot match the goal's voxel count.
    #[error(
        "the pieces supply between {piece_min} and {piece_max} voxels \
         but the goal needs between {goal_min} and {goal_max}"
    )]
    VoxelCountMismatch {
        piece_min: usize,
        piece_max: usize,
        goal_min: usize,
        goal_max: usize,
    },

    /// A required piece has no placement inside the goal.
    #[error("piece {0} does not fit anywhere in the goal")]
    UnplaceablePiece(String),

    /// A piece's minimum count exceeds its number of placements.
    #[error("piece {piece} must be used {min} times but has only {placements} placements")]
    PieceMinUnsatisfiable {
        piece: String,
        min: usize,
        placements: usize,
    },

    /// Optional voxels are only supported on the goal piece.
    #[error("piece {0} has optional voxels, which only the goal supports")]
    OptionalVoxelsUnsupported(String),

    /// A single-shot engine was invoked a second time.
    #[error("this disassembler has already run; construct a new one")]
    AlreadyRun,

    /// An internal invariant failed while lifting solver output.
    #[error("internal solver error: {0}")]
    Internal(String),
}
