//! Polycube puzzle problems: pieces, placements, and solutions.
//!
//! An [`AssemblyProblem`] asks whether a multiset of pieces can be
//! assembled into a goal shape. The [`Assembler`](assembly::Assembler)
//! reduces it to a cover [`Problem`](crate::problem::Problem); a
//! [`Disassembler`](disassembler::Disassembler) checks whether a found
//! assembly can be taken apart again.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::problem::Value;

pub mod assembly;
pub mod disassembler;
pub mod disassembly;
pub mod symmetry;

/// A puzzle piece: an unordered set of voxels, some of which may be
/// marked optional.
///
/// Optional voxels make sense on a goal shape only — a solution may
/// leave them uncovered. The coordinates are kept exactly as given;
/// placement enumeration normalizes on the fly.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
pub struct Piece<V: Value + Ord> {
    voxels: Vec<V>,
    optional: IndexSet<V>,
}

impl<V: Value + Ord> Piece<V> {
    /// Creates a piece from a list of voxels. Duplicates are dropped.
    pub fn new<I: IntoIterator<Item = V>>(voxels: I) -> Piece<V> {
        let dedup: IndexSet<V> = voxels.into_iter().collect();
        Piece {
            voxels: dedup.into_iter().collect(),
            optional: IndexSet::new(),
        }
    }

    /// Marks a voxel of the piece as optional.
    ///
    /// Unknown voxels are ignored; they cannot affect placements.
    pub fn set_optional(&mut self, voxel: V) {
        if self.voxels.contains(&voxel) {
            self.optional.insert(voxel);
        }
    }

    /// Returns the list of voxels in the piece.
    pub fn voxels(&self) -> &[V] { &self.voxels }

    /// Returns the optional voxels of the piece.
    pub fn optional(&self) -> &IndexSet<V> { &self.optional }

    /// Whether the given voxel is optional.
    pub fn is_optional(&self, voxel: &V) -> bool {
        self.optional.contains(voxel)
    }

    /// Number of voxels a placement of this piece always covers.
    pub fn required_count(&self) -> usize {
        self.voxels.len() - self.optional.len()
    }
}

/// A piece of an [`AssemblyProblem`] together with its usage range.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct CountedPiece<V: Value + Ord> {
    pub piece: Piece<V>,
    pub min: usize,
    pub max: usize,
}

/// Requires exactly `count` placements drawn from a set of pieces.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct GroupConstraint<N> {
    pub pieces: Vec<N>,
    pub count: usize,
}

/// An assembly problem: a goal shape, a multiset of candidate pieces,
/// and optional piece-group constraints.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct AssemblyProblem<N: Value, V: Value + Ord> {
    goal: Piece<V>,
    pieces: IndexMap<N, CountedPiece<V>>,
    groups: Vec<GroupConstraint<N>>,
    remove_symmetries: bool,
}

impl<N: Value, V: Value + Ord> AssemblyProblem<N, V> {
    pub fn new(goal: Piece<V>) -> AssemblyProblem<N, V> {
        AssemblyProblem {
            goal,
            pieces: IndexMap::new(),
            groups: Vec::new(),
            remove_symmetries: false,
        }
    }

    /// Returns a reference to the goal piece.
    pub fn goal(&self) -> &Piece<V> { &self.goal }
    /// Returns the candidate pieces with their usage ranges.
    pub fn pieces(&self) -> &IndexMap<N, CountedPiece<V>> { &self.pieces }
    /// Returns the piece-group constraints.
    pub fn groups(&self) -> &[GroupConstraint<N>] { &self.groups }
    /// Whether symmetric solutions are reduced to one representative.
    pub fn removes_symmetries(&self) -> bool { self.remove_symmetries }

    /// Adds a piece used exactly `count` times.
    ///
    /// If the piece name already exists, the piece is replaced.
    pub fn add_piece(&mut self, name: N, piece: Piece<V>, count: usize) {
        self.add_piece_range(name, piece, count, count);
    }

    /// Adds a piece used between `min` and `max` times.
    pub fn add_piece_range(&mut self, name: N, piece: Piece<V>, min: usize, max: usize) {
        self.pieces.insert(name, CountedPiece { piece, min, max });
    }

    /// Adds a piece-group constraint.
    pub fn add_group<I: IntoIterator<Item = N>>(&mut self, pieces: I, count: usize) {
        self.groups.push(GroupConstraint { pieces: pieces.into_iter().collect(), count });
    }

    /// Requests one solution per symmetry class of the goal.
    pub fn set_remove_symmetries(&mut self, remove: bool) {
        self.remove_symmetries = remove;
    }
}

/// One use of a piece inside a solution: the piece, its instance
/// number, and the rigid transform that places it in the goal.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
pub struct Placement<N, T, V> {
    pub piece: N,
    /// 1-based occurrence number among placements of the same piece.
    pub instance: usize,
    pub rotation: T,
    pub translation: T,
    pub voxels: Vec<V>,
}

impl<N: fmt::Display, T, V> Placement<N, T, V> {
    /// The derived instance identity, e.g. `A#2`.
    pub fn label(&self) -> String {
        format!("{}#{}", self.piece, self.instance)
    }
}

/// A set of placements covering the goal.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct AssemblySolution<N, T, V> {
    pub placements: Vec<Placement<N, T, V>>,
}

impl<N: Value, T, V: Value + Ord> AssemblySolution<N, T, V> {
    /// The solution's pieces in place, keyed by (piece, instance), in
    /// the form the disassembler consumes.
    pub fn placed_pieces(&self) -> Vec<PlacedPiece<(N, usize), V>> {
        self.placements
            .iter()
            .map(|p| PlacedPiece {
                name: (p.piece.clone(), p.instance),
                voxels: p.voxels.clone(),
            })
            .collect()
    }
}

/// A piece somewhere in space, identified by name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(test, derive(Debug))]
pub struct PlacedPiece<N, V> {
    pub name: N,
    pub voxels: Vec<V>,
}
