//! The abstract geometry collaborator consumed by the engines.

use std::hash::Hash;

/// Grid geometry as the combinatorial engines see it.
///
/// A grid owns its voxel encoding; the engines only compare, hash, and
/// order voxels. The `Ord` on [`Grid::Voxel`] must be invariant under
/// translation (translating two voxel sets by the same transform keeps
/// their sorted orders aligned), which lets the engines match up
/// translated copies of a shape by their first sorted voxels.
pub trait Grid {
    /// A single cell of the grid.
    type Voxel: Clone + Eq + Hash + Ord;
    /// A rigid transform (rotation, translation, or a composition).
    type Transform: Clone + Eq + Hash;
    /// An axis-aligned bounding region of the grid.
    type Bounds;

    /// The bounding region of a non-empty voxel set.
    fn voxel_bounds(&self, voxels: &[Self::Voxel]) -> Self::Bounds;

    /// Every voxel inside a bounding region.
    fn voxels_in_bounds(&self, bounds: &Self::Bounds) -> Vec<Self::Voxel>;

    /// The grid's rotation set, optionally including mirror images.
    fn rotations(&self, include_mirrors: bool) -> Vec<Self::Transform>;

    /// The translation taking `from` onto `to`.
    fn translation(&self, from: &Self::Voxel, to: &Self::Voxel) -> Self::Transform;

    /// Applies a transform to each voxel, preserving order.
    fn apply(&self, transform: &Self::Transform, voxels: &[Self::Voxel]) -> Vec<Self::Voxel>;

    /// The translation that moves a voxel set to its canonical position.
    ///
    /// Two voxel sets that differ only by translation map to the same
    /// voxels under their respective origin translations.
    fn origin_translation(&self, voxels: &[Self::Voxel]) -> Self::Transform;

    /// The unit moves available when taking an assembly apart.
    fn disassembly_transforms(&self) -> Vec<Self::Transform>;

    /// Whether two voxel groups are spatially disjoint, tested on
    /// bounding regions. Used to detect separating moves.
    fn is_separate(&self, group_a: &[Self::Voxel], group_b: &[Self::Voxel]) -> bool;
}
