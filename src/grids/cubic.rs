//! The standard cubic lattice.

use crate::grid::Grid;
use crate::vector::{RotationMatrix, Vector3D, MIRRORS, ROTATIONS};

/// A rigid transform of the cubic lattice: a rotation about the origin
/// followed by a translation.
///
/// The rotation is an index into the signed-permutation tables
/// (`0..24` proper rotations, `24..48` mirror images); index 0 is the
/// identity.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Default, Debug)]
pub struct CubicTransform {
    pub rotation: u8,
    pub translation: Vector3D,
}

impl CubicTransform {
    pub const IDENTITY: CubicTransform = CubicTransform {
        rotation: 0,
        translation: Vector3D { x: 0, y: 0, z: 0 },
    };

    fn matrix(&self) -> &'static RotationMatrix {
        let r = self.rotation as usize;
        if r < 24 { &ROTATIONS[r] } else { &MIRRORS[r - 24] }
    }

    fn apply_one(&self, v: Vector3D) -> Vector3D {
        v.rotate(self.matrix()) + self.translation
    }
}

/// An axis-aligned box, inclusive on both corners.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct CubicBounds {
    pub min: Vector3D,
    pub max: Vector3D,
}

impl CubicBounds {
    fn disjoint(&self, other: &CubicBounds) -> bool {
        self.max.x < other.min.x || other.max.x < self.min.x
            || self.max.y < other.min.y || other.max.y < self.min.y
            || self.max.z < other.min.z || other.max.z < self.min.z
    }
}

/// The cubic grid: voxels are integer lattice points, unit disassembly
/// moves are the six axis steps.
#[derive(Default, Clone, Copy, Debug)]
pub struct CubicGrid;

impl Grid for CubicGrid {
    type Voxel = Vector3D;
    type Transform = CubicTransform;
    type Bounds = CubicBounds;

    fn voxel_bounds(&self, voxels: &[Vector3D]) -> CubicBounds {
        let mut min = voxels[0];
        let mut max = voxels[0];
        for v in voxels {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        CubicBounds { min, max }
    }

    fn voxels_in_bounds(&self, bounds: &CubicBounds) -> Vec<Vector3D> {
        let mut voxels = Vec::new();
        for x in bounds.min.x..=bounds.max.x {
            for y in bounds.min.y..=bounds.max.y {
                for z in bounds.min.z..=bounds.max.z {
                    voxels.push(Vector3D { x, y, z });
                }
            }
        }
        voxels
    }

    fn rotations(&self, include_mirrors: bool) -> Vec<CubicTransform> {
        let count = if include_mirrors { 48 } else { 24 };
        (0..count)
            .map(|rotation| CubicTransform { rotation, translation: Vector3D::default() })
            .collect()
    }

    fn translation(&self, from: &Vector3D, to: &Vector3D) -> CubicTransform {
        CubicTransform { rotation: 0, translation: *to - *from }
    }

    fn apply(&self, transform: &CubicTransform, voxels: &[Vector3D]) -> Vec<Vector3D> {
        voxels.iter().map(|&v| transform.apply_one(v)).collect()
    }

    fn origin_translation(&self, voxels: &[Vector3D]) -> CubicTransform {
        let bounds = self.voxel_bounds(voxels);
        self.translation(&bounds.min, &Vector3D::default())
    }

    fn disassembly_transforms(&self) -> Vec<CubicTransform> {
        [
            Vector3D::new(1, 0, 0), Vector3D::new(-1, 0, 0),
            Vector3D::new(0, 1, 0), Vector3D::new(0, -1, 0),
            Vector3D::new(0, 0, 1), Vector3D::new(0, 0, -1),
        ]
        .iter()
        .map(|&translation| CubicTransform { rotation: 0, translation })
        .collect()
    }

    fn is_separate(&self, group_a: &[Vector3D], group_b: &[Vector3D]) -> bool {
        if group_a.is_empty() || group_b.is_empty() {
            return true;
        }
        self.voxel_bounds(group_a).disjoint(&self.voxel_bounds(group_b))
    }
}
