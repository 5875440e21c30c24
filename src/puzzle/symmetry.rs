//! Goal symmetry analysis for solution reduction.
//!
//! The goal's stabilizer (the rotations that map its voxel set onto
//! itself) acts on the placements of every piece. Restricting one
//! well-chosen piece to a single representative per orbit removes the
//! corresponding symmetric copies from the solution set.

use indexmap::IndexMap;

use crate::grid::Grid;
use crate::problem::Value;

/// Reports which piece broke the goal's symmetry and by how much.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct SymmetryInfo<N> {
    pub piece: N,
    /// Order of the goal's rotation stabilizer, identity included.
    pub group_order: usize,
    /// Placement count of the breaker divided by its orbit count.
    pub factor: f64,
}

/// The position-normalized, sorted form of a voxel set.
pub(crate) fn canonical_form<G: Grid>(grid: &G, voxels: &[G::Voxel]) -> Vec<G::Voxel> {
    let t = grid.origin_translation(voxels);
    let mut canon = grid.apply(&t, voxels);
    canon.sort();
    canon
}

/// The goal's stabilizer under the grid's proper rotations.
///
/// Each element is returned together with the translation that maps the
/// rotated goal back onto the original, so the pair acts on anything
/// placed inside the goal. The identity is element 0.
pub(crate) fn goal_stabilizer<G: Grid>(
    grid: &G,
    goal: &[G::Voxel],
) -> Vec<(G::Transform, G::Transform)> {
    let canon = canonical_form(grid, goal);
    let first = goal.iter().min().cloned();

    let mut stabilizer = Vec::new();
    for rotation in grid.rotations(false) {
        let rotated = grid.apply(&rotation, goal);
        if canonical_form(grid, &rotated) != canon {
            continue;
        }
        // The rotated goal is a translated copy of the original, so
        // matching the first voxels in the translation-invariant order
        // recovers the offset.
        let (from, to) = match (rotated.iter().min(), &first) {
            (Some(from), Some(to)) => (from.clone(), to.clone()),
            _ => continue,
        };
        let fixup = grid.translation(&from, &to);
        stabilizer.push((rotation, fixup));
    }
    stabilizer
}

/// Partitions a piece's placements into stabilizer orbits and returns
/// one representative index per orbit (the smallest).
pub(crate) fn orbit_representatives<G: Grid>(
    grid: &G,
    stabilizer: &[(G::Transform, G::Transform)],
    placements: &[Vec<G::Voxel>],
) -> Vec<usize> {
    let mut by_voxels: IndexMap<Vec<G::Voxel>, usize> = IndexMap::new();
    for (i, voxels) in placements.iter().enumerate() {
        let mut key = voxels.clone();
        key.sort();
        by_voxels.insert(key, i);
    }

    let mut visited = vec![false; placements.len()];
    let mut representatives = Vec::new();

    for i in 0..placements.len() {
        if visited[i] {
            continue;
        }
        representatives.push(i);
        visited[i] = true;

        let mut stack = vec![i];
        while let Some(j) = stack.pop() {
            for (rotation, fixup) in stabilizer {
                let rotated = grid.apply(rotation, &placements[j]);
                let mut image = grid.apply(fixup, &rotated);
                image.sort();
                if let Some(&k) = by_voxels.get(&image) {
                    if !visited[k] {
                        visited[k] = true;
                        stack.push(k);
                    }
                }
            }
        }
    }
    representatives
}

/// Picks the symmetry breaker among the candidate pieces: the one whose
/// placements shrink the most, i.e. with the highest placement count
/// per orbit.
///
/// Returns the winning candidate's position plus its representative
/// placement indices, or `None` when no candidate gains anything.
pub(crate) fn choose_breaker<G: Grid, N: Value>(
    grid: &G,
    stabilizer: &[(G::Transform, G::Transform)],
    candidates: &[(N, Vec<Vec<G::Voxel>>)],
) -> Option<(usize, Vec<usize>, f64)> {
    let mut best: Option<(usize, Vec<usize>, f64)> = None;
    for (pos, (_, placements)) in candidates.iter().enumerate() {
        if placements.is_empty() {
            continue;
        }
        let reps = orbit_representatives(grid, stabilizer, placements);
        let factor = placements.len() as f64 / reps.len() as f64;
        let better = match &best {
            Some((_, _, best_factor)) => factor > *best_factor,
            None => factor > 1.0,
        };
        if better {
            best = Some((pos, reps, factor));
        }
    }
    best
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grids::cubic::CubicGrid;
    use crate::vector::Vector3D;

    fn bar() -> Vec<Vector3D> {
        (0..3).map(|x| Vector3D::new(x, 0, 0)).collect()
    }

    #[test]
    fn bar_stabilizer_has_order_eight() {
        // Four rotations about the bar's axis, times the end swap.
        let stab = goal_stabilizer(&CubicGrid, &bar());
        assert_eq!(stab.len(), 8);
    }

    #[test]
    fn unit_cube_stabilizer_is_the_full_rotation_group() {
        let stab = goal_stabilizer(&CubicGrid, &[Vector3D::new(0, 0, 0)]);
        assert_eq!(stab.len(), 24);
    }

    #[test]
    fn bar_end_placements_share_an_orbit() {
        let grid = CubicGrid;
        let stab = goal_stabilizer(&grid, &bar());
        let placements: Vec<Vec<Vector3D>> =
            bar().into_iter().map(|v| vec![v]).collect();
        let reps = orbit_representatives(&grid, &stab, &placements);
        // The two ends are symmetric; the middle voxel stands alone.
        assert_eq!(reps, vec![0, 1]);
    }
}
