//! Breadth-first disassembly search over rigid moves.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::callback::StatusCallback;
use crate::error::SolverError;
use crate::grid::Grid;
use crate::problem::Value;
use crate::puzzle::disassembly::{
    canonicalize, ChildEdge, DagNode, Disassembly, DisassemblyDag, DisassemblyStep, NodeIndex,
};
use crate::puzzle::PlacedPiece;

/// A movable subset of the current sub-assembly, already slid to its
/// final position.
struct Movement<T, V> {
    members: Vec<usize>,
    transform: T,
    repeat: usize,
    separates: bool,
    moved: Vec<Vec<V>>,
}

/// Searches for ways to take a placed assembly apart.
///
/// The search runs breadth-first over sub-assembly states. States
/// reached along different paths are merged by their canonical form, so
/// the explored space is a DAG of shared subtrees rather than a tree.
///
/// A disassembler is single-shot: calling [`disassemble`] twice is an
/// error.
///
/// [`disassemble`]: Disassembler::disassemble
pub struct Disassembler<'g, G: Grid, N: Value + Ord> {
    grid: &'g G,
    pieces: Vec<PlacedPiece<N, G::Voxel>>,
    find_all: bool,
    ran: bool,
}

impl<'g, G: Grid, N: Value + Ord> Disassembler<'g, G, N> {
    pub fn new(grid: &'g G, pieces: Vec<PlacedPiece<N, G::Voxel>>) -> Disassembler<'g, G, N> {
        Disassembler { grid, pieces, find_all: false, ran: false }
    }

    /// Keeps searching after the first complete disassembly is found.
    pub fn set_find_all(&mut self, find_all: bool) {
        self.find_all = find_all;
    }

    /// Runs the search and extracts the disassembly sequences.
    ///
    /// An assembly that cannot be taken apart yields an empty list;
    /// that is an answer, not an error.
    pub fn disassemble(
        &mut self,
        status: &mut impl StatusCallback,
    ) -> Result<Vec<Disassembly<N, G::Transform>>, SolverError> {
        if self.ran {
            return Err(SolverError::AlreadyRun);
        }
        self.ran = true;

        if self.pieces.len() <= 1 {
            // Nothing to take apart.
            return Ok(vec![Disassembly { steps: vec![] }]);
        }

        let grid = self.grid;
        let root = canonicalize(grid, &self.pieces);
        let mut dag = DisassemblyDag::new(DagNode::new(0, root.clone()));
        let mut index_by_key: IndexMap<Vec<PlacedPiece<N, G::Voxel>>, NodeIndex> =
            IndexMap::new();
        index_by_key.insert(root, 0);

        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        queue.push_back(0);
        let mut processed = 0usize;

        'search: while let Some(current) = queue.pop_front() {
            processed += 1;
            status.on_progress(processed as f64 / dag.nodes.len() as f64, None);

            let placements = dag.nodes[current].placements.clone();
            let depth = dag.nodes[current].depth;

            let mut movements = enumerate_movements(grid, &placements);
            if let Some(pos) = pick_separating(&movements) {
                // A separation never constrains later moves; exploring
                // the alternatives next to one is wasted work.
                let kept = movements.swap_remove(pos);
                movements = vec![kept];
            }

            for movement in movements {
                let parts = movement_parts(&placements, &movement);

                // Resolve every part before committing any new node, so
                // a pruned edge leaves no orphans behind.
                let mut resolved: Vec<PartRef<N, G::Voxel>> = Vec::new();
                let mut prune = false;
                for part in parts {
                    if part.len() == 1 {
                        resolved.push(PartRef::Leaf);
                        continue;
                    }
                    let key = canonicalize(grid, &part);
                    match index_by_key.get(&key) {
                        Some(&found) if dag.nodes[found].depth <= depth => {
                            // Going no deeper cannot shorten anything.
                            prune = true;
                            break;
                        }
                        Some(&found) => resolved.push(PartRef::Known(found)),
                        None => resolved.push(PartRef::New(key)),
                    }
                }
                if prune {
                    continue;
                }

                // An edge duplicates another iff it reaches the same
                // multiset of children; only fully-known edges can.
                if resolved.iter().all(|p| !matches!(p, PartRef::New(_))) {
                    let mut children: Vec<Option<NodeIndex>> = resolved
                        .iter()
                        .map(|p| match p {
                            PartRef::Known(i) => Some(*i),
                            _ => None,
                        })
                        .collect();
                    children.sort_unstable();
                    let duplicate = dag.nodes[current].edges.iter().any(|edge| {
                        let mut existing = edge.parts.clone();
                        existing.sort_unstable();
                        existing == children
                    });
                    if duplicate {
                        continue;
                    }
                }

                let mut edge_parts: Vec<Option<NodeIndex>> = Vec::new();
                for part in resolved {
                    match part {
                        PartRef::Leaf => edge_parts.push(None),
                        PartRef::Known(found) => edge_parts.push(Some(found)),
                        PartRef::New(key) => {
                            let index = dag.nodes.len();
                            dag.nodes.push(DagNode::new(depth + 1, key.clone()));
                            index_by_key.insert(key, index);
                            queue.push_back(index);
                            edge_parts.push(Some(index));
                        }
                    }
                }
                for part in edge_parts.iter().flatten() {
                    if !dag.nodes[*part].parents.contains(&current) {
                        dag.nodes[*part].parents.push(current);
                    }
                }

                let step = DisassemblyStep {
                    pieces: movement.members.iter().map(|&m| placements[m].name.clone()).collect(),
                    transform: movement.transform,
                    repeat: movement.repeat,
                    separates: movement.separates,
                };
                let solvable_now = edge_parts
                    .iter()
                    .all(|p| p.map_or(true, |j| dag.nodes[j].solved));
                dag.nodes[current].edges.push(ChildEdge { step, parts: edge_parts });

                if solvable_now {
                    dag.mark_solved_from(current);
                    if !self.find_all && dag.nodes[0].solved {
                        break 'search;
                    }
                }
            }
        }

        debug!(
            "disassembly search finished: {} nodes, root solved: {}",
            dag.nodes.len(),
            dag.nodes[0].solved,
        );
        status.on_log(&format!(
            "disassembly graph has {} states; assembly {} be taken apart",
            dag.nodes.len(),
            if dag.nodes[0].solved { "can" } else { "cannot" },
        ));

        Ok(dag.extract(self.find_all))
    }
}

enum PartRef<N, V> {
    Leaf,
    Known(NodeIndex),
    New(Vec<PlacedPiece<N, V>>),
}

/// The sub-assemblies a movement leaves behind: the whole group with
/// the members shifted, or the two sides of a separation.
fn movement_parts<N: Value, T, V: Value + Ord>(
    placements: &[PlacedPiece<N, V>],
    movement: &Movement<T, V>,
) -> Vec<Vec<PlacedPiece<N, V>>> {
    let member_set: IndexSet<usize> = movement.members.iter().copied().collect();
    let moved: Vec<PlacedPiece<N, V>> = movement
        .members
        .iter()
        .zip(&movement.moved)
        .map(|(&m, voxels)| PlacedPiece {
            name: placements[m].name.clone(),
            voxels: voxels.clone(),
        })
        .collect();
    let rest: Vec<PlacedPiece<N, V>> = placements
        .iter()
        .enumerate()
        .filter(|(i, _)| !member_set.contains(i))
        .map(|(_, p)| p.clone())
        .collect();

    if movement.separates {
        vec![rest, moved]
    } else {
        let mut whole = rest;
        whole.extend(moved);
        vec![whole]
    }
}

/// Lists the legal movements of a sub-assembly.
///
/// For every unit transform, movable subsets grow by collision closure
/// from each seed piece: whatever the moving group would push into has
/// to move along. A closure that swallows the whole group is a drift of
/// the assembly, not a move. Each subset then slides step by step until
/// it is blocked or comes apart from the rest.
fn enumerate_movements<G: Grid, N: Value + Ord>(
    grid: &G,
    placements: &[PlacedPiece<N, G::Voxel>],
) -> Vec<Movement<G::Transform, G::Voxel>> {
    let n = placements.len();
    let piece_sets: Vec<IndexSet<G::Voxel>> = placements
        .iter()
        .map(|p| p.voxels.iter().cloned().collect())
        .collect();

    let mut movements = Vec::new();
    for transform in grid.disassembly_transforms() {
        let mut seen: IndexSet<Vec<usize>> = IndexSet::new();

        for seed in 0..n {
            // Collision closure of one unit step.
            let mut in_group = vec![false; n];
            in_group[seed] = true;
            let mut members = vec![seed];
            loop {
                let moved: Vec<G::Voxel> = members
                    .iter()
                    .flat_map(|&m| grid.apply(&transform, &placements[m].voxels))
                    .collect();
                let mut grew = false;
                for j in 0..n {
                    if !in_group[j] && moved.iter().any(|v| piece_sets[j].contains(v)) {
                        in_group[j] = true;
                        members.push(j);
                        grew = true;
                    }
                }
                if !grew {
                    break;
                }
            }
            if members.len() == n {
                continue;
            }
            members.sort_unstable();
            if !seen.insert(members.clone()) {
                continue;
            }

            movements.extend(slide(grid, placements, &piece_sets, members, &transform));
        }
    }
    movements
}

/// Slides a movable subset one unit at a time. Every collision-free
/// position becomes a movement with its repeat count; the first
/// position separate from the rest ends the slide.
fn slide<G: Grid, N: Value + Ord>(
    grid: &G,
    placements: &[PlacedPiece<N, G::Voxel>],
    piece_sets: &[IndexSet<G::Voxel>],
    members: Vec<usize>,
    transform: &G::Transform,
) -> Vec<Movement<G::Transform, G::Voxel>> {
    let member_set: IndexSet<usize> = members.iter().copied().collect();
    let mut rest_voxels: Vec<G::Voxel> = Vec::new();
    let mut rest_set: IndexSet<G::Voxel> = IndexSet::new();
    for (i, set) in piece_sets.iter().enumerate() {
        if !member_set.contains(&i) {
            rest_voxels.extend(set.iter().cloned());
            rest_set.extend(set.iter().cloned());
        }
    }

    let mut current: Vec<Vec<G::Voxel>> = members
        .iter()
        .map(|&m| placements[m].voxels.clone())
        .collect();
    let mut movements = Vec::new();
    let mut repeat = 0;

    loop {
        current = current
            .iter()
            .map(|voxels| grid.apply(transform, voxels))
            .collect();
        repeat += 1;
        let flat: Vec<G::Voxel> = current.iter().flatten().cloned().collect();

        if grid.is_separate(&flat, &rest_voxels) {
            movements.push(Movement {
                members,
                transform: transform.clone(),
                repeat,
                separates: true,
                moved: current,
            });
            return movements;
        }
        if flat.iter().any(|v| rest_set.contains(v)) {
            return movements; // blocked before coming apart
        }
        movements.push(Movement {
            members: members.clone(),
            transform: transform.clone(),
            repeat,
            separates: false,
            moved: current.clone(),
        });
    }
}

/// The index of the separating movement to keep, preferring one that
/// peels off a single piece.
fn pick_separating<T, V>(movements: &[Movement<T, V>]) -> Option<usize> {
    let mut fallback = None;
    for (i, movement) in movements.iter().enumerate() {
        if movement.separates {
            if movement.members.len() == 1 {
                return Some(i);
            }
            if fallback.is_none() {
                fallback = Some(i);
            }
        }
    }
    fallback
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grids::cubic::CubicGrid;
    use crate::vector::Vector3D;

    fn cube(name: &'static str, x: i32, y: i32) -> PlacedPiece<&'static str, Vector3D> {
        PlacedPiece { name, voxels: vec![Vector3D::new(x, y, 0)] }
    }

    #[test]
    fn side_by_side_pieces_come_apart_in_one_move() {
        let grid = CubicGrid;
        let mut disassembler = Disassembler::new(&grid, vec![cube("a", 0, 0), cube("b", 1, 0)]);
        let result = disassembler.disassemble(&mut ()).unwrap();

        assert_eq!(result.len(), 1);
        let steps = &result[0].steps;
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].repeat, 1);
        assert!(steps[0].separates);
        assert_eq!(steps[0].pieces.len(), 1);
    }

    #[test]
    fn disassembler_is_single_shot() {
        let grid = CubicGrid;
        let mut disassembler = Disassembler::new(&grid, vec![cube("a", 0, 0), cube("b", 1, 0)]);
        disassembler.disassemble(&mut ()).unwrap();
        assert_eq!(
            disassembler.disassemble(&mut ()).unwrap_err(),
            SolverError::AlreadyRun,
        );
    }

    #[test]
    fn single_piece_is_already_apart() {
        let grid = CubicGrid;
        let mut disassembler = Disassembler::new(&grid, vec![cube("a", 0, 0)]);
        let result = disassembler.disassemble(&mut ()).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].steps.is_empty());
    }

    #[test]
    fn flat_interlock_lifts_apart_along_z() {
        // Two halves of a 2x2x1 block holding opposite corners:
        //   a b     moving either piece along x or y collides, but
        //   b a     lifting one along z frees it in a single step.
        let grid = CubicGrid;
        let a = PlacedPiece {
            name: "a",
            voxels: vec![Vector3D::new(0, 1, 0), Vector3D::new(1, 0, 0)],
        };
        let b = PlacedPiece {
            name: "b",
            voxels: vec![Vector3D::new(0, 0, 0), Vector3D::new(1, 1, 0)],
        };
        let mut disassembler = Disassembler::new(&grid, vec![a, b]);
        let result = disassembler.disassemble(&mut ()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].steps.len(), 1);
        assert!(result[0].steps[0].separates);
    }
}
