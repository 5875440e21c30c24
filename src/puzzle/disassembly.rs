//! The disassembly DAG: shared sub-assembly states, solved-state
//! propagation, and move-sequence extraction.

use crate::grid::Grid;
use crate::problem::Value;
use crate::puzzle::PlacedPiece;

/// Index of a node in the disassembly DAG.
pub type NodeIndex = usize;

/// One rigid move: a set of pieces shifted by a unit transform,
/// possibly several times in a row.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
pub struct DisassemblyStep<N, T> {
    pub pieces: Vec<N>,
    pub transform: T,
    pub repeat: usize,
    /// Whether the move splits the assembly into two parts.
    pub separates: bool,
}

/// An ordered sequence of steps taking an assembly apart completely.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
pub struct Disassembly<N, T> {
    pub steps: Vec<DisassemblyStep<N, T>>,
}

/// An edge of the DAG: the step plus the resulting parts.
///
/// A move yields one part, or two when it separates the assembly. A
/// `None` part is a single piece that needs no further disassembly.
#[cfg_attr(test, derive(Debug))]
pub(crate) struct ChildEdge<N, T> {
    pub step: DisassemblyStep<N, T>,
    pub parts: Vec<Option<NodeIndex>>,
}

/// A sub-assembly state, canonicalized by translating to the origin
/// and sorting the pieces by identity.
#[cfg_attr(test, derive(Debug))]
pub(crate) struct DagNode<N, V, T> {
    pub depth: usize,
    pub placements: Vec<PlacedPiece<N, V>>,
    pub edges: Vec<ChildEdge<N, T>>,
    pub parents: Vec<NodeIndex>,
    pub solved: bool,
}

impl<N, V, T> DagNode<N, V, T> {
    pub fn new(depth: usize, placements: Vec<PlacedPiece<N, V>>) -> DagNode<N, V, T> {
        DagNode {
            depth,
            placements,
            edges: Vec::new(),
            parents: Vec::new(),
            solved: false,
        }
    }
}

/// The node arena of a disassembly search. Node 0 is the root.
#[cfg_attr(test, derive(Debug))]
pub(crate) struct DisassemblyDag<N, V, T> {
    pub nodes: Vec<DagNode<N, V, T>>,
}

impl<N: Value, V: Value, T: Clone> DisassemblyDag<N, V, T> {
    pub fn new(root: DagNode<N, V, T>) -> DisassemblyDag<N, V, T> {
        DisassemblyDag { nodes: vec![root] }
    }

    /// Whether every part of the edge is a leaf or a solved node.
    pub fn edge_solved(&self, edge: &ChildEdge<N, T>) -> bool {
        edge.parts
            .iter()
            .all(|part| part.map_or(true, |j| self.nodes[j].solved))
    }

    /// Re-evaluates a node after one of its edges became solvable and
    /// propagates the solved flag towards the root, stopping at nodes
    /// that are already solved.
    pub fn mark_solved_from(&mut self, start: NodeIndex) {
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            if self.nodes[i].solved {
                continue;
            }
            let solvable = self.nodes[i]
                .edges
                .iter()
                .any(|edge| self.edge_solved(edge));
            if solvable {
                self.nodes[i].solved = true;
                stack.extend(self.nodes[i].parents.iter().copied());
            }
        }
    }

    /// Enumerates disassembly sequences from the root.
    ///
    /// At every recursion step each currently independent sub-assembly
    /// advances along one of its solved edges; the Cartesian product of
    /// those choices spans all sequences. An unsolved root yields an
    /// empty list.
    pub fn extract(&self, find_all: bool) -> Vec<Disassembly<N, T>> {
        if self.nodes.is_empty() || !self.nodes[0].solved {
            return vec![];
        }
        let limit = if find_all { usize::MAX } else { 1 };
        let mut out = Vec::new();
        let mut steps = Vec::new();
        self.extract_rec(&[0], &mut steps, &mut out, limit);
        out
    }

    fn extract_rec(
        &self,
        active: &[NodeIndex],
        steps: &mut Vec<DisassemblyStep<N, T>>,
        out: &mut Vec<Disassembly<N, T>>,
        limit: usize,
    ) {
        if out.len() >= limit {
            return;
        }
        if active.is_empty() {
            out.push(Disassembly { steps: steps.clone() });
            return;
        }

        let options: Vec<Vec<&ChildEdge<N, T>>> = active
            .iter()
            .map(|&i| {
                self.nodes[i]
                    .edges
                    .iter()
                    .filter(|edge| self.edge_solved(edge))
                    .collect()
            })
            .collect();
        if options.iter().any(|edges| edges.is_empty()) {
            return;
        }

        let mut combo = vec![0usize; active.len()];
        loop {
            let kept = steps.len();
            let mut next_active = Vec::new();
            for (slot, edges) in options.iter().enumerate() {
                let edge = edges[combo[slot]];
                steps.push(edge.step.clone());
                next_active.extend(edge.parts.iter().flatten().copied());
            }
            self.extract_rec(&next_active, steps, out, limit);
            steps.truncate(kept);
            if out.len() >= limit {
                return;
            }

            // Odometer over the edge choices.
            let mut slot = 0;
            loop {
                if slot == combo.len() {
                    return;
                }
                combo[slot] += 1;
                if combo[slot] < options[slot].len() {
                    break;
                }
                combo[slot] = 0;
                slot += 1;
            }
        }
    }
}

/// Canonicalizes a sub-assembly: translate the whole group to the
/// origin, sort each piece's voxels, then sort the pieces.
pub(crate) fn canonicalize<G: Grid, N: Value + Ord>(
    grid: &G,
    pieces: &[PlacedPiece<N, G::Voxel>],
) -> Vec<PlacedPiece<N, G::Voxel>> {
    let all: Vec<G::Voxel> = pieces
        .iter()
        .flat_map(|p| p.voxels.iter().cloned())
        .collect();
    let t = grid.origin_translation(&all);

    let mut canonical: Vec<PlacedPiece<N, G::Voxel>> = pieces
        .iter()
        .map(|p| {
            let mut voxels = grid.apply(&t, &p.voxels);
            voxels.sort();
            PlacedPiece { name: p.name.clone(), voxels }
        })
        .collect();
    canonical.sort();
    canonical
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grids::cubic::{CubicGrid, CubicTransform};
    use crate::vector::Vector3D;

    fn step(name: &'static str) -> DisassemblyStep<&'static str, u8> {
        DisassemblyStep { pieces: vec![name], transform: 0, repeat: 1, separates: true }
    }

    fn leaf_edge(name: &'static str) -> ChildEdge<&'static str, u8> {
        ChildEdge { step: step(name), parts: vec![None, None] }
    }

    #[test]
    fn solved_state_propagates_to_the_root() {
        let placements: Vec<PlacedPiece<&str, u8>> = vec![];
        let mut dag = DisassemblyDag::new(DagNode::new(0, placements.clone()));
        dag.nodes.push(DagNode::new(1, placements.clone()));
        dag.nodes[0].edges.push(ChildEdge { step: step("a"), parts: vec![Some(1), None] });
        dag.nodes[1].parents.push(0);

        assert!(!dag.nodes[0].solved);
        dag.nodes[1].edges.push(leaf_edge("b"));
        dag.mark_solved_from(1);
        assert!(dag.nodes[1].solved);
        assert!(dag.nodes[0].solved);
    }

    #[test]
    fn extract_walks_the_cartesian_product() {
        // Root separates into two sub-assemblies; the first has two
        // solved edges, the second one, so two full sequences exist.
        let placements: Vec<PlacedPiece<&str, u8>> = vec![];
        let mut dag = DisassemblyDag::new(DagNode::new(0, placements.clone()));
        dag.nodes.push(DagNode::new(1, placements.clone()));
        dag.nodes.push(DagNode::new(1, placements.clone()));
        dag.nodes[0].edges.push(ChildEdge { step: step("split"), parts: vec![Some(1), Some(2)] });
        dag.nodes[1].parents.push(0);
        dag.nodes[2].parents.push(0);
        dag.nodes[1].edges.push(leaf_edge("x"));
        dag.nodes[1].edges.push(leaf_edge("y"));
        dag.nodes[2].edges.push(leaf_edge("z"));
        dag.mark_solved_from(1);
        dag.mark_solved_from(2);

        let all = dag.extract(true);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].steps.len(), 3);
        assert_eq!(all[0].steps[0], step("split"));

        let first = dag.extract(false);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn unsolved_root_yields_nothing() {
        let placements: Vec<PlacedPiece<&str, u8>> = vec![];
        let dag: DisassemblyDag<&str, u8, u8> = DisassemblyDag::new(DagNode::new(0, placements));
        assert!(dag.extract(true).is_empty());
    }

    #[test]
    fn canonical_form_merges_translated_states() {
        let grid = CubicGrid;
        let state = |offset: i32| {
            vec![
                PlacedPiece {
                    name: "b",
                    voxels: vec![Vector3D::new(offset + 1, 0, 0)],
                },
                PlacedPiece {
                    name: "a",
                    voxels: vec![Vector3D::new(offset, 0, 0)],
                },
            ]
        };
        let canon: Vec<PlacedPiece<&str, Vector3D>> = canonicalize(&grid, &state(0));
        assert_eq!(canon, canonicalize(&grid, &state(7)));
        // Pieces come back sorted by identity.
        assert_eq!(canon[0].name, "a");
        let _: CubicTransform = grid.origin_translation(&canon[0].voxels);
    }
}
