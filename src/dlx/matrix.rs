//! A sparse matrix for the generalized exact cover problem.

use log::trace;

use crate::dlx::callback::Callback;
use crate::error::SolverError;

/// A single node of [`Matrix`].
#[derive(Default)]
#[cfg_attr(test, derive(Debug))]
struct Node {
    // row, col: 1-based b/c of head node (only internally)
    row: usize,
    col: usize,
    left: usize,
    right: usize,
    up: usize,
    down: usize,
}

/// A sparse matrix representation of a generalized exact cover problem.
///
/// Every column carries an occupancy range `min..=max`: a solution must
/// select between `min` and `max` rows with a 1 in that column. The
/// classic exact cover is the all-`1..=1` case; an optional column is
/// `0..=1`; a multi-use column has `max > 1`.
///
/// A column stays in the live header list while its remaining `min` is
/// positive. Covering a column decrements both bounds; the column's
/// rows are only spliced out of the other columns once `max` reaches
/// zero, so a column with budget left keeps accepting rows.
#[cfg_attr(test, derive(Debug))]
pub struct Matrix {
    row_cnt: usize,
    col_cnt: usize,
    pool: Vec<Node>, // head: 0, columns: 1..=col_cnt
    col_size: Vec<usize>,

    // column occupancy range, decremented by cover (may go negative)
    min: Vec<i32>,
    max: Vec<i32>,

    partial_sol: Vec<usize>,
    abort_requested: bool,
}

impl Default for Matrix {
    fn default() -> Matrix {
        Matrix {
            row_cnt: 0,
            col_cnt: 0,
            pool: vec![Node::default()],
            col_size: vec![0],

            min: vec![0],
            max: vec![0],

            partial_sol: vec![],
            abort_requested: false,
        }
    }
}

// Methods for initializing Matrix
impl Matrix {
    const HEAD: usize = 0;

    /// Creates a matrix with `col_cnt` columns, all ranged `1..=1`.
    pub fn new(col_cnt: usize) -> Matrix {
        let mut range_default = vec![1; col_cnt + 1];
        range_default[0] = 0;

        let mut mat = Matrix {
            col_cnt,
            col_size: vec![0; col_cnt + 1],
            min: range_default.clone(),
            max: range_default,
            ..Matrix::default()
        };
        for col_num in 1..=col_cnt {
            let col = mat.create_node(0, col_num);
            mat.insert_right(col - 1, col);
        }
        mat
    }

    pub fn with_rows(col_cnt: usize, rows: &[&[usize]]) -> Result<Matrix, SolverError> {
        let mut mat = Matrix::new(col_cnt);
        for row in rows {
            mat.add_row(row)?;
        }
        Ok(mat)
    }

    pub fn col_cnt(&self) -> usize { self.col_cnt }
    pub fn row_cnt(&self) -> usize { self.row_cnt }

    /// Sets the occupancy range of a column. Only valid before `solve`.
    ///
    /// If `min` crosses zero the column joins or leaves the live header
    /// list. Setting `max` to zero is rejected once the column has rows,
    /// since those rows could never be used.
    pub fn set_range(&mut self, col: usize, min: usize, max: usize) -> Result<(), SolverError> {
        if col < 1 || col > self.col_cnt {
            return Err(SolverError::ColumnOutOfRange { index: col, columns: self.col_cnt });
        }
        if min > max {
            return Err(SolverError::InvalidRange { column: col, min, max });
        }
        if max == 0 && self.col_size[col] > 0 {
            return Err(SolverError::UnusableColumn(col));
        }

        let was_live = self.min[col] > 0;
        self.min[col] = min as i32;
        self.max[col] = max as i32;

        if was_live && min == 0 {
            let Node { left, right, .. } = self.pool[col];
            self.pool[left].right = right;
            self.pool[right].left = left;
        } else if !was_live && min > 0 {
            // Rejoin after the nearest live column to keep header order.
            let mut at = col - 1;
            while at != Matrix::HEAD && self.min[at] == 0 {
                at -= 1;
            }
            self.insert_right(at, col);
        }
        Ok(())
    }

    /// Appends a row given as 1-based column indices.
    ///
    /// The indices must be distinct. Returns the new row's 1-based id.
    pub fn add_row(&mut self, row: &[usize]) -> Result<usize, SolverError> {
        if row.is_empty() {
            return Err(SolverError::EmptyRow);
        }
        for &col_num in row {
            if col_num < 1 || col_num > self.col_cnt {
                return Err(SolverError::ColumnOutOfRange {
                    index: col_num,
                    columns: self.col_cnt,
                });
            }
            if self.max[col_num] == 0 {
                return Err(SolverError::UnusableColumn(col_num));
            }
        }

        self.row_cnt += 1;
        let row_num = self.row_cnt;
        let mut left_node = 0;

        for &col_num in row {
            let node = self.create_node(row_num, col_num);

            self.insert_down(self.pool[col_num].up, node);
            if left_node != 0 {
                self.insert_right(left_node, node);
            }

            self.col_size[col_num] += 1;
            left_node = node;
        }
        Ok(row_num)
    }
}

// Main algorithm (dancing links over ranged columns)
impl Matrix {
    /// Runs the search, reporting every solution through the callback.
    ///
    /// A solution is reported when the live header list is empty; the
    /// search never tries to additionally fill optional columns past
    /// that point.
    pub fn solve(&mut self, callback: &mut impl Callback) {
        trace!(
            "solving cover matrix: {} columns, {} rows",
            self.col_cnt, self.row_cnt,
        );
        self.abort_requested = false;
        self.search(0, callback);
        callback.on_finish();
    }

    /// Requests the search to stop at the next step.
    pub fn abort(&mut self) {
        self.abort_requested = true;
    }

    fn search(&mut self, depth: usize, callback: &mut impl Callback) {
        if self.abort_requested {
            return;
        }
        if self.pool[Matrix::HEAD].right == Matrix::HEAD {
            callback.on_solution(self.partial_sol.clone(), self);
            return;
        }

        // MRV (minimum remaining values) heuristic:
        // choose a live column with minimal branching factor.
        let (col, size) = self.choose_best_col();
        if size == 0 {
            return; // Dead end
        }

        self.cover_col(col);
        // With budget left after the cover, the column's rows survive in
        // the other columns. Each tried row is then tweaked away for the
        // rest of the loop: a deeper re-choice of this column iterates
        // strictly after the rows already tried here, which is what
        // keeps permutations of the same row set from being reported
        // twice.
        let exhausted = self.max[col] <= 0;
        let first = self.pool[col].down;

        let mut tried = 0;
        let mut r = first;
        while r != col {
            if self.abort_requested {
                break;
            }
            if !exhausted {
                self.tweak_row(r);
            }
            self.select_row(r);
            self.partial_sol.push(self.pool[r].row);

            self.search(depth + 1, callback);

            self.partial_sol.pop();
            self.unselect_row(r);

            if depth == 0 {
                tried += 1;
                callback.on_progress(tried as f64 / size as f64, self);
            }
            r = self.pool[r].down;
        }

        if !exhausted {
            self.untweak_rows(col, first);
        }
        self.uncover_col(col);
    }
}

// Helper methods
impl Matrix {
    fn create_node(&mut self, row: usize, col: usize) -> usize {
        let idx = self.pool.len();
        self.pool.push(Node {
            row,
            col,
            left: idx,
            right: idx,
            up: idx,
            down: idx,
        });
        idx
    }

    fn insert_right(&mut self, at: usize, node: usize) {
        let right = self.pool[at].right;
        self.pool[node].right = right;
        self.pool[right].left = node;
        self.pool[node].left = at;
        self.pool[at].right = node;
    }

    fn insert_down(&mut self, at: usize, node: usize) {
        let down = self.pool[at].down;
        self.pool[node].down = down;
        self.pool[down].up = node;
        self.pool[node].up = at;
        self.pool[at].down = node;
    }

    /// Covers column c: one more selected row will count against it.
    ///
    /// Decrements both bounds. The column leaves the live header list
    /// when its `min` reaches zero, and its remaining rows are spliced
    /// out of the other columns only when its `max` reaches zero.
    #[inline]
    fn cover_col(&mut self, c: usize) {
        self.min[c] -= 1;
        self.max[c] -= 1;

        if self.min[c] == 0 {
            let Node { left, right, .. } = self.pool[c];
            self.pool[left].right = right;
            self.pool[right].left = left;
        }
        if self.max[c] == 0 {
            let mut i = self.pool[c].down;
            while i != c {
                self.hide_row(i);
                i = self.pool[i].down;
            }
        }
    }

    /// Uncovers column c: the exact pointer-for-pointer inverse.
    #[inline]
    fn uncover_col(&mut self, c: usize) {
        if self.max[c] == 0 {
            let mut i = self.pool[c].up;
            while i != c {
                self.unhide_row(i);
                i = self.pool[i].up;
            }
        }
        self.max[c] += 1;
        self.min[c] += 1;

        if self.min[c] == 1 {
            let Node { left, right, .. } = self.pool[c];
            self.pool[left].right = c;
            self.pool[right].left = c;
        }
    }

    /// Selects row r by covering the column of each of its other nodes.
    #[inline]
    fn select_row(&mut self, r: usize) {
        let mut j = self.pool[r].right;
        while j != r {
            self.cover_col(self.pool[j].col);
            j = self.pool[j].right;
        }
    }

    /// Unselects row r.
    #[inline]
    fn unselect_row(&mut self, r: usize) {
        let mut j = self.pool[r].left;
        while j != r {
            self.uncover_col(self.pool[j].col);
            j = self.pool[j].left;
        }
    }

    /// Hides row r completely, including from its own column's ring.
    /// It must only be called when r is the first row in the ring.
    /// The name "tweak" is from Knuth's TAOCP fascicle 5.
    #[inline]
    fn tweak_row(&mut self, r: usize) {
        self.hide_row(r);
        let Node { col: c, down: d, .. } = self.pool[r];
        self.pool[c].down = d;
        self.pool[d].up = c;
    }

    /// Untweaks the rows from `first` up to the current ring head,
    /// restoring them in the same order as they were hidden.
    #[inline]
    fn untweak_rows(&mut self, c: usize, first: usize) {
        let head = self.pool[c].down;
        let mut prev = c;
        let mut r = first;
        while r != head {
            self.unhide_row(r);
            self.pool[prev].down = r;
            self.pool[r].up = prev;
            prev = r;
            r = self.pool[r].down;
        }
        self.pool[prev].down = head;
        self.pool[head].up = prev;
    }

    /// Hides row r from the other columns by hiding each of its nodes.
    /// The node in r's own column is left alone; the caller covers or
    /// tweaks it.
    #[inline]
    fn hide_row(&mut self, r: usize) {
        let mut j = self.pool[r].right;
        while j != r {
            self.hide_node(j);
            j = self.pool[j].right;
        }
    }

    /// Unhides row r.
    #[inline]
    fn unhide_row(&mut self, r: usize) {
        let mut j = self.pool[r].left;
        while j != r {
            self.unhide_node(j);
            j = self.pool[j].left;
        }
    }

    /// Hides node j by connecting its up/down nodes.
    #[inline]
    fn hide_node(&mut self, j: usize) {
        let Node { col, up, down, .. } = self.pool[j];
        self.pool[up].down = down;
        self.pool[down].up = up;
        self.col_size[col] -= 1;
    }

    /// Unhides node j.
    #[inline]
    fn unhide_node(&mut self, j: usize) {
        let Node { col, up, down, .. } = self.pool[j];
        self.pool[up].down = j;
        self.pool[down].up = j;
        self.col_size[col] += 1;
    }

    /// Chooses the live column with the lowest `col_size`, breaking
    /// ties towards the first one encountered. (MRV heuristic.)
    #[inline]
    fn choose_best_col(&self) -> (usize, usize) {
        let mut col = self.pool[Matrix::HEAD].right;
        let mut size = self.col_size[col];

        let mut j = self.pool[col].right;
        while j != Matrix::HEAD {
            if self.col_size[j] < size {
                col = j;
                size = self.col_size[j];
            }
            j = self.pool[j].right;
        }
        (col, size)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlx::callback::SolutionCallback;

    fn solve(mat: &mut Matrix) -> Vec<Vec<usize>> {
        let mut callback = SolutionCallback::default();
        mat.solve(&mut callback);
        let mut solutions: Vec<Vec<usize>> = callback
            .solutions
            .into_iter()
            .map(|mut sol| {
                sol.sort_unstable();
                sol
            })
            .collect();
        solutions.sort();
        solutions
    }

    #[test]
    fn knuth_example_has_one_solution() {
        // Columns A..G; the classic instance from Knuth's DLX paper.
        let mut mat = Matrix::with_rows(7, &[
            &[3, 5, 6],
            &[1, 4, 7],
            &[2, 3, 6],
            &[1, 4],
            &[2, 7],
            &[4, 5, 7],
        ])
        .unwrap();
        assert_eq!(solve(&mut mat), vec![vec![1, 4, 5]]);
    }

    #[test]
    fn optional_column_is_not_forced() {
        let mut mat = Matrix::with_rows(3, &[&[1, 2], &[3]]).unwrap();
        mat.set_range(3, 0, 1).unwrap();
        assert_eq!(solve(&mut mat), vec![vec![1]]);
    }

    #[test]
    fn ranged_column_can_be_used_twice() {
        let mut mat = Matrix::with_rows(3, &[&[1, 3], &[2, 3]]).unwrap();
        mat.set_range(3, 0, 2).unwrap();
        assert_eq!(solve(&mut mat), vec![vec![1, 2]]);
    }

    #[test]
    fn multi_use_column_reports_no_duplicate_solutions() {
        // One column used exactly twice, three interchangeable rows:
        // each unordered pair must show up exactly once.
        let mut mat = Matrix::with_rows(1, &[&[1], &[1], &[1]]).unwrap();
        mat.set_range(1, 2, 2).unwrap();
        assert_eq!(solve(&mut mat), vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
    }

    #[test]
    fn min_two_column_needs_two_rows() {
        let mut mat = Matrix::with_rows(2, &[&[1, 2], &[1]]).unwrap();
        mat.set_range(1, 2, 2).unwrap();
        mat.set_range(2, 0, 1).unwrap();
        assert_eq!(solve(&mut mat), vec![vec![1, 2]]);
    }

    #[test]
    fn infeasible_matrix_has_no_solution() {
        let mut mat = Matrix::with_rows(2, &[&[1]]).unwrap();
        assert_eq!(solve(&mut mat), Vec::<Vec<usize>>::new());
    }

    #[test]
    fn add_row_validates_column_indices() {
        let mut mat = Matrix::new(2);
        assert_eq!(
            mat.add_row(&[3]),
            Err(SolverError::ColumnOutOfRange { index: 3, columns: 2 }),
        );
        assert_eq!(mat.add_row(&[]), Err(SolverError::EmptyRow));
    }

    #[test]
    fn set_range_rejects_inverted_range() {
        let mut mat = Matrix::new(2);
        assert_eq!(
            mat.set_range(1, 2, 1),
            Err(SolverError::InvalidRange { column: 1, min: 2, max: 1 }),
        );
    }

    #[test]
    fn cover_then_uncover_restores_the_matrix() {
        let build = || {
            Matrix::with_rows(3, &[&[1, 2], &[2, 3], &[1, 3]]).unwrap()
        };
        let mut mat = build();
        let reference = build();
        for col in 1..=3 {
            mat.cover_col(col);
            mat.uncover_col(col);
            for idx in 0..mat.pool.len() {
                assert_eq!(mat.pool[idx].left, reference.pool[idx].left);
                assert_eq!(mat.pool[idx].right, reference.pool[idx].right);
                assert_eq!(mat.pool[idx].up, reference.pool[idx].up);
                assert_eq!(mat.pool[idx].down, reference.pool[idx].down);
            }
            assert_eq!(mat.col_size, reference.col_size);
            assert_eq!(mat.min, reference.min);
            assert_eq!(mat.max, reference.max);
        }
    }
}
