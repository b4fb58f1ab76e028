// square cost matrix, used for both the cost table and the live structure

use crate::sg_interface::{Cost, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymMatrix {
    size: usize,
    cells: Vec<Cost>,
}

impl SymMatrix {
    pub fn zeroed(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build from rows, no symmetry check
    pub fn from_rows(rows: &[Vec<Cost>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: NodeId, j: NodeId) -> Cost {
        self.cells[i * self.size + j]
    }

    pub fn row(&self, i: NodeId) -> &[Cost] {
        &self.cells[i * self.size..(i + 1) * self.size]
    }

    /// Write `[i][j]` and `[j][i]`
    pub fn set_pair(&mut self, i: NodeId, j: NodeId, value: Cost) {
        self.cells[i * self.size + j] = value;
        self.cells[j * self.size + i] = value;
    }

    /// Zero the row and column of `i`
    pub fn clear_node(&mut self, i: NodeId) {
        for j in 0..self.size {
            self.set_pair(i, j, 0);
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0);
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.size).all(|i| self.get(i, i) == 0)
    }

    /// Non-zero cells above the diagonal, row-major
    pub fn upper_entries(&self) -> impl Iterator<Item = (NodeId, NodeId, Cost)> + '_ {
        (0..self.size).flat_map(move |i| {
            ((i + 1)..self.size).filter_map(move |j| {
                let cost = self.get(i, j);
                (cost != 0).then_some((i, j, cost))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pair_is_symmetric() {
        let mut m = SymMatrix::zeroed(3);
        m.set_pair(0, 2, 7);
        assert_eq!(m.get(0, 2), 7);
        assert_eq!(m.get(2, 0), 7);
        assert!(m.is_symmetric());
        assert!(m.has_zero_diagonal());
    }

    #[test]
    fn test_clear_node_zeroes_row_and_column() {
        let mut m = SymMatrix::zeroed(3);
        m.set_pair(0, 1, 4);
        m.set_pair(1, 2, 5);
        m.set_pair(0, 2, 6);

        m.clear_node(1);
        assert!(m.row(1).iter().all(|c| *c == 0));
        assert_eq!(m.get(0, 1), 0);
        assert_eq!(m.get(2, 1), 0);
        assert_eq!(m.get(0, 2), 6);
    }

    #[test]
    fn test_upper_entries_skip_zero_cells() {
        let m = SymMatrix::from_rows(&[vec![0, 3, 0], vec![3, 0, -2], vec![0, -2, 0]]).unwrap();
        let entries: Vec<_> = m.upper_entries().collect();
        assert_eq!(entries, vec![(0, 1, 3), (1, 2, -2)]);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(SymMatrix::from_rows(&[vec![0, 1], vec![1]]).is_none());
    }
}
