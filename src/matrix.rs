// Copyright (C) 2020-2026 Andy Kurnia.

// a lane (one row or one column) seen as a one-dimensional run of squares.
#[derive(Clone, Copy, Debug)]
pub struct Strider {
    base: i16,
    step: i8,
    len: i8,
}

impl Strider {
    #[inline(always)]
    pub fn base(&self) -> i16 {
        self.base
    }

    #[inline(always)]
    pub fn step(&self) -> i8 {
        self.step
    }

    #[inline(always)]
    pub fn len(&self) -> i8 {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn at(&self, idx: i8) -> usize {
        ((self.base as isize) + (idx as isize) * (self.step as isize)) as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dim {
    pub rows: i8,
    pub cols: i8,
}

impl Dim {
    #[inline(always)]
    pub fn across(&self, row: i8) -> Strider {
        Strider {
            base: (row as i16) * (self.cols as i16),
            step: 1,
            len: self.cols,
        }
    }

    #[inline(always)]
    pub fn down(&self, col: i8) -> Strider {
        Strider {
            base: col as i16,
            step: self.cols,
            len: self.rows,
        }
    }

    #[inline(always)]
    pub fn lane(&self, down: bool, lane: i8) -> Strider {
        if down {
            self.down(lane)
        } else {
            self.across(lane)
        }
    }

    // number of lanes running in the given direction.
    #[inline(always)]
    pub fn num_lanes(&self, down: bool) -> i8 {
        if down { self.cols } else { self.rows }
    }

    #[inline(always)]
    pub fn at_row_col(&self, row: i8, col: i8) -> usize {
        (((row as isize) * (self.cols as isize)) + (col as isize)) as usize
    }

    #[inline(always)]
    pub fn row_col(&self, idx: usize) -> (i8, i8) {
        (
            (idx / self.cols as usize) as i8,
            (idx % self.cols as usize) as i8,
        )
    }

    #[inline(always)]
    pub fn contains(&self, row: i8, col: i8) -> bool {
        (0..self.rows).contains(&row) && (0..self.cols).contains(&col)
    }

    #[inline(always)]
    pub fn area(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn striders_walk_rows_and_columns() {
        let dim = Dim { rows: 3, cols: 4 };
        let across = dim.across(1);
        assert_eq!(
            (0..across.len()).map(|i| across.at(i)).collect::<Vec<_>>(),
            vec![4, 5, 6, 7]
        );
        let down = dim.down(2);
        assert_eq!(
            (0..down.len()).map(|i| down.at(i)).collect::<Vec<_>>(),
            vec![2, 6, 10]
        );
        assert_eq!(dim.lane(true, 2).at(1), down.at(1));
    }

    #[test]
    fn row_col_inverts_at_row_col() {
        let dim = Dim { rows: 15, cols: 15 };
        for idx in [0, 14, 15, 112, 224] {
            let (r, c) = dim.row_col(idx);
            assert_eq!(dim.at_row_col(r, c), idx);
        }
        assert!(dim.contains(14, 0));
        assert!(!dim.contains(15, 0));
        assert!(!dim.contains(0, -1));
        assert_eq!(dim.area(), 225);
    }
}
