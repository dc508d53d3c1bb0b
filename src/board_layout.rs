// Copyright (C) 2020-2026 Andy Kurnia.

use super::matrix;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Premium {
    pub word_multiplier: i8,
    pub tile_multiplier: i8,
}

pub static TWS: Premium = Premium {
    word_multiplier: 3,
    tile_multiplier: 1,
};
pub static DWS: Premium = Premium {
    word_multiplier: 2,
    tile_multiplier: 1,
};
pub static TLS: Premium = Premium {
    word_multiplier: 1,
    tile_multiplier: 3,
};
pub static DLS: Premium = Premium {
    word_multiplier: 1,
    tile_multiplier: 2,
};
pub static FVS: Premium = Premium {
    word_multiplier: 1,
    tile_multiplier: 1,
};

pub struct StaticBoardLayout {
    premiums: Box<[Premium]>,
    dim: matrix::Dim,
    star_row: i8,
    star_col: i8,
}

pub enum BoardLayout {
    Static(StaticBoardLayout),
}

impl BoardLayout {
    // one string per row: '=' TWS, '-' DWS, '"' TLS, '\'' DLS, '*' star (DWS), ' ' or '.' plain.
    pub fn from_rows(rows: &[&str]) -> Result<Self, String> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, |row| row.chars().count());
        if num_rows == 0 || num_cols == 0 || num_rows > 64 || num_cols > 64 {
            return Err(format!("unsupported board size {}x{}", num_rows, num_cols));
        }
        let mut premiums = Vec::with_capacity(num_rows * num_cols);
        let mut star = None;
        for (r, row) in rows.iter().enumerate() {
            if row.chars().count() != num_cols {
                return Err(format!("row {} does not have {} columns", r, num_cols));
            }
            for (c, ch) in row.chars().enumerate() {
                premiums.push(match ch {
                    '=' => TWS,
                    '-' => DWS,
                    '"' => TLS,
                    '\'' => DLS,
                    ' ' | '.' => FVS,
                    '*' => {
                        if star.is_some() {
                            return Err("board has more than one star".into());
                        }
                        star = Some((r as i8, c as i8));
                        DWS
                    }
                    _ => return Err(format!("invalid premium {:?} at row {} col {}", ch, r, c)),
                });
            }
        }
        let (star_row, star_col) = star.unwrap_or(((num_rows / 2) as i8, (num_cols / 2) as i8));
        Ok(BoardLayout::Static(StaticBoardLayout {
            premiums: premiums.into_boxed_slice(),
            dim: matrix::Dim {
                rows: num_rows as i8,
                cols: num_cols as i8,
            },
            star_row,
            star_col,
        }))
    }

    #[inline(always)]
    pub fn premiums(&self) -> &[Premium] {
        match self {
            BoardLayout::Static(x) => &x.premiums,
        }
    }

    #[inline(always)]
    pub fn dim(&self) -> matrix::Dim {
        match self {
            BoardLayout::Static(x) => x.dim,
        }
    }

    #[inline(always)]
    pub fn star_row(&self) -> i8 {
        match self {
            BoardLayout::Static(x) => x.star_row,
        }
    }

    #[inline(always)]
    pub fn star_col(&self) -> i8 {
        match self {
            BoardLayout::Static(x) => x.star_col,
        }
    }

    #[inline(always)]
    pub fn premium_at(&self, row: i8, col: i8) -> Premium {
        self.premiums()[self.dim().at_row_col(row, col)]
    }
}

static STANDARD_ROWS: [&str; 15] = [
    "=  '   =   '  =",
    " -   \"   \"   - ",
    "  -   ' '   -  ",
    "'  -   '   -  '",
    "    -     -    ",
    " \"   \"   \"   \" ",
    "  '   ' '   '  ",
    "=  '   *   '  =",
    "  '   ' '   '  ",
    " \"   \"   \"   \" ",
    "    -     -    ",
    "'  -   '   -  '",
    "  -   ' '   -  ",
    " -   \"   \"   - ",
    "=  '   =   '  =",
];

pub fn make_standard_board_layout() -> BoardLayout {
    match BoardLayout::from_rows(&STANDARD_ROWS) {
        Ok(board_layout) => board_layout,
        Err(e) => unreachable!("standard board layout: {}", e),
    }
}
