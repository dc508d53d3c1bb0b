// Copyright (C) 2020-2026 Andy Kurnia.

use super::{alphabet, board_layout, movegen};
use std::fmt::Write;

#[inline(always)]
pub fn empty_label(board_layout: &board_layout::BoardLayout, row: i8, col: i8) -> &'static str {
    if row == board_layout.star_row() && col == board_layout.star_col() {
        return "*";
    }
    let premium = board_layout.premium_at(row, col);
    match (premium.word_multiplier, premium.tile_multiplier) {
        (3, _) => "=",
        (2, _) => "-",
        (_, 3) => "\"",
        (_, 2) => "'",
        _ => " ",
    }
}

#[inline(always)]
pub fn board_label<'a>(
    alphabet: &'a alphabet::Alphabet<'a>,
    board_layout: &board_layout::BoardLayout,
    board_tiles: &[u8],
    row: i8,
    col: i8,
) -> &'a str {
    alphabet
        .from_board(board_tiles[board_layout.dim().at_row_col(row, col)])
        .unwrap_or_else(|| empty_label(board_layout, row, col))
}

fn push_column_labels(s: &mut String, cols: i8) {
    s.push_str("  ");
    for c in 0..cols {
        s.push(' ');
        s.push(((c as u8) + 0x61) as char);
    }
    s.push('\n');
}

fn push_border(s: &mut String, cols: i8) {
    s.push_str("  +");
    for _ in 1..cols {
        s.push_str("--");
    }
    s.push_str("-+\n");
}

// lowercase letters are blanks.
pub fn board_to_string(
    alphabet: &alphabet::Alphabet<'_>,
    board_layout: &board_layout::BoardLayout,
    board_tiles: &[u8],
) -> String {
    let dim = board_layout.dim();
    let mut s = String::new();
    push_column_labels(&mut s, dim.cols);
    push_border(&mut s, dim.cols);
    for r in 0..dim.rows {
        let _ = write!(s, "{:2}|", r + 1);
        for c in 0..dim.cols {
            if c > 0 {
                s.push(' ');
            }
            s.push_str(board_label(alphabet, board_layout, board_tiles, r, c));
        }
        let _ = writeln!(s, "|{}", r + 1);
    }
    push_border(&mut s, dim.cols);
    push_column_labels(&mut s, dim.cols);
    s
}

pub fn print_board(
    alphabet: &alphabet::Alphabet<'_>,
    board_layout: &board_layout::BoardLayout,
    board_tiles: &[u8],
) {
    print!("{}", board_to_string(alphabet, board_layout, board_tiles));
}

// across plays read row then column ("8H"), down plays column then row ("H8").
pub fn fmt_coord(down: bool, lane: i8, idx: i8) -> String {
    if down {
        format!("{}{}", ((lane as u8) + 0x41) as char, idx + 1)
    } else {
        format!("{}{}", lane + 1, ((idx as u8) + 0x41) as char)
    }
}

// played-through tiles show as '.'.
pub fn fmt_play(alphabet: &alphabet::Alphabet<'_>, play: &movegen::Play) -> String {
    match play {
        movegen::Play::Exchange { tiles } => {
            if tiles.is_empty() {
                "pass".into()
            } else {
                format!("- {}", alphabet.fmt_rack(tiles))
            }
        }
        movegen::Play::Place {
            down,
            lane,
            idx,
            word,
            score,
        } => format!(
            "{} {} {}",
            fmt_coord(*down, *lane, *idx),
            alphabet.fmt_word(word),
            score
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plays_and_boards() {
        let alphabet = alphabet::make_english_alphabet();
        let board_layout = board_layout::make_standard_board_layout();
        let play = movegen::Play::Place {
            down: false,
            lane: 7,
            idx: 6,
            word: [3, 0, 0x94].into(),
            score: 5,
        };
        assert_eq!(fmt_play(&alphabet, &play), "8G C.t 5");
        assert_eq!(fmt_coord(true, 7, 6), "H7");
        assert_eq!(
            fmt_play(&alphabet, &movegen::Play::Exchange { tiles: [0, 17].into() }),
            "- ?Q"
        );
        assert_eq!(
            fmt_play(&alphabet, &movegen::Play::Exchange { tiles: Box::new([]) }),
            "pass"
        );
        let mut board_tiles = vec![0u8; 225];
        board_tiles[7 * 15 + 7] = 1;
        let s = board_to_string(&alphabet, &board_layout, &board_tiles);
        let lines = s.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 19);
        assert_eq!(lines[0], "   a b c d e f g h i j k l m n o");
        assert_eq!(lines[2], " 1|=     '       =       '     =|1");
        assert_eq!(lines[9], " 8|=     '       A       '     =|8");
    }
}
