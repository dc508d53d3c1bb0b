// Copyright (C) 2020-2026 Andy Kurnia.

pub struct Tile<'a> {
    label: &'a str,
    blank_label: &'a str,
    freq: u8,
    score: i8,
    is_vowel: bool,
}

pub struct StaticAlphabet<'a> {
    tiles: &'a [Tile<'a>],
    num_tiles: u16,
}

pub enum Alphabet<'a> {
    Static(StaticAlphabet<'a>),
}

impl<'a> Alphabet<'a> {
    #[inline(always)]
    pub fn len(&self) -> u8 {
        match self {
            Alphabet::Static(x) => x.tiles.len() as u8,
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    #[inline(always)]
    pub fn get(&self, idx: u8) -> &'a Tile<'a> {
        match self {
            Alphabet::Static(x) => &x.tiles[idx as usize],
        }
    }

    #[inline(always)]
    pub fn num_tiles(&self) -> u16 {
        match self {
            Alphabet::Static(x) => x.num_tiles,
        }
    }

    #[inline(always)]
    pub fn from_board(&self, idx: u8) -> Option<&'a str> {
        let c = idx & 0x7f;
        if c == 0 || c >= self.len() {
            None
        } else if idx & 0x80 == 0 {
            Some(self.get(c).label)
        } else {
            Some(self.get(c).blank_label)
        }
    }

    #[inline(always)]
    pub fn from_rack(&self, idx: u8) -> Option<&'a str> {
        if idx >= self.len() {
            None
        } else {
            Some(self.get(idx).label)
        }
    }

    // designated blanks are worth the blank's score.
    #[inline(always)]
    pub fn score(&self, idx: u8) -> i8 {
        self.get(if idx & 0x80 == 0 { idx } else { 0 }).score
    }

    #[inline(always)]
    pub fn is_vowel(&self, idx: u8) -> bool {
        self.get(idx & 0x7f).is_vowel
    }

    #[inline(always)]
    pub fn freq(&self, idx: u8) -> u8 {
        self.get(idx).freq
    }

    // bits 1..len, one per letter (bit 0 is never a letter).
    #[inline(always)]
    pub fn letters_mask(&self) -> u64 {
        ((1u64 << self.len()) - 1) & !1
    }

    pub fn fmt_rack(&self, rack: &[u8]) -> String {
        let mut s = String::new();
        for &tile in rack {
            s.push_str(self.from_rack(tile).unwrap_or("#"));
        }
        s
    }

    pub fn fmt_word(&self, word: &[u8]) -> String {
        let mut s = String::new();
        for &tile in word {
            s.push_str(self.from_board(tile).unwrap_or("."));
        }
        s
    }

    // the declared bag size must match the distribution exactly.
    pub fn check(&self) -> Result<(), String> {
        if self.len() < 2 {
            return Err("alphabet has no letters".into());
        }
        if self.len() > 63 {
            return Err(format!(
                "alphabet has {} tiles, cross-sets only fit 63",
                self.len()
            ));
        }
        let total = (0..self.len())
            .map(|tile| self.freq(tile) as u16)
            .sum::<u16>();
        if total != self.num_tiles() {
            return Err(format!(
                "bag declares {} tiles but the distribution adds up to {}",
                self.num_tiles(),
                total
            ));
        }
        Ok(())
    }
}

// Tile labels may be multi-byte, so lookups go by first byte, longest first.
pub struct AlphabetReader {
    supported_tiles: Box<[Vec<(Box<[u8]>, u8)>]>,
}

impl AlphabetReader {
    fn new(labels: impl Iterator<Item = (&'static str, u8)>) -> Self {
        let mut supported_tiles = vec![Vec::new(); 256].into_boxed_slice();
        for (label, tile) in labels {
            let bytes = label.as_bytes();
            if bytes.is_empty() {
                continue;
            }
            let bucket: &mut Vec<(Box<[u8]>, u8)> = &mut supported_tiles[bytes[0] as usize];
            if !bucket.iter().any(|(b, _)| &b[..] == bytes) {
                bucket.push((bytes.into(), tile));
            }
        }
        for bucket in supported_tiles.iter_mut() {
            bucket.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        }
        Self { supported_tiles }
    }

    // words in lexicon files: either case reads as the natural letter.
    pub fn new_for_words(alphabet: &Alphabet<'static>) -> Self {
        Self::new((1..alphabet.len()).flat_map(|tile| {
            let t = alphabet.get(tile);
            [(t.label, tile), (t.blank_label, tile)]
        }))
    }

    // racks: letters plus the blank label as tile 0.
    pub fn new_for_racks(alphabet: &Alphabet<'static>) -> Self {
        Self::new((0..alphabet.len()).map(|tile| (alphabet.get(tile).label, tile)))
    }

    // board squares: lowercase-style labels mean designated blanks.
    pub fn new_for_plays(alphabet: &Alphabet<'static>) -> Self {
        Self::new((1..alphabet.len()).flat_map(|tile| {
            let t = alphabet.get(tile);
            [(t.label, tile), (t.blank_label, tile | 0x80)]
        }))
    }

    #[inline(always)]
    pub fn next_tile(&self, sb: &[u8], ix: usize) -> Option<(u8, usize)> {
        let bucket = &self.supported_tiles[*sb.get(ix)? as usize];
        for (label, tile) in bucket.iter() {
            if sb[ix..].starts_with(label) {
                return Some((*tile, ix + label.len()));
            }
        }
        None
    }

    pub fn read(&self, s: &str) -> Option<Vec<u8>> {
        let sb = s.as_bytes();
        let mut v = Vec::with_capacity(sb.len());
        let mut ix = 0;
        while ix < sb.len() {
            let (tile, end_ix) = self.next_tile(sb, ix)?;
            v.push(tile);
            ix = end_ix;
        }
        Some(v)
    }
}

pub fn make_english_alphabet() -> Alphabet<'static> {
    Alphabet::Static(StaticAlphabet {
        tiles: &ENGLISH_TILES,
        num_tiles: 100,
    })
}

pub fn make_icelandic_alphabet() -> Alphabet<'static> {
    Alphabet::Static(StaticAlphabet {
        tiles: &ICELANDIC_TILES,
        num_tiles: 100,
    })
}

macro_rules! tile {
    ($label:expr, $blank_label:expr, $freq:expr, $score:expr, $is_vowel:expr) => {
        Tile {
            label: $label,
            blank_label: $blank_label,
            freq: $freq,
            score: $score,
            is_vowel: $is_vowel,
        }
    };
}

static ENGLISH_TILES: [Tile<'static>; 27] = [
    tile!("?", "?", 2, 0, false),
    tile!("A", "a", 9, 1, true),
    tile!("B", "b", 2, 3, false),
    tile!("C", "c", 2, 3, false),
    tile!("D", "d", 4, 2, false),
    tile!("E", "e", 12, 1, true),
    tile!("F", "f", 2, 4, false),
    tile!("G", "g", 3, 2, false),
    tile!("H", "h", 2, 4, false),
    tile!("I", "i", 9, 1, true),
    tile!("J", "j", 1, 8, false),
    tile!("K", "k", 1, 5, false),
    tile!("L", "l", 4, 1, false),
    tile!("M", "m", 2, 3, false),
    tile!("N", "n", 6, 1, false),
    tile!("O", "o", 8, 1, true),
    tile!("P", "p", 2, 3, false),
    tile!("Q", "q", 1, 10, false),
    tile!("R", "r", 6, 1, false),
    tile!("S", "s", 4, 1, false),
    tile!("T", "t", 6, 1, false),
    tile!("U", "u", 4, 1, true),
    tile!("V", "v", 2, 4, false),
    tile!("W", "w", 2, 4, false),
    tile!("X", "x", 1, 8, false),
    tile!("Y", "y", 2, 4, false),
    tile!("Z", "z", 1, 10, false),
];

// the lowercase form is the natural spelling in Icelandic word lists.
static ICELANDIC_TILES: [Tile<'static>; 33] = [
    tile!("?", "?", 2, 0, false),
    tile!("A", "a", 11, 1, true),
    tile!("Á", "á", 2, 3, true),
    tile!("B", "b", 1, 5, false),
    tile!("D", "d", 1, 5, false),
    tile!("Ð", "ð", 4, 2, false),
    tile!("E", "e", 3, 3, true),
    tile!("É", "é", 1, 7, true),
    tile!("F", "f", 3, 3, false),
    tile!("G", "g", 3, 3, false),
    tile!("H", "h", 1, 4, false),
    tile!("I", "i", 7, 1, true),
    tile!("Í", "í", 1, 4, true),
    tile!("J", "j", 1, 6, false),
    tile!("K", "k", 4, 2, false),
    tile!("L", "l", 5, 2, false),
    tile!("M", "m", 3, 2, false),
    tile!("N", "n", 7, 1, false),
    tile!("O", "o", 1, 5, true),
    tile!("Ó", "ó", 2, 3, true),
    tile!("P", "p", 1, 5, false),
    tile!("R", "r", 8, 1, false),
    tile!("S", "s", 7, 1, false),
    tile!("T", "t", 6, 2, false),
    tile!("U", "u", 6, 2, true),
    tile!("Ú", "ú", 1, 4, true),
    tile!("V", "v", 1, 5, false),
    tile!("X", "x", 1, 10, false),
    tile!("Y", "y", 1, 6, true),
    tile!("Ý", "ý", 1, 5, true),
    tile!("Þ", "þ", 1, 7, false),
    tile!("Æ", "æ", 2, 4, true),
    tile!("Ö", "ö", 1, 6, true),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distributions_match_declared_bag_sizes() {
        make_english_alphabet().check().unwrap();
        make_icelandic_alphabet().check().unwrap();
    }

    #[test]
    fn check_rejects_miscounted_bag() {
        let broken = Alphabet::Static(StaticAlphabet {
            tiles: &ENGLISH_TILES,
            num_tiles: 99,
        });
        assert!(broken.check().unwrap_err().contains("adds up to 100"));
    }

    #[test]
    fn blanks_score_zero() {
        let alphabet = make_english_alphabet();
        assert_eq!(alphabet.score(26), 10);
        assert_eq!(alphabet.score(0x80 | 26), 0);
        assert_eq!(alphabet.from_board(0x80 | 26), Some("z"));
        assert_eq!(alphabet.from_board(0), None);
    }

    #[test]
    fn reader_handles_multibyte_labels() {
        let alphabet = make_icelandic_alphabet();
        let reader = AlphabetReader::new_for_words(&alphabet);
        // "þæð" in lowercase, "ÁA" in uppercase
        assert_eq!(reader.read("þæð"), Some(vec![30, 31, 5]));
        assert_eq!(reader.read("ÁA"), Some(vec![2, 1]));
        assert_eq!(reader.read("c"), None);
        let racks = AlphabetReader::new_for_racks(&alphabet);
        assert_eq!(racks.read("?Ö"), Some(vec![0, 32]));
        let plays = AlphabetReader::new_for_plays(&alphabet);
        assert_eq!(plays.read("Áá"), Some(vec![2, 0x82]));
    }

    #[test]
    fn letters_mask_excludes_blank() {
        let alphabet = make_english_alphabet();
        let mask = alphabet.letters_mask();
        assert_eq!(mask & 1, 0);
        assert_eq!(mask.count_ones(), 26);
        assert_ne!(mask & (1 << 26), 0);
    }
}
