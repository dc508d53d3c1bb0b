// Copyright (C) 2020-2026 Andy Kurnia.

use super::{build, error};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Node(u32);

impl Node {
    #[inline(always)]
    pub fn tile(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline(always)]
    pub fn accepts(&self) -> bool {
        self.0 & 0x800000 != 0
    }

    #[inline(always)]
    pub fn is_end(&self) -> bool {
        self.0 & 0x400000 != 0
    }

    #[inline(always)]
    pub fn arc_index(&self) -> i32 {
        (self.0 & 0x3fffff) as i32
    }
}

// Node 0 points to the dawg, node 1 to the gaddag. Arc index 0 means no
// children. Immutable once loaded, so it can be shared across threads.
pub struct Kwg {
    nodes: Box<[Node]>,
    // largest letter tile anywhere in the graph.
    max_tile: u8,
}

pub static EMPTY_KWG_BYTES: &[u8] = b"\x00\x00\x40\x00\x00\x00\x40\x00";

pub const DAWG_ROOT: i32 = 0;
pub const GADDAG_ROOT: i32 = 1;

const UNSEEN: u8 = 0;
const OPEN: u8 = 1;
const DONE: u8 = 2;

impl std::ops::Index<i32> for Kwg {
    type Output = Node;

    #[inline(always)]
    fn index(&self, i: i32) -> &Node {
        &self.nodes[i as usize]
    }
}

impl Kwg {
    // The whole blob is checked up front so lookups never run off the arena.
    pub fn from_bytes(buf: &[u8]) -> error::EngineResult<Kwg> {
        if buf.len() % 4 != 0 {
            return Err(error::EngineError::CorruptLexicon(format!(
                "{} bytes is not a whole number of nodes",
                buf.len()
            )));
        }
        let kwg_len = buf.len() / 4;
        if kwg_len < 2 {
            return Err(error::EngineError::CorruptLexicon(
                "missing root nodes".into(),
            ));
        }
        if kwg_len > build::MAX_NODES as usize {
            return Err(error::EngineError::CorruptLexicon(format!(
                "{} nodes exceed the format limit",
                kwg_len
            )));
        }
        let nodes = buf
            .chunks_exact(4)
            .map(|b| Node(u32::from_le_bytes([b[0], b[1], b[2], b[3]])))
            .collect::<Box<_>>();
        let mut kwg = Kwg { nodes, max_tile: 0 };
        kwg.max_tile = kwg.check()?;
        Ok(kwg)
    }

    // Returns the largest letter tile.
    fn check(&self) -> error::EngineResult<u8> {
        let len = self.nodes.len();
        for root in [DAWG_ROOT, GADDAG_ROOT] {
            if !self[root].is_end() {
                return Err(error::EngineError::CorruptLexicon(format!(
                    "root node {} is not a list of its own",
                    root
                )));
            }
        }
        // a list starting at p must reach an end marker inside the arena.
        let mut end_seen = false;
        let mut list_ok = vec![false; len];
        for p in (0..len).rev() {
            end_seen = self.nodes[p].is_end() || end_seen;
            list_ok[p] = end_seen;
        }
        for (p, node) in self.nodes.iter().enumerate() {
            let arc = node.arc_index() as usize;
            if arc == 0 {
                continue;
            }
            if arc >= len || arc < 2 {
                return Err(error::EngineError::CorruptLexicon(format!(
                    "node {} points to {} outside 2..{}",
                    p, arc, len
                )));
            }
            if !list_ok[arc] {
                return Err(error::EngineError::CorruptLexicon(format!(
                    "node {} points to an unterminated list at {}",
                    p, arc
                )));
            }
        }
        // separators only appear before the gaddag reaches its dawg part.
        let mut dawg_states = vec![UNSEEN; len];
        let mut gaddag_states = vec![UNSEEN; len];
        let mut separator_arcs = Vec::new();
        let mut max_tile = self.walk_lists(
            self[GADDAG_ROOT].arc_index(),
            &mut gaddag_states,
            Some(&mut separator_arcs),
        )?;
        max_tile = max_tile.max(self.walk_lists(
            self[DAWG_ROOT].arc_index(),
            &mut dawg_states,
            None,
        )?);
        for arc in separator_arcs {
            max_tile = max_tile.max(self.walk_lists(arc, &mut dawg_states, None)?);
        }
        Ok(max_tile)
    }

    // Depth-first over the sibling lists reachable from start, without
    // recursion. Fails on a cycle or an impossible tile. Separator arcs are
    // collected into separator_arcs when given, otherwise a separator fails.
    fn walk_lists(
        &self,
        start: i32,
        states: &mut [u8],
        mut separator_arcs: Option<&mut Vec<i32>>,
    ) -> error::EngineResult<u8> {
        let mut max_tile = 0;
        if start == 0 || states[start as usize] != UNSEEN {
            return Ok(max_tile);
        }
        states[start as usize] = OPEN;
        // (list start, next node in that list or -1 when done)
        let mut stack = vec![(start, start)];
        while let Some(&(list, p)) = stack.last() {
            if p < 0 {
                states[list as usize] = DONE;
                stack.pop();
                continue;
            }
            let node = self[p];
            if let Some(top) = stack.last_mut() {
                top.1 = if node.is_end() { -1 } else { p + 1 };
            }
            let tile = node.tile();
            let arc = node.arc_index();
            if tile >= 64 {
                return Err(error::EngineError::CorruptLexicon(format!(
                    "node {} has tile {}",
                    p, tile
                )));
            }
            if tile == 0 {
                match separator_arcs.as_deref_mut() {
                    Some(separator_arcs) => {
                        if arc != 0 {
                            separator_arcs.push(arc);
                        }
                        continue;
                    }
                    None => {
                        return Err(error::EngineError::CorruptLexicon(format!(
                            "node {} is a separator outside the gaddag",
                            p
                        )));
                    }
                }
            }
            max_tile = max_tile.max(tile);
            if arc != 0 {
                match states[arc as usize] {
                    UNSEEN => {
                        states[arc as usize] = OPEN;
                        stack.push((arc, arc));
                    }
                    OPEN => {
                        return Err(error::EngineError::CorruptLexicon(format!(
                            "node {} leads back to list {}",
                            p, arc
                        )));
                    }
                    _ => {}
                }
            }
        }
        Ok(max_tile)
    }

    pub fn from_sorted_words(
        build_format: build::BuildFormat,
        machine_words: &[Box<[u8]>],
    ) -> error::EngineResult<Kwg> {
        let bin = build::build(build_format, machine_words)
            .map_err(error::EngineError::CorruptLexicon)?;
        Self::from_bytes(&bin)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut ret = Vec::with_capacity(self.nodes.len() * 4);
        for node in self.nodes.iter() {
            ret.extend_from_slice(&node.0.to_le_bytes());
        }
        ret
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    // 0 for an empty lexicon.
    #[inline(always)]
    pub fn max_tile(&self) -> u8 {
        self.max_tile
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self[DAWG_ROOT].arc_index() == 0
    }

    #[inline(always)]
    pub fn has_gaddag(&self) -> bool {
        self[GADDAG_ROOT].arc_index() != 0
    }

    // returns the node for tile among p's children, or -1.
    #[inline(always)]
    pub fn seek(&self, mut p: i32, tile: u8) -> i32 {
        if p >= 0 {
            p = self[p].arc_index();
            if p > 0 {
                loop {
                    let node = self[p];
                    if node.tile() == tile {
                        return p;
                    }
                    if node.is_end() {
                        return -1;
                    }
                    p += 1;
                }
            }
        }
        -1 // intentionally return 0 as -1
    }

    #[inline(always)]
    pub fn child(&self, p: i32, tile: u8) -> Option<i32> {
        let q = self.seek(p, tile);
        if q > 0 { Some(q) } else { None }
    }

    #[inline(always)]
    pub fn is_terminal(&self, p: i32) -> bool {
        p > 0 && self[p].accepts()
    }

    // designated blanks are accepted as their letter.
    pub fn accepts(&self, word: &[u8]) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut p = DAWG_ROOT;
        for &tile in word {
            p = self.seek(p, tile & 0x7f);
            if p <= 0 {
                return false;
            }
        }
        self[p].accepts()
    }

    // Calls f with every word of the dawg, in ascending order.
    pub fn for_each_word<F: FnMut(&[u8])>(&self, mut f: F) {
        fn iter<F: FnMut(&[u8])>(kwg: &Kwg, mut p: i32, word: &mut Vec<u8>, f: &mut F) {
            let l = word.len();
            loop {
                let node = kwg[p];
                word.push(node.tile());
                if node.accepts() {
                    f(word);
                }
                if node.arc_index() != 0 {
                    iter(kwg, node.arc_index(), word, f);
                }
                word.truncate(l);
                if node.is_end() {
                    break;
                }
                p += 1;
            }
        }
        let p = self[DAWG_ROOT].arc_index();
        if p != 0 {
            iter(self, p, &mut Vec::new(), &mut f);
        }
    }

    fn count_words_at(&self, word_counts: &mut [u32], p: i32) -> u32 {
        if word_counts[p as usize] == 0 {
            let node = self[p];
            word_counts[p as usize] = node.accepts() as u32
                + if node.arc_index() != 0 {
                    self.count_words_at(word_counts, node.arc_index())
                } else {
                    0
                }
                + if node.is_end() {
                    0
                } else {
                    self.count_words_at(word_counts, p + 1)
                };
        }
        word_counts[p as usize]
    }

    pub fn count_dawg_words(&self) -> u32 {
        let p = self[DAWG_ROOT].arc_index();
        if p == 0 {
            return 0;
        }
        let mut word_counts = vec![0u32; self.nodes.len()];
        self.count_words_at(&mut word_counts, p)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn english_words(words: &[&str]) -> Vec<Box<[u8]>> {
        let mut v = words
            .iter()
            .map(|w| w.bytes().map(|b| b & 0x3f).collect::<Box<[u8]>>())
            .collect::<Vec<_>>();
        v.sort();
        v.dedup();
        v
    }

    pub(crate) fn english_kwg(words: &[&str]) -> Kwg {
        Kwg::from_sorted_words(build::BuildFormat::Gaddawg, &english_words(words)).unwrap()
    }

    fn word(s: &str) -> Vec<u8> {
        s.bytes().map(|b| b & 0x3f).collect()
    }

    #[test]
    fn accepts_exact_words_only() {
        let kwg = english_kwg(&["CAT", "CATS", "ACT", "AT"]);
        assert!(kwg.accepts(&word("CAT")));
        assert!(kwg.accepts(&word("CATS")));
        assert!(kwg.accepts(&word("AT")));
        assert!(!kwg.accepts(&word("CA")));
        assert!(!kwg.accepts(&word("CATSS")));
        assert!(!kwg.accepts(&word("TAC")));
        assert!(!kwg.accepts(&[]));
        // blank designated as T
        assert!(kwg.accepts(&[3, 1, 0x80 | 20]));
    }

    #[test]
    fn children_and_terminals() {
        let kwg = english_kwg(&["AT", "ATE"]);
        let a = kwg.child(DAWG_ROOT, 1).unwrap();
        assert!(!kwg.is_terminal(a));
        let at = kwg.child(a, 20).unwrap();
        assert!(kwg.is_terminal(at));
        assert!(kwg.child(at, 5).is_some());
        assert!(kwg.child(at, 19).is_none());
        assert!(kwg.child(DAWG_ROOT, 26).is_none());
    }

    #[test]
    fn gaddag_reaches_suffix_through_separator() {
        // CARE read from R leftwards: R A C @ then E.
        let kwg = english_kwg(&["CARE"]);
        assert!(kwg.has_gaddag());
        let mut p = GADDAG_ROOT;
        for t in [18, 1, 3, 0, 5] {
            p = kwg.seek(p, t);
            assert!(p > 0);
        }
        assert!(kwg[p].accepts());
        // the full reversal accepts without separator
        let mut p = GADDAG_ROOT;
        for t in word("ERAC") {
            p = kwg.seek(p, t);
        }
        assert!(kwg.is_terminal(p));
    }

    #[test]
    fn round_trip_preserves_vocabulary() {
        let vocab = ["AA", "AB", "ABA", "BAA", "CAB", "CABS", "SCAB", "ZZZ"];
        let kwg = english_kwg(&vocab);
        let bytes = kwg.to_bytes();
        let reloaded = Kwg::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.to_bytes(), bytes);
        for w in vocab {
            assert!(reloaded.accepts(&word(w)), "{}", w);
        }
        for w in ["A", "BA", "CA", "ABAB", "SCABS", "ZZ", "Q"] {
            assert!(!reloaded.accepts(&word(w)), "{}", w);
        }
        let mut listed = Vec::new();
        reloaded.for_each_word(|w| listed.push(w.to_vec()));
        assert_eq!(listed, english_words(&vocab).iter().map(|w| w.to_vec()).collect::<Vec<_>>());
        assert_eq!(reloaded.count_dawg_words(), vocab.len() as u32);
    }

    #[test]
    fn empty_blob_loads_as_empty_lexicon() {
        let kwg = Kwg::from_bytes(EMPTY_KWG_BYTES).unwrap();
        assert!(kwg.is_empty());
        assert!(!kwg.accepts(&word("A")));
        assert_eq!(kwg.count_dawg_words(), 0);
    }

    #[test]
    fn corrupt_blobs_are_rejected() {
        let bytes = english_kwg(&["CAT", "DOG"]).to_bytes();
        // truncated mid-node
        assert!(matches!(
            Kwg::from_bytes(&bytes[..bytes.len() - 1]),
            Err(error::EngineError::CorruptLexicon(_))
        ));
        // truncated on a node boundary loses list ends or arc targets
        assert!(Kwg::from_bytes(&bytes[..bytes.len() - 4]).is_err());
        // too short for the roots
        assert!(Kwg::from_bytes(&bytes[..4]).is_err());
        // arc index out of range
        let mut bad = bytes.clone();
        bad[0] = 0xff;
        bad[1] = 0xff;
        bad[2] |= 0x3f;
        assert!(Kwg::from_bytes(&bad).is_err());
    }

    fn blob(nodes: &[u32]) -> Vec<u8> {
        nodes.iter().flat_map(|node| node.to_le_bytes()).collect()
    }

    const END: u32 = 0x400000;
    const ACCEPTS: u32 = 0x800000;

    #[test]
    fn cycles_are_rejected() {
        // A loops back to its own list, so A, AA, AAA... would all be words.
        let self_loop = blob(&[END | 2, END, (1 << 24) | ACCEPTS | END | 2]);
        assert!(matches!(
            Kwg::from_bytes(&self_loop),
            Err(error::EngineError::CorruptLexicon(_))
        ));
        // A -> B -> A.
        let two_step = blob(&[END | 2, END, (1 << 24) | END | 3, (2 << 24) | ACCEPTS | END | 2]);
        assert!(Kwg::from_bytes(&two_step).is_err());
        // through the gaddag separator into the dawg part and back.
        let via_separator = blob(&[END, END | 2, END | 3, (1 << 24) | ACCEPTS | END | 2]);
        assert!(Kwg::from_bytes(&via_separator).is_err());
        // two lists sharing a child is fine.
        let shared = blob(&[
            END | 2,
            END,
            (1 << 24) | 4,
            (2 << 24) | END | 4,
            (20 << 24) | ACCEPTS | END,
        ]);
        let kwg = Kwg::from_bytes(&shared).unwrap();
        assert_eq!(kwg.count_dawg_words(), 2);
        assert_eq!(kwg.max_tile(), 20);
    }

    #[test]
    fn impossible_tiles_are_rejected() {
        let separator_in_dawg = blob(&[END | 2, END, ACCEPTS | END]);
        assert!(Kwg::from_bytes(&separator_in_dawg).is_err());
        let tile_too_big = blob(&[END | 2, END, (70 << 24) | ACCEPTS | END]);
        assert!(Kwg::from_bytes(&tile_too_big).is_err());
        assert_eq!(english_kwg(&["CARE", "ZA"]).max_tile(), 26);
        assert_eq!(Kwg::from_bytes(EMPTY_KWG_BYTES).unwrap().max_tile(), 0);
    }
}
