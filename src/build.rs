// Copyright (C) 2020-2026 Andy Kurnia.

// Builds the packed lexicon graph from a sorted word list. Sibling lists are
// interned by value so identical suffix subgraphs are stored once, and the
// reversed-prefix section reuses the forward section for every suffix.

struct MyHasher(u64);

impl std::hash::Hasher for MyHasher {
    fn finish(&self) -> u64 {
        self.0
    }
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (std::num::Wrapping(self.0) * std::num::Wrapping(3467)).0 ^ (!b as u64);
        }
    }
}

impl Default for MyHasher {
    fn default() -> MyHasher {
        MyHasher(0)
    }
}

type MyHasherDefault = std::hash::BuildHasherDefault<MyHasher>;

// the format has 22 bits of arc index.
pub const MAX_NODES: u32 = 0x400000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildFormat {
    DawgOnly,
    Gaddawg,
}

// An arc still being assembled for the word currently on the stack.
struct PendingArc {
    tile: u8,
    accepts: bool,
    target: u32,
}

// Interned arc. `next` chains siblings, so a whole sibling list is identified
// by its first element and shares its tail with every list ending the same way.
#[derive(Clone, Eq, Hash, PartialEq)]
struct SharedArc {
    tile: u8,
    accepts: bool,
    target: u32,
    next: u32,
}

struct ArcTable {
    arcs: Vec<SharedArc>,
    finder: std::collections::HashMap<SharedArc, u32, MyHasherDefault>,
}

impl ArcTable {
    fn new() -> Self {
        // arc 0 is the sink, it terminates every chain.
        let sink = SharedArc {
            tile: 0,
            accepts: false,
            target: 0,
            next: 0,
        };
        let mut finder = std::collections::HashMap::<_, _, MyHasherDefault>::default();
        finder.insert(sink.clone(), 0);
        Self {
            arcs: vec![sink],
            finder,
        }
    }

    fn intern_list(&mut self, pending: &[PendingArc]) -> u32 {
        let mut ret = 0;
        for arc in pending.iter().rev() {
            let shared = SharedArc {
                tile: arc.tile,
                accepts: arc.accepts,
                target: arc.target,
                next: ret,
            };
            use std::collections::hash_map::Entry::{Occupied, Vacant};
            ret = match self.finder.entry(shared) {
                Occupied(entry) => *entry.get(),
                Vacant(entry) => {
                    let idx = self.arcs.len() as u32;
                    self.arcs.push(entry.key().clone());
                    entry.insert(idx);
                    idx
                }
            };
        }
        ret
    }

    // The forward list reached by reading `tiles` from `start`. The caller
    // guarantees the path exists.
    fn follow(&self, start: u32, tiles: impl Iterator<Item = u8>) -> u32 {
        let mut p = start;
        for sought in tiles {
            while self.arcs[p as usize].tile != sought {
                p = self.arcs[p as usize].next;
            }
            p = self.arcs[p as usize].target;
        }
        p
    }

    // Interns one sorted word list and returns its root list. In the
    // reversed-prefix pass, entries ending with the separator (tile 0) are
    // linked into the forward graph instead of being accepted.
    fn insert_sorted(&mut self, sorted_words: &[Box<[u8]>], forward_root: u32, linking: bool) -> u32 {
        let mut pending = Vec::<PendingArc>::new();
        // depth_starts[d] is where the children of pending[depth_starts[d] - 1] begin.
        let mut depth_starts = Vec::<usize>::new();
        let mut prev_word: &[u8] = &[];
        for word in sorted_words {
            let depth = depth_starts.len();
            let mut common = 0;
            while common < depth.min(word.len()) && prev_word[common] == word[common] {
                common += 1;
            }
            for _ in common..depth {
                self.close_depth(&mut pending, &mut depth_starts);
            }
            for &tile in &word[common..] {
                pending.push(PendingArc {
                    tile,
                    accepts: false,
                    target: 0,
                });
                depth_starts.push(pending.len());
            }
            let last = pending.len() - 1;
            if linking && word[word.len() - 1] == 0 {
                // "AC@" continues as the forward "CA".
                depth_starts.pop();
                pending[last].target =
                    self.follow(forward_root, word[..word.len() - 1].iter().rev().copied());
            } else {
                pending[last].accepts = true;
            }
            prev_word = word;
        }
        while !depth_starts.is_empty() {
            self.close_depth(&mut pending, &mut depth_starts);
        }
        self.intern_list(&pending)
    }

    fn close_depth(&mut self, pending: &mut Vec<PendingArc>, depth_starts: &mut Vec<usize>) {
        if let Some(start) = depth_starts.pop() {
            let target = self.intern_list(&pending[start..]);
            pending[start - 1].target = target;
            pending.truncate(start);
        }
    }
}

// For CARE: ERAC, RAC@, AC@, C@. Suffixes after the separator come from the
// forward graph.
fn gen_reversed_prefixes(words: &[Box<[u8]>]) -> Box<[Box<[u8]>]> {
    let mut set = std::collections::HashSet::<Box<[u8]>, MyHasherDefault>::default();
    let mut buf = Vec::new();
    for word in words {
        buf.clear();
        buf.extend(word.iter().rev());
        set.insert(buf[..].into());
        buf.push(0);
        for skip in 1..word.len() {
            set.insert(buf[skip..].into());
        }
    }
    let mut ret = set.into_iter().collect::<Box<_>>();
    ret.sort_unstable();
    ret
}

// Lays out every reachable sibling list contiguously, which the packed format
// requires. Lists sharing a tail are written once per distinct head.
struct Relocator<'a> {
    arcs: &'a [SharedArc],
    prev: &'a [u32],
    destination: Vec<u32>,
    num_written: u32,
}

impl Relocator<'_> {
    fn place(&mut self, mut p: u32) {
        while self.prev[p as usize] != 0 {
            p = self.prev[p as usize];
        }
        if self.destination[p as usize] != 0 {
            return;
        }
        // marks the list as in progress.
        self.destination[p as usize] = !0;
        let head = p;
        let mut num = 0u32;
        loop {
            num += 1;
            let target = self.arcs[p as usize].target;
            if target != 0 {
                self.place(target);
            }
            p = self.arcs[p as usize].next;
            if p == 0 {
                break;
            }
        }
        let mut write_p = head;
        for ofs in 0..num {
            self.destination[write_p as usize] = self.num_written + ofs;
            write_p = self.arcs[write_p as usize].next;
        }
        self.num_written += num;
    }

    // bits 0-21 = arc index, bit 22 = end of list, bit 23 = accepts, bits 24-31 = tile.
    fn encode(&self, target: u32, is_end: bool, accepts: bool, tile: u8) -> [u8; 4] {
        let arc_index = self.destination[target as usize];
        [
            arc_index as u8,
            (arc_index >> 8) as u8,
            ((arc_index >> 16) & 0x3f) as u8
                | if is_end { 0x40 } else { 0 }
                | if accepts { 0x80 } else { 0 },
            tile,
        ]
    }

    fn to_vec(&self, dawg_root: u32, gaddag_root: u32) -> Vec<u8> {
        let mut ret = vec![0u8; (self.num_written as usize) * 4];
        ret[0..4].copy_from_slice(&self.encode(dawg_root, true, false, 0));
        ret[4..8].copy_from_slice(&self.encode(gaddag_root, true, false, 0));
        for head in 1..self.arcs.len() {
            if self.prev[head] != 0 || self.destination[head] == 0 {
                continue;
            }
            let mut p = head;
            let mut w = (self.destination[head] as usize) * 4;
            loop {
                let arc = &self.arcs[p];
                ret[w..w + 4].copy_from_slice(&self.encode(
                    arc.target,
                    arc.next == 0,
                    arc.accepts,
                    arc.tile,
                ));
                if arc.next == 0 {
                    break;
                }
                p = arc.next as usize;
                w += 4;
            }
        }
        ret
    }
}

// Words must be non-empty, strictly ascending, and use tiles 1..=63.
pub fn check_machine_words(machine_words: &[Box<[u8]>]) -> Result<(), String> {
    for (i, word) in machine_words.iter().enumerate() {
        if word.is_empty() {
            return Err(format!("word {} is empty", i));
        }
        if let Some(&tile) = word.iter().find(|&&t| t == 0 || t >= 64) {
            return Err(format!("word {} has invalid tile {}", i, tile));
        }
        if i > 0 && word[..] <= machine_words[i - 1][..] {
            return Err(format!(
                "input is not sorted, {:?} cannot come after {:?}",
                word,
                machine_words[i - 1]
            ));
        }
    }
    Ok(())
}

pub fn build(build_format: BuildFormat, machine_words: &[Box<[u8]>]) -> Result<Vec<u8>, String> {
    check_machine_words(machine_words)?;
    let mut table = ArcTable::new();
    let dawg_root = table.insert_sorted(machine_words, 0, false);
    let gaddag_root = match build_format {
        BuildFormat::DawgOnly => 0,
        BuildFormat::Gaddawg => {
            table.insert_sorted(&gen_reversed_prefixes(machine_words), dawg_root, true)
        }
    };

    let mut prev = vec![0u32; table.arcs.len()];
    for p in (1..table.arcs.len()).rev() {
        prev[table.arcs[p].next as usize] = p as u32;
    }
    // the sink has no predecessor by definition.
    prev[0] = 0;

    let mut relocator = Relocator {
        arcs: &table.arcs,
        prev: &prev,
        destination: vec![0u32; table.arcs.len()],
        // nodes 0 and 1 are the two roots.
        num_written: 2,
    };
    relocator.destination[0] = !0;
    if dawg_root != 0 {
        relocator.place(dawg_root);
    }
    if gaddag_root != 0 {
        relocator.place(gaddag_root);
    }
    relocator.destination[0] = 0;

    if relocator.num_written > MAX_NODES {
        return Err(format!(
            "this format cannot have {} nodes",
            relocator.num_written
        ));
    }
    tracing::debug!(
        words = machine_words.len(),
        interned = table.arcs.len(),
        nodes = relocator.num_written,
        ?build_format,
        "built lexicon graph"
    );
    Ok(relocator.to_vec(dawg_root, gaddag_root))
}
