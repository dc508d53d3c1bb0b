// Copyright (C) 2020-2026 Andy Kurnia.

use super::alphabet;
use rand::prelude::*;

#[derive(Clone, Debug)]
pub struct Bag(pub Vec<u8>);

impl Bag {
    pub fn new(alphabet: &alphabet::Alphabet<'_>) -> Bag {
        let mut bag = Vec::with_capacity(alphabet.num_tiles() as usize);
        for tile in 0..alphabet.len() {
            for _ in 0..alphabet.freq(tile) {
                bag.push(tile);
            }
        }
        Bag(bag)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn shuffle(&mut self, rng: &mut dyn RngCore) {
        self.0.shuffle(rng);
    }

    pub fn pop(&mut self) -> Option<u8> {
        self.0.pop()
    }

    pub fn replenish(&mut self, rack: &mut Vec<u8>, rack_size: usize) {
        while rack.len() < rack_size {
            match self.pop() {
                Some(tile) => rack.push(tile),
                None => break,
            }
        }
    }

    // put back the tiles in random order. keep the rest of the bag in the same order.
    pub fn put_back(&mut self, rng: &mut dyn RngCore, tiles: &[u8]) {
        let mut new_tiles = tiles.to_vec();
        new_tiles.shuffle(rng);
        let old_tiles = std::mem::take(&mut self.0);
        let mut num_old_tiles = old_tiles.len();
        let mut num_new_tiles = new_tiles.len();
        self.0.reserve(num_old_tiles + num_new_tiles);
        let mut old_iter = old_tiles.into_iter();
        let mut new_iter = new_tiles.into_iter();
        while num_old_tiles + num_new_tiles > 0 {
            let take_old = rng.random_range(0..num_old_tiles + num_new_tiles) < num_old_tiles;
            let next_tile = if take_old {
                num_old_tiles -= 1;
                old_iter.next()
            } else {
                num_new_tiles -= 1;
                new_iter.next()
            };
            if let Some(tile) = next_tile {
                self.0.push(tile);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_english_bag() {
        let alphabet = alphabet::make_english_alphabet();
        let bag = Bag::new(&alphabet);
        assert_eq!(bag.len(), 100);
        assert_eq!(bag.0.iter().filter(|&&t| t == 0).count(), 2);
        assert_eq!(bag.0.iter().filter(|&&t| t == 5).count(), 12);
    }

    #[test]
    fn put_back_keeps_old_order() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(3);
        let mut bag = Bag(vec![1, 2, 3, 4, 5]);
        bag.put_back(&mut rng, &[20, 21]);
        assert_eq!(bag.len(), 7);
        let old = bag.0.iter().copied().filter(|&t| t < 20).collect::<Vec<_>>();
        assert_eq!(old, vec![1, 2, 3, 4, 5]);
        let mut rack = vec![26];
        bag.replenish(&mut rack, 3);
        assert_eq!(rack.len(), 3);
        assert_eq!(bag.len(), 5);
        let mut empty = Bag(Vec::new());
        empty.replenish(&mut rack, 7);
        assert_eq!(rack.len(), 3);
    }
}
