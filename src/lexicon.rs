// Copyright (C) 2020-2026 Andy Kurnia.

use super::{alphabet, build, error, kwg};
use std::sync::{Arc, Mutex};

// Reads one word per line. Blank lines are skipped. With `require_sorted`
// the input must already be in strictly ascending tile order, otherwise the
// words are sorted and deduplicated here.
pub fn read_machine_words(
    alphabet_reader: &alphabet::AlphabetReader,
    giant_string: &str,
    require_sorted: bool,
) -> error::EngineResult<Box<[Box<[u8]>]>> {
    let mut machine_words = Vec::<Box<[u8]>>::new();
    for (line_num, s) in (1..).zip(giant_string.lines()) {
        let s = s.trim_end_matches('\r');
        if s.is_empty() {
            continue;
        }
        let v = alphabet_reader.read(s).ok_or_else(|| {
            error::EngineError::CorruptLexicon(format!(
                "line {}: invalid tile in {:?}",
                line_num, s
            ))
        })?;
        if require_sorted {
            if let Some(previous_v) = machine_words.last() {
                if v[..] <= previous_v[..] {
                    return Err(error::EngineError::CorruptLexicon(format!(
                        "line {}: input is not sorted, {:?} cannot come after the previous word",
                        line_num, s
                    )));
                }
            }
        }
        machine_words.push(v.into_boxed_slice());
    }
    if !require_sorted {
        machine_words.sort_unstable();
        machine_words.dedup();
    }
    Ok(machine_words.into_boxed_slice())
}

pub fn kwg_from_word_list(
    alphabet: &alphabet::Alphabet<'static>,
    giant_string: &str,
    build_format: build::BuildFormat,
    require_sorted: bool,
) -> error::EngineResult<kwg::Kwg> {
    let t0 = std::time::Instant::now();
    let machine_words = read_machine_words(
        &alphabet::AlphabetReader::new_for_words(alphabet),
        giant_string,
        require_sorted,
    )?;
    let t1 = std::time::Instant::now();
    let kwg = kwg::Kwg::from_sorted_words(build_format, &machine_words)?;
    tracing::debug!(
        words = machine_words.len(),
        read_ms = (t1 - t0).as_millis() as u64,
        build_ms = t1.elapsed().as_millis() as u64,
        "lexicon ready"
    );
    Ok(kwg)
}

// Loaded graphs by name, e.g. "icelandic" and "icelandic-common". Created at
// startup and handed to every search by reference.
#[derive(Default)]
pub struct LexiconRegistry {
    entries: Mutex<std::collections::HashMap<String, Arc<kwg::Kwg>>>,
}

impl LexiconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, std::collections::HashMap<String, Arc<kwg::Kwg>>> {
        // a panicking loader cannot leave a half-built entry behind.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, name: &str, kwg: kwg::Kwg) -> Arc<kwg::Kwg> {
        let kwg = Arc::new(kwg);
        self.lock().insert(name.to_string(), Arc::clone(&kwg));
        kwg
    }

    pub fn get(&self, name: &str) -> Option<Arc<kwg::Kwg>> {
        self.lock().get(name).cloned()
    }

    // The loader runs at most once per name, even with concurrent callers.
    // A failed load is not cached.
    pub fn get_or_load<F: FnOnce() -> error::EngineResult<kwg::Kwg>>(
        &self,
        name: &str,
        loader: F,
    ) -> error::EngineResult<Arc<kwg::Kwg>> {
        let mut entries = self.lock();
        if let Some(kwg) = entries.get(name) {
            return Ok(Arc::clone(kwg));
        }
        let kwg = Arc::new(loader()?);
        tracing::info!(name, nodes = kwg.len(), "registered lexicon");
        entries.insert(name.to_string(), Arc::clone(&kwg));
        Ok(kwg)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = self.lock().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_icelandic_word_list() {
        let alphabet = alphabet::make_icelandic_alphabet();
        let kwg = kwg_from_word_list(
            &alphabet,
            "þú\nís\nás\n\nás\n",
            build::BuildFormat::Gaddawg,
            false,
        )
        .unwrap();
        let reader = alphabet::AlphabetReader::new_for_words(&alphabet);
        for w in ["þú", "ís", "ás", "ÁS"] {
            assert!(kwg.accepts(&reader.read(w).unwrap()), "{}", w);
        }
        assert!(!kwg.accepts(&reader.read("sá").unwrap()));
        assert_eq!(kwg.count_dawg_words(), 3);
    }

    #[test]
    fn strict_reader_rejects_unsorted_input() {
        let alphabet = alphabet::make_english_alphabet();
        let reader = alphabet::AlphabetReader::new_for_words(&alphabet);
        assert!(read_machine_words(&reader, "AB\nAC\r\nB\n", true).is_ok());
        assert!(matches!(
            read_machine_words(&reader, "B\nA\n", true),
            Err(error::EngineError::CorruptLexicon(_))
        ));
        assert!(matches!(
            read_machine_words(&reader, "A1\n", false),
            Err(error::EngineError::CorruptLexicon(_))
        ));
    }

    #[test]
    fn registry_loads_each_name_once() {
        let registry = LexiconRegistry::new();
        let calls = std::sync::atomic::AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    registry
                        .get_or_load("tiny", || {
                            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                            kwg::Kwg::from_bytes(kwg::EMPTY_KWG_BYTES)
                        })
                        .unwrap();
                });
            }
        });
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(registry.get("tiny").is_some());
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn registry_does_not_cache_failures() {
        let registry = LexiconRegistry::new();
        assert!(
            registry
                .get_or_load("bad", || kwg::Kwg::from_bytes(b"\x00"))
                .is_err()
        );
        assert!(registry.get("bad").is_none());
        registry.insert("bad", kwg::Kwg::from_bytes(kwg::EMPTY_KWG_BYTES).unwrap());
        assert_eq!(registry.names(), vec!["bad".to_string()]);
    }
}
