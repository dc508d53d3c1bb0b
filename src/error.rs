// Copyright (C) 2020-2026 Andy Kurnia.

pub struct MyError {
    s: String,
}

impl std::fmt::Display for MyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.s)
    }
}

impl std::fmt::Debug for MyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        (self as &dyn std::fmt::Display).fmt(f)
    }
}

impl std::error::Error for MyError {}

pub fn new(s: String) -> MyError {
    MyError { s }
}

pub type BoxAnyError = Box<dyn std::error::Error>;
pub type Returns<T> = Result<T, BoxAnyError>;

#[macro_export]
macro_rules! return_error {
    ($error:expr) => {
        return Err($crate::error::new($error).into());
    };
}

// Failures surfaced by the engine. Running out of moves is not one of them,
// that outcome is a Pass or Exchange decision.
#[derive(Clone, PartialEq, Eq)]
pub enum EngineError {
    // the lexicon blob or word list cannot be used. nothing is loaded.
    CorruptLexicon(String),
    // the rack does not fit the tile distribution or the alphabet.
    InvalidRackState(String),
    // the board snapshot has the wrong shape or impossible tiles.
    InvalidBoard(String),
    // only produced when the caller configured a deadline.
    SearchTimeout { elapsed: std::time::Duration },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::CorruptLexicon(s) => write!(f, "corrupt lexicon: {}", s),
            EngineError::InvalidRackState(s) => write!(f, "invalid rack: {}", s),
            EngineError::InvalidBoard(s) => write!(f, "invalid board: {}", s),
            EngineError::SearchTimeout { elapsed } => {
                write!(f, "search timed out after {}ms", elapsed.as_millis())
            }
        }
    }
}

impl std::fmt::Debug for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        (self as &dyn std::fmt::Display).fmt(f)
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
