//! Business-logic services decoupled from the CLI layer

pub mod matching;
