//! Text analysis for wordstat.
//!
//! This module provides the streaming tokenizer that every statistic is built
//! on, together with the token types it produces.

pub mod token;
pub mod tokenizer;
