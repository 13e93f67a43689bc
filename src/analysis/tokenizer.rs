//! Streaming word tokenizer.
//!
//! [`WordTokenizer`] is an immutable, shareable configuration object. Every
//! call to [`WordTokenizer::stream`] creates a fresh [`TokenStream`], a
//! single-use lexer that pulls the reader in fixed-size chunks and yields
//! tokens lazily. Workers processing different files each own their own
//! stream; nothing mutable is shared.
//!
//! `-` and `'` are dropped before classification, so "hi-lite" is the single
//! word "hilite" and "we're" is "were". Classification is ASCII: any non-ASCII
//! character is non-alphanumeric.
//!
//! # Examples
//!
//! ```
//! use wordstat::analysis::token::Token;
//! use wordstat::analysis::tokenizer::WordTokenizer;
//!
//! let tokenizer = WordTokenizer::new(false);
//! let tokens = tokenizer.tokenize_str("we're here\n").unwrap();
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::word("were"),
//!         Token::non_alphanumeric(" "),
//!         Token::word("here"),
//!         Token::newline(),
//!     ]
//! );
//! ```

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::Arc;

use crate::analysis::token::{Token, TokenType};
use crate::error::{Result, WordstatError};
use crate::util::cancel::Interrupt;

/// Default number of bytes pulled from the reader per chunk.
pub const DEFAULT_READ_SIZE: usize = 4096;

/// Factory for single-use token streams.
#[derive(Clone, Debug)]
pub struct WordTokenizer {
    fold_newlines: bool,
    read_size: usize,
    log_target: Option<Arc<str>>,
}

impl WordTokenizer {
    /// Create a tokenizer.
    ///
    /// With `fold_newlines` set, `\n` is an ordinary separator character and
    /// no [`TokenType::Newline`] tokens are produced.
    pub fn new(fold_newlines: bool) -> Self {
        WordTokenizer {
            fold_newlines,
            read_size: DEFAULT_READ_SIZE,
            log_target: None,
        }
    }

    /// Set the chunk size in bytes.
    pub fn with_read_size(mut self, read_size: usize) -> Result<Self> {
        if read_size == 0 {
            return Err(WordstatError::config("read_size must be at least 1"));
        }
        self.read_size = read_size;
        Ok(self)
    }

    /// Log emitted tokens under `target` instead of this module's path.
    pub fn with_log_target<S: Into<Arc<str>>>(mut self, target: S) -> Self {
        self.log_target = Some(target.into());
        self
    }

    pub fn fold_newlines(&self) -> bool {
        self.fold_newlines
    }

    pub fn read_size(&self) -> usize {
        self.read_size
    }

    /// Start tokenizing `reader`.
    pub fn stream<R: Read>(&self, reader: R) -> TokenStream<R> {
        self.stream_with_interrupt(reader, Interrupt::none())
    }

    /// Start tokenizing `reader`, checking `interrupt` before every chunk read.
    pub fn stream_with_interrupt<R: Read>(
        &self,
        reader: R,
        interrupt: Interrupt,
    ) -> TokenStream<R> {
        TokenStream {
            reader,
            fold_newlines: self.fold_newlines,
            buf: vec![0; self.read_size],
            carry: Vec::new(),
            state: TokenizerState::Begin,
            remainder: String::new(),
            pending: VecDeque::new(),
            interrupt,
            log_target: self.log_target.clone(),
            bytes_read: 0,
            tokens_emitted: 0,
            finished: false,
        }
    }

    /// Tokenize an in-memory string.
    pub fn tokenize_str(&self, text: &str) -> Result<Vec<Token>> {
        self.stream(text.as_bytes()).collect()
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new(false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenizerState {
    Begin,
    InWord,
    InNonAlnum,
    AtNewline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharClass {
    Alphanumeric,
    Newline,
    Other,
}

/// Lazy token sequence over one reader.
///
/// Yields `Err` at most once (I/O failure, malformed UTF-8, or a tripped
/// interrupt); the stream is exhausted afterwards.
pub struct TokenStream<R> {
    reader: R,
    fold_newlines: bool,
    buf: Vec<u8>,
    /// Trailing bytes of an incomplete UTF-8 sequence from the previous chunk.
    carry: Vec<u8>,
    state: TokenizerState,
    /// Text of the run in progress; survives chunk boundaries.
    remainder: String,
    pending: VecDeque<Token>,
    interrupt: Interrupt,
    log_target: Option<Arc<str>>,
    bytes_read: u64,
    tokens_emitted: u64,
    finished: bool,
}

impl<R: Read> TokenStream<R> {
    /// Bytes pulled from the reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Tokens produced so far (including ones not yet yielded).
    pub fn tokens_emitted(&self) -> u64 {
        self.tokens_emitted
    }

    fn classify(&self, c: char) -> CharClass {
        if c == '\n' {
            if self.fold_newlines {
                CharClass::Other
            } else {
                CharClass::Newline
            }
        } else if c.is_ascii_alphanumeric() {
            CharClass::Alphanumeric
        } else {
            CharClass::Other
        }
    }

    fn feed(&mut self, c: char) {
        if c == '-' || c == '\'' {
            return;
        }

        let class = self.classify(c);
        match (self.state, class) {
            (TokenizerState::InWord, CharClass::Alphanumeric)
            | (TokenizerState::InNonAlnum, CharClass::Other) => {
                self.remainder.push(c);
                return;
            }
            (TokenizerState::Begin, _) => {}
            _ => self.emit_run(),
        }
        self.start_run(c, class);
    }

    fn start_run(&mut self, c: char, class: CharClass) {
        self.state = match class {
            CharClass::Alphanumeric => TokenizerState::InWord,
            CharClass::Newline => TokenizerState::AtNewline,
            CharClass::Other => TokenizerState::InNonAlnum,
        };
        self.remainder.push(c);
    }

    fn emit_run(&mut self) {
        let token_type = match self.state {
            TokenizerState::Begin => return,
            TokenizerState::InWord => TokenType::Word,
            TokenizerState::InNonAlnum => TokenType::NonAlphanumeric,
            TokenizerState::AtNewline => TokenType::Newline,
        };
        let token = Token::new(token_type, std::mem::take(&mut self.remainder));
        log::trace!(
            target: self.log_target.as_deref().unwrap_or(module_path!()),
            "Token: {token}"
        );
        self.tokens_emitted += 1;
        self.pending.push_back(token);
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        if !self.carry.is_empty() {
            return Err(WordstatError::decode(format!(
                "stream ends inside a UTF-8 sequence at byte {}",
                self.bytes_read - self.carry.len() as u64
            )));
        }
        if !self.remainder.is_empty() {
            self.emit_run();
        }
        self.state = TokenizerState::Begin;
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<usize> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read and classify one chunk, queueing every completed token.
    fn fill(&mut self) -> Result<()> {
        self.interrupt.check()?;

        let n = self.read_chunk()?;
        if n == 0 {
            return self.finish();
        }

        let chunk_start = self.bytes_read - self.carry.len() as u64;
        self.bytes_read += n as u64;

        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(&self.buf[..n]);

        let valid_len = match std::str::from_utf8(&bytes) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(WordstatError::decode(format!(
                    "invalid UTF-8 sequence at byte {}",
                    chunk_start + e.valid_up_to() as u64
                )));
            }
        };
        let (head, tail) = bytes.split_at(valid_len);
        let text = std::str::from_utf8(head).map_err(|e| WordstatError::decode(e.to_string()))?;

        for c in text.chars() {
            self.feed(c);
        }
        self.carry = tail.to_vec();

        Ok(())
    }
}

impl<R: Read> Iterator for TokenStream<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.fill() {
                self.finished = true;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for TokenStream<R> {}
