//! Token types produced by the streaming tokenizer.
//!
//! A [`Token`] is an immutable classified run of text. The tokenizer emits
//! three kinds of token (see [`TokenType`]); which of them a caller observes
//! depends on whether newlines are folded into ordinary separators.
//!
//! # Examples
//!
//! ```
//! use wordstat::analysis::token::{Token, TokenType};
//!
//! let token = Token::word("hello");
//! assert_eq!(token.token_type, TokenType::Word);
//! assert_eq!(token.to_string(), "<Word, hello>");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single classified unit of text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of run this token covers
    pub token_type: TokenType,

    /// The literal text, with `-` and `'` already removed
    pub text: String,
}

/// Token type classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Contiguous block of ASCII alphanumerics
    Word,
    /// Contiguous block of anything else (newlines included when folded)
    NonAlphanumeric,
    /// A single `\n`
    Newline,
}

impl TokenType {
    /// Name used in the `<KIND, text>` debug representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Word => "Word",
            TokenType::NonAlphanumeric => "NonAlphanumeric",
            TokenType::Newline => "Newline",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token {
    /// Create a new token.
    pub fn new<S: Into<String>>(token_type: TokenType, text: S) -> Self {
        Token {
            token_type,
            text: text.into(),
        }
    }

    /// Create a word token.
    pub fn word<S: Into<String>>(text: S) -> Self {
        Self::new(TokenType::Word, text)
    }

    /// Create a non-alphanumeric token.
    pub fn non_alphanumeric<S: Into<String>>(text: S) -> Self {
        Self::new(TokenType::NonAlphanumeric, text)
    }

    /// Create a newline token.
    pub fn newline() -> Self {
        Self::new(TokenType::Newline, "\n")
    }

    pub fn is_word(&self) -> bool {
        self.token_type == TokenType::Word
    }

    pub fn is_newline(&self) -> bool {
        self.token_type == TokenType::Newline
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.token_type, self.text)
    }
}
