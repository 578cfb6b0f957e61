//! Output filename templates such as `[name].[contenthash].js`.
//!
//! A template is parsed once into literal segments and substitution tokens.
//! Hash tokens take an optional length suffix (`[contenthash:8]`); without
//! one the digest is cut to [`DEFAULT_HASH_LENGTH`] characters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Digest length used when a hash token carries no explicit length.
pub const DEFAULT_HASH_LENGTH: usize = 20;

/// A substitutable token inside a filename template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Entry or chunk name
    Name,
    /// Numeric chunk id
    Id,
    /// Source file extension (asset loaders only)
    Ext,
    /// Query string of the request
    Query,
    /// Directory of the source file
    Path,
    /// Hash of the whole compilation
    Hash(Option<usize>),
    /// Hash of the chunk
    ChunkHash(Option<usize>),
    /// Hash of the emitted bytes
    ContentHash(Option<usize>),
}

impl Token {
    fn parse(raw: &str) -> Result<Self, String> {
        let (name, len) = match raw.split_once(':') {
            Some((name, len)) => {
                let len: usize = len
                    .parse()
                    .map_err(|_| format!("invalid hash length `{len}` in `[{raw}]`"))?;
                if len == 0 {
                    return Err(format!("hash length must be positive in `[{raw}]`"));
                }
                (name, Some(len))
            }
            None => (raw, None),
        };

        let token = match name {
            "name" => Token::Name,
            "id" => Token::Id,
            "ext" => Token::Ext,
            "query" => Token::Query,
            "path" => Token::Path,
            "hash" => Token::Hash(len),
            "chunkhash" => Token::ChunkHash(len),
            "contenthash" => Token::ContentHash(len),
            other => return Err(format!("unknown token `[{other}]`")),
        };

        if len.is_some() && !token.is_hash() {
            return Err(format!("token `[{name}]` does not take a length"));
        }
        Ok(token)
    }

    pub fn is_hash(self) -> bool {
        matches!(
            self,
            Token::Hash(_) | Token::ChunkHash(_) | Token::ContentHash(_)
        )
    }

    fn write(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, len) = match self {
            Token::Name => ("name", None),
            Token::Id => ("id", None),
            Token::Ext => ("ext", None),
            Token::Query => ("query", None),
            Token::Path => ("path", None),
            Token::Hash(len) => ("hash", len),
            Token::ChunkHash(len) => ("chunkhash", len),
            Token::ContentHash(len) => ("contenthash", len),
        };
        match len {
            Some(len) => write!(f, "[{name}:{len}]"),
            None => write!(f, "[{name}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// Values substituted into a template by [`FilenameTemplate::render`].
///
/// Tokens whose value is missing render as an empty string.
#[derive(Debug, Clone, Default)]
pub struct RenderContext<'a> {
    pub name: Option<&'a str>,
    pub id: Option<u32>,
    pub ext: Option<&'a str>,
    pub query: Option<&'a str>,
    pub path: Option<&'a str>,
    pub hash: Option<&'a str>,
    pub chunk_hash: Option<&'a str>,
    pub content_hash: Option<&'a str>,
}

/// A parsed filename template.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilenameTemplate {
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidTemplate {
            template: template.to_string(),
            message,
        };

        if template.trim().is_empty() {
            return Err(invalid("template is empty".to_string()));
        }

        let mut segments = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('[') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find(']')
                .ok_or_else(|| invalid("unterminated `[`".to_string()))?;
            let token = Token::parse(&after[..close]).map_err(invalid)?;
            segments.push(Segment::Token(token));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Token(token) => Some(*token),
            Segment::Literal(_) => None,
        })
    }

    /// True when the template embeds a digest of the artifact's own bytes.
    pub fn has_content_hash(&self) -> bool {
        self.tokens()
            .any(|token| matches!(token, Token::ContentHash(_)))
    }

    pub fn has_any_hash(&self) -> bool {
        self.tokens().any(Token::is_hash)
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(token) => {
                    let value = match token {
                        Token::Name => ctx.name.map(str::to_string),
                        Token::Id => ctx.id.map(|id| id.to_string()),
                        Token::Ext => ctx.ext.map(str::to_string),
                        Token::Query => ctx.query.map(str::to_string),
                        Token::Path => ctx.path.map(str::to_string),
                        Token::Hash(len) => ctx.hash.map(|h| truncate(h, *len)),
                        Token::ChunkHash(len) => ctx.chunk_hash.map(|h| truncate(h, *len)),
                        Token::ContentHash(len) => ctx.content_hash.map(|h| truncate(h, *len)),
                    };
                    if let Some(value) = value {
                        out.push_str(&value);
                    }
                }
            }
        }
        out
    }
}

fn truncate(hash: &str, len: Option<usize>) -> String {
    let len = len.unwrap_or(DEFAULT_HASH_LENGTH);
    hash.chars().take(len).collect()
}

/// Hex digest of an artifact's bytes, suitable for `[contenthash]`.
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

impl TryFrom<String> for FilenameTemplate {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for FilenameTemplate {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FilenameTemplate> for String {
    fn from(template: FilenameTemplate) -> Self {
        template.to_string()
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Token(token) => token.write(f)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilenameTemplate({self})")
    }
}
