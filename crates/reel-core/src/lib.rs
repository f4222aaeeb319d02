//! Reel Core - Domain models, errors, and shared types
//!
//! This crate defines the abstractions shared by the title recognition
//! pipeline:
//! - Title corpus records and the candidates found in a transcript
//! - Annotated tokens produced by an external tagger
//! - Rule match results
//! - Common error types
//! - Configuration management for the I/O collaborators

pub mod config;
pub mod corpus;

pub use config::{AppConfig, ConfigError, CorpusConfig, LoggingConfig};
pub use corpus::TitleCorpus;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Reel operations
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Corpus error: {0}")]
    CorpusError(String),

    #[error("Title corpus not sorted by descending length at index {index}: {previous:?} precedes {current:?}")]
    UnsortedCorpus {
        index: usize,
        previous: String,
        current: String,
    },

    #[error("Tagging error: {0}")]
    TaggingError(String),

    #[error("Token format error at line {line}: {message}")]
    TokenFormat { line: usize, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReelError>;

// ============================================================================
// Title Joining
// ============================================================================

/// Join a multi-word title into a single lowercase token (`les_jeunes_amants`)
pub fn join_title(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Undo [`join_title`] on a token surface, restoring spaces
pub fn unjoin_title(surface: &str) -> String {
    surface.replace('_', " ")
}

// ============================================================================
// Title Corpus Models
// ============================================================================

/// A known film title as supplied by the corpus store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    /// Display text of the title
    pub text: String,

    /// Unique identifier (e.g., an IMDb `tconst`)
    pub id: String,
}

impl TitleRecord {
    /// Create a new title record
    pub fn new(text: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            id: id.into(),
        }
    }

    /// Length in characters, the key the corpus is ordered by
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Number of whitespace separated words
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A corpus title found as a whole word in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTitle {
    /// Original title text
    pub text: String,

    /// Identifier of the originating record
    pub id: String,

    /// Underscore-joined lowercase form, only for multi-word titles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_form: Option<String>,
}

impl CandidateTitle {
    /// Build a candidate from a corpus record.
    ///
    /// Single-word titles are never joined: they stay indistinguishable
    /// from ordinary words so that name capitalization keeps working.
    pub fn from_record(record: &TitleRecord) -> Self {
        let joined_form = if record.word_count() > 1 {
            Some(join_title(&record.text))
        } else {
            None
        };

        Self {
            text: record.text.clone(),
            id: record.id.clone(),
            joined_form,
        }
    }

    /// Lowercase form a token's normalized text is compared against
    pub fn key(&self) -> String {
        match &self.joined_form {
            Some(joined) => joined.clone(),
            None => self.text.to_lowercase(),
        }
    }

    pub fn is_multi_word(&self) -> bool {
        self.joined_form.is_some()
    }
}

// ============================================================================
// Annotated Token Models
// ============================================================================

/// Universal Dependencies part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    Space,
    X,
}

impl PosTag {
    /// Get the UD string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::Space => "SPACE",
            Self::X => "X",
        }
    }

    /// Parse a tag, mapping anything unknown to `X`
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::X)
    }
}

impl std::fmt::Display for PosTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PosTag {
    type Err = ReelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADJ" => Ok(Self::Adj),
            "ADP" => Ok(Self::Adp),
            "ADV" => Ok(Self::Adv),
            "AUX" => Ok(Self::Aux),
            "CCONJ" | "CONJ" => Ok(Self::Cconj),
            "DET" => Ok(Self::Det),
            "INTJ" => Ok(Self::Intj),
            "NOUN" => Ok(Self::Noun),
            "NUM" => Ok(Self::Num),
            "PART" => Ok(Self::Part),
            "PRON" => Ok(Self::Pron),
            "PROPN" => Ok(Self::Propn),
            "PUNCT" => Ok(Self::Punct),
            "SCONJ" => Ok(Self::Sconj),
            "SYM" => Ok(Self::Sym),
            "VERB" => Ok(Self::Verb),
            "SPACE" => Ok(Self::Space),
            "X" => Ok(Self::X),
            other => Err(ReelError::TaggingError(format!(
                "unknown part-of-speech tag: {other}"
            ))),
        }
    }
}

/// Named-entity label attached to a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Per,
    Loc,
    Org,
    Misc,
    #[default]
    None,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Per => "PER",
            Self::Loc => "LOC",
            Self::Org => "ORG",
            Self::Misc => "MISC",
            Self::None => "",
        }
    }

    /// Parse a label; IOB prefixes are stripped and unknown labels map to `None`
    pub fn parse_label(label: &str) -> Self {
        let label = label
            .trim()
            .trim_start_matches("B-")
            .trim_start_matches("I-");
        match label.to_uppercase().as_str() {
            "PER" | "PERSON" => Self::Per,
            "LOC" | "GPE" => Self::Loc,
            "ORG" => Self::Org,
            "MISC" => Self::Misc,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token produced by the external tagger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    /// Raw surface text
    pub surface: String,

    /// Lowercased surface text
    pub normalized: String,

    /// Part-of-speech tag
    pub pos: PosTag,

    /// Lemma
    pub lemma: String,

    /// Named-entity label
    #[serde(default)]
    pub entity: EntityKind,
}

impl AnnotatedToken {
    /// Create a token; the normalized form is derived from the surface
    pub fn new(surface: impl Into<String>, pos: PosTag, lemma: impl Into<String>) -> Self {
        let surface = surface.into();
        Self {
            normalized: surface.to_lowercase(),
            surface,
            pos,
            lemma: lemma.into(),
            entity: EntityKind::None,
        }
    }

    /// Set the entity label
    pub fn with_entity(mut self, entity: EntityKind) -> Self {
        self.entity = entity;
        self
    }
}

// ============================================================================
// Match Results
// ============================================================================

/// A single rule match over the token sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Identifier of the rule that matched (e.g., "MR1")
    pub rule_id: String,

    /// First token index of the matched window
    pub start: usize,

    /// One past the last token index of the matched window
    pub end: usize,

    /// Title mention extracted from the rule's slot, spaces restored
    pub extracted_text: String,

    /// Whole matched window, spaces restored
    pub matched_text: String,
}

impl MatchResult {
    /// Matched span as token indices
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}
