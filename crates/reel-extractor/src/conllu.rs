//! CoNLL-U token reader
//!
//! Tagging happens outside this crate. Taggers such as spaCy (through
//! `spacy-conll`) or UDPipe export CoNLL-U; this module turns that output
//! into annotated tokens. Sentences are concatenated into one sequence.

use reel_core::{AnnotatedToken, EntityKind, PosTag, ReelError, Result};

const FORM: usize = 1;
const LEMMA: usize = 2;
const UPOS: usize = 3;
const MISC: usize = 9;

/// MISC keys carrying an entity label
const ENTITY_KEYS: &[&str] = &["NER", "Ent", "ENT"];

/// Parse CoNLL-U text into annotated tokens
pub fn parse_conllu(input: &str) -> Result<Vec<AnnotatedToken>> {
    let mut tokens = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() <= UPOS {
            return Err(ReelError::TokenFormat {
                line: index + 1,
                message: format!("expected at least 4 columns, found {}", columns.len()),
            });
        }

        // Multiword ranges (1-2) and empty nodes (1.1) carry no token of their own
        let id = columns[0];
        if id.contains('-') || id.contains('.') {
            continue;
        }
        if id.parse::<usize>().is_err() {
            return Err(ReelError::TokenFormat {
                line: index + 1,
                message: format!("invalid token id {id:?}"),
            });
        }

        let form = columns[FORM];
        let lemma = match columns[LEMMA] {
            "_" if form != "_" => form.to_lowercase(),
            lemma => lemma.to_string(),
        };
        let pos = PosTag::parse_lenient(columns[UPOS]);
        let entity = columns
            .get(MISC)
            .map(|misc| entity_from_misc(misc))
            .unwrap_or_default();

        tokens.push(AnnotatedToken::new(form, pos, lemma).with_entity(entity));
    }

    Ok(tokens)
}

fn entity_from_misc(misc: &str) -> EntityKind {
    misc.split('|')
        .filter_map(|field| field.split_once('='))
        .find(|(key, _)| ENTITY_KEYS.contains(key))
        .map(|(_, value)| EntityKind::parse_label(value))
        .unwrap_or_default()
}
