//! Title corpus loading
//!
//! The corpus is the ordered list of known titles the lexical pass scans
//! for. Its ordering is a caller contract: records come sorted by
//! descending title length so that a long title is matched before any
//! shorter title it contains. Loaders here establish that ordering; the
//! matcher only checks it.

use std::cmp::Reverse;
use std::io::BufRead;
use std::path::Path;

use crate::config::CorpusConfig;
use crate::{ReelError, Result, TitleRecord};

/// IMDb's marker for a missing value
const TSV_NULL: &str = "\\N";

/// Ordered title corpus
#[derive(Debug, Clone, Default)]
pub struct TitleCorpus {
    records: Vec<TitleRecord>,
}

impl TitleCorpus {
    /// Wrap records that are already sorted by descending length
    pub fn from_records(records: Vec<TitleRecord>) -> Result<Self> {
        Self::check_sorted(&records)?;
        Ok(Self { records })
    }

    /// Read a `title<TAB>id[<TAB>rating]` corpus, keeping rated titles
    /// and ordering them longest first
    pub fn from_tsv_reader<R: BufRead>(reader: R, config: &CorpusConfig) -> Result<Self> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if index == 0 && config.has_header {
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let mut columns = line.split('\t');
            let title = columns.next().unwrap_or_default().trim();
            let id = columns.next().map(str::trim).ok_or_else(|| {
                ReelError::CorpusError(format!("line {}: missing id column", index + 1))
            })?;

            if title.is_empty() {
                skipped += 1;
                continue;
            }

            if let Some(rating) = columns.next().map(str::trim) {
                if !is_rated_above(rating, config.min_rating, index + 1)? {
                    skipped += 1;
                    continue;
                }
            }

            records.push(TitleRecord::new(title, id));
        }

        records.sort_by_key(|record| Reverse(record.char_len()));

        tracing::debug!(
            kept = records.len(),
            skipped,
            "Loaded title corpus"
        );

        Ok(Self { records })
    }

    /// Read a TSV corpus from disk
    pub fn from_tsv_file(path: impl AsRef<Path>, config: &CorpusConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            ReelError::CorpusError(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_tsv_reader(std::io::BufReader::new(file), config)
    }

    /// Check that records are ordered by non-increasing character length
    pub fn check_sorted(records: &[TitleRecord]) -> Result<()> {
        for (index, pair) in records.windows(2).enumerate() {
            if pair[0].char_len() < pair[1].char_len() {
                return Err(ReelError::UnsortedCorpus {
                    index: index + 1,
                    previous: pair[0].text.clone(),
                    current: pair[1].text.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn records(&self) -> &[TitleRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TitleRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a TitleCorpus {
    type Item = &'a TitleRecord;
    type IntoIter = std::slice::Iter<'a, TitleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A null rating behaves like SQL NULL: never above the threshold
fn is_rated_above(rating: &str, min_rating: f32, line: usize) -> Result<bool> {
    if rating.is_empty() || rating == TSV_NULL {
        return Ok(false);
    }
    let value: f32 = rating.parse().map_err(|_| {
        ReelError::CorpusError(format!("line {line}: invalid rating {rating:?}"))
    })?;
    Ok(value > min_rating)
}
