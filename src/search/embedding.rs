//! Phrase embeddings for similarity-guided search
//!
//! A [`VectorSource`] maps tokens and phrases to fixed-dimension vectors.
//! [`EmbeddingTable`] is the in-memory implementation, loaded from the
//! word2vec text format (`token v1 v2 ... vN` per line, with an optional
//! `count dimension` header).

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Embedding table errors
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Failed to read embeddings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Line {line}: expected {expected} components, found {found}")]
    Dimension {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Embedding table is empty")]
    Empty,
}

/// Source of phrase vectors
pub trait VectorSource {
    /// Dimension of every vector this source returns
    fn dimension(&self) -> usize;

    /// Vector for an exact token or phrase, if known
    fn lookup(&self, token: &str) -> Option<Cow<'_, [f32]>>;
}

/// Vector for a title-like phrase
///
/// The whole phrase is tried first. Otherwise each whitespace-separated
/// fragment is tried verbatim and then lower-cased, and the first one
/// that resolves wins. An unresolvable phrase maps to the zero vector.
pub fn phrase_vector<V: VectorSource + ?Sized>(phrase: &str, source: &V) -> Vec<f32> {
    if let Some(vector) = source.lookup(phrase) {
        return vector.into_owned();
    }

    for fragment in phrase.split_whitespace() {
        if let Some(vector) = source.lookup(fragment) {
            return vector.into_owned();
        }
        if let Some(vector) = source.lookup(&fragment.to_lowercase()) {
            return vector.into_owned();
        }
    }

    vec![0.0; source.dimension()]
}

/// Cosine similarity of two vectors
///
/// Returns 0.0 when either vector has zero magnitude (or the lengths differ).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|&x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|&x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot / (magnitude_a * magnitude_b)
}

/// In-memory token → vector table
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Loads a word2vec text file
    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses the word2vec text format
    ///
    /// The dimension comes from the header when present, otherwise from the
    /// first vector line. Blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, EmbeddingError> {
        let mut dimension: Option<usize> = None;
        let mut vectors = HashMap::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }

            if index == 0 && fields.len() == 2 {
                if let (Ok(_count), Ok(declared)) =
                    (fields[0].parse::<usize>(), fields[1].parse::<usize>())
                {
                    dimension = Some(declared);
                    continue;
                }
            }

            let token = fields[0].to_string();
            let vector = fields[1..]
                .iter()
                .map(|value| value.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| EmbeddingError::Parse {
                    line: line_number,
                    message: format!("invalid component for '{}': {}", token, e),
                })?;

            let expected = *dimension.get_or_insert(vector.len());
            if vector.len() != expected || expected == 0 {
                return Err(EmbeddingError::Dimension {
                    line: line_number,
                    expected,
                    found: vector.len(),
                });
            }

            vectors.insert(token, vector);
        }

        if vectors.is_empty() {
            return Err(EmbeddingError::Empty);
        }

        Ok(Self {
            dimension: dimension.unwrap_or_default(),
            vectors,
        })
    }

    /// Adds or replaces a vector; the length must match the table dimension
    pub fn insert(&mut self, token: &str, vector: Vec<f32>) -> Result<(), EmbeddingError> {
        if vector.len() != self.dimension {
            return Err(EmbeddingError::Dimension {
                line: 0,
                expected: self.dimension,
                found: vector.len(),
            });
        }
        self.vectors.insert(token.to_string(), vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl VectorSource for EmbeddingTable {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn lookup(&self, token: &str) -> Option<Cow<'_, [f32]>> {
        self.vectors
            .get(token)
            .map(|vector| Cow::Borrowed(vector.as_slice()))
    }
}
