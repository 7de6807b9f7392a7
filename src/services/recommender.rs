//! Content-based "related products" ranking.
//!
//! Products in the reference's category are vectorized with TF-IDF over
//! title and description, and ranked by cosine similarity to the reference.
//! Vocabulary and IDF weights are computed over the category pool only.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use crate::models::Product;

/// Default number of related products returned
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecommenderError {
    #[error("top_n must be non-negative, got {0}")]
    NegativeTopN(i64),
}

/// Converts a caller-supplied count into a `top_n`. Negative values are
/// rejected, never clamped.
pub fn validate_top_n(raw: i64) -> Result<usize, RecommenderError> {
    usize::try_from(raw).map_err(|_| RecommenderError::NegativeTopN(raw))
}

/// English stop words dropped before weighting
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Lowercases, splits on anything that is not a word character and keeps
/// tokens of two or more characters that are not stop words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Builds one L2-normalised TF-IDF vector per document. IDF is smoothed:
/// `ln((1 + n) / (1 + df)) + 1`. Vocabulary indices follow sorted term
/// order, so identical input always yields identical vectors.
fn tfidf_vectors(documents: &[String]) -> Vec<Vec<f64>> {
    let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

    let mut term_doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
    for tokens in &tokenized {
        let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
        for term in unique {
            *term_doc_freq.entry(term).or_insert(0) += 1;
        }
    }

    let vocabulary: HashMap<&str, usize> = term_doc_freq
        .keys()
        .enumerate()
        .map(|(idx, &term)| (term, idx))
        .collect();
    let doc_freq: Vec<usize> = term_doc_freq.values().copied().collect();

    let n = documents.len() as f64;
    let idf: Vec<f64> = doc_freq
        .iter()
        .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    tokenized
        .iter()
        .map(|tokens| {
            let mut vector = vec![0.0f64; idf.len()];
            for token in tokens {
                vector[vocabulary[token.as_str()]] += 1.0;
            }
            for (weight, idf) in vector.iter_mut().zip(&idf) {
                *weight *= idf;
            }
            normalize(&mut vector);
            vector
        })
        .collect()
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Scores closer than this are treated as equal when ranking
const SCORE_EPSILON: f64 = 1e-9;

fn tie_key(score: f64) -> f64 {
    (score / SCORE_EPSILON).round()
}

/// Cosine similarity of unit vectors
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Ranks the products of `category_id` by textual similarity to
/// `reference_id` and returns up to `top_n` ids, most similar first.
///
/// "No recommendations" is an empty result, never an error: the category
/// has fewer than two products, or the reference is not in that category.
/// Equal scores keep corpus order. The reference itself is never returned;
/// other products with identical text may tie with it and are kept.
pub fn generate_recommendations(
    reference_id: &str,
    category_id: i64,
    corpus: &[Product],
    top_n: usize,
) -> Vec<String> {
    let pool: Vec<&Product> = corpus
        .iter()
        .filter(|p| p.category_id == category_id)
        .collect();

    if pool.len() < 2 {
        tracing::debug!(category_id, pool_size = pool.len(), "Candidate pool too small");
        return Vec::new();
    }

    let Some(reference_idx) = pool.iter().position(|p| p.id == reference_id) else {
        tracing::debug!(reference_id, category_id, "Reference not in candidate pool");
        return Vec::new();
    };

    let features: Vec<String> = pool.iter().map(|p| p.feature_text()).collect();
    let vectors = tfidf_vectors(&features);
    let reference = &vectors[reference_idx];

    let mut scores: Vec<(usize, f64)> = vectors
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != reference_idx)
        .map(|(idx, v)| (idx, dot(reference, v)))
        .collect();

    // Stable sort on rounded scores: ties, including those that differ only
    // by floating-point noise, stay in pool order
    scores.sort_by(|a, b| tie_key(b.1).total_cmp(&tie_key(a.1)));

    let ids: Vec<String> = scores
        .into_iter()
        .take(top_n)
        .map(|(idx, _)| pool[idx].id.clone())
        .collect();

    tracing::debug!(
        reference_id,
        category_id,
        pool_size = pool.len(),
        returned = ids.len(),
        "Generated recommendations"
    );

    ids
}
