//! Fuzzy ranking of photo-library albums against free text.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use atlas_services::AlbumSummary;

/// Number of albums offered after a search.
pub const SUGGESTION_LIMIT: usize = 5;

fn tokens(text: &str) -> BTreeSet<String> {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn join(parts: &[&String]) -> String {
    parts
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token-set similarity in `[0, 1]`.
///
/// Both texts are split into lowercase alphanumeric tokens. The shared tokens
/// are compared against each side's full sorted token set, so word order and
/// repeated words do not matter and a query that names a subset of an
/// album's words still scores high.
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared: Vec<&String> = a.intersection(&b).collect();
    let only_a: Vec<&String> = a.difference(&b).collect();
    let only_b: Vec<&String> = b.difference(&a).collect();

    let base = join(&shared);
    let with = |rest: &[&String]| -> String {
        let rest = join(rest);
        match (base.is_empty(), rest.is_empty()) {
            (true, _) => rest,
            (false, true) => base.clone(),
            (false, false) => format!("{base} {rest}"),
        }
    };
    let full_a = with(&only_a);
    let full_b = with(&only_b);

    let mut best = strsim::normalized_levenshtein(&full_a, &full_b);
    if !base.is_empty() {
        best = best
            .max(strsim::normalized_levenshtein(&base, &full_a))
            .max(strsim::normalized_levenshtein(&base, &full_b));
    }
    best
}

/// The `limit` albums whose titles best match `query`, best first.
///
/// Ties keep listing order.
pub fn rank_albums(albums: &[AlbumSummary], query: &str, limit: usize) -> Vec<AlbumSummary> {
    let mut scored: Vec<(f64, &AlbumSummary)> = albums
        .iter()
        .map(|album| (token_set_similarity(query, &album.title), album))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, album)| album.clone())
        .collect()
}
