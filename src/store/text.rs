//! Term matching shared by the search implementations.
//!
//! Names and queries are broken into lowercase alphanumeric terms. Query
//! terms are de-duplicated, keeping the position of their last occurrence. A
//! record matches when any query term equals one of its name terms; the last
//! query term also matches as a prefix so that type-ahead queries find results.

/// Splits `text` into lowercase alphanumeric terms.
pub fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Distinct terms of a search query, in order of their last occurrence.
pub fn query_terms(text: &str) -> Vec<String> {
    let all = terms(text);
    let mut distinct: Vec<String> = Vec::with_capacity(all.len());
    for (i, term) in all.iter().enumerate() {
        if !all[i + 1..].contains(term) {
            distinct.push(term.clone());
        }
    }
    distinct
}

/// Number of query terms found in `name`. Zero means no match.
///
/// `query_terms` must come from [`query_terms`].
pub fn relevance(query_terms: &[String], name: &str) -> usize {
    let name_terms = terms(name);
    let last = query_terms.len().saturating_sub(1);

    query_terms
        .iter()
        .enumerate()
        .filter(|(i, term)| {
            name_terms
                .iter()
                .any(|n| n == *term || (*i == last && n.starts_with(term.as_str())))
        })
        .count()
}

/// One `to_tsquery` operand per query term, the last one as a prefix.
///
/// Terms only ever contain alphanumeric characters, so operands need no
/// further escaping.
pub fn tsquery_operands(query_terms: &[String]) -> Vec<String> {
    let last = query_terms.len().saturating_sub(1);
    query_terms
        .iter()
        .enumerate()
        .map(|(i, term)| {
            if i == last {
                format!("{}:*", term)
            } else {
                term.clone()
            }
        })
        .collect()
}

/// Builds a PostgreSQL `to_tsquery` expression equivalent to [`relevance`] > 0.
/// Returns `None` for a query without terms.
pub fn to_tsquery(query_terms: &[String]) -> Option<String> {
    if query_terms.is_empty() {
        return None;
    }
    Some(tsquery_operands(query_terms).join(" | "))
}
