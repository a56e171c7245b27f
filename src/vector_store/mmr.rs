//! Maximal marginal relevance selection.

use super::cosine_similarity;

/// Select up to `k` candidate indices balancing relevance and diversity.
///
/// The first pick is the candidate most similar to the query. Each following
/// pick maximises `lambda * sim(query, c) - (1 - lambda) * max sim(c, selected)`.
/// Returned indices are distinct and in selection order.
pub fn maximal_marginal_relevance(
    query: &[f32],
    candidates: &[&[f32]],
    k: usize,
    lambda: f32,
) -> Vec<usize> {
    let limit = k.min(candidates.len());
    if limit == 0 {
        return Vec::new();
    }

    let relevance: Vec<f32> = candidates
        .iter()
        .map(|c| cosine_similarity(query, c))
        .collect();

    let first = argmax(relevance.iter().copied().enumerate());
    let mut selected = vec![first];
    // Highest similarity of each candidate to anything selected so far.
    let mut redundancy: Vec<f32> = candidates
        .iter()
        .map(|c| cosine_similarity(c, candidates[first]))
        .collect();

    while selected.len() < limit {
        let scores = (0..candidates.len())
            .filter(|i| !selected.contains(i))
            .map(|i| (i, lambda * relevance[i] - (1.0 - lambda) * redundancy[i]));
        let next = argmax(scores);

        selected.push(next);
        for (i, candidate) in candidates.iter().enumerate() {
            redundancy[i] = redundancy[i].max(cosine_similarity(candidate, candidates[next]));
        }
    }

    selected
}

/// Index of the highest score; the earliest index wins ties.
fn argmax(scores: impl Iterator<Item = (usize, f32)>) -> usize {
    let mut best: Option<(usize, f32)> = None;
    for (i, score) in scores {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i).unwrap_or(0)
}
