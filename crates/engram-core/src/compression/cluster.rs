//! Greedy similarity clustering.

use engram_contracts::Observation;

use crate::compression::similarity::token_set_similarity;

/// Partition observations into clusters of similar items.
///
/// Greedy single-pass agglomeration: observations are visited in input
/// order; each not-yet-assigned observation opens a new cluster as its
/// seed, and every subsequent unassigned observation whose similarity to
/// the seed meets `threshold` joins that cluster. Membership is judged
/// against the seed only, not between members: two observations can share
/// a cluster while being mutually dissimilar, because both matched the
/// seed. That non-transitive behavior is intentional and must be kept.
///
/// Clusters of size 1 are discarded; there is nothing to compress.
/// Deterministic for a fixed input order. Cost is O(n^2) similarity
/// comparisons, acceptable for the small per-group volumes this runs on.
pub fn cluster_by_similarity(observations: &[Observation], threshold: f64) -> Vec<Vec<Observation>> {
    let mut assigned = vec![false; observations.len()];
    let mut clusters = Vec::new();

    for seed_idx in 0..observations.len() {
        if assigned[seed_idx] {
            continue;
        }
        assigned[seed_idx] = true;
        let seed = &observations[seed_idx];
        let mut cluster = vec![seed.clone()];

        for other_idx in seed_idx + 1..observations.len() {
            if assigned[other_idx] {
                continue;
            }
            let other = &observations[other_idx];
            if token_set_similarity(&seed.content, &other.content) >= threshold {
                assigned[other_idx] = true;
                cluster.push(other.clone());
            }
        }

        if cluster.len() > 1 {
            clusters.push(cluster);
        }
    }

    clusters
}
