//! Candidate-pair generation and greedy structural alignment.
//!
//! Implements spec §4.7 steps 2–5: seed predicate/object candidates from
//! pairwise similarity, walk source relations picking the best-aligned
//! target relation for each, and fold the result into a scored
//! [`AnalogicalMapping`].

use std::collections::{BTreeMap, BTreeSet};

use reasoning_ast::{AstId, AstNodeKind, AstStore};

use crate::extract::DomainSummary;
use crate::mapping::AnalogicalMapping;
use crate::similarity::{object_similarity, predicate_similarity};

/// How many target candidates are kept per source predicate/object
/// before alignment narrows down to one. Small and fixed, matching
/// spec's "keep top-K pairs per candidate mapping" without exposing a
/// tuning knob nothing in this crate exercises.
const TOP_K: usize = 3;

fn top_k_candidates<F>(
    source_items: &BTreeSet<AstId>,
    target_items: &BTreeSet<AstId>,
    mut score: F,
) -> BTreeMap<AstId, Vec<(AstId, f64)>>
where
    F: FnMut(AstId, AstId) -> f64,
{
    let mut out = BTreeMap::new();
    for &s in source_items {
        let mut scored: Vec<(AstId, f64)> = target_items
            .iter()
            .map(|&t| (t, score(s, t)))
            .filter(|&(_, sc)| sc > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
        scored.truncate(TOP_K);
        out.insert(s, scored);
    }
    out
}

/// One greedy alignment pass seeded by a chosen top-`rank` predicate
/// candidate (rank 0 = best). `rank` lets [`compute_analogies`] generate
/// a handful of distinct candidate mappings instead of only ever the
/// single best one.
fn align_once(
    store: &AstStore,
    source: &DomainSummary,
    target: &DomainSummary,
    predicate_candidates: &BTreeMap<AstId, Vec<(AstId, f64)>>,
    object_candidates: &BTreeMap<AstId, Vec<(AstId, f64)>>,
    rank: usize,
) -> (BTreeMap<AstId, AstId>, BTreeMap<AstId, AstId>, BTreeMap<AstId, AstId>, Vec<f64>) {
    let mut predicate_mapping = BTreeMap::new();
    let mut pair_scores = Vec::new();
    for (&s, candidates) in predicate_candidates {
        if let Some(&(t, score)) = candidates.get(rank).or_else(|| candidates.first()) {
            predicate_mapping.insert(s, t);
            pair_scores.push(score);
        }
    }

    let mut object_mapping: BTreeMap<AstId, AstId> = BTreeMap::new();
    let mut relation_pairs: BTreeMap<AstId, AstId> = BTreeMap::new();

    for &source_rel in &source.relations {
        let (source_op, source_args) = match store.get(source_rel) {
            AstNodeKind::Application { operator, args, .. } => (*operator, args.clone()),
            _ => continue,
        };
        let Some(&target_op) = predicate_mapping.get(&source_op) else {
            continue;
        };

        let mut best: Option<(AstId, f64)> = None;
        for &target_rel in &target.relations {
            let (target_op_actual, target_args) = match store.get(target_rel) {
                AstNodeKind::Application { operator, args, .. } => (*operator, args.clone()),
                _ => continue,
            };
            if target_op_actual != target_op || target_args.len() != source_args.len() {
                continue;
            }
            let arity = source_args.len().max(1) as f64;
            let mut score = 0.0;
            for (s_arg, t_arg) in source_args.iter().zip(target_args.iter()) {
                match object_mapping.get(s_arg) {
                    Some(mapped) if mapped == t_arg => score += 1.0,
                    Some(_) => {}
                    None => score += 0.5,
                }
            }
            let score = score / arity;
            let better = match best {
                Some((_, b)) => score > b,
                None => true,
            };
            if better {
                best = Some((target_rel, score));
            }
        }

        if let Some((target_rel, score)) = best {
            if score <= 0.0 {
                continue;
            }
            relation_pairs.insert(source_rel, target_rel);
            let target_args = match store.get(target_rel) {
                AstNodeKind::Application { args, .. } => args.clone(),
                _ => continue,
            };
            for (s_arg, t_arg) in source_args.iter().zip(target_args.iter()) {
                object_mapping.entry(*s_arg).or_insert(*t_arg);
            }
        }
    }

    // Fill in any object correspondences relations left unmapped,
    // straight from the top candidate, so projection of a standalone
    // object reference (not inside any aligned relation) still works.
    for (&s, candidates) in object_candidates {
        if object_mapping.contains_key(&s) {
            continue;
        }
        if let Some(&(t, score)) = candidates.first() {
            object_mapping.insert(s, t);
            pair_scores.push(score);
        }
    }

    (predicate_mapping, object_mapping, relation_pairs, pair_scores)
}

/// Produces up to `max_mappings` candidate analogies between `source`
/// and `target`, sorted by [`AnalogicalMapping::overall_score`]
/// descending, per spec §4.7 step 5.
pub fn compute_analogies(
    store: &AstStore,
    source: &DomainSummary,
    target: &DomainSummary,
    source_id: &str,
    target_id: &str,
    max_mappings: usize,
) -> Vec<AnalogicalMapping> {
    if source.relations.is_empty() || target.relations.is_empty() {
        return Vec::new();
    }

    let predicate_candidates = top_k_candidates(&source.predicates, &target.predicates, |a, b| predicate_similarity(store, a, b));
    let object_candidates = top_k_candidates(&source.objects, &target.objects, |a, b| object_similarity(store, a, b));

    let mut mappings = Vec::new();
    let mut seen_relation_sets = BTreeSet::new();
    for rank in 0..TOP_K.max(max_mappings) {
        if mappings.len() >= max_mappings.max(1) {
            break;
        }
        let (predicate_mapping, object_mapping, relation_pairs, pair_scores) =
            align_once(store, source, target, &predicate_candidates, &object_candidates, rank);
        if relation_pairs.is_empty() {
            continue;
        }
        let signature: Vec<(AstId, AstId)> = relation_pairs.iter().map(|(&a, &b)| (a, b)).collect();
        if !seen_relation_sets.insert(signature) {
            continue;
        }

        let structural_score = relation_pairs.len() as f64 / source.relations.len() as f64;
        let semantic_score = if pair_scores.is_empty() {
            0.0
        } else {
            pair_scores.iter().sum::<f64>() / pair_scores.len() as f64
        };

        mappings.push(AnalogicalMapping {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            object_pairs: object_mapping,
            predicate_pairs: predicate_mapping,
            relation_pairs,
            structural_score,
            semantic_score,
        });
    }

    mappings.sort_by(|a, b| b.overall_score().partial_cmp(&a.overall_score()).unwrap());
    mappings.truncate(max_mappings.max(1));
    mappings
}
