//! Structure-mapping analogical reasoning over AST domains.
//!
//! [`AnalogicalEngine`] answers two kinds of goal: *compute* an
//! [`AnalogicalMapping`] between a source and a target domain
//! (`FindAnalogy`/`FindMapping`/`StructuralMapping`/
//! `FindAnalogicalMapping`), or *project* source-domain expressions
//! through an already-implicit mapping into the target domain
//! (`ProjectInference`/`ProjectAnalogy`/`TransferKnowledge`), per
//! spec §4.7.

pub mod align;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod project;
pub mod similarity;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use reasoning_ast::{AstId, AstNodeKind, AstStore, ProofObject, ProofStep, Prover, ResourceLimits};

pub use align::compute_analogies;
pub use error::AnalogyError;
pub use extract::{extract_domain, DomainSummary};
pub use mapping::AnalogicalMapping;
pub use project::project;

const COMPUTE_PREDICATES: &[&str] = &["FindAnalogy", "FindMapping", "StructuralMapping", "FindAnalogicalMapping"];
const PROJECT_PREDICATES: &[&str] = &["ProjectInference", "ProjectAnalogy", "TransferKnowledge"];

/// The default cap on how many candidate mappings [`compute_analogies`]
/// returns, unless a goal's resources override it.
pub const DEFAULT_MAX_MAPPINGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Compute,
    Project,
}

fn top_level_predicate_name<'a>(store: &'a AstStore, id: AstId) -> Option<&'a str> {
    match store.get(id) {
        AstNodeKind::Application { operator, .. } => match store.get(*operator) {
            AstNodeKind::Constant { name, .. } => Some(store.resolve(*name)),
            _ => None,
        },
        _ => None,
    }
}

fn classify(store: &AstStore, goal: AstId) -> Option<Task> {
    let name = top_level_predicate_name(store, goal)?;
    if COMPUTE_PREDICATES.contains(&name) {
        Some(Task::Compute)
    } else if PROJECT_PREDICATES.contains(&name) {
        Some(Task::Project)
    } else {
        None
    }
}

/// Splits a context into a source and a target domain.
///
/// The reference system tags statements with an explicit domain id in
/// node metadata, which this AST does not model; absent that, this
/// engine falls back to the "split heuristic" spec §4.7 explicitly
/// allows: statements are partitioned in `AstId` order (their
/// hash-consing insertion order), the first half assigned to the source
/// domain and the second half to the target domain. Context producers
/// that care about the split should intern all of the source domain's
/// statements before any of the target's.
fn split_context(context: &BTreeSet<AstId>) -> (BTreeSet<AstId>, BTreeSet<AstId>) {
    let half = context.len().div_ceil(2);
    let mut source = BTreeSet::new();
    let mut target = BTreeSet::new();
    for (i, &id) in context.iter().enumerate() {
        if i < half {
            source.insert(id);
        } else {
            target.insert(id);
        }
    }
    (source, target)
}

fn max_mappings_from(resources: &ResourceLimits) -> usize {
    resources
        .get_additional("max_mappings")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_MAPPINGS)
}

/// Produces and applies [`AnalogicalMapping`]s between two domains.
///
/// Holds no state between calls: every `prove` extracts fresh domain
/// summaries from whatever context it is handed.
#[derive(Debug, Default)]
pub struct AnalogicalEngine;

impl AnalogicalEngine {
    pub fn new() -> Self {
        AnalogicalEngine
    }

    fn failure(status: impl Into<String>, start: Instant) -> ProofObject {
        ProofObject::failure(status, "analogical_engine", start.elapsed().as_millis() as u64, BTreeMap::new())
    }
}

impl Prover for AnalogicalEngine {
    fn prove(&self, store: &mut AstStore, goal: AstId, context: &BTreeSet<AstId>, resources: &ResourceLimits) -> ProofObject {
        let start = Instant::now();
        let Some(task) = classify(store, goal) else {
            return Self::failure("goal is not an analogy task", start);
        };

        let (source_domain, target_domain) = split_context(context);
        let source_summary = extract_domain(store, &source_domain);
        let target_summary = extract_domain(store, &target_domain);
        let max_mappings = max_mappings_from(resources);

        let mappings = compute_analogies(store, &source_summary, &target_summary, "source", "target", max_mappings);
        let Some(best) = mappings.into_iter().next() else {
            return Self::failure(AnalogyError::NoMappingFound.to_string(), start);
        };

        match task {
            Task::Compute => {
                let step = ProofStep::new(goal, "StructureMapping", vec![]).with_explanation(format!(
                    "{} object pair(s), {} relation pair(s), overall score {:.3}",
                    best.object_pairs.len(),
                    best.relation_pairs.len(),
                    best.overall_score()
                ));
                let mut used_premises = BTreeSet::new();
                used_premises.extend(source_domain.iter().copied());
                used_premises.extend(target_domain.iter().copied());
                let mut resources_used = BTreeMap::new();
                resources_used.insert("structural_score".to_string(), best.structural_score);
                resources_used.insert("semantic_score".to_string(), best.semantic_score);
                ProofObject::success(goal, None, vec![step], used_premises, "analogical_engine", start.elapsed().as_millis() as u64, resources_used)
            }
            Task::Project => {
                let source_exprs: Vec<AstId> = match store.get(goal) {
                    AstNodeKind::Application { args, .. } => args.clone(),
                    _ => Vec::new(),
                };
                let mut projected = Vec::new();
                for &expr in &source_exprs {
                    if let Some(p) = project(store, &best, expr) {
                        projected.push(p);
                    }
                }
                if projected.is_empty() {
                    return Self::failure(AnalogyError::NoMappingFound.to_string(), start);
                }
                let steps: Vec<ProofStep> = projected
                    .iter()
                    .map(|&p| ProofStep::new(p, "AnalogicalProjection", vec![]))
                    .collect();
                let conclusion = projected[0];
                ProofObject::success(conclusion, None, steps, source_domain, "analogical_engine", start.elapsed().as_millis() as u64, BTreeMap::new())
            }
        }
    }

    fn can_handle(&self, store: &AstStore, goal: AstId, _context: &BTreeSet<AstId>) -> bool {
        classify(store, goal).is_some()
    }

    fn name(&self) -> &str {
        "analogical_engine"
    }

    fn capabilities(&self) -> HashMap<&'static str, bool> {
        let mut caps = HashMap::new();
        caps.insert("analogical_reasoning", true);
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::Type;

    fn domain_object(store: &mut AstStore, type_name: &str, const_name: &str) -> AstId {
        let ty = Type::Atomic(store.intern(type_name));
        let name = store.intern(const_name);
        store.constant(name, None, ty)
    }

    #[test]
    fn finds_mapping_between_smart_home_and_conference_room() {
        let mut store = AstStore::new();
        let place_ty = || Type::Atomic(store.intern("Place"));
        let thing_ty = || Type::Atomic(store.intern("Thing"));
        let is_in_ty = Type::Function(vec![thing_ty(), place_ty()], Box::new(Type::Boolean));
        let is_in_name = store.intern("IsIn");
        let is_in = store.constant(is_in_name, None, is_in_ty);

        let tv = domain_object(&mut store, "Thing", "TV");
        let thermostat = domain_object(&mut store, "Thing", "Thermostat");
        let living_room = domain_object(&mut store, "Place", "LivingRoom");
        let rel1 = store.application(is_in, vec![tv, living_room], Type::Boolean);
        let rel2 = store.application(is_in, vec![thermostat, living_room], Type::Boolean);

        let projector = domain_object(&mut store, "Thing", "Projector");
        let ac = domain_object(&mut store, "Thing", "AC");
        let conference_room = domain_object(&mut store, "Place", "ConferenceRoom");
        let rel3 = store.application(is_in, vec![projector, conference_room], Type::Boolean);
        let rel4 = store.application(is_in, vec![ac, conference_room], Type::Boolean);

        let mut context = BTreeSet::new();
        context.insert(rel1);
        context.insert(rel2);
        context.insert(rel3);
        context.insert(rel4);

        let find_analogy_name = store.intern("FindAnalogy");
        let find_analogy_ty = Type::Function(vec![Type::Boolean, Type::Boolean], Box::new(Type::Boolean));
        let find_analogy = store.constant(find_analogy_name, None, find_analogy_ty);
        let goal = store.application(find_analogy, vec![rel1, rel3], Type::Boolean);

        let engine = AnalogicalEngine::new();
        assert!(engine.can_handle(&store, goal, &context));
        let result = engine.prove(&mut store, goal, &context, &ResourceLimits::new());
        assert!(result.achieved);
        assert_eq!(result.engine, "analogical_engine");
        assert!(result.resources.get("structural_score").copied().unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn unrelated_goal_is_not_handled() {
        let mut store = AstStore::new();
        let name = store.intern("Mortal");
        let ty = Type::Function(vec![Type::Boolean], Box::new(Type::Boolean));
        let predicate = store.constant(name, None, ty);
        let arg = domain_object(&mut store, "Person", "socrates");
        let goal = store.application(predicate, vec![arg], Type::Boolean);

        let engine = AnalogicalEngine::new();
        assert!(!engine.can_handle(&store, goal, &BTreeSet::new()));
    }
}
