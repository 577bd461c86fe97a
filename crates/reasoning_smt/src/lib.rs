//! Bridge to an external SMT-LIB 2 solver process.
//!
//! [`SmtProver`] answers `prove(G, Γ)` by asserting `Γ ∪ {¬G}` against a
//! configured solver: if the solver reports `unsat`, the negated goal
//! has no model, so `G` is entailed by `Γ`. `sat` means a countermodel
//! exists; `unknown` or a solver-level failure is reported as such.

pub mod config;
pub mod error;
pub mod invoke;
pub mod result;
pub mod translate;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use reasoning_ast::{AstId, AstNodeKind, AstStore, ConnectiveKind, ProofObject, ProofStep, Prover, ResourceLimits};

use config::SmtSolverConfig;
use error::SmtError;
use result::SatStatus;

/// The default SMT-LIB logic used when a goal's resources do not
/// override it, matching the reference implementation.
pub const DEFAULT_LOGIC: &str = "AUFLIRA";

/// Bridges proof goals to one of several configured external solvers.
#[derive(Debug, Clone)]
pub struct SmtProver {
    solvers: Vec<SmtSolverConfig>,
}

impl SmtProver {
    pub fn new(solvers: Vec<SmtSolverConfig>) -> Self {
        SmtProver { solvers }
    }

    /// A single Z3 solver, assumed reachable on `PATH`.
    pub fn with_default_z3() -> Self {
        SmtProver::new(vec![SmtSolverConfig::z3()])
    }

    fn select_solver(&self, resources: &ResourceLimits) -> Result<&SmtSolverConfig, SmtError> {
        if let Some(requested) = resources.get_additional("solver_name") {
            return self
                .solvers
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(requested))
                .ok_or_else(|| SmtError::UnknownSolver(requested.to_string()));
        }
        self.solvers.first().ok_or(SmtError::NoSolverConfigured)
    }
}

impl Default for SmtProver {
    fn default() -> Self {
        SmtProver::with_default_z3()
    }
}

/// `true` if `id`, or any sub-term, applies an arithmetic comparator or
/// numeric operator.
pub fn contains_arithmetic(store: &AstStore, id: AstId) -> bool {
    translate::contains_arithmetic(store, id)
}

/// Eliminates a double negation at the top level, matching the
/// reference's `_negate_formula`; otherwise wraps `formula` in `Not`.
fn negate(store: &mut AstStore, formula: AstId) -> AstId {
    if let AstNodeKind::Connective {
        kind: ConnectiveKind::Not,
        operands,
        ..
    } = store.get(formula)
    {
        if operands.len() == 1 {
            return operands[0];
        }
    }
    let ty = store.type_of(formula).clone();
    store.connective(ConnectiveKind::Not, vec![formula], ty)
}

/// One context formula's assertion label for unsat-core tracking.
fn axiom_label(index: usize) -> String {
    format!("axiom_{index}")
}

const GOAL_LABEL: &str = "formula";

fn build_script(
    store: &AstStore,
    negated_goal: AstId,
    context: &BTreeSet<AstId>,
    logic: &str,
    request_model: bool,
    request_unsat_core: bool,
) -> Result<String, SmtError> {
    let mut all_ids: Vec<AstId> = context.iter().copied().collect();
    all_ids.push(negated_goal);
    let decls = translate::collect_declarations(store, all_ids);

    let mut lines = vec![format!("(set-logic {logic})")];
    lines.extend(translate::declaration_lines(store, &decls));

    for (i, &formula) in context.iter().enumerate() {
        let body = translate::translate_term(store, formula)?;
        if request_unsat_core {
            lines.push(format!("(assert (! {body} :named {}))", axiom_label(i)));
        } else {
            lines.push(format!("(assert {body})"));
        }
    }

    let goal_body = translate::translate_term(store, negated_goal)?;
    if request_unsat_core {
        lines.push(format!("(assert (! {goal_body} :named {GOAL_LABEL}))"));
    } else {
        lines.push(format!("(assert {goal_body})"));
    }

    lines.push("(check-sat)".to_string());
    if request_model {
        lines.push("(get-model)".to_string());
    }
    if request_unsat_core {
        lines.push("(get-unsat-core)".to_string());
    }

    Ok(lines.join("\n"))
}

fn solve(
    prover: &SmtProver,
    store: &mut AstStore,
    goal: AstId,
    context: &BTreeSet<AstId>,
    resources: &ResourceLimits,
) -> Result<(result::SmtOutcome, String), SmtError> {
    let solver = prover.select_solver(resources)?;
    let logic = resources.get_additional("logic_theory").unwrap_or(DEFAULT_LOGIC);
    let request_model = resources.get_additional("request_model") == Some("true");
    let request_unsat_core = resources.get_additional("request_unsat_core") != Some("false");

    let negated_goal = negate(store, goal);
    let script = build_script(store, negated_goal, context, logic, request_model, request_unsat_core)?;

    let output = invoke::run(solver, &script, resources.time_limit_ms)?;
    let outcome = result::parse(&output.stdout)?;
    Ok((outcome, solver.name.clone()))
}

impl Prover for SmtProver {
    fn prove(&self, store: &mut AstStore, goal: AstId, context: &BTreeSet<AstId>, resources: &ResourceLimits) -> ProofObject {
        let start = Instant::now();

        let outcome = match solve(self, store, goal, context, resources) {
            Ok(o) => o,
            Err(e) => return failure(e.to_string(), start.elapsed().as_millis() as u64),
        };
        let (outcome, solver_name) = outcome;

        let mut resource_counters = BTreeMap::new();
        resource_counters.insert("unsat_core_size".to_string(), outcome.unsat_core.len() as f64);

        match outcome.status {
            SatStatus::Unsat => {
                let steps: Vec<ProofStep> = outcome
                    .unsat_core
                    .iter()
                    .map(|label| {
                        let rule = if label.starts_with("axiom_") { "SMT Axiom" } else { "SMT Contradiction" };
                        ProofStep::new(goal, rule, vec![]).with_explanation(format!("used in SMT unsat core: {label}"))
                    })
                    .collect();
                resource_counters.insert("smt_solver".to_string(), 1.0);
                ProofObject::success(
                    goal,
                    None,
                    steps,
                    context.clone(),
                    format!("smt_interface[{solver_name}]"),
                    start.elapsed().as_millis() as u64,
                    resource_counters,
                )
            }
            SatStatus::Sat => ProofObject::failure(
                "Failed: countermodel exists",
                "smt_interface",
                start.elapsed().as_millis() as u64,
                resource_counters,
            ),
            SatStatus::Unknown => ProofObject::failure(
                "Failed: SMT solver returned unknown",
                "smt_interface",
                start.elapsed().as_millis() as u64,
                resource_counters,
            ),
        }
    }

    fn can_handle(&self, store: &AstStore, goal: AstId, context: &BTreeSet<AstId>) -> bool {
        contains_arithmetic(store, goal) || context.iter().any(|&c| contains_arithmetic(store, c))
    }

    fn name(&self) -> &str {
        "smt_interface"
    }

    fn capabilities(&self) -> std::collections::HashMap<&'static str, bool> {
        let mut caps = std::collections::HashMap::new();
        caps.insert("arithmetic", true);
        caps.insert("equality", true);
        caps.insert("propositional_logic", true);
        caps.insert("first_order_logic", true);
        caps
    }
}

fn failure(status: impl Into<String>, time_ms: u64) -> ProofObject {
    ProofObject::failure(status, "smt_interface", time_ms, BTreeMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::Type;

    #[test]
    fn can_handle_requires_an_arithmetic_operator() {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let prover = SmtProver::with_default_z3();
        let context = BTreeSet::new();
        assert!(!prover.can_handle(&store, p, &context));
    }

    #[test]
    fn no_configured_solver_fails_gracefully() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);
        let five_sym = store.intern("5");
        let five = store.constant(five_sym, Some(reasoning_ast::Literal::Int(5)), Type::Integer);
        let op_sym = store.intern("<");
        let op = store.constant(op_sym, None, Type::Function(vec![Type::Integer, Type::Integer], Box::new(Type::Boolean)));
        let lt = store.application(op, vec![x, five], Type::Boolean);

        let prover = SmtProver::new(vec![]);
        let context = BTreeSet::new();
        let result = prover.prove(&mut store, lt, &context, &ResourceLimits::new());
        assert!(!result.achieved);
        assert_eq!(result.status, "no SMT solver configured");
    }

    #[test]
    fn unknown_requested_solver_fails_gracefully() {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);

        let prover = SmtProver::with_default_z3();
        let context = BTreeSet::new();
        let resources = ResourceLimits::new().with_additional("solver_name", "CVC5");
        let result = prover.prove(&mut store, p, &context, &resources);
        assert!(!result.achieved);
        assert!(result.status.contains("CVC5"));
    }

    #[test]
    fn build_script_asserts_context_and_negated_goal() {
        let mut store = AstStore::new();
        let total_name = store.intern("Total");
        let total = store.variable(total_name, 1, Type::Integer);
        let hundred25_sym = store.intern("125");
        let hundred25 = store.constant(hundred25_sym, Some(reasoning_ast::Literal::Int(125)), Type::Integer);
        let gt_sym = store.intern(">");
        let gt = store.constant(gt_sym, None, Type::Function(vec![Type::Integer, Type::Integer], Box::new(Type::Boolean)));
        let goal = store.application(gt, vec![total, hundred25], Type::Boolean);

        let negated = negate(&mut store, goal);
        let script = build_script(&store, negated, &BTreeSet::new(), DEFAULT_LOGIC, false, true).unwrap();

        assert!(script.contains("(set-logic AUFLIRA)"));
        assert!(script.contains("(not (> Total_1 125))"));
        assert!(script.contains("(check-sat)"));
        assert!(script.contains("(get-unsat-core)"));
    }
}
