//! Classification of signed formulas into tableau rule kinds.

use reasoning_ast::{AstNodeKind, AstStore, ConnectiveKind, ModalOpKind};

use crate::branch::SignedFormula;

/// The expansion a signed formula calls for.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Non-branching: both components are added to the current world.
    Alpha(Vec<SignedFormula>),
    /// Branching: the branch splits, one clone per disjunct.
    Beta(Vec<SignedFormula>),
    /// Universal modal: the inner formula is added to every world
    /// accessible from the owning world.
    Pi(SignedFormula),
    /// Existential modal: a fresh world is created, linked from the
    /// owning world, and the inner formula placed there.
    Nu(SignedFormula),
    /// Already atomic; only checked for contradiction.
    Literal,
}

/// Classifies `sf` according to the signed-tableau expansion rules.
pub fn classify(store: &AstStore, sf: SignedFormula) -> RuleKind {
    let node = store.get(sf.formula);
    match node {
        AstNodeKind::Connective { kind, operands, .. } => match (kind, sf.sign) {
            (ConnectiveKind::Not, _) => {
                // Double negation: T:¬¬A / F:¬¬A both reduce to A with the
                // sign distributed through the one negation layer we see
                // here, plus the inner literal's own negation handled by
                // whoever re-classifies it. A single `Not` node flips sign
                // on its operand and is itself alpha (a one-component
                // "conjunction").
                RuleKind::Alpha(vec![SignedFormula::new(operands[0], !sf.sign)])
            }
            (ConnectiveKind::And, true) => {
                RuleKind::Alpha(operands.iter().map(|&o| SignedFormula::new(o, true)).collect())
            }
            (ConnectiveKind::And, false) => {
                RuleKind::Beta(operands.iter().map(|&o| SignedFormula::new(o, false)).collect())
            }
            (ConnectiveKind::Or, true) => {
                RuleKind::Beta(operands.iter().map(|&o| SignedFormula::new(o, true)).collect())
            }
            (ConnectiveKind::Or, false) => {
                RuleKind::Alpha(operands.iter().map(|&o| SignedFormula::new(o, false)).collect())
            }
            (ConnectiveKind::Implies, true) => RuleKind::Beta(vec![
                SignedFormula::new(operands[0], false),
                SignedFormula::new(operands[1], true),
            ]),
            (ConnectiveKind::Implies, false) => RuleKind::Alpha(vec![
                SignedFormula::new(operands[0], true),
                SignedFormula::new(operands[1], false),
            ]),
            (ConnectiveKind::Equiv, _) => {
                // A<->B is expected to already be eliminated one level up,
                // the same way the resolution prover's CNF pipeline expands
                // it into (A->B)&(B->A). Reaching here with an
                // un-eliminated Equiv is a bug in the caller.
                RuleKind::Literal
            }
        },
        AstNodeKind::ModalOp {
            op, proposition, ..
        } => match (op, sf.sign) {
            (ModalOpKind::Necessary, true) | (ModalOpKind::Knows, true) | (ModalOpKind::Believes, true) => {
                RuleKind::Pi(SignedFormula::new(*proposition, true))
            }
            (ModalOpKind::Possible, false) => RuleKind::Pi(SignedFormula::new(*proposition, false)),
            (ModalOpKind::Possible, true) => RuleKind::Nu(SignedFormula::new(*proposition, true)),
            (ModalOpKind::Necessary, false) | (ModalOpKind::Knows, false) | (ModalOpKind::Believes, false) => {
                RuleKind::Nu(SignedFormula::new(*proposition, false))
            }
        },
        _ => RuleKind::Literal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::{AstStore, Type};

    #[test]
    fn t_and_is_alpha() {
        let mut store = AstStore::new();
        let p_name = store.intern("p");
        let q_name = store.intern("q");
        let p = store.constant(p_name, None, Type::Boolean);
        let q = store.constant(q_name, None, Type::Boolean);
        let conj = store.connective(ConnectiveKind::And, vec![p, q], Type::Boolean);
        match classify(&store, SignedFormula::new(conj, true)) {
            RuleKind::Alpha(components) => assert_eq!(components.len(), 2),
            other => panic!("expected alpha, got {:?}", other),
        }
    }

    #[test]
    fn f_and_is_beta() {
        let mut store = AstStore::new();
        let p_name = store.intern("p");
        let q_name = store.intern("q");
        let p = store.constant(p_name, None, Type::Boolean);
        let q = store.constant(q_name, None, Type::Boolean);
        let conj = store.connective(ConnectiveKind::And, vec![p, q], Type::Boolean);
        match classify(&store, SignedFormula::new(conj, false)) {
            RuleKind::Beta(components) => assert_eq!(components.len(), 2),
            other => panic!("expected beta, got {:?}", other),
        }
    }

    #[test]
    fn t_necessary_is_pi() {
        let mut store = AstStore::new();
        let p_name = store.intern("p");
        let p = store.constant(p_name, None, Type::Boolean);
        let boxed = store.modal_op(ModalOpKind::Necessary, None, p, Type::Boolean);
        match classify(&store, SignedFormula::new(boxed, true)) {
            RuleKind::Pi(inner) => assert_eq!(inner.formula, p),
            other => panic!("expected pi, got {:?}", other),
        }
    }

    #[test]
    fn t_possible_is_nu() {
        let mut store = AstStore::new();
        let p_name = store.intern("p");
        let p = store.constant(p_name, None, Type::Boolean);
        let diamond = store.modal_op(ModalOpKind::Possible, None, p, Type::Boolean);
        match classify(&store, SignedFormula::new(diamond, true)) {
            RuleKind::Nu(inner) => assert_eq!(inner.formula, p),
            other => panic!("expected nu, got {:?}", other),
        }
    }

    #[test]
    fn constant_is_literal() {
        let mut store = AstStore::new();
        let p_name = store.intern("p");
        let p = store.constant(p_name, None, Type::Boolean);
        match classify(&store, SignedFormula::new(p, true)) {
            RuleKind::Literal => {}
            other => panic!("expected literal, got {:?}", other),
        }
    }
}
