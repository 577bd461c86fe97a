//! The hash-consed formula language.
//!
//! Every formula, term, and sub-term handled by any prover in this engine
//! is built from the six [`AstNodeKind`] variants below and interned into
//! an [`AstStore`]. Interning means structural equality collapses to
//! `AstId` equality: two calls that build "the same formula" from scratch
//! return the same handle, so callers never need to walk the tree to
//! compare formulas or to deduplicate a clause set.

use std::collections::HashMap;

use reasoning_base::{Interner, Symbol};

use crate::literal::Literal;
use crate::types::Type;

/// The identity of a bound or free variable.
///
/// Distinct from [`AstId`]: a `VarId` names a *variable*, independent of
/// which [`AstNodeKind::Variable`] node (with which type) refers to it.
/// Two `Variable` nodes with the same `VarId` but different `Type`s are
/// different AST nodes (and would intern to different `AstId`s), but
/// substitution and unification key off `VarId` alone.
pub type VarId = u64;

/// A handle to a hash-consed AST node.
///
/// `AstId` is `Copy` and compares/hashes in O(1) time. It is only
/// meaningful relative to the [`AstStore`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AstId(u32);

impl AstId {
    fn from_index(index: usize) -> Self {
        AstId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The logical connectives: negation and the four binary connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectiveKind {
    Not,
    And,
    Or,
    Implies,
    Equiv,
}

/// First-order quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierKind {
    ForAll,
    Exists,
}

/// Modal and epistemic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalOpKind {
    Necessary,
    Possible,
    Knows,
    Believes,
}

/// One node of the formula language.
///
/// `Application` covers ordinary function and predicate application,
/// e.g. `Mortal(socrates)` or `plus(x, 1)`; which one it is follows from
/// the operator's [`Type`], not from a separate tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AstNodeKind {
    Constant {
        name: Symbol,
        value: Option<Literal>,
        ty: Type,
    },
    Variable {
        name: Symbol,
        id: VarId,
        ty: Type,
    },
    Application {
        operator: AstId,
        args: Vec<AstId>,
        ty: Type,
    },
    Connective {
        kind: ConnectiveKind,
        operands: Vec<AstId>,
        ty: Type,
    },
    Quantifier {
        kind: QuantifierKind,
        bound_vars: Vec<VarId>,
        scope: AstId,
        ty: Type,
    },
    ModalOp {
        op: ModalOpKind,
        agent: Option<AstId>,
        proposition: AstId,
        ty: Type,
    },
}

impl AstNodeKind {
    /// The type of this node, as recorded at construction time.
    pub fn ty(&self) -> &Type {
        match self {
            AstNodeKind::Constant { ty, .. } => ty,
            AstNodeKind::Variable { ty, .. } => ty,
            AstNodeKind::Application { ty, .. } => ty,
            AstNodeKind::Connective { ty, .. } => ty,
            AstNodeKind::Quantifier { ty, .. } => ty,
            AstNodeKind::ModalOp { ty, .. } => ty,
        }
    }
}

/// A hash-consing store for AST nodes and the names within them.
///
/// `AstStore` owns both the node arena and the [`Interner`] for symbols,
/// since the two are always needed together when constructing or
/// printing formulas.
pub struct AstStore {
    nodes: Vec<AstNodeKind>,
    index: HashMap<AstNodeKind, AstId>,
    interner: Interner,
}

impl AstStore {
    pub fn new() -> Self {
        AstStore {
            nodes: Vec::new(),
            index: HashMap::new(),
            interner: Interner::new(),
        }
    }

    /// Interns a name, returning its symbol.
    pub fn intern(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    /// Resolves a symbol back to its string.
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    /// Returns the node behind an `AstId`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this store.
    pub fn get(&self, id: AstId) -> &AstNodeKind {
        &self.nodes[id.index()]
    }

    /// The type recorded on the node behind `id`.
    pub fn type_of(&self, id: AstId) -> &Type {
        self.get(id).ty()
    }

    /// Interns a node, returning its existing handle if an identical node
    /// was already interned, or allocating a new one otherwise.
    pub fn intern_node(&mut self, kind: AstNodeKind) -> AstId {
        if let Some(&id) = self.index.get(&kind) {
            return id;
        }
        let id = AstId::from_index(self.nodes.len());
        self.index.insert(kind.clone(), id);
        self.nodes.push(kind);
        id
    }

    pub fn constant(&mut self, name: Symbol, value: Option<Literal>, ty: Type) -> AstId {
        self.intern_node(AstNodeKind::Constant { name, value, ty })
    }

    pub fn variable(&mut self, name: Symbol, id: VarId, ty: Type) -> AstId {
        self.intern_node(AstNodeKind::Variable { name, id, ty })
    }

    pub fn application(&mut self, operator: AstId, args: Vec<AstId>, ty: Type) -> AstId {
        self.intern_node(AstNodeKind::Application { operator, args, ty })
    }

    pub fn connective(&mut self, kind: ConnectiveKind, operands: Vec<AstId>, ty: Type) -> AstId {
        self.intern_node(AstNodeKind::Connective { kind, operands, ty })
    }

    pub fn quantifier(
        &mut self,
        kind: QuantifierKind,
        bound_vars: Vec<VarId>,
        scope: AstId,
        ty: Type,
    ) -> AstId {
        self.intern_node(AstNodeKind::Quantifier {
            kind,
            bound_vars,
            scope,
            ty,
        })
    }

    pub fn modal_op(
        &mut self,
        op: ModalOpKind,
        agent: Option<AstId>,
        proposition: AstId,
        ty: Type,
    ) -> AstId {
        self.intern_node(AstNodeKind::ModalOp {
            op,
            agent,
            proposition,
            ty,
        })
    }

    /// Renders a formula as a human-readable string, for diagnostics and
    /// proof-step explanations.
    pub fn display(&self, id: AstId) -> String {
        let mut out = String::new();
        self.display_into(id, &mut out);
        out
    }

    fn display_into(&self, id: AstId, out: &mut String) {
        use std::fmt::Write;
        match self.get(id) {
            AstNodeKind::Constant { name, value, .. } => {
                if let Some(v) = value {
                    let _ = write!(out, "{:?}", v);
                } else {
                    out.push_str(self.resolve(*name));
                }
            }
            AstNodeKind::Variable { name, id: var, .. } => {
                let _ = write!(out, "?{}_{}", self.resolve(*name), var);
            }
            AstNodeKind::Application { operator, args, .. } => {
                self.display_into(*operator, out);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.display_into(*arg, out);
                }
                out.push(')');
            }
            AstNodeKind::Connective { kind, operands, .. } => match kind {
                ConnectiveKind::Not => {
                    out.push('¬');
                    self.display_into(operands[0], out);
                }
                _ => {
                    let op = match kind {
                        ConnectiveKind::And => "∧",
                        ConnectiveKind::Or => "∨",
                        ConnectiveKind::Implies => "→",
                        ConnectiveKind::Equiv => "↔",
                        ConnectiveKind::Not => unreachable!(),
                    };
                    out.push('(');
                    for (i, operand) in operands.iter().enumerate() {
                        if i > 0 {
                            let _ = write!(out, " {} ", op);
                        }
                        self.display_into(*operand, out);
                    }
                    out.push(')');
                }
            },
            AstNodeKind::Quantifier {
                kind,
                bound_vars,
                scope,
                ..
            } => {
                let q = match kind {
                    QuantifierKind::ForAll => "∀",
                    QuantifierKind::Exists => "∃",
                };
                out.push_str(q);
                for (i, v) in bound_vars.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "x{}", v);
                }
                out.push('.');
                self.display_into(*scope, out);
            }
            AstNodeKind::ModalOp {
                op,
                agent,
                proposition,
                ..
            } => {
                let sym = match op {
                    ModalOpKind::Necessary => "□",
                    ModalOpKind::Possible => "◇",
                    ModalOpKind::Knows => "K",
                    ModalOpKind::Believes => "B",
                };
                out.push_str(sym);
                if let Some(a) = agent {
                    out.push('[');
                    self.display_into(*a, out);
                    out.push(']');
                }
                self.display_into(*proposition, out);
            }
        }
    }
}

impl Default for AstStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_constants_intern_to_the_same_id() {
        let mut store = AstStore::new();
        let name = store.intern("socrates");
        let a = store.constant(name, None, Type::Atomic(name));
        let b = store.constant(name, None, Type::Atomic(name));
        assert_eq!(a, b);
    }

    #[test]
    fn different_types_produce_different_ids() {
        let mut store = AstStore::new();
        let name = store.intern("x");
        let a = store.constant(name, None, Type::Integer);
        let b = store.constant(name, None, Type::Real);
        assert_ne!(a, b);
    }

    #[test]
    fn application_with_same_shape_is_shared() {
        let mut store = AstStore::new();
        let mortal = store.intern("Mortal");
        let socrates = store.intern("socrates");
        let op = store.constant(mortal, None, Type::Function(vec![Type::Atomic(socrates)], Box::new(Type::Boolean)));
        let arg = store.constant(socrates, None, Type::Atomic(socrates));
        let app1 = store.application(op, vec![arg], Type::Boolean);
        let app2 = store.application(op, vec![arg], Type::Boolean);
        assert_eq!(app1, app2);
    }

    #[test]
    fn display_renders_negation_and_application() {
        let mut store = AstStore::new();
        let mortal = store.intern("Mortal");
        let socrates = store.intern("socrates");
        let op = store.constant(mortal, None, Type::Function(vec![Type::Atomic(socrates)], Box::new(Type::Boolean)));
        let arg = store.constant(socrates, None, Type::Atomic(socrates));
        let app = store.application(op, vec![arg], Type::Boolean);
        let not_app = store.connective(ConnectiveKind::Not, vec![app], Type::Boolean);
        assert_eq!(store.display(not_app), "¬Mortal(socrates)");
    }
}
