//! Recursive translation of the shared formula language to SMT-LIB 2
//! S-expressions, plus the declarations a script needs before any
//! assertion can reference a name.

use std::collections::{BTreeMap, BTreeSet};

use reasoning_ast::{AstId, AstNodeKind, AstStore, ConnectiveKind, Literal, QuantifierKind, Type, VarId};
use reasoning_base::Symbol;

use crate::error::SmtError;

/// Arithmetic and comparison operator names that SMT-LIB already defines;
/// these must never be `declare-fun`'d even though they surface as
/// ordinary `Constant` operators in an `Application` node.
const BUILTIN_OPERATORS: &[&str] = &["+", "-", "*", "/", "<", "<=", ">", ">=", "="];

/// `true` if `id`, or any sub-term, applies an arithmetic comparator or
/// numeric operator — the dispatch signal the coordinator uses to route
/// a goal to the SMT bridge.
pub fn contains_arithmetic(store: &AstStore, id: AstId) -> bool {
    match store.get(id) {
        AstNodeKind::Application { operator, args, .. } => {
            if let AstNodeKind::Constant { name, .. } = store.get(*operator) {
                if BUILTIN_OPERATORS.contains(&store.resolve(*name)) {
                    return true;
                }
            }
            args.iter().any(|&a| contains_arithmetic(store, a))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().any(|&o| contains_arithmetic(store, o)),
        AstNodeKind::Quantifier { scope, .. } => contains_arithmetic(store, *scope),
        AstNodeKind::ModalOp { proposition, .. } => contains_arithmetic(store, *proposition),
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } => false,
    }
}

/// The declared symbols a script needs: constants/functions keyed by
/// name (deduplicated, builtin operators excluded) and variables keyed
/// by `VarId` (deduplicated across every formula that mentions them).
#[derive(Debug, Default)]
pub struct Declarations {
    pub sorts: BTreeSet<Symbol>,
    pub constants: BTreeMap<Symbol, Type>,
    pub variables: BTreeMap<VarId, (Symbol, Type)>,
}

impl Declarations {
    fn note_type(&mut self, ty: &Type) {
        match ty {
            Type::Atomic(sym) => {
                self.sorts.insert(*sym);
            }
            Type::Function(args, ret) => {
                for a in args {
                    self.note_type(a);
                }
                self.note_type(ret);
            }
            Type::Boolean | Type::Integer | Type::Real | Type::Text => {}
        }
    }

    fn note_constant(&mut self, store: &AstStore, name: Symbol, value: &Option<Literal>, ty: &Type) {
        if value.is_some() {
            return;
        }
        if BUILTIN_OPERATORS.contains(&store.resolve(name)) {
            return;
        }
        self.note_type(ty);
        self.constants.entry(name).or_insert_with(|| ty.clone());
    }

    fn note_variable(&mut self, var: VarId, name: Symbol, ty: &Type) {
        self.note_type(ty);
        self.variables.entry(var).or_insert_with(|| (name, ty.clone()));
    }
}

/// Walks every formula in `ids`, collecting the sorts, constants, and
/// variables a script declaring them all would need.
pub fn collect_declarations(store: &AstStore, ids: impl IntoIterator<Item = AstId>) -> Declarations {
    let mut decls = Declarations::default();
    for id in ids {
        walk(store, id, &mut decls);
    }
    decls
}

fn walk(store: &AstStore, id: AstId, decls: &mut Declarations) {
    match store.get(id) {
        AstNodeKind::Constant { name, value, ty } => decls.note_constant(store, *name, value, ty),
        AstNodeKind::Variable { name, id: var, ty } => decls.note_variable(*var, *name, ty),
        AstNodeKind::Application { operator, args, .. } => {
            walk(store, *operator, decls);
            for &a in args {
                walk(store, a, decls);
            }
        }
        AstNodeKind::Connective { operands, .. } => {
            for &o in operands {
                walk(store, o, decls);
            }
        }
        AstNodeKind::Quantifier { scope, .. } => walk(store, *scope, decls),
        AstNodeKind::ModalOp { agent, proposition, .. } => {
            if let Some(a) = agent {
                walk(store, *a, decls);
            }
            walk(store, *proposition, decls);
        }
    }
}

/// Maps a sort name, as it would be emitted by `(declare-sort ...)`.
pub fn sort_name(store: &AstStore, ty: &Type) -> String {
    match ty {
        Type::Boolean => "Bool".to_string(),
        Type::Integer => "Int".to_string(),
        Type::Real => "Real".to_string(),
        Type::Text => "String".to_string(),
        Type::Atomic(sym) => store.resolve(*sym).to_string(),
        Type::Function(args, ret) => {
            let arg_sorts: Vec<String> = args.iter().map(|a| sort_name(store, a)).collect();
            if arg_sorts.is_empty() {
                sort_name(store, ret)
            } else {
                format!("({} -> {})", arg_sorts.join(" "), sort_name(store, ret))
            }
        }
    }
}

/// Emits `(declare-sort ...)`, `(declare-fun ...)` / `(declare-const ...)`
/// lines for every name in `decls`, in a stable order.
pub fn declaration_lines(store: &AstStore, decls: &Declarations) -> Vec<String> {
    let mut lines = Vec::new();

    for &sym in &decls.sorts {
        let name = store.resolve(sym);
        if !matches!(name, "Bool" | "Int" | "Real" | "String") {
            lines.push(format!("(declare-sort {name} 0)"));
        }
    }

    for (&sym, ty) in &decls.constants {
        let name = store.resolve(sym);
        lines.push(declare_line(name.to_string(), store, ty));
    }

    for (&var, (sym, ty)) in &decls.variables {
        let base = store.resolve(*sym);
        lines.push(declare_line(format!("{base}_{var}"), store, ty));
    }

    lines
}

fn declare_line(name: String, store: &AstStore, ty: &Type) -> String {
    match ty {
        Type::Function(args, ret) if !args.is_empty() => {
            let arg_sorts: Vec<String> = args.iter().map(|a| sort_name(store, a)).collect();
            format!("(declare-fun {name} ({}) {})", arg_sorts.join(" "), sort_name(store, ret))
        }
        Type::Function(_, ret) => format!("(declare-const {name} {})", sort_name(store, ret)),
        other => format!("(declare-const {name} {})", sort_name(store, other)),
    }
}

/// Renders a formula or term as an SMT-LIB S-expression.
pub fn translate_term(store: &AstStore, id: AstId) -> Result<String, SmtError> {
    match store.get(id) {
        AstNodeKind::Constant { name, value, .. } => Ok(match value {
            Some(Literal::Bool(true)) => "true".to_string(),
            Some(Literal::Bool(false)) => "false".to_string(),
            Some(Literal::Int(i)) => i.to_string(),
            Some(Literal::Real(r)) => format_real(*r),
            Some(Literal::Text(s)) => format!("\"{}\"", s.replace('"', "\"\"")),
            None => store.resolve(*name).to_string(),
        }),
        AstNodeKind::Variable { name, id: var, .. } => Ok(format!("{}_{}", store.resolve(*name), var)),
        AstNodeKind::Application { operator, args, .. } => {
            let op = translate_term(store, *operator)?;
            if args.is_empty() {
                return Ok(op);
            }
            let mut parts = Vec::with_capacity(args.len());
            for &a in args {
                parts.push(translate_term(store, a)?);
            }
            Ok(format!("({} {})", op, parts.join(" ")))
        }
        AstNodeKind::Connective { kind, operands, .. } => {
            let mut parts = Vec::with_capacity(operands.len());
            for &o in operands {
                parts.push(translate_term(store, o)?);
            }
            Ok(match kind {
                ConnectiveKind::Not => format!("(not {})", parts[0]),
                ConnectiveKind::And if parts.is_empty() => "true".to_string(),
                ConnectiveKind::And => format!("(and {})", parts.join(" ")),
                ConnectiveKind::Or if parts.is_empty() => "false".to_string(),
                ConnectiveKind::Or => format!("(or {})", parts.join(" ")),
                ConnectiveKind::Implies => format!("(=> {} {})", parts[0], parts[1]),
                ConnectiveKind::Equiv => format!("(= {} {})", parts[0], parts[1]),
            })
        }
        AstNodeKind::Quantifier { kind, bound_vars, scope, .. } => {
            let mut binders = Vec::with_capacity(bound_vars.len());
            for &var in bound_vars {
                let (name, ty) = find_variable(store, *scope, var)
                    .ok_or_else(|| SmtError::UnsupportedConstruct(format!("unbound quantified variable {var}")))?;
                binders.push(format!("({}_{} {})", store.resolve(name), var, sort_name(store, &ty)));
            }
            let body = translate_term(store, *scope)?;
            let quant = match kind {
                QuantifierKind::ForAll => "forall",
                QuantifierKind::Exists => "exists",
            };
            Ok(format!("({} ({}) {})", quant, binders.join(" "), body))
        }
        AstNodeKind::ModalOp { .. } => Err(SmtError::UnsupportedConstruct("modal operator".to_string())),
    }
}

fn format_real(r: f64) -> String {
    if r.fract() == 0.0 {
        format!("{r:.1}")
    } else {
        r.to_string()
    }
}

fn find_variable(store: &AstStore, id: AstId, var: VarId) -> Option<(Symbol, Type)> {
    match store.get(id) {
        AstNodeKind::Variable { name, id: v, ty } if *v == var => Some((*name, ty.clone())),
        AstNodeKind::Application { operator, args, .. } => {
            find_variable(store, *operator, var).or_else(|| args.iter().find_map(|&a| find_variable(store, a, var)))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().find_map(|&o| find_variable(store, o, var)),
        AstNodeKind::Quantifier { scope, .. } => find_variable(store, *scope, var),
        AstNodeKind::ModalOp { agent, proposition, .. } => agent
            .and_then(|a| find_variable(store, a, var))
            .or_else(|| find_variable(store, *proposition, var)),
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::AstStore;

    fn op(store: &mut AstStore, name: &str, arg_tys: Vec<Type>, ret: Type) -> AstId {
        let sym = store.intern(name);
        store.constant(sym, None, Type::Function(arg_tys, Box::new(ret)))
    }

    #[test]
    fn translates_arithmetic_comparison() {
        let mut store = AstStore::new();
        let x_name = store.intern("Total");
        let x = store.variable(x_name, 1, Type::Integer);
        let hundred_sym = store.intern("125");
        let hundred = store.constant(hundred_sym, Some(Literal::Int(125)), Type::Integer);
        let gt = op(&mut store, ">", vec![Type::Integer, Type::Integer], Type::Boolean);
        let app = store.application(gt, vec![x, hundred], Type::Boolean);

        assert_eq!(translate_term(&store, app).unwrap(), "(> Total_1 125)");
    }

    #[test]
    fn translates_implication_and_negation() {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let q_name = store.intern("Q");
        let q = store.constant(q_name, None, Type::Boolean);
        let not_q = store.connective(ConnectiveKind::Not, vec![q], Type::Boolean);
        let implies = store.connective(ConnectiveKind::Implies, vec![p, not_q], Type::Boolean);

        assert_eq!(translate_term(&store, implies).unwrap(), "(=> P (not Q))");
    }

    #[test]
    fn builtin_operators_are_excluded_from_declarations() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);
        let five_sym = store.intern("5");
        let five = store.constant(five_sym, Some(Literal::Int(5)), Type::Integer);
        let lt = op(&mut store, "<", vec![Type::Integer, Type::Integer], Type::Boolean);
        let app = store.application(lt, vec![x, five], Type::Boolean);

        let decls = collect_declarations(&store, [app]);
        assert!(decls.constants.is_empty());
        assert_eq!(decls.variables.len(), 1);
    }

    #[test]
    fn custom_atomic_sorts_are_declared() {
        let mut store = AstStore::new();
        let person = store.intern("Person");
        let socrates_name = store.intern("socrates");
        let socrates = store.constant(socrates_name, None, Type::Atomic(person));

        let decls = collect_declarations(&store, [socrates]);
        let lines = declaration_lines(&store, &decls);
        assert!(lines.contains(&"(declare-sort Person 0)".to_string()));
        assert!(lines.contains(&"(declare-const socrates Person)".to_string()));
    }
}
