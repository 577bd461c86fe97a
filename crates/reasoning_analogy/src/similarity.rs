//! Pairwise similarity scores feeding candidate-pair generation.

use reasoning_ast::{AstId, AstNodeKind, AstStore, Literal};

use crate::extract::predicate_name_arity;

/// Predicate-pair similarity per spec §4.7 step 2: exact name match
/// scores highest, a substring relationship next, matching arity as a
/// last resort, otherwise zero.
pub fn predicate_similarity(store: &AstStore, a: AstId, b: AstId) -> f64 {
    let (name_a, arity_a) = predicate_name_arity(store, a);
    let (name_b, arity_b) = predicate_name_arity(store, b);
    if name_a == name_b {
        return 1.0;
    }
    if substring_overlap(&name_a, &name_b) {
        return 0.5;
    }
    if arity_a == arity_b {
        return 0.3;
    }
    0.0
}

fn substring_overlap(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a.contains(&b) || b.contains(&a)
}

/// Object-pair similarity: a weighted blend of name match, type match,
/// and literal-value equality, each in `[0,1]` so the blend stays in
/// range.
pub fn object_similarity(store: &AstStore, a: AstId, b: AstId) -> f64 {
    let (name_a, value_a, ty_a) = match store.get(a) {
        AstNodeKind::Constant { name, value, ty } => (*name, value.clone(), ty.clone()),
        _ => return 0.0,
    };
    let (name_b, value_b, ty_b) = match store.get(b) {
        AstNodeKind::Constant { name, value, ty } => (*name, value.clone(), ty.clone()),
        _ => return 0.0,
    };

    let name_match = if name_a == name_b { 1.0 } else if substring_overlap(store.resolve(name_a), store.resolve(name_b)) { 0.5 } else { 0.0 };
    let type_match = if ty_a.compatible(&ty_b) { 1.0 } else { 0.0 };
    let value_match = match (&value_a, &value_b) {
        (Some(x), Some(y)) => literal_equal(x, y) as u8 as f64,
        (None, None) => 1.0,
        _ => 0.0,
    };

    0.5 * name_match + 0.3 * type_match + 0.2 * value_match
}

fn literal_equal(a: &Literal, b: &Literal) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::Type;

    #[test]
    fn identical_predicate_names_score_one() {
        let mut store = AstStore::new();
        let is_in = store.intern("IsIn");
        let ty = Type::Function(vec![Type::Boolean], Box::new(Type::Boolean));
        let a = store.constant(is_in, None, ty.clone());
        let b = store.constant(is_in, None, ty);
        assert_eq!(predicate_similarity(&store, a, b), 1.0);
    }

    #[test]
    fn unrelated_names_with_different_arity_score_zero() {
        let mut store = AstStore::new();
        let a_name = store.intern("IsIn");
        let b_name = store.intern("Likes");
        let ty_unary = Type::Function(vec![Type::Boolean], Box::new(Type::Boolean));
        let ty_binary = Type::Function(vec![Type::Boolean, Type::Boolean], Box::new(Type::Boolean));
        let a = store.constant(a_name, None, ty_unary);
        let b = store.constant(b_name, None, ty_binary);
        assert_eq!(predicate_similarity(&store, a, b), 0.0);
    }

    #[test]
    fn object_similarity_rewards_type_match_even_with_different_names() {
        let mut store = AstStore::new();
        let place_ty = Type::Atomic(store.intern("Place"));
        let tv_room = store.intern("LivingRoom");
        let conf_room = store.intern("ConferenceRoom");
        let a = store.constant(tv_room, None, place_ty.clone());
        let b = store.constant(conf_room, None, place_ty);
        let score = object_similarity(&store, a, b);
        assert!(score > 0.0 && score < 1.0);
    }
}
