//! Tests for the constraint-gathering matcher.

use super::*;
use crate::fixtures::Library;
use crate::match_rules::interfaces::as_instance_of;
use crate::trace::ConstraintRecorder;
use crate::types::ParamInfo;

// =============================================================================
// Basic properties
// =============================================================================

#[test]
fn test_reflexivity_on_closed_types() {
    let lib = Library::new();
    let ops = lib.ops();
    let closed = [
        TypeId::DYNAMIC,
        TypeId::VOID,
        TypeId::NEVER,
        TypeId::NULL,
        TypeId::OBJECT,
        TypeId::OBJECT_NULLABLE,
        TypeId::FUNCTION,
        TypeId::RECORD,
        lib.int(),
        lib.nullable(lib.list_of(lib.int())),
        lib.map_of(lib.string(), lib.eventual(lib.int())),
        lib.cell_of(lib.cat()),
        lib.func(vec![lib.int()], lib.string()),
        lib.record(vec![lib.int()], vec![("name", lib.string())]),
    ];

    for ty in closed {
        let mut matcher = ConstraintMatcher::new(&ops, std::iter::empty());
        assert!(
            matcher.try_match(ty, ty, false),
            "{} should match itself",
            ops.format_type(ty)
        );
        assert!(matcher.constraints().is_empty());
    }
}

#[test]
fn test_unknown_absorbs_everything() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    for ty in [t_ty, lib.int(), TypeId::NEVER, lib.nullable(lib.list_of(t_ty))] {
        let mut matcher = ConstraintMatcher::new(&ops, [t]);
        assert!(matcher.try_match(TypeId::UNKNOWN, ty, false));
        assert!(matcher.try_match(ty, TypeId::UNKNOWN, true));
        assert!(matcher.constraints().is_empty());
    }
}

#[test]
fn test_tracked_variable_on_the_left_gets_upper_bound() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let list_of_int = lib.list_of(lib.int());

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(t_ty, list_of_int, false));
    assert_eq!(matcher.constraints(), &[Constraint::upper(t, list_of_int)]);
}

#[test]
fn test_tracked_variable_on_the_right_gets_lower_bound() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let list_of_int = lib.list_of(lib.int());

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(list_of_int, t_ty, false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, list_of_int)]);
}

#[test]
fn test_untracked_variable_is_not_constrained() {
    let lib = Library::new();
    let ops = lib.ops();
    let (_, u_ty) = lib.var("U");

    let mut matcher = ConstraintMatcher::new(&ops, std::iter::empty());

    assert!(!matcher.try_match(lib.int(), u_ty, false));
    assert!(!matcher.try_match(u_ty, lib.int(), false));
    assert!(matcher.constraints().is_empty());
}

#[test]
fn test_failed_match_leaves_log_untouched() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);
    assert!(matcher.try_match(lib.int(), t_ty, false));
    let before = matcher.constraints().to_vec();

    // The first argument constrains T before the second one fails.
    let p = lib.map_of(t_ty, lib.int());
    let q = lib.map_of(lib.string(), lib.string());
    assert!(!matcher.try_match(p, q, false));

    assert_eq!(matcher.constraints(), before.as_slice());
}

#[test]
fn test_nullable_distribution() {
    let lib = Library::new();
    let ops = lib.ops();
    let int = lib.int();

    assert!(is_subtype_of(&ops, int, TypeId::OBJECT));
    assert!(!is_subtype_of(&ops, TypeId::NULL, TypeId::OBJECT));
    assert!(!is_subtype_of(&ops, lib.nullable(int), TypeId::OBJECT));
    assert!(is_subtype_of(&ops, lib.nullable(int), TypeId::OBJECT_NULLABLE));
    assert!(is_subtype_of(&ops, lib.nullable(int), lib.nullable(lib.num())));
}

#[test]
fn test_nullable_variable_needs_null_to_fit() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let t_nullable = lib.nullable(t_ty);

    let mut matcher = ConstraintMatcher::new(&ops, [t]);
    assert!(!matcher.try_match(t_nullable, lib.int(), false));
    assert!(matcher.constraints().is_empty());

    assert!(matcher.try_match(t_nullable, TypeId::OBJECT_NULLABLE, false));
    assert_eq!(matcher.constraints(), &[Constraint::upper(t, TypeId::OBJECT)]);
}

#[test]
fn test_nullable_bounded_parameter_splits_before_its_bound() {
    let lib = Library::new();
    let ops = lib.ops();
    let (_, z_ty) = lib.bounded_var("Z", Some(lib.num()));
    let z_nullable = lib.nullable(z_ty);

    assert!(is_subtype_of(&ops, z_ty, lib.num()));
    assert!(is_subtype_of(&ops, z_nullable, lib.nullable(lib.num())));
    assert!(!is_subtype_of(&ops, z_nullable, lib.num()));
    assert!(!is_subtype_of(&ops, z_nullable, lib.int()));
}

// =============================================================================
// Interface types
// =============================================================================

#[test]
fn test_subclass_matches_superclass_only_upwards() {
    let lib = Library::new();
    let ops = lib.ops();

    assert!(is_subtype_of(&ops, lib.cat(), lib.animal()));
    assert!(!is_subtype_of(&ops, lib.animal(), lib.cat()));
    assert!(is_subtype_of(&ops, lib.int(), lib.comparable_of(lib.num())));
    assert!(!is_subtype_of(&ops, lib.int(), lib.comparable_of(lib.int())));
}

#[test]
fn test_type_arguments_follow_declared_variance() {
    let lib = Library::new();
    let ops = lib.ops();
    let (cat, animal) = (lib.cat(), lib.animal());

    assert!(is_subtype_of(&ops, lib.list_of(cat), lib.list_of(animal)));
    assert!(!is_subtype_of(&ops, lib.list_of(animal), lib.list_of(cat)));

    assert!(is_subtype_of(&ops, lib.sink_of(animal), lib.sink_of(cat)));
    assert!(!is_subtype_of(&ops, lib.sink_of(cat), lib.sink_of(animal)));

    assert!(!is_subtype_of(&ops, lib.cell_of(cat), lib.cell_of(animal)));
    assert!(!is_subtype_of(&ops, lib.cell_of(animal), lib.cell_of(cat)));
}

#[test]
fn test_contravariant_argument_gives_lower_bound() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(lib.sink_of(t_ty), lib.sink_of(lib.int()), false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.int())]);
}

#[test]
fn test_invariant_argument_gives_both_bounds() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(lib.cell_of(t_ty), lib.cell_of(lib.int()), false));
    assert_eq!(
        matcher.constraints(),
        &[
            Constraint::upper(t, lib.int()),
            Constraint::lower(t, lib.int())
        ]
    );
}

#[test]
fn test_list_of_string_against_iterable_of_t() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);
    assert!(matcher.constrain_argument(lib.list_of(lib.string()), lib.iterable_of(t_ty)));

    let merged = matcher.compute_constraints();
    assert_eq!(
        merged[&t],
        MergedConstraint {
            lower: lib.string(),
            upper: TypeId::UNKNOWN,
        }
    );
}

#[test]
fn test_return_type_against_context() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.constrain_return_type(lib.list_of(t_ty), lib.iterable_of(lib.num())));
    assert_eq!(matcher.constraints(), &[Constraint::upper(t, lib.num())]);
}

#[test]
fn test_extension_types_only_relate_to_extension_types() {
    let lib = Library::new();
    let ops = lib.ops();

    assert!(is_subtype_of(
        &ops,
        lib.wrapper_of(lib.cat()),
        lib.wrapper_of(lib.animal())
    ));
    assert!(!is_subtype_of(
        &ops,
        lib.wrapper_of(lib.int()),
        lib.iterable_of(lib.int())
    ));
}

#[test]
fn test_as_instance_of_walks_supertypes() {
    let lib = Library::new();
    let ops = lib.ops();

    let args = as_instance_of(&ops, lib.int, &[], lib.comparable);
    assert_eq!(args.as_deref(), Some(&[lib.num()][..]));

    let args = as_instance_of(&ops, lib.list, &[lib.string()], lib.iterable);
    assert_eq!(args.as_deref(), Some(&[lib.string()][..]));

    assert!(as_instance_of(&ops, lib.cat, &[], lib.iterable).is_none());
}

// =============================================================================
// FutureOr and nullable types
// =============================================================================

#[test]
fn test_future_against_future_or_prefers_future_branch() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(lib.future_of(lib.int()), lib.eventual(t_ty), false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.int())]);
}

#[test]
fn test_plain_value_against_future_or_uses_value_branch() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let list_of_int = lib.list_of(lib.int());

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(list_of_int, lib.eventual(t_ty), false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, list_of_int)]);
}

#[test]
fn test_future_or_against_future_or_matches_inner_types() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(lib.eventual(lib.int()), lib.eventual(t_ty), false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.int())]);
}

#[test]
fn test_vacuous_future_branch_is_accepted_last() {
    let lib = Library::new();
    let ops = lib.ops();
    let future_of_int = lib.future_of(lib.int());

    let mut matcher = ConstraintMatcher::new(&ops, std::iter::empty());

    assert!(matcher.try_match(future_of_int, lib.eventual(lib.int()), false));
    assert!(matcher.try_match(lib.int(), lib.eventual(lib.num()), false));
    assert!(!matcher.try_match(lib.string(), lib.eventual(lib.num()), false));
    assert!(matcher.constraints().is_empty());
}

#[test]
fn test_future_or_on_the_left_needs_both_halves() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    assert!(is_subtype_of(&ops, lib.eventual(lib.int()), TypeId::OBJECT));
    assert!(!is_subtype_of(&ops, lib.eventual(lib.int()), lib.int()));

    let mut matcher = ConstraintMatcher::new(&ops, [t]);
    assert!(!matcher.try_match(lib.eventual(t_ty), lib.num(), false));
    assert!(matcher.constraints().is_empty());

    assert!(matcher.try_match(lib.eventual(t_ty), TypeId::OBJECT, false));
    assert_eq!(matcher.constraints(), &[Constraint::upper(t, TypeId::OBJECT)]);
}

#[test]
fn test_dynamic_against_nullable_variable() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(TypeId::DYNAMIC, lib.nullable(t_ty), false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, TypeId::OBJECT)]);
}

#[test]
fn test_non_nullable_against_nullable_variable() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(lib.int(), lib.nullable(t_ty), false));
    assert!(matcher.try_match(TypeId::NULL, lib.nullable(t_ty), false));
    assert_eq!(
        matcher.constraints(),
        &[
            Constraint::lower(t, lib.int()),
            Constraint::lower(t, TypeId::NULL)
        ]
    );
}

#[test]
fn test_null_against_nullable_types() {
    let lib = Library::new();
    let ops = lib.ops();

    assert!(is_subtype_of(&ops, TypeId::NULL, lib.nullable(lib.int())));
    assert!(is_subtype_of(&ops, TypeId::NULL, TypeId::DYNAMIC));
    assert!(is_subtype_of(
        &ops,
        TypeId::NULL,
        lib.eventual(lib.nullable(lib.int()))
    ));
    assert!(!is_subtype_of(&ops, TypeId::NULL, lib.eventual(lib.int())));
}

// =============================================================================
// Top, bottom, Object and type parameter bounds
// =============================================================================

#[test]
fn test_top_and_bottom() {
    let lib = Library::new();
    let ops = lib.ops();
    let list = lib.list_of(lib.int());

    for top in [TypeId::DYNAMIC, TypeId::VOID, TypeId::OBJECT_NULLABLE] {
        assert!(is_subtype_of(&ops, list, top));
        assert!(is_subtype_of(&ops, lib.nullable(list), top));
    }
    assert!(is_subtype_of(&ops, TypeId::NEVER, list));
    assert!(!is_subtype_of(&ops, TypeId::DYNAMIC, TypeId::OBJECT));
}

#[test]
fn test_object_requires_known_non_nullable() {
    let lib = Library::new();
    let ops = lib.ops();
    let (_, unbounded) = lib.var("U");
    let (_, bounded) = lib.bounded_var("B", Some(lib.num()));

    assert!(is_subtype_of(&ops, lib.func(vec![], TypeId::VOID), TypeId::OBJECT));
    assert!(is_subtype_of(&ops, lib.record(vec![], vec![]), TypeId::OBJECT));
    assert!(is_subtype_of(&ops, bounded, TypeId::OBJECT));
    assert!(!is_subtype_of(&ops, unbounded, TypeId::OBJECT));
}

#[test]
fn test_type_parameter_bound_is_used() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let (_, bounded) = lib.bounded_var("B", Some(lib.list_of(lib.int())));

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(bounded, lib.iterable_of(t_ty), false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.int())]);
    assert!(!matcher.try_match(bounded, lib.string(), false));
    assert_eq!(matcher.constraints().len(), 1);
}

// =============================================================================
// Function types
// =============================================================================

#[test]
fn test_function_parameters_are_contravariant() {
    let lib = Library::new();
    let ops = lib.ops();
    let f = lib.func(vec![TypeId::OBJECT], lib.int());
    let g = lib.func(vec![lib.int()], lib.num());

    assert!(is_subtype_of(&ops, f, g));
    assert!(!is_subtype_of(&ops, g, f));
}

#[test]
fn test_function_top() {
    let lib = Library::new();
    let ops = lib.ops();
    let f = lib.func(vec![lib.int()], TypeId::VOID);

    assert!(is_subtype_of(&ops, f, TypeId::FUNCTION));
    assert!(is_subtype_of(&ops, f, TypeId::FUNCTION_NULLABLE));
    assert!(!is_subtype_of(&ops, TypeId::FUNCTION, f));
    assert!(!is_subtype_of(&ops, lib.nullable(f), f));
}

#[test]
fn test_function_positional_arity() {
    let lib = Library::new();
    let ops = lib.ops();
    let int = lib.int();
    let one_required = lib.func(vec![int], TypeId::VOID);
    let two_required = lib.func(vec![int, int], TypeId::VOID);
    let one_optional = lib.func_shape(
        vec![],
        vec![ParamInfo::required(int), ParamInfo::optional(int)],
        vec![],
        TypeId::VOID,
    );

    assert!(is_subtype_of(&ops, one_optional, one_required));
    assert!(is_subtype_of(&ops, one_optional, two_required));
    assert!(!is_subtype_of(&ops, two_required, one_required));
    assert!(!is_subtype_of(&ops, one_required, one_optional));
}

#[test]
fn test_function_named_parameters() {
    let lib = Library::new();
    let ops = lib.ops();
    let int = lib.int();
    let named = |params: Vec<(&str, TypeId, bool)>| lib.func_shape(vec![], vec![], params, TypeId::VOID);

    let optional_a = named(vec![("a", int, false)]);
    let required_a = named(vec![("a", int, true)]);
    let optional_a_b = named(vec![("a", int, false), ("b", int, false)]);
    let optional_b = named(vec![("b", int, false)]);
    let none = named(vec![]);

    assert!(is_subtype_of(&ops, optional_a, required_a));
    assert!(!is_subtype_of(&ops, required_a, optional_a));
    assert!(is_subtype_of(&ops, optional_a_b, optional_a));
    assert!(!is_subtype_of(&ops, optional_a, optional_a_b));
    assert!(!is_subtype_of(&ops, optional_a, optional_b));
    assert!(is_subtype_of(&ops, optional_a, none));
    assert!(!is_subtype_of(&ops, required_a, none));
}

#[test]
fn test_function_parameter_constrains_variable_from_below() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(
        lib.func(vec![t_ty], TypeId::VOID),
        lib.func(vec![lib.int()], TypeId::VOID),
        false
    ));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.int())]);
}

#[test]
fn test_generic_function_types() {
    let lib = Library::new();
    let ops = lib.ops();
    let (x, x_ty) = lib.var("X");
    let (y, y_ty) = lib.var("Y");
    let (z, z_ty) = lib.bounded_var("Z", Some(lib.num()));
    let identity_x = lib.func_shape(vec![x], vec![ParamInfo::required(x_ty)], vec![], x_ty);
    let identity_y = lib.func_shape(vec![y], vec![ParamInfo::required(y_ty)], vec![], y_ty);
    let identity_z = lib.func_shape(vec![z], vec![ParamInfo::required(z_ty)], vec![], z_ty);
    let plain = lib.func(vec![lib.int()], lib.int());

    assert!(is_subtype_of(&ops, identity_x, identity_y));
    assert!(!is_subtype_of(&ops, identity_x, identity_z));
    assert!(!is_subtype_of(&ops, identity_x, plain));
}

#[test]
fn test_f_bounded_generic_function_types() {
    let lib = Library::new();
    let ops = lib.ops();
    let make = |name: &str| {
        let (param, param_ty) = lib.var(name);
        lib.interner
            .set_type_param_bound(param, Some(lib.comparable_of(param_ty)));
        lib.func_shape(vec![param], vec![ParamInfo::required(param_ty)], vec![], param_ty)
    };

    assert!(is_subtype_of(&ops, make("X"), make("Y")));
}

#[test]
fn test_generic_function_return_constrains_variable() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let (x, x_ty) = lib.var("X");
    let (y, y_ty) = lib.var("Y");
    let p = lib.func_shape(vec![x], vec![ParamInfo::required(x_ty)], vec![], t_ty);
    let q = lib.func_shape(vec![y], vec![ParamInfo::required(y_ty)], vec![], lib.int());

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.try_match(p, q, false));
    assert_eq!(matcher.constraints(), &[Constraint::upper(t, lib.int())]);
}

#[test]
fn test_generic_function_matching_reuses_its_parameters() {
    let lib = Library::new();
    let ops = lib.ops();
    let (x, x_ty) = lib.bounded_var("X", Some(lib.num()));
    let (y, y_ty) = lib.bounded_var("Y", Some(lib.num()));
    let (z, z_ty) = lib.var("Z");
    let p = lib.func_shape(vec![x], vec![ParamInfo::required(x_ty)], vec![], x_ty);
    let q = lib.func_shape(vec![y], vec![ParamInfo::required(y_ty)], vec![], y_ty);
    let unbounded = lib.func_shape(vec![z], vec![ParamInfo::required(z_ty)], vec![], z_ty);

    assert!(is_subtype_of(&ops, p, q));
    assert!(!is_subtype_of(&ops, p, unbounded));
    let allocated = lib.interner.type_param_count();

    for _ in 0..20 {
        assert!(is_subtype_of(&ops, p, q));
        assert!(!is_subtype_of(&ops, p, unbounded));
        let mut matcher = ConstraintMatcher::new(&ops, std::iter::empty());
        assert!(matcher.try_match(q, p, true));
    }

    // Only the reversed comparison needed parameters of its own.
    assert_eq!(lib.interner.type_param_count(), allocated + 1);
}

// =============================================================================
// Record types
// =============================================================================

#[test]
fn test_record_shape_must_agree() {
    let lib = Library::new();
    let ops = lib.ops();
    let int = lib.int();

    assert!(!is_subtype_of(
        &ops,
        lib.record(vec![int], vec![]),
        lib.record(vec![int, int], vec![])
    ));
    assert!(!is_subtype_of(
        &ops,
        lib.record(vec![], vec![("a", int)]),
        lib.record(vec![], vec![("b", int)])
    ));
    assert!(is_subtype_of(
        &ops,
        lib.record(vec![int], vec![("a", int)]),
        lib.record(vec![lib.num()], vec![("a", TypeId::OBJECT)])
    ));
    assert!(is_subtype_of(&ops, lib.record(vec![int], vec![]), TypeId::RECORD));
}

#[test]
fn test_record_fields_constrain_variables() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let (u, u_ty) = lib.var("U");

    let mut matcher = ConstraintMatcher::new(&ops, [t, u]);

    assert!(matcher.try_match(
        lib.record(vec![t_ty], vec![("name", u_ty)]),
        lib.record(vec![lib.int()], vec![("name", lib.string())]),
        false
    ));
    assert_eq!(
        matcher.constraints(),
        &[
            Constraint::upper(t, lib.int()),
            Constraint::upper(u, lib.string())
        ]
    );
}

// =============================================================================
// Driver surface
// =============================================================================

#[test]
fn test_compute_constraints_is_repeatable() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let (u, _) = lib.var("U");

    let mut matcher = ConstraintMatcher::new(&ops, [t, u]);
    assert!(matcher.constrain_argument(lib.int(), t_ty));
    assert!(matcher.constrain_argument(lib.double(), t_ty));

    let first = matcher.compute_constraints();
    let second = matcher.compute_constraints();

    assert_eq!(first, second);
    assert_eq!(first[&t].lower, lib.num());
    assert_eq!(first[&u], MergedConstraint::default());
    assert_eq!(matcher.constraints().len(), 2);
}

#[test]
fn test_observer_sees_committed_constraints_only() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let mut recorder = ConstraintRecorder::new();

    {
        let mut matcher = ConstraintMatcher::new(&ops, [t]).with_observer(&mut recorder);
        assert!(matcher.try_match_at(MatchSite(1), lib.int(), t_ty, false));
        assert!(!matcher.try_match_at(
            MatchSite(2),
            lib.map_of(t_ty, lib.int()),
            lib.map_of(lib.string(), lib.string()),
            false
        ));
        assert!(matcher.try_match_at(MatchSite(3), lib.int(), lib.num(), false));
    }

    assert_eq!(
        recorder.constraints_at(MatchSite(1)),
        &[Constraint::lower(t, lib.int())]
    );
    assert!(recorder.constraints_at(MatchSite(2)).is_empty());
    assert_eq!(
        recorder.sites().collect::<Vec<_>>(),
        vec![MatchSite(1), MatchSite(3)]
    );
}

#[test]
fn test_recursion_limit_fails_the_match() {
    let lib = Library::new();
    let ops = lib.ops();
    let nested = lib.list_of(lib.list_of(lib.list_of(lib.int())));
    let target = lib.iterable_of(lib.iterable_of(lib.iterable_of(lib.num())));
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]).with_recursion_profile(
        crate::recursion::RecursionProfile::Custom {
            max_depth: 2,
            max_iterations: 1_000,
        },
    );
    assert!(matcher.try_match(lib.int(), t_ty, false));

    assert!(!matcher.try_match(nested, target, false));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.int())]);

    // The next walk starts over.
    assert!(matcher.try_match(lib.list_of(lib.int()), lib.iterable_of(lib.num()), false));
}

#[test]
fn test_deep_nesting_is_not_cut_off() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let list = (0..300).fold(lib.string(), |inner, _| lib.list_of(inner));
    let iterable = (0..300).fold(t_ty, |inner, _| lib.iterable_of(inner));

    let mut matcher = ConstraintMatcher::new(&ops, [t]);

    assert!(matcher.constrain_argument(list, iterable));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.string())]);
}

#[test]
fn test_nested_future_or_stays_cheap() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");
    let nest = |leaf: TypeId| (0..10).fold(leaf, |inner, _| lib.eventual(inner));

    assert!(!is_subtype_of(&ops, nest(lib.int()), nest(lib.string())));
    assert!(is_subtype_of(&ops, nest(lib.int()), nest(lib.num())));

    let mut matcher = ConstraintMatcher::new(&ops, [t]);
    assert!(matcher.constrain_argument(nest(lib.int()), nest(t_ty)));
    assert_eq!(matcher.constraints(), &[Constraint::lower(t, lib.int())]);
}

#[test]
fn test_step_budget_is_per_match() {
    let lib = Library::new();
    let ops = lib.ops();
    let (t, t_ty) = lib.var("T");

    let mut matcher = ConstraintMatcher::new(&ops, [t]).with_recursion_profile(
        crate::recursion::RecursionProfile::Custom {
            max_depth: 64,
            max_iterations: 50,
        },
    );

    for _ in 0..200 {
        assert!(matcher.constrain_argument(lib.list_of(lib.string()), lib.iterable_of(t_ty)));
    }
    assert_eq!(matcher.constraints().len(), 200);
}

#[test]
fn test_matching_under_a_trace_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let lib = Library::new();
        let ops = lib.ops();
        let (t, t_ty) = lib.var("T");

        let mut matcher = ConstraintMatcher::new(&ops, [t]);
        assert!(matcher.constrain_argument(lib.eventual(lib.int()), lib.eventual(t_ty)));
        assert_eq!(matcher.compute_constraints()[&t].lower, lib.int());
    });
}

#[test]
fn test_parallel_problems_share_one_interner() {
    use rayon::prelude::*;

    let lib = Library::new();
    let ops = lib.ops();

    let solved: Vec<bool> = (0..64)
        .into_par_iter()
        .map(|i| {
            let (t, t_ty) = lib.var(&format!("T{i}"));
            let mut matcher = ConstraintMatcher::new(&ops, [t]);
            matcher.constrain_argument(lib.list_of(lib.int()), lib.iterable_of(t_ty))
                && matcher.compute_constraints()[&t].lower == lib.int()
        })
        .collect();

    assert!(solved.into_iter().all(|ok| ok));
}
