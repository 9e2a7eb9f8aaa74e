use super::*;
use crate::fixtures::Library;
use crate::types::ParamInfo;

fn render(lib: &Library, ty: TypeId) -> String {
    TypeFormatter::with_declarations(&lib.interner, &lib.defs).format(ty)
}

#[test]
fn test_format_intrinsic_types() {
    let lib = Library::new();
    let mut formatter = TypeFormatter::new(&lib.interner);

    assert_eq!(formatter.format(TypeId::UNKNOWN), "_");
    assert_eq!(formatter.format(TypeId::DYNAMIC), "dynamic");
    assert_eq!(formatter.format(TypeId::VOID), "void");
    assert_eq!(formatter.format(TypeId::NEVER), "Never");
    assert_eq!(formatter.format(TypeId::NULL), "Null");
    assert_eq!(formatter.format(TypeId::OBJECT_NULLABLE), "Object?");
    assert_eq!(formatter.format(TypeId::FUNCTION), "Function");
    assert_eq!(formatter.format(TypeId::RECORD_NULLABLE), "Record?");
}

#[test]
fn test_format_interface_types() {
    let lib = Library::new();

    assert_eq!(render(&lib, lib.list_of(lib.int())), "List<int>");
    assert_eq!(
        render(&lib, lib.nullable(lib.map_of(lib.string(), lib.int()))),
        "Map<String, int>?"
    );
    assert_eq!(render(&lib, lib.eventual(lib.int())), "FutureOr<int>");
}

#[test]
fn test_format_without_declarations_uses_ids() {
    let lib = Library::new();
    let mut formatter = TypeFormatter::new(&lib.interner);

    assert_eq!(formatter.format(lib.cat()), format!("#{}", lib.cat.0));
}

#[test]
fn test_format_function_types() {
    let lib = Library::new();
    let func = lib.func_shape(
        vec![],
        vec![
            ParamInfo::required(lib.string()),
            ParamInfo::optional(lib.int()),
        ],
        vec![("flag", TypeId::OBJECT, true), ("label", lib.string(), false)],
        lib.int(),
    );

    assert_eq!(
        render(&lib, func),
        "int Function(String, [int], {required Object flag, String label})"
    );
    assert_eq!(
        render(&lib, lib.nullable(lib.func(vec![], TypeId::VOID))),
        "(void Function())?"
    );
}

#[test]
fn test_format_generic_function_type() {
    let lib = Library::new();
    let (t, t_ty) = lib.bounded_var("T", Some(lib.num()));
    let func = lib.func_shape(vec![t], vec![ParamInfo::required(t_ty)], vec![], t_ty);

    assert_eq!(render(&lib, func), "T Function<T extends num>(T)");
}

#[test]
fn test_format_record_types() {
    let lib = Library::new();

    assert_eq!(
        render(&lib, lib.record(vec![lib.int()], vec![("name", lib.string())])),
        "(int, {String name})"
    );
    assert_eq!(render(&lib, lib.record(vec![lib.int()], vec![])), "(int,)");
    assert_eq!(render(&lib, lib.record(vec![], vec![])), "()");
}
