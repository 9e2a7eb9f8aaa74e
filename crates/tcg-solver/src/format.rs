//! Human-readable rendering of types.
//!
//! Used by log events, by the constraint recorder's JSON export and by test
//! failure messages. Rendering follows the surface syntax of the modeled
//! language: `List<int>?`, `FutureOr<T>`, `int Function(String, {required bool flag})`,
//! `(int, {String name})`.

use crate::db::TypeDatabase;
use crate::def::DeclarationResolver;
use crate::types::{FunctionShape, Nullability, RecordShape, TypeData, TypeId, TypeParamId};

/// Nesting beyond this depth is elided as `...`.
const MAX_FORMAT_DEPTH: u32 = 32;

/// Formats types for display.
pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    declarations: Option<&'a dyn DeclarationResolver>,
    depth: u32,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        TypeFormatter {
            db,
            declarations: None,
            depth: 0,
        }
    }

    /// Resolve declaration names through `declarations`. Without it
    /// interface types render as `#<def id>`.
    pub fn with_declarations(
        db: &'a dyn TypeDatabase,
        declarations: &'a dyn DeclarationResolver,
    ) -> Self {
        TypeFormatter {
            db,
            declarations: Some(declarations),
            depth: 0,
        }
    }

    pub fn format(&mut self, ty: TypeId) -> String {
        if self.depth > MAX_FORMAT_DEPTH {
            return "...".to_string();
        }
        self.depth += 1;
        let rendered = self.format_inner(ty);
        self.depth -= 1;
        rendered
    }

    fn format_inner(&mut self, ty: TypeId) -> String {
        let Some(data) = self.db.lookup(ty) else {
            return format!("<invalid #{}>", ty.0);
        };

        match data {
            TypeData::Unknown => "_".to_string(),
            TypeData::Dynamic => "dynamic".to_string(),
            TypeData::Void => "void".to_string(),
            TypeData::Never => "Never".to_string(),
            TypeData::Null => "Null".to_string(),
            TypeData::Object(n) => suffixed("Object".to_string(), n),
            TypeData::FunctionTop(n) => suffixed("Function".to_string(), n),
            TypeData::RecordTop(n) => suffixed("Record".to_string(), n),
            TypeData::Interface(def, args, n) => {
                let name = self
                    .declarations
                    .and_then(|decls| decls.name(def))
                    .map(|atom| self.db.resolve_atom(atom))
                    .unwrap_or_else(|| format!("#{}", def.0));
                let args = self.db.type_list(args);
                let rendered = if args.is_empty() {
                    name
                } else {
                    format!("{}<{}>", name, self.format_list(&args))
                };
                suffixed(rendered, n)
            }
            TypeData::TypeParameter(param, n) => suffixed(self.param_name(param), n),
            TypeData::Eventual(inner, n) => suffixed(format!("FutureOr<{}>", self.format(inner)), n),
            TypeData::Function(shape, n) => {
                let shape = self.db.function_shape(shape);
                let rendered = self.format_function(&shape);
                if n.is_nullable() {
                    format!("({rendered})?")
                } else {
                    rendered
                }
            }
            TypeData::Record(shape, n) => {
                let shape = self.db.record_shape(shape);
                suffixed(self.format_record(&shape), n)
            }
        }
    }

    fn param_name(&self, param: TypeParamId) -> String {
        let info = self.db.type_param_info(param);
        if info.name.is_none() {
            format!("T#{}", param.0)
        } else {
            self.db.resolve_atom(info.name)
        }
    }

    fn format_list(&mut self, types: &[TypeId]) -> String {
        types
            .iter()
            .map(|&ty| self.format(ty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn format_function(&mut self, shape: &FunctionShape) -> String {
        let mut out = self.format(shape.return_type);
        out.push_str(" Function");

        if shape.is_generic() {
            let params: Vec<String> = shape
                .type_params
                .iter()
                .map(|&param| {
                    let name = self.param_name(param);
                    match self.db.type_param_info(param).bound {
                        Some(bound) => format!("{name} extends {}", self.format(bound)),
                        None => name,
                    }
                })
                .collect();
            out.push('<');
            out.push_str(&params.join(", "));
            out.push('>');
        }

        let required = shape.required_positional_count();
        let mut parts: Vec<String> = shape.positional[..required]
            .iter()
            .map(|param| self.format(param.type_id))
            .collect();
        if required < shape.positional.len() {
            let optional: Vec<String> = shape.positional[required..]
                .iter()
                .map(|param| self.format(param.type_id))
                .collect();
            parts.push(format!("[{}]", optional.join(", ")));
        }
        if !shape.named.is_empty() {
            let named: Vec<String> = shape
                .named
                .iter()
                .map(|param| {
                    let ty = self.format(param.type_id);
                    let name = self.db.resolve_atom(param.name);
                    if param.required {
                        format!("required {ty} {name}")
                    } else {
                        format!("{ty} {name}")
                    }
                })
                .collect();
            parts.push(format!("{{{}}}", named.join(", ")));
        }

        out.push('(');
        out.push_str(&parts.join(", "));
        out.push(')');
        out
    }

    fn format_record(&mut self, shape: &RecordShape) -> String {
        let mut parts: Vec<String> = shape
            .positional
            .iter()
            .map(|&field| self.format(field))
            .collect();
        if !shape.named.is_empty() {
            let named: Vec<String> = shape
                .named
                .iter()
                .map(|field| {
                    format!(
                        "{} {}",
                        self.format(field.type_id),
                        self.db.resolve_atom(field.name)
                    )
                })
                .collect();
            parts.push(format!("{{{}}}", named.join(", ")));
        }
        // A lone positional field needs a trailing comma to read as a record.
        if shape.positional.len() == 1 && shape.named.is_empty() {
            format!("({},)", parts[0])
        } else {
            format!("({})", parts.join(", "))
        }
    }
}

fn suffixed(rendered: String, nullability: Nullability) -> String {
    match nullability {
        Nullability::Nullable => format!("{rendered}?"),
        Nullability::NonNullable => rendered,
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
