//! Maps schema nodes onto Python type expressions.

use std::collections::BTreeMap;

use kiln_openapi::{Document, Schema, SchemaKind, ref_name};

/// Maps schema nodes onto Python type expressions.
///
/// A `$ref` to a schema with an emitted model becomes that model's class
/// name via the alias table; everything else inlines a structural type.
/// There is no failure mode: insufficient information degrades to the most
/// permissive applicable type.
pub struct TypeMapper<'a> {
    doc: &'a Document,
    aliases: &'a BTreeMap<String, String>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(doc: &'a Document, aliases: &'a BTreeMap<String, String>) -> Self {
        Self { doc, aliases }
    }

    /// The Python type for a schema node.
    pub fn type_for(&self, schema: &Schema) -> String {
        self.type_at(schema, 0)
    }

    /// The type for an optional parameter schema, `Optional`-wrapped.
    pub fn type_for_opt(&self, schema: Option<&Schema>) -> String {
        match schema {
            Some(s) => self.type_for(s),
            None => "Any".to_string(),
        }
    }

    fn type_at(&self, schema: &Schema, depth: usize) -> String {
        if depth > 8 {
            return "Any".to_string();
        }
        match schema.kind() {
            SchemaKind::Ref(r) => {
                if let Some(class) = ref_name(r).and_then(|n| self.aliases.get(n)) {
                    return class.clone();
                }
                // No emitted model behind this ref: inline its structure,
                // or degrade when the ref dangles.
                let resolved = self.doc.resolve(schema);
                if resolved.ref_path.is_some() {
                    return "Dict[str, Any]".to_string();
                }
                self.structural(resolved, depth + 1)
            }
            _ => self.structural(schema, depth),
        }
    }

    fn structural(&self, schema: &Schema, depth: usize) -> String {
        match schema.kind() {
            SchemaKind::Primitive("string") => "str".to_string(),
            SchemaKind::Primitive("integer") => "int".to_string(),
            SchemaKind::Primitive("number") => "float".to_string(),
            SchemaKind::Primitive("boolean") => "bool".to_string(),
            SchemaKind::Primitive(_) => "str".to_string(),
            SchemaKind::Array => match &schema.items {
                Some(items) => format!("List[{}]", self.type_at(items, depth + 1)),
                None => "List[Any]".to_string(),
            },
            SchemaKind::Object => "Dict[str, Any]".to_string(),
            // An enum with no model context stays string-like.
            SchemaKind::Enum => "str".to_string(),
            SchemaKind::Composed => self.composed(schema, depth),
            SchemaKind::Ref(_) => "Dict[str, Any]".to_string(),
            SchemaKind::Unknown => "Any".to_string(),
        }
    }

    fn composed(&self, schema: &Schema, depth: usize) -> String {
        if !schema.all_of.is_empty() {
            return "Dict[str, Any]".to_string();
        }
        let mut branches: Vec<String> = schema
            .any_of
            .iter()
            .chain(schema.one_of.iter())
            .map(|b| self.type_at(b, depth + 1))
            .collect();
        branches.dedup();
        match branches.len() {
            0 => "Any".to_string(),
            1 => branches.remove(0),
            _ => format!("Union[{}]", branches.join(", ")),
        }
    }
}

/// Wrap a type in `Optional[...]`, never double-wrapping.
pub fn optional(expr: &str) -> String {
    if expr.starts_with("Optional[") || expr == "Any" || expr == "None" {
        expr.to_string()
    } else {
        format!("Optional[{}]", expr)
    }
}
