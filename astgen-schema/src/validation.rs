//! Schema validation utilities.
//!
//! Generation never validates on its own: a malformed schema still produces
//! well-formed text and the defect surfaces when the generated sources are
//! compiled. This module offers a strict check that rejects those defects up
//! front without changing what is generated for a valid schema.

use crate::error::{ParseError, SchemaError};
use crate::parser::parse_schema;
use crate::types::{NodeFamily, Schema, handle_name};
use std::collections::HashSet;
use std::path::Path;

/// Parses an XML schema and validates it.
///
/// # Errors
/// Returns `SchemaError::Parse` if the XML cannot be loaded, or the first
/// validation failure.
pub fn parse_and_validate(xml: &str) -> Result<Schema, SchemaError> {
    let schema = parse_schema(xml)?;
    validate_schema(&schema)?;
    Ok(schema)
}

/// Reads, parses and validates an XML schema file.
///
/// # Errors
/// Returns `SchemaError::Parse` if the file cannot be read or parsed, or the
/// first validation failure.
pub fn parse_and_validate_file(path: &Path) -> Result<Schema, SchemaError> {
    let xml = std::fs::read_to_string(path).map_err(ParseError::from)?;
    parse_and_validate(&xml)
}

/// Validates a schema for structural correctness.
///
/// # Arguments
/// * `schema` - The schema to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the first issue found.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    let mut seen_families = HashSet::new();

    for (index, family) in schema.families.iter().enumerate() {
        // Family names become file names, so they must be plain identifiers.
        if !is_identifier(&family.name) {
            return Err(SchemaError::Validation {
                message: format!("invalid family name '{}'", family.name),
            });
        }
        if !seen_families.insert(family.name.as_str()) {
            return Err(SchemaError::duplicate("family", &family.name));
        }

        validate_dependencies(schema, family, index)?;
        validate_accepts(family)?;
        validate_types(schema, family)?;
    }

    Ok(())
}

/// Validates that every dependency names an earlier family.
fn validate_dependencies(
    schema: &Schema,
    family: &NodeFamily,
    index: usize,
) -> Result<(), SchemaError> {
    for dependency in &family.dependencies {
        match schema.family_index(dependency) {
            Some(dep_index) if dep_index < index => {}
            _ => {
                return Err(SchemaError::UnknownFamily {
                    family: family.name.clone(),
                    name: dependency.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validates the accept entry points of a family.
fn validate_accepts(family: &NodeFamily) -> Result<(), SchemaError> {
    let mut seen_methods = HashSet::new();

    for accept in &family.accepts {
        if !is_identifier(&accept.method) {
            return Err(SchemaError::Validation {
                message: format!(
                    "invalid accept method name '{}' in family '{}'",
                    accept.method, family.name
                ),
            });
        }
        if !seen_methods.insert(accept.method.as_str()) {
            return Err(SchemaError::duplicate(
                "accept",
                format!("{}::{}", family.name, accept.method),
            ));
        }
    }

    Ok(())
}

/// Validates the node types of a family and their fields.
fn validate_types(schema: &Schema, family: &NodeFamily) -> Result<(), SchemaError> {
    let mut seen_types = HashSet::new();
    let visible_handles = visible_handles(schema, family);

    for node in &family.types {
        if !is_identifier(&node.name) {
            return Err(SchemaError::Validation {
                message: format!(
                    "invalid node type name '{}' in family '{}'",
                    node.name, family.name
                ),
            });
        }
        if !seen_types.insert(node.name.as_str()) {
            return Err(SchemaError::duplicate(
                "node type",
                format!("{}::{}", family.name, node.name),
            ));
        }

        let full_name = node.full_name(&family.name);
        let mut seen_fields = HashSet::new();

        for field in &node.fields {
            let qualified = format!("{}::{}", full_name, field.name);

            if !is_identifier(&field.name) {
                return Err(SchemaError::Validation {
                    message: format!("invalid field name '{}' in '{}'", field.name, full_name),
                });
            }
            if !seen_fields.insert(field.name.as_str()) {
                return Err(SchemaError::duplicate("field", qualified));
            }

            for type_text in [field.ctor_type.as_str(), field.member_type()] {
                for ident in identifiers(type_text) {
                    if ident == full_name {
                        return Err(SchemaError::SelfReference {
                            node: full_name.clone(),
                            field: field.name.clone(),
                        });
                    }

                    // A handle of any other family must be reachable through
                    // this family's own header.
                    let foreign_handle = schema
                        .families
                        .iter()
                        .any(|f| handle_name(&f.name) == ident);
                    if foreign_handle && !visible_handles.contains(ident) {
                        return Err(SchemaError::UnresolvedType {
                            type_name: ident.to_string(),
                            field: qualified,
                        });
                    }
                }
            }
        }
    }

    Ok(())
}

/// Returns the handle aliases reachable from a family's header: its own and
/// those of every family it includes, directly or through another header.
fn visible_handles(schema: &Schema, family: &NodeFamily) -> HashSet<String> {
    let mut visible = HashSet::from([handle_name(&family.name)]);
    let mut pending: Vec<&str> = family.dependencies.iter().map(String::as_str).collect();

    while let Some(name) = pending.pop() {
        if !visible.insert(handle_name(name)) {
            continue;
        }
        if let Some(dependency) = schema.get_family(name) {
            pending.extend(dependency.dependencies.iter().map(String::as_str));
        }
    }

    visible
}

/// Splits a C++ type expression into its identifiers (`::` paths kept whole).
fn identifiers(type_text: &str) -> impl Iterator<Item = &str> {
    type_text
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ':'))
        .filter(|s| !s.is_empty())
}

/// Returns true if `s` is a plain identifier.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lox;
    use crate::parser::parse_schema;
    use crate::types::{AcceptDef, FieldDef, NodeTypeDef};

    fn family_with(name: &str, nodes: Vec<NodeTypeDef>) -> NodeFamily {
        let mut family = NodeFamily::new(name, name.to_lowercase());
        for node in nodes {
            family.add_type(node);
        }
        family
    }

    fn node(name: &str, fields: &[(&str, &str)]) -> NodeTypeDef {
        let mut node = NodeTypeDef::new(name);
        for (field, ty) in fields {
            node.add_field(FieldDef::new(*field, *ty));
        }
        node
    }

    fn schema_of(families: Vec<NodeFamily>) -> Schema {
        let mut schema = Schema::new("lox");
        for family in families {
            schema.add_family(family);
        }
        schema
    }

    #[test]
    fn test_validate_lox_schema() {
        assert!(validate_schema(&lox::schema()).is_ok());
        assert!(validate_schema(&lox::schema_with_resolver()).is_ok());
    }

    #[test]
    fn test_validate_empty_family() {
        let schema = schema_of(vec![family_with("Expr", Vec::new())]);
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn test_validate_duplicate_family() {
        let schema = schema_of(vec![
            family_with("Expr", Vec::new()),
            family_with("Expr", Vec::new()),
        ]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::DuplicateDefinition { .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_type() {
        let schema = schema_of(vec![family_with(
            "Expr",
            vec![node("Literal", &[]), node("Literal", &[])],
        )]);
        let err = validate_schema(&schema).expect_err("duplicate type");
        assert_eq!(
            err.to_string(),
            "duplicate node type definition: 'Expr::Literal'"
        );
    }

    #[test]
    fn test_validate_duplicate_field() {
        let schema = schema_of(vec![family_with(
            "Expr",
            vec![node("Binary", &[("left", "ExprPtr"), ("left", "ExprPtr")])],
        )]);
        let err = validate_schema(&schema).expect_err("duplicate field");
        assert!(err.to_string().contains("BinaryExpr::left"));
    }

    #[test]
    fn test_validate_self_reference() {
        let schema = schema_of(vec![family_with(
            "Expr",
            vec![node("Grouping", &[("inner", "GroupingExpr")])],
        )]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::SelfReference { .. })
        ));
    }

    #[test]
    fn test_validate_self_reference_in_stored_type() {
        let mut grouping = NodeTypeDef::new("Grouping");
        grouping.add_field(FieldDef::with_stored(
            "inner",
            "const GroupingExpr&",
            "std::vector<GroupingExpr>",
        ));
        let schema = schema_of(vec![family_with("Expr", vec![grouping])]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::SelfReference { .. })
        ));
    }

    #[test]
    fn test_validate_unknown_dependency() {
        let mut stmt = family_with("Stmt", Vec::new());
        stmt.add_dependency("Expr");
        let schema = schema_of(vec![stmt]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn test_validate_dependency_on_later_family() {
        let mut expr = family_with("Expr", Vec::new());
        expr.add_dependency("Stmt");
        let schema = schema_of(vec![expr, family_with("Stmt", Vec::new())]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn test_validate_unresolved_handle() {
        // Expr does not depend on Stmt, so StmtPtr is not declared in expr.hpp.
        let schema = schema_of(vec![
            family_with("Expr", vec![node("Lambda", &[("body", "std::vector<StmtPtr>")])]),
            family_with("Stmt", Vec::new()),
        ]);
        let err = validate_schema(&schema).expect_err("unresolved handle");
        assert!(matches!(
            err,
            SchemaError::UnresolvedType { ref type_name, .. } if type_name == "StmtPtr"
        ));
    }

    #[test]
    fn test_validate_transitive_handle() {
        // decl.hpp includes stmt.hpp, which includes expr.hpp.
        let mut stmt = family_with("Stmt", Vec::new());
        stmt.add_dependency("Expr");
        let mut decl = family_with("Decl", vec![node("Class", &[("superclass", "ExprPtr")])]);
        decl.add_dependency("Stmt");
        let schema = schema_of(vec![family_with("Expr", Vec::new()), stmt, decl]);

        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn test_validate_sibling_handle_still_unresolved() {
        // Decl and Stmt both include expr.hpp, but not each other.
        let mut stmt = family_with("Stmt", Vec::new());
        stmt.add_dependency("Expr");
        let mut decl = family_with("Decl", vec![node("Class", &[("body", "StmtPtr")])]);
        decl.add_dependency("Expr");
        let schema = schema_of(vec![family_with("Expr", Vec::new()), stmt, decl]);

        let err = validate_schema(&schema).expect_err("unresolved handle");
        assert!(matches!(
            err,
            SchemaError::UnresolvedType { ref field, .. } if field == "ClassDecl::body"
        ));
    }

    #[test]
    fn test_validate_family_name_is_identifier() {
        let schema = schema_of(vec![family_with("x/../../Evil", Vec::new())]);
        let err = validate_schema(&schema).expect_err("path in family name");
        assert!(err.to_string().contains("invalid family name 'x/../../Evil'"));

        let schema = schema_of(vec![family_with("", Vec::new())]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::Validation { .. })
        ));
    }

    #[test]
    fn test_parse_and_validate() {
        let xml = r#"<astSchema namespace="lox">
    <family name="Expr"><node name="Literal"><field name="value" type="V"/></node></family>
</astSchema>"#;
        let schema = parse_and_validate(xml).expect("valid schema");
        assert_eq!(schema.families.len(), 1);

        assert!(matches!(
            parse_and_validate("<astSchema>"),
            Err(SchemaError::Parse(ParseError::MissingAttribute { .. }))
        ));

        let duplicate = r#"<astSchema namespace="lox">
    <family name="Expr"/>
    <family name="Expr"/>
</astSchema>"#;
        assert!(matches!(
            parse_and_validate(duplicate),
            Err(SchemaError::DuplicateDefinition { .. })
        ));
    }

    #[test]
    fn test_parse_and_validate_missing_file() {
        let result = parse_and_validate_file(Path::new("/no/such/schema.xml"));
        assert!(matches!(result, Err(SchemaError::Parse(ParseError::Io(_)))));
    }

    #[test]
    fn test_validate_duplicate_accept() {
        let mut family = family_with("Expr", Vec::new());
        family.add_accept(AcceptDef::new("evaluate", "LoxObject", "Interpreter", "i.hpp"));
        family.add_accept(AcceptDef::new("evaluate", "void", "Resolver", "r.hpp"));
        let schema = schema_of(vec![family]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::DuplicateDefinition { .. })
        ));
    }

    #[test]
    fn test_validate_invalid_names() {
        let schema = schema_of(vec![family_with("Expr", vec![node("Bad Name", &[])])]);
        assert!(matches!(
            validate_schema(&schema),
            Err(SchemaError::Validation { .. })
        ));

        let schema = schema_of(vec![family_with(
            "Expr",
            vec![node("Literal", &[("1value", "V")])],
        )]);
        assert!(validate_schema(&schema).is_err());
    }

    #[test]
    fn test_validate_parsed_schema() {
        let xml = r#"<astSchema namespace="lox">
    <family name="Expr">
        <node name="Unary">
            <field name="op" type="const Token&amp;" stored="Token"/>
            <field name="right" type="ExprPtr"/>
        </node>
    </family>
</astSchema>"#;
        let schema = parse_schema(xml).expect("Failed to parse");
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn test_identifiers() {
        let idents: Vec<&str> = identifiers("const std::vector<ExprPtr>&").collect();
        assert_eq!(idents, ["const", "std::vector", "ExprPtr"]);
        assert!(is_identifier("thenBranch"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
