//! Built-in schema for the Lox tree-walking interpreter.
//!
//! Expression nodes are printed by `AstPrinter` and evaluated by
//! `Interpreter`; statement nodes are executed by `Interpreter` and embed
//! expression nodes, so the statement family depends on the expression family.

use crate::types::{AcceptDef, FieldDef, NodeFamily, NodeTypeDef, Schema};

/// Namespace of the generated Lox sources.
pub const NAMESPACE: &str = "lox";

/// Returns the Lox schema: the `Expr` family followed by the `Stmt` family.
#[must_use]
pub fn schema() -> Schema {
    let mut schema = Schema::new(NAMESPACE);
    schema.add_family(expr_family());
    schema.add_family(stmt_family());
    schema
}

/// Returns the Lox schema with an additional `resolve(Resolver&)` accept
/// entry point on both families, for the static variable-resolution pass.
#[must_use]
pub fn schema_with_resolver() -> Schema {
    let mut schema = schema();
    for family in &mut schema.families {
        family.add_accept(resolver_accept());
    }
    schema
}

/// Returns the expression family.
#[must_use]
pub fn expr_family() -> NodeFamily {
    let mut family = NodeFamily::new("Expr", "expression");
    family.add_include("token.hpp");
    family.add_system_include("memory");
    family.add_accept(
        AcceptDef::new("toString", "std::string", "AstPrinter", "astprinter.hpp")
            .with_param("printer"),
    );
    family.add_accept(AcceptDef::new(
        "evaluate",
        "LoxObject",
        "Interpreter",
        "interpreter.hpp",
    ));

    family.add_type(node("Assign", &[("name", "Token"), ("value", "ExprPtr")]));
    family.add_type(node(
        "Binary",
        &[("left", "ExprPtr"), ("op", "Token"), ("right", "ExprPtr")],
    ));
    family.add_type(node(
        "Call",
        &[
            ("callee", "ExprPtr"),
            ("paren", "Token"),
            ("arguments", "std::vector<ExprPtr>"),
        ],
    ));
    family.add_type(node("Grouping", &[("expression", "ExprPtr")]));
    family.add_type(node("Literal", &[("value", "LoxObject")]));
    family.add_type(node(
        "Logical",
        &[("left", "ExprPtr"), ("op", "Token"), ("right", "ExprPtr")],
    ));
    family.add_type(node("Unary", &[("op", "Token"), ("right", "ExprPtr")]));
    family.add_type(node("Variable", &[("name", "Token")]));
    family
}

/// Returns the statement family.
#[must_use]
pub fn stmt_family() -> NodeFamily {
    let mut family = NodeFamily::new("Stmt", "statement");
    family.add_dependency("Expr");
    family.add_system_include("vector");
    family.add_system_include("memory");
    family.add_accept(AcceptDef::new(
        "execute",
        "void",
        "Interpreter",
        "interpreter.hpp",
    ));

    family.add_type(node("Block", &[("statements", "std::vector<StmtPtr>")]));
    family.add_type(node("Expr", &[("expression", "ExprPtr")]));
    family.add_type(node(
        "Function",
        &[
            ("name", "Token"),
            ("params", "std::vector<Token>"),
            ("body", "std::vector<StmtPtr>"),
        ],
    ));
    // elseBranch may be empty
    family.add_type(node(
        "If",
        &[
            ("condition", "ExprPtr"),
            ("thenBranch", "StmtPtr"),
            ("elseBranch", "StmtPtr"),
        ],
    ));
    family.add_type(node("Print", &[("expression", "ExprPtr")]));
    family.add_type(node("Return", &[("keyword", "Token"), ("value", "ExprPtr")]));
    family.add_type(node("Var", &[("name", "Token"), ("initializer", "ExprPtr")]));
    family.add_type(node("While", &[("condition", "ExprPtr"), ("body", "StmtPtr")]));
    // every piece except the body may be empty
    family.add_type(node(
        "For",
        &[
            ("initializer", "StmtPtr"),
            ("condition", "ExprPtr"),
            ("increment", "ExprPtr"),
            ("body", "StmtPtr"),
        ],
    ));
    family
}

fn resolver_accept() -> AcceptDef {
    AcceptDef::new("resolve", "void", "Resolver", "resolver.hpp")
}

fn node(name: &str, fields: &[(&str, &str)]) -> NodeTypeDef {
    let mut node = NodeTypeDef::new(name);
    for (field, ctor_type) in fields {
        node.add_field(FieldDef::new(*field, *ctor_type));
    }
    node
}
