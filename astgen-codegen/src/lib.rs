//! # astgen Codegen
//!
//! C++ code generation from node-family schemas.
//!
//! This crate provides:
//! - Declaration surface (`.hpp`) generation: handle aliases, visitor
//!   interfaces, abstract base types and concrete node types
//! - Definition surface (`.cpp`) generation: constructors and accept forwarders
//! - Writing the generated files into an output directory
//! - Strict entry points that validate the schema before generating

pub mod cpp;
pub mod error;
pub mod generator;

pub use error::CodegenError;
pub use generator::{Artifact, CodegenOptions, Generator};

use astgen_schema::{SchemaIr, lox};

/// Generates the four Lox source files from the built-in schema.
///
/// # Returns
/// `expr.hpp`, `expr.cpp`, `stmt.hpp` and `stmt.cpp`, in that order.
#[must_use]
pub fn generate_lox() -> Vec<Artifact> {
    let ir = SchemaIr::from_schema(&lox::schema());
    Generator::new(&ir).generate()
}

/// Generates C++ sources from an XML schema string.
///
/// # Arguments
/// * `xml` - XML schema content
///
/// # Returns
/// Generated artifacts, header then source for each family.
///
/// # Errors
/// Returns `CodegenError` if parsing fails.
pub fn generate_from_xml(xml: &str) -> Result<Vec<Artifact>, CodegenError> {
    let schema = astgen_schema::parse_schema(xml)?;
    let ir = SchemaIr::from_schema(&schema);
    let generator = Generator::new(&ir);
    Ok(generator.generate())
}

/// Generates C++ sources from an XML schema file.
///
/// # Arguments
/// * `path` - Path to the XML schema file
///
/// # Errors
/// Returns `CodegenError` if reading or parsing fails.
pub fn generate_from_file(path: &std::path::Path) -> Result<Vec<Artifact>, CodegenError> {
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml)
}

/// Generates C++ sources from an XML schema string after validating it.
///
/// # Errors
/// Returns `CodegenError::Schema` if parsing or validation fails.
pub fn generate_from_xml_strict(xml: &str) -> Result<Vec<Artifact>, CodegenError> {
    let schema = astgen_schema::parse_and_validate(xml)?;
    let ir = SchemaIr::from_schema(&schema);
    Ok(Generator::new(&ir).generate())
}

/// Generates C++ sources from an XML schema file after validating it.
///
/// # Errors
/// Returns `CodegenError::Schema` if reading, parsing or validation fails.
pub fn generate_from_file_strict(path: &std::path::Path) -> Result<Vec<Artifact>, CodegenError> {
    let schema = astgen_schema::parse_and_validate_file(path)?;
    let ir = SchemaIr::from_schema(&schema);
    Ok(Generator::new(&ir).generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPR_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<astSchema namespace="calc">
    <family name="Node" noun="node">
        <systemInclude>memory</systemInclude>
        <accept method="eval" returns="double" visitor="Evaluator" header="evaluator.hpp"/>
        <node name="Number">
            <field name="value" type="double"/>
        </node>
        <node name="Add">
            <field name="lhs" type="NodePtr"/>
            <field name="rhs" type="NodePtr"/>
        </node>
    </family>
</astSchema>"#;

    #[test]
    fn test_generate_lox() {
        let artifacts = generate_lox();
        assert_eq!(artifacts.len(), 4);
        assert!(artifacts[0].contents.contains("namespace lox {"));
        assert!(artifacts[3].contents.contains("ForStmt::ForStmt("));
    }

    #[test]
    fn test_generate_from_xml() {
        let artifacts = generate_from_xml(EXPR_XML).expect("Failed to generate");
        assert_eq!(artifacts.len(), 2);

        let header = &artifacts[0];
        assert_eq!(header.file_name, "node.hpp");
        assert!(header.contents.contains("using NodePtr = std::unique_ptr<Node>;"));
        assert!(header.contents.contains("virtual T visitAddNode(AddNode&) = 0;"));
        assert!(header.contents.contains("/** Number node.\n */"));
        assert!(header.contents.contains("}  // namespace calc\n"));

        let source = &artifacts[1];
        assert_eq!(source.file_name, "node.cpp");
        assert!(source.contents.contains(
            "double NumberNode::eval(Evaluator& evaluator)\n{\n  return evaluator.visitNumberNode(*this);\n}"
        ));
    }

    #[test]
    fn test_generate_from_xml_matches_builtin_shape() {
        let xml = r#"<astSchema namespace="lox">
    <family name="Expr" noun="expression">
        <include>token.hpp</include>
        <systemInclude>memory</systemInclude>
        <accept method="toString" returns="std::string" visitor="AstPrinter" header="astprinter.hpp" param="printer"/>
        <accept method="evaluate" returns="LoxObject" visitor="Interpreter" header="interpreter.hpp"/>
        <node name="Assign"><field name="name" type="Token"/><field name="value" type="ExprPtr"/></node>
        <node name="Binary"><field name="left" type="ExprPtr"/><field name="op" type="Token"/><field name="right" type="ExprPtr"/></node>
        <node name="Call"><field name="callee" type="ExprPtr"/><field name="paren" type="Token"/><field name="arguments" type="std::vector&lt;ExprPtr&gt;"/></node>
        <node name="Grouping"><field name="expression" type="ExprPtr"/></node>
        <node name="Literal"><field name="value" type="LoxObject"/></node>
        <node name="Logical"><field name="left" type="ExprPtr"/><field name="op" type="Token"/><field name="right" type="ExprPtr"/></node>
        <node name="Unary"><field name="op" type="Token"/><field name="right" type="ExprPtr"/></node>
        <node name="Variable"><field name="name" type="Token"/></node>
    </family>
</astSchema>"#;
        let from_xml = generate_from_xml(xml).expect("Failed to generate");
        let builtin = generate_lox();
        assert_eq!(from_xml[0], builtin[0]);
        assert_eq!(from_xml[1], builtin[1]);
    }

    #[test]
    fn test_generate_from_invalid_xml() {
        let result = generate_from_xml("<astSchema>");
        assert!(matches!(result, Err(CodegenError::Parse(_))));
    }

    #[test]
    fn test_strict_generation_matches_lenient() {
        let strict = generate_from_xml_strict(EXPR_XML).expect("Failed to generate");
        assert_eq!(strict, generate_from_xml(EXPR_XML).expect("Failed to generate"));
    }

    #[test]
    fn test_strict_generation_rejects_self_reference() {
        let xml = r#"<astSchema namespace="lox">
    <family name="Expr">
        <node name="Grouping"><field name="inner" type="GroupingExpr"/></node>
    </family>
</astSchema>"#;
        assert!(generate_from_xml(xml).is_ok());
        assert!(matches!(
            generate_from_xml_strict(xml),
            Err(CodegenError::Schema(astgen_schema::SchemaError::SelfReference { .. }))
        ));
    }

    #[test]
    fn test_strict_generation_reports_parse_errors_as_schema_errors() {
        assert!(matches!(
            generate_from_xml_strict("<astSchema>"),
            Err(CodegenError::Schema(astgen_schema::SchemaError::Parse(_)))
        ));
        assert!(matches!(
            generate_from_file_strict(std::path::Path::new("/no/such/schema.xml")),
            Err(CodegenError::Schema(astgen_schema::SchemaError::Parse(_)))
        ));
    }

    #[test]
    fn test_generate_from_missing_file() {
        let result = generate_from_file(std::path::Path::new("/no/such/schema.xml"));
        assert!(matches!(result, Err(CodegenError::Io(_))));
    }
}
