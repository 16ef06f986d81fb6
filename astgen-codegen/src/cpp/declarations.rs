//! Declaration surface (`<family>.hpp`) generation.
//!
//! The header is emitted in a fixed order so that every name is declared
//! before it is used: forward declarations and the handle alias, the visitor
//! interface, forward declarations of the visitor implementations, the
//! abstract base type, then every concrete node type in schema order.

use super::layout::{
    ctor_params, push_local_includes, push_namespace_close, push_namespace_open, push_rule,
    push_system_includes, signature,
};
use astgen_schema::ir::{ResolvedFamily, ResolvedNode};

/// Generator for the declaration surface of one family.
pub struct DeclarationGenerator<'a> {
    family: &'a ResolvedFamily,
    namespace: &'a str,
    column_limit: usize,
}

impl<'a> DeclarationGenerator<'a> {
    /// Creates a new declaration generator.
    #[must_use]
    pub fn new(family: &'a ResolvedFamily, namespace: &'a str, column_limit: usize) -> Self {
        Self {
            family,
            namespace,
            column_limit,
        }
    }

    /// Generates the complete header.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.generate_prologue());
        output.push_str(&self.generate_forward_declarations());
        output.push_str(&self.generate_visitor());
        output.push_str(&self.generate_visitor_implementations());
        output.push_str(&self.generate_base());

        for node in &self.family.types {
            output.push_str(&self.generate_node(node));
        }

        push_namespace_close(&mut output, self.namespace);
        output
    }

    /// Generates the include guard, includes and namespace opening.
    fn generate_prologue(&self) -> String {
        let mut output = String::from("#pragma once\n\n");

        push_local_includes(
            &mut output,
            self.family
                .dependency_headers
                .iter()
                .chain(self.family.includes.iter()),
        );
        push_system_includes(&mut output, &self.family.system_includes);
        push_namespace_open(&mut output, self.namespace);

        output
    }

    /// Generates forward declarations of the base and concrete types, and the
    /// exclusive-ownership handle alias.
    fn generate_forward_declarations(&self) -> String {
        let mut output = String::new();
        let base = &self.family.name;

        push_rule(&mut output);
        output.push_str(&format!("// Forward declare all {base} types\n"));
        output.push_str(&format!("class {base};\n"));
        for node in &self.family.types {
            output.push_str(&format!("class {};\n", node.full_name));
        }
        output.push('\n');
        output.push_str(&format!(
            "using {} = std::unique_ptr<{}>;\n\n",
            self.family.handle_name, base
        ));

        output
    }

    /// Generates the visitor interface template.
    fn generate_visitor(&self) -> String {
        let mut output = String::new();
        let visitor = &self.family.visitor_name;

        push_rule(&mut output);
        output.push_str("template <typename T>\n");
        output.push_str(&format!("class {visitor}\n"));
        output.push_str("{\npublic:\n");
        output.push_str(&format!("  virtual ~{visitor}() = default;\n"));

        if !self.family.is_empty() {
            output.push('\n');
        }
        for node in &self.family.types {
            output.push_str(&format!(
                "  virtual T {}({}&) = 0;\n",
                node.visit_method, node.full_name
            ));
        }

        output.push_str("};\n\n");
        output
    }

    /// Generates forward declarations of visitor implementations not already
    /// declared by an included family header.
    fn generate_visitor_implementations(&self) -> String {
        let mut output = String::new();
        if self.family.visitor_forward_decls.is_empty() {
            return output;
        }

        push_rule(&mut output);
        output.push_str(&format!(
            "// Forward declare {} implementations\n",
            self.family.visitor_name
        ));
        for visitor in &self.family.visitor_forward_decls {
            output.push_str(&format!("class {visitor};\n"));
        }
        output.push('\n');

        output
    }

    /// Generates the abstract base type.
    fn generate_base(&self) -> String {
        let mut output = String::new();
        let base = &self.family.name;

        push_rule(&mut output);
        output.push_str(&format!(
            "/** Base class for all {} types.\n */\n",
            self.family.noun
        ));
        output.push_str(&format!("class {base}\n"));
        output.push_str("{\npublic:\n");
        output.push_str(&format!("  virtual ~{base}() = default;\n"));

        for accept in &self.family.accepts {
            output.push('\n');
            output.push_str(&format!("  // accept function for {}\n", accept.interface));
            output.push_str(&format!(
                "  virtual {} {}({}&) = 0;\n",
                accept.return_type, accept.method, accept.visitor
            ));
        }

        output.push_str("};\n\n");
        output
    }

    /// Generates a concrete node type declaration.
    fn generate_node(&self, node: &ResolvedNode) -> String {
        let mut output = String::new();

        push_rule(&mut output);
        output.push_str(&format!("/** {} {}.\n */\n", node.name, self.family.noun));
        output.push_str(&format!(
            "class {} : public {}\n",
            node.full_name, self.family.name
        ));
        output.push_str("{\npublic:\n");

        output.push_str(&signature(
            &format!("  {}", node.full_name),
            &ctor_params(&node.fields),
            ";",
            "    ",
            self.column_limit,
        ));
        output.push('\n');

        for accept in &self.family.accepts {
            output.push('\n');
            output.push_str(&format!(
                "  {} {}({}&) override;\n",
                accept.return_type, accept.method, accept.visitor
            ));
        }

        if !node.fields.is_empty() {
            output.push('\n');
        }
        for field in &node.fields {
            output.push_str(&format!("  {} {};\n", field.member_type, field.name));
        }

        output.push_str("};\n\n");
        output
    }
}
