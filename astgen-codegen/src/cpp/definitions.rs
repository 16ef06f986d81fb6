//! Definition surface (`<family>.cpp`) generation.

use super::layout::{
    ctor_params, initializer, push_local_includes, push_namespace_close, push_namespace_open,
    push_rule, signature,
};
use astgen_schema::ir::{ResolvedAccept, ResolvedFamily, ResolvedNode};

/// Generator for the definition surface of one family.
pub struct DefinitionGenerator<'a> {
    family: &'a ResolvedFamily,
    namespace: &'a str,
    column_limit: usize,
}

impl<'a> DefinitionGenerator<'a> {
    /// Creates a new definition generator.
    #[must_use]
    pub fn new(family: &'a ResolvedFamily, namespace: &'a str, column_limit: usize) -> Self {
        Self {
            family,
            namespace,
            column_limit,
        }
    }

    /// Generates the complete source file.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = format!("#include \"{}\"\n\n", self.family.header_file);

        push_local_includes(&mut output, &self.family.visitor_headers);
        push_namespace_open(&mut output, self.namespace);

        for node in &self.family.types {
            output.push_str(&self.generate_constructor(node));
            for accept in &self.family.accepts {
                output.push_str(&Self::generate_forwarder(node, accept));
            }
        }

        push_namespace_close(&mut output, self.namespace);
        output
    }

    /// Generates a constructor with its member initializer list.
    fn generate_constructor(&self, node: &ResolvedNode) -> String {
        let mut output = String::new();

        push_rule(&mut output);
        output.push_str(&signature(
            &format!("{0}::{0}", node.full_name),
            &ctor_params(&node.fields),
            "",
            "  ",
            self.column_limit,
        ));
        output.push('\n');

        for (idx, field) in node.fields.iter().enumerate() {
            let lead = if idx == 0 { ':' } else { ',' };
            output.push_str(&format!("  {} {}\n", lead, initializer(field)));
        }
        output.push_str("{\n}\n\n");

        output
    }

    /// Generates an accept forwarder that dispatches to the visitor.
    fn generate_forwarder(node: &ResolvedNode, accept: &ResolvedAccept) -> String {
        let mut output = String::new();

        push_rule(&mut output);
        output.push_str(&format!(
            "{} {}::{}({}& {})\n",
            accept.return_type, node.full_name, accept.method, accept.visitor, accept.param
        ));
        output.push_str("{\n");
        let call = format!("{}.{}(*this);", accept.param, node.visit_method);
        if accept.returns_value {
            output.push_str(&format!("  return {call}\n"));
        } else {
            output.push_str(&format!("  {call}\n"));
        }
        output.push_str("}\n\n");

        output
    }
}
