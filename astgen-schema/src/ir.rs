//! Intermediate representation for code generation.
//!
//! This module provides a flattened, resolved representation of the schema
//! that both emitters consume: every name the generated code uses is computed
//! once here, as is the storage policy of every field.

use crate::types::{AcceptDef, FieldDef, NodeFamily, NodeTypeDef, Schema, handle_name};
use std::collections::HashMap;

/// Marker whose presence in a constructor type means "borrowed, copy into storage".
pub const REFERENCE_MARKER: char = '&';

/// How a constructor argument is stored into its member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoragePolicy {
    /// Consumed by value and moved into the member.
    Move,
    /// Borrowed and copied into the member.
    Copy,
}

impl StoragePolicy {
    /// Decides the storage policy from a constructor parameter type.
    ///
    /// This is the only place the decision is made; the declaration and
    /// definition emitters both read the resolved policy.
    #[must_use]
    pub fn for_ctor_type(ctor_type: &str) -> Self {
        if ctor_type.contains(REFERENCE_MARKER) {
            Self::Copy
        } else {
            Self::Move
        }
    }

    /// Returns true if the argument is moved into storage.
    #[must_use]
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Move)
    }
}

/// Intermediate representation of a schema for code generation.
#[derive(Debug, Clone)]
pub struct SchemaIr {
    /// Namespace of the generated code.
    pub namespace: String,
    /// Resolved families, in generation order.
    pub families: Vec<ResolvedFamily>,
}

impl SchemaIr {
    /// Creates an intermediate representation from a schema.
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        let mut ir = Self {
            namespace: schema.namespace.clone(),
            families: Vec::with_capacity(schema.families.len()),
        };

        // Visitor classes visible through each family's declaration header.
        let mut visible: HashMap<&str, Vec<String>> = HashMap::new();

        for family in &schema.families {
            let mut inherited: Vec<String> = Vec::new();
            for dependency in &family.dependencies {
                for visitor in visible.get(dependency.as_str()).into_iter().flatten() {
                    if !inherited.contains(visitor) {
                        inherited.push(visitor.clone());
                    }
                }
            }

            let resolved = ResolvedFamily::from_family(family, &inherited);

            inherited.extend(resolved.visitor_forward_decls.iter().cloned());
            visible.entry(family.name.as_str()).or_insert(inherited);

            ir.families.push(resolved);
        }

        ir
    }

    /// Gets a resolved family by name.
    #[must_use]
    pub fn get_family(&self, name: &str) -> Option<&ResolvedFamily> {
        self.families.iter().find(|f| f.name == name)
    }
}

/// Resolved node family.
#[derive(Debug, Clone)]
pub struct ResolvedFamily {
    /// Family name, also the base type name.
    pub name: String,
    /// Noun used in documentation.
    pub noun: String,
    /// Handle alias name (e.g. `ExprPtr`).
    pub handle_name: String,
    /// Visitor interface name (e.g. `ExprVisitor`).
    pub visitor_name: String,
    /// Declaration surface file name (e.g. `expr.hpp`).
    pub header_file: String,
    /// Definition surface file name (e.g. `expr.cpp`).
    pub source_file: String,
    /// Declaration headers of the families this one depends on.
    pub dependency_headers: Vec<String>,
    /// Quoted local includes.
    pub includes: Vec<String>,
    /// Angle-bracket system includes.
    pub system_includes: Vec<String>,
    /// Accept entry points.
    pub accepts: Vec<ResolvedAccept>,
    /// Visitor implementation classes this header must forward-declare.
    pub visitor_forward_decls: Vec<String>,
    /// Distinct visitor headers the definition surface includes.
    pub visitor_headers: Vec<String>,
    /// Concrete node types, in schema order.
    pub types: Vec<ResolvedNode>,
}

impl ResolvedFamily {
    /// Resolves a family.
    ///
    /// `inherited_visitors` lists the visitor classes already declared by the
    /// headers of the families this one depends on.
    #[must_use]
    pub fn from_family(family: &NodeFamily, inherited_visitors: &[String]) -> Self {
        let accepts: Vec<ResolvedAccept> = family
            .accepts
            .iter()
            .map(|a| ResolvedAccept::from_accept_def(a, &family.name))
            .collect();

        let mut visitor_forward_decls: Vec<String> = Vec::new();
        let mut visitor_headers: Vec<String> = Vec::new();
        for accept in &accepts {
            if !inherited_visitors.contains(&accept.visitor)
                && !visitor_forward_decls.contains(&accept.visitor)
            {
                visitor_forward_decls.push(accept.visitor.clone());
            }
            if !visitor_headers.contains(&accept.header) {
                visitor_headers.push(accept.header.clone());
            }
        }

        let types = family
            .types
            .iter()
            .map(|t| ResolvedNode::from_node_def(t, &family.name))
            .collect();

        Self {
            name: family.name.clone(),
            noun: family.noun.clone(),
            handle_name: handle_name(&family.name),
            visitor_name: format!("{}Visitor", family.name),
            header_file: header_file_name(&family.name),
            source_file: source_file_name(&family.name),
            dependency_headers: family
                .dependencies
                .iter()
                .map(|d| header_file_name(d))
                .collect(),
            includes: family.includes.clone(),
            system_includes: family.system_includes.clone(),
            accepts,
            visitor_forward_decls,
            visitor_headers,
            types,
        }
    }

    /// Returns true if the family has no concrete node types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Resolved accept entry point.
#[derive(Debug, Clone)]
pub struct ResolvedAccept {
    /// Method name on the node.
    pub method: String,
    /// Return type.
    pub return_type: String,
    /// Visitor implementation class.
    pub visitor: String,
    /// Header declaring the visitor implementation.
    pub header: String,
    /// Forwarder parameter name.
    pub param: String,
    /// Whether the forwarder returns the visitor's result.
    pub returns_value: bool,
    /// Visitor interface the entry point serves (e.g. `ExprVisitor`).
    pub interface: String,
}

impl ResolvedAccept {
    /// Creates a resolved accept from its definition.
    #[must_use]
    pub fn from_accept_def(accept: &AcceptDef, family: &str) -> Self {
        Self {
            method: accept.method.clone(),
            return_type: accept.return_type.clone(),
            visitor: accept.visitor.clone(),
            header: accept.header.clone(),
            param: accept.param.clone(),
            returns_value: accept.returns_value(),
            interface: format!("{family}Visitor"),
        }
    }
}

/// Resolved concrete node type.
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    /// Schema type name (e.g. `Binary`).
    pub name: String,
    /// Generated class name (e.g. `BinaryExpr`).
    pub full_name: String,
    /// Visitor dispatch method name (e.g. `visitBinaryExpr`).
    pub visit_method: String,
    /// Resolved fields, in schema order.
    pub fields: Vec<ResolvedField>,
}

impl ResolvedNode {
    /// Creates a resolved node from its definition.
    #[must_use]
    pub fn from_node_def(node: &NodeTypeDef, family: &str) -> Self {
        let full_name = node.full_name(family);
        Self {
            name: node.name.clone(),
            visit_method: format!("visit{full_name}"),
            full_name,
            fields: node.fields.iter().map(ResolvedField::from_field_def).collect(),
        }
    }
}

/// Resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Field name.
    pub name: String,
    /// Constructor parameter type.
    pub ctor_type: String,
    /// Declared member type.
    pub member_type: String,
    /// How the constructor argument reaches the member.
    pub storage: StoragePolicy,
}

impl ResolvedField {
    /// Creates a resolved field from its definition.
    #[must_use]
    pub fn from_field_def(field: &FieldDef) -> Self {
        Self {
            name: field.name.clone(),
            ctor_type: field.ctor_type.clone(),
            member_type: field.member_type().to_string(),
            storage: StoragePolicy::for_ctor_type(&field.ctor_type),
        }
    }
}

/// Returns the declaration surface file name of a family (e.g. `expr.hpp`).
#[must_use]
pub fn header_file_name(family: &str) -> String {
    format!("{}.hpp", family.to_lowercase())
}

/// Returns the definition surface file name of a family (e.g. `expr.cpp`).
#[must_use]
pub fn source_file_name(family: &str) -> String {
    format!("{}.cpp", family.to_lowercase())
}
