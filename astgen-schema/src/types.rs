//! Schema type definitions.
//!
//! This module contains the data structures describing node families, the
//! concrete node types they contain, their ordered fields, and the accept
//! entry points every node of a family exposes to its visitors.

use std::collections::HashMap;

/// Complete AST schema definition.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Namespace the generated code is emitted into.
    pub namespace: String,
    /// Node families, in generation order.
    pub families: Vec<NodeFamily>,
    /// Family lookup map (first definition wins).
    family_map: HashMap<String, usize>,
}

impl Schema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            families: Vec::new(),
            family_map: HashMap::new(),
        }
    }

    /// Adds a node family to the schema.
    pub fn add_family(&mut self, family: NodeFamily) {
        let index = self.families.len();
        self.family_map.entry(family.name.clone()).or_insert(index);
        self.families.push(family);
    }

    /// Looks up a family by name.
    #[must_use]
    pub fn get_family(&self, name: &str) -> Option<&NodeFamily> {
        self.family_index(name).map(|idx| &self.families[idx])
    }

    /// Returns the position of a family in generation order.
    #[must_use]
    pub fn family_index(&self, name: &str) -> Option<usize> {
        self.family_map.get(name).copied()
    }
}

/// A set of related node types sharing one base type and one visitor interface.
#[derive(Debug, Clone)]
pub struct NodeFamily {
    /// Family name, also the base type name (e.g. `Expr`).
    pub name: String,
    /// Noun used in generated documentation (e.g. `expression`).
    pub noun: String,
    /// Earlier families whose declarations this family's declarations include.
    pub dependencies: Vec<String>,
    /// Quoted local includes of the declaration surface.
    pub includes: Vec<String>,
    /// Angle-bracket system includes of the declaration surface.
    pub system_includes: Vec<String>,
    /// Accept entry points of the family base type.
    pub accepts: Vec<AcceptDef>,
    /// Concrete node types, in schema order.
    pub types: Vec<NodeTypeDef>,
}

impl NodeFamily {
    /// Creates a new empty family.
    #[must_use]
    pub fn new(name: impl Into<String>, noun: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            noun: noun.into(),
            dependencies: Vec::new(),
            includes: Vec::new(),
            system_includes: Vec::new(),
            accepts: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Adds a concrete node type.
    pub fn add_type(&mut self, node: NodeTypeDef) {
        self.types.push(node);
    }

    /// Adds an accept entry point.
    pub fn add_accept(&mut self, accept: AcceptDef) {
        self.accepts.push(accept);
    }

    /// Records a dependency on an earlier family.
    pub fn add_dependency(&mut self, family: impl Into<String>) {
        self.dependencies.push(family.into());
    }

    /// Adds a quoted local include.
    pub fn add_include(&mut self, header: impl Into<String>) {
        self.includes.push(header.into());
    }

    /// Adds an angle-bracket system include.
    pub fn add_system_include(&mut self, header: impl Into<String>) {
        self.system_includes.push(header.into());
    }

    /// Returns the exclusive-ownership handle alias (e.g. `ExprPtr`).
    #[must_use]
    pub fn handle_name(&self) -> String {
        handle_name(&self.name)
    }

    /// Returns true if the family has no concrete node types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Concrete node type definition.
#[derive(Debug, Clone)]
pub struct NodeTypeDef {
    /// Type name, unique within its family (e.g. `Binary`).
    pub name: String,
    /// Fields, in declaration order.
    pub fields: Vec<FieldDef>,
}

impl NodeTypeDef {
    /// Creates a new node type definition without fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field to the node type.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields.push(field);
    }

    /// Returns the generated class name within `family` (e.g. `BinaryExpr`).
    #[must_use]
    pub fn full_name(&self, family: &str) -> String {
        format!("{}{}", self.name, family)
    }
}

/// Field definition within a node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Constructor parameter type.
    pub ctor_type: String,
    /// Stored member type, when it differs from the constructor type.
    pub stored_type: Option<String>,
}

impl FieldDef {
    /// Creates a field stored with its constructor type.
    #[must_use]
    pub fn new(name: impl Into<String>, ctor_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ctor_type: ctor_type.into(),
            stored_type: None,
        }
    }

    /// Creates a field with a distinct stored member type.
    #[must_use]
    pub fn with_stored(
        name: impl Into<String>,
        ctor_type: impl Into<String>,
        stored_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ctor_type: ctor_type.into(),
            stored_type: Some(stored_type.into()),
        }
    }

    /// Returns the member type declared for this field.
    #[must_use]
    pub fn member_type(&self) -> &str {
        self.stored_type.as_deref().unwrap_or(&self.ctor_type)
    }
}

/// Accept entry point of a family base type.
///
/// Each accept takes one visitor implementation and forwards to that visitor's
/// per-type method, e.g. `std::string toString(AstPrinter& printer)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptDef {
    /// Method name on the node (e.g. `evaluate`).
    pub method: String,
    /// Return type (`void` for none).
    pub return_type: String,
    /// Visitor implementation class (e.g. `Interpreter`).
    pub visitor: String,
    /// Header declaring the visitor implementation.
    pub header: String,
    /// Parameter name used in the generated forwarder.
    pub param: String,
}

impl AcceptDef {
    /// Creates an accept entry point whose parameter is named after the visitor.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        return_type: impl Into<String>,
        visitor: impl Into<String>,
        header: impl Into<String>,
    ) -> Self {
        let visitor = visitor.into();
        let param = to_lower_camel_case(&visitor);
        Self {
            method: method.into(),
            return_type: return_type.into(),
            visitor,
            header: header.into(),
            param,
        }
    }

    /// Overrides the forwarder parameter name.
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Returns true if the entry point returns a value.
    #[must_use]
    pub fn returns_value(&self) -> bool {
        self.return_type.trim() != "void"
    }
}

/// Returns the exclusive-ownership handle alias for a family name.
#[must_use]
pub fn handle_name(family: &str) -> String {
    format!("{family}Ptr")
}

/// Converts a PascalCase identifier to lowerCamelCase.
#[must_use]
pub fn to_lower_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
