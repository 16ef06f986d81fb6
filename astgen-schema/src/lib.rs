//! # astgen Schema
//!
//! Node-family schema model and type definitions.
//!
//! This crate provides:
//! - Type definitions for node families, node types, fields and accept entry points
//! - The built-in Lox schema (expression and statement families)
//! - XML schema loading
//! - Opt-in schema validation
//! - Intermediate representation for code generation

pub mod error;
pub mod ir;
pub mod lox;
pub mod parser;
pub mod types;
pub mod validation;

pub use error::{ParseError, SchemaError};
pub use ir::{SchemaIr, StoragePolicy};
pub use parser::parse_schema;
pub use types::{AcceptDef, FieldDef, NodeFamily, NodeTypeDef, Schema};
pub use validation::{parse_and_validate, parse_and_validate_file, validate_schema};
