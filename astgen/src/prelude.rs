//! Prelude module for convenient imports.
//!
//! ```ignore
//! use astgen::prelude::*;
//! ```

// Schema types
pub use astgen_schema::ir::{ResolvedFamily, SchemaIr, StoragePolicy};
pub use astgen_schema::parser::{parse_schema, parse_schema_file};
pub use astgen_schema::{
    AcceptDef, FieldDef, NodeFamily, NodeTypeDef, ParseError, Schema, SchemaError, lox,
    validate_schema,
};

// Codegen types
pub use astgen_codegen::{Artifact, CodegenError, CodegenOptions, Generator};
