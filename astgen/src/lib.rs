//! # astgen
//!
//! Generates the double-dispatch AST node hierarchy of the Lox tree-walking
//! interpreter as C++ sources.
//!
//! For every node family (`Expr`, `Stmt`) the generator writes a declaration
//! surface (`expr.hpp`) holding the handle alias, the visitor interface, the
//! abstract base type and every concrete node type, and a definition surface
//! (`expr.cpp`) holding constructors and accept forwarders.
//!
//! ## Quick Start
//!
//! ```ignore
//! use astgen::prelude::*;
//! use std::path::Path;
//!
//! let ir = SchemaIr::from_schema(&lox::schema());
//! Generator::new(&ir).write_to(Path::new("src/"))?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Schema model, built-in Lox schema, XML loading and validation
//! - [`codegen`] - C++ generation from schemas
//! - [`cli`] - Command-line front end

pub mod cli;
pub mod prelude;

/// Schema model, loading and validation.
pub mod schema {
    pub use astgen_schema::*;
}

/// C++ code generation from schemas.
pub mod codegen {
    pub use astgen_codegen::*;
}
