//! Main code generator orchestrating all family emitters.

use crate::cpp::layout::DEFAULT_COLUMN_LIMIT;
use crate::cpp::{DeclarationGenerator, DefinitionGenerator};
use crate::error::CodegenError;
use astgen_schema::ir::{ResolvedFamily, SchemaIr};
use std::fs;
use std::path::{Path, PathBuf};

/// Options controlling the generated layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Signatures longer than this many characters are wrapped.
    pub column_limit: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            column_limit: DEFAULT_COLUMN_LIMIT,
        }
    }
}

/// A generated file: its name relative to the output directory and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name, e.g. `expr.hpp`.
    pub file_name: String,
    /// Complete file contents.
    pub contents: String,
}

impl Artifact {
    /// Writes the artifact into `dir`, replacing any existing file.
    ///
    /// # Errors
    /// Returns `CodegenError::Generation` if the file name is not a plain
    /// name inside `dir` (no file stem, or a path separator), or
    /// `CodegenError::Io` if the file cannot be created or written.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf, CodegenError> {
        if self.file_name.starts_with('.') || self.file_name.contains(['/', '\\', ':']) {
            return Err(CodegenError::generation(format!(
                "refusing to write '{}': not a plain file name",
                self.file_name
            )));
        }
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// Main code generator.
pub struct Generator<'a> {
    ir: &'a SchemaIr,
    options: CodegenOptions,
}

impl<'a> Generator<'a> {
    /// Creates a new generator with default options.
    #[must_use]
    pub fn new(ir: &'a SchemaIr) -> Self {
        Self {
            ir,
            options: CodegenOptions::default(),
        }
    }

    /// Replaces the generator options.
    #[must_use]
    pub fn with_options(mut self, options: CodegenOptions) -> Self {
        self.options = options;
        self
    }

    /// Generates the header and source of every family, in schema order.
    #[must_use]
    pub fn generate(&self) -> Vec<Artifact> {
        self.ir
            .families
            .iter()
            .flat_map(|family| self.generate_family(family))
            .collect()
    }

    /// Generates every artifact and writes it into `dir`.
    ///
    /// Files are written in schema order and each is completely written
    /// before the next is started; an I/O failure stops the run, leaving
    /// earlier files in place.
    ///
    /// # Errors
    /// Returns `CodegenError::OutputDir` if `dir` is not an existing
    /// directory, or `CodegenError::Io` if a file cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        if !dir.is_dir() {
            return Err(CodegenError::OutputDir {
                path: dir.to_path_buf(),
            });
        }

        let mut written = Vec::new();
        for artifact in self.generate() {
            let path = artifact.write_into(dir)?;
            tracing::debug!(
                "wrote {} ({} bytes)",
                path.display(),
                artifact.contents.len()
            );
            written.push(path);
        }

        tracing::info!(
            "generated {} files for {} families in {}",
            written.len(),
            self.ir.families.len(),
            dir.display()
        );
        Ok(written)
    }

    fn generate_family(&self, family: &ResolvedFamily) -> [Artifact; 2] {
        let namespace = self.ir.namespace.as_str();
        let column_limit = self.options.column_limit;

        tracing::debug!(
            "generating family {} ({} node types, {} accept entry points)",
            family.name,
            family.types.len(),
            family.accepts.len()
        );

        [
            Artifact {
                file_name: family.header_file.clone(),
                contents: DeclarationGenerator::new(family, namespace, column_limit).generate(),
            },
            Artifact {
                file_name: family.source_file.clone(),
                contents: DefinitionGenerator::new(family, namespace, column_limit).generate(),
            },
        ]
    }
}
