//! Command-line front end.

use anyhow::Context;
use astgen_codegen::cpp::layout::DEFAULT_COLUMN_LIMIT;
use astgen_codegen::{CodegenOptions, Generator};
use astgen_schema::parser::parse_schema_file;
use astgen_schema::{Schema, SchemaIr, lox, parse_and_validate_file, validate_schema};
use clap::Parser;
use std::path::PathBuf;

/// Generates the C++ AST node hierarchy (`<family>.hpp` / `<family>.cpp`)
/// into an output directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "astgen", version, about)]
pub struct Cli {
    /// Directory the generated sources are written into
    pub output_dir: PathBuf,

    /// Load the schema from an XML file instead of the built-in Lox schema
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Add the resolve(Resolver&) entry point to the built-in Lox schema
    #[arg(long, conflicts_with = "schema")]
    pub resolver: bool,

    /// Validate the schema before generating
    #[arg(long)]
    pub strict: bool,

    /// Signatures longer than this are wrapped one parameter per line
    #[arg(long, value_name = "N", default_value_t = DEFAULT_COLUMN_LIMIT)]
    pub column_limit: usize,

    /// Create the output directory if it does not exist
    #[arg(long)]
    pub create_dir: bool,
}

impl Cli {
    /// Returns the schema selected by the options, validated with `--strict`.
    ///
    /// # Errors
    /// Returns an error if the schema file cannot be read or parsed, or if
    /// `--strict` validation fails.
    pub fn load_schema(&self) -> anyhow::Result<Schema> {
        if let Some(path) = &self.schema {
            tracing::info!("loading schema from {}", path.display());
            let context = || format!("failed to load schema '{}'", path.display());
            return if self.strict {
                parse_and_validate_file(path).with_context(context)
            } else {
                parse_schema_file(path).with_context(context)
            };
        }

        let schema = if self.resolver {
            tracing::info!("using built-in Lox schema with resolver entry points");
            lox::schema_with_resolver()
        } else {
            tracing::info!("using built-in Lox schema");
            lox::schema()
        };
        if self.strict {
            validate_schema(&schema).context("schema validation failed")?;
        }
        Ok(schema)
    }

    /// Loads the schema, generates every family and writes the sources.
    ///
    /// # Returns
    /// Paths of the written files, in generation order.
    ///
    /// # Errors
    /// Returns an error if loading, validation (with `--strict`) or writing
    /// fails.
    pub fn run(&self) -> anyhow::Result<Vec<PathBuf>> {
        let schema = self.load_schema()?;
        let ir = SchemaIr::from_schema(&schema);
        if ir.families.is_empty() {
            tracing::warn!("schema defines no node families; nothing to generate");
        }

        if self.create_dir && !self.output_dir.is_dir() {
            std::fs::create_dir_all(&self.output_dir).with_context(|| {
                format!(
                    "failed to create output directory '{}'",
                    self.output_dir.display()
                )
            })?;
            tracing::info!("created {}", self.output_dir.display());
        }

        let options = CodegenOptions {
            column_limit: self.column_limit,
        };
        Generator::new(&ir)
            .with_options(options)
            .write_to(&self.output_dir)
            .with_context(|| {
                format!(
                    "failed to generate sources into '{}'",
                    self.output_dir.display()
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DUPLICATE_FIELD_XML: &str = r#"<astSchema namespace="lox">
    <family name="Expr" noun="expression">
        <node name="Binary">
            <field name="left" type="ExprPtr"/>
            <field name="left" type="ExprPtr"/>
        </node>
    </family>
</astSchema>"#;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("astgen").chain(args.iter().copied()))
            .expect("Failed to parse arguments")
    }

    #[test]
    fn test_parse_defaults() {
        let cli = parse(&["out"]);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert!(cli.schema.is_none());
        assert!(!cli.resolver);
        assert!(!cli.strict);
        assert!(!cli.create_dir);
        assert_eq!(cli.column_limit, DEFAULT_COLUMN_LIMIT);
    }

    #[test]
    fn test_parse_options() {
        let cli = parse(&["--strict", "--column-limit", "100", "--create-dir", "out"]);
        assert!(cli.strict);
        assert!(cli.create_dir);
        assert_eq!(cli.column_limit, 100);
    }

    #[test]
    fn test_parse_requires_exactly_one_output_dir() {
        assert!(Cli::try_parse_from(["astgen"]).is_err());
        assert!(Cli::try_parse_from(["astgen", "a", "b"]).is_err());
    }

    #[test]
    fn test_resolver_conflicts_with_schema() {
        let result = Cli::try_parse_from(["astgen", "--resolver", "--schema", "s.xml", "out"]);
        let err = result.expect_err("conflicting options");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_run_writes_lox_sources() {
        let dir = tempdir().expect("tempdir");
        let cli = parse(&[dir.path().to_str().expect("utf-8 path")]);

        let written = cli.run().expect("run");
        let names: Vec<_> = written
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["expr.hpp", "expr.cpp", "stmt.hpp", "stmt.cpp"]);
    }

    #[test]
    fn test_run_with_resolver() {
        let dir = tempdir().expect("tempdir");
        let cli = parse(&["--resolver", dir.path().to_str().expect("utf-8 path")]);
        cli.run().expect("run");

        let stmt = std::fs::read_to_string(dir.path().join("stmt.cpp")).expect("read");
        assert!(stmt.contains("#include \"resolver.hpp\""));
        assert!(stmt.contains("void WhileStmt::resolve(Resolver& resolver)"));
    }

    #[test]
    fn test_run_missing_directory_fails() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("missing");
        let cli = parse(&[missing.to_str().expect("utf-8 path")]);

        let err = cli.run().expect_err("missing directory");
        assert!(format!("{err:#}").contains("does not exist"));
        assert!(!missing.exists());
    }

    #[test]
    fn test_run_creates_directory() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("generated").join("ast");
        let cli = parse(&["--create-dir", nested.to_str().expect("utf-8 path")]);

        cli.run().expect("run");
        assert!(nested.join("expr.hpp").is_file());
    }

    #[test]
    fn test_run_schema_file() {
        let dir = tempdir().expect("tempdir");
        let schema = dir.path().join("calc.xml");
        std::fs::write(
            &schema,
            r#"<astSchema namespace="calc">
    <family name="Node">
        <accept method="eval" returns="double" visitor="Evaluator" header="evaluator.hpp"/>
        <node name="Number"><field name="value" type="double"/></node>
    </family>
</astSchema>"#,
        )
        .expect("write schema");

        let cli = parse(&[
            "--schema",
            schema.to_str().expect("utf-8 path"),
            dir.path().to_str().expect("utf-8 path"),
        ]);
        let written = cli.run().expect("run");
        assert_eq!(written.len(), 2);

        let header = std::fs::read_to_string(dir.path().join("node.hpp")).expect("read");
        assert!(header.contains("namespace calc {"));
        assert!(header.contains("class NumberNode : public Node"));
    }

    #[test]
    fn test_strict_rejects_duplicate_fields() {
        let dir = tempdir().expect("tempdir");
        let schema = dir.path().join("bad.xml");
        std::fs::write(&schema, DUPLICATE_FIELD_XML).expect("write schema");
        let schema = schema.to_str().expect("utf-8 path");
        let out = dir.path().to_str().expect("utf-8 path");

        let err = parse(&["--strict", "--schema", schema, out])
            .run()
            .expect_err("strict validation");
        assert!(format!("{err:#}").contains("duplicate field definition"));
        assert!(!dir.path().join("expr.hpp").exists());

        // Without --strict the defect passes through to the generated text.
        parse(&["--schema", schema, out]).run().expect("run");
        assert!(dir.path().join("expr.hpp").is_file());
    }

    #[test]
    fn test_strict_reports_malformed_schema() {
        let dir = tempdir().expect("tempdir");
        let schema = dir.path().join("bad.xml");
        std::fs::write(&schema, "<astSchema><family name=\"Expr\"/></astSchema>")
            .expect("write schema");

        let err = parse(&[
            "--strict",
            "--schema",
            schema.to_str().expect("utf-8 path"),
            dir.path().to_str().expect("utf-8 path"),
        ])
        .run()
        .expect_err("malformed schema");
        let message = format!("{err:#}");
        assert!(message.contains("failed to load schema"));
        assert!(message.contains("missing required attribute 'namespace'"));
    }

    #[test]
    fn test_strict_accepts_builtin_schemas() {
        let dir = tempdir().expect("tempdir");
        let out = dir.path().to_str().expect("utf-8 path");
        parse(&["--strict", out]).run().expect("strict lox");
        parse(&["--strict", "--resolver", out]).run().expect("strict resolver");
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("none.xml");
        let cli = parse(&[
            "--schema",
            missing.to_str().expect("utf-8 path"),
            dir.path().to_str().expect("utf-8 path"),
        ]);

        let err = cli.run().expect_err("missing schema");
        assert!(err.to_string().contains("failed to load schema"));
    }
}
