//! Shared layout helpers for the C++ emitters.
//!
//! The generated files follow the clang-formatted layout of the hand-written
//! interpreter sources: section rules, two-space indentation, and signatures
//! broken one parameter per line once they exceed the column limit.

use astgen_schema::ir::{ResolvedField, StoragePolicy};

/// Section rule placed between top-level declarations.
pub const RULE: &str =
    "/*---------------------------------------------------------------------------*/";

/// Default column limit for signature wrapping.
pub const DEFAULT_COLUMN_LIMIT: usize = 80;

/// Renders a parenthesised signature.
///
/// The signature is `head(params)tail` on one line if it fits within
/// `column_limit`; otherwise each parameter goes on its own line, indented by
/// `continuation`.
#[must_use]
pub fn signature(
    head: &str,
    params: &[String],
    tail: &str,
    continuation: &str,
    column_limit: usize,
) -> String {
    let single = format!("{}({}){}", head, params.join(", "), tail);
    if params.is_empty() || single.chars().count() <= column_limit {
        return single;
    }

    let mut out = format!("{head}(\n");
    let last = params.len() - 1;
    for (idx, param) in params.iter().enumerate() {
        out.push_str(continuation);
        out.push_str(param);
        if idx != last {
            out.push_str(",\n");
        }
    }
    out.push(')');
    out.push_str(tail);
    out
}

/// Returns the constructor parameters of a node, in field order.
#[must_use]
pub fn ctor_params(fields: &[ResolvedField]) -> Vec<String> {
    fields
        .iter()
        .map(|f| format!("{} {}", f.ctor_type, f.name))
        .collect()
}

/// Returns the member initializer for a field according to its storage policy.
#[must_use]
pub fn initializer(field: &ResolvedField) -> String {
    match field.storage {
        StoragePolicy::Move => format!("{0}(std::move({0}))", field.name),
        StoragePolicy::Copy => format!("{0}({0})", field.name),
    }
}

/// Appends a `#include "..."` block followed by a blank line, if non-empty.
pub fn push_local_includes<'a>(out: &mut String, headers: impl IntoIterator<Item = &'a String>) {
    let mut any = false;
    for header in headers {
        out.push_str(&format!("#include \"{header}\"\n"));
        any = true;
    }
    if any {
        out.push('\n');
    }
}

/// Appends a `#include <...>` block followed by a blank line, if non-empty.
pub fn push_system_includes(out: &mut String, headers: &[String]) {
    for header in headers {
        out.push_str(&format!("#include <{header}>\n"));
    }
    if !headers.is_empty() {
        out.push('\n');
    }
}

/// Appends a section rule followed by a blank line.
pub fn push_rule(out: &mut String) {
    out.push_str(RULE);
    out.push_str("\n\n");
}

/// Opens the target namespace; an empty namespace emits nothing.
pub fn push_namespace_open(out: &mut String, namespace: &str) {
    if !namespace.is_empty() {
        out.push_str(&format!("namespace {namespace} {{\n\n"));
    }
}

/// Closes the target namespace; an empty namespace emits nothing.
pub fn push_namespace_close(out: &mut String, namespace: &str) {
    if !namespace.is_empty() {
        out.push_str(&format!("}}  // namespace {namespace}\n"));
    }
}
