//! XML schema loader.
//!
//! This module parses node-family schemas written as XML into the internal
//! schema representation:
//!
//! ```xml
//! <astSchema namespace="lox">
//!   <family name="Expr" noun="expression">
//!     <include>token.hpp</include>
//!     <systemInclude>memory</systemInclude>
//!     <accept method="toString" returns="std::string" visitor="AstPrinter"
//!             header="astprinter.hpp" param="printer"/>
//!     <node name="Binary">
//!       <field name="left" type="ExprPtr"/>
//!       <field name="op" type="const Token&amp;" stored="Token"/>
//!       <field name="right" type="ExprPtr"/>
//!     </node>
//!   </family>
//! </astSchema>
//! ```
//!
//! Loading performs no semantic validation; see [`crate::validation`].

use crate::error::ParseError;
use crate::types::{AcceptDef, FieldDef, NodeFamily, NodeTypeDef, Schema};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parses an AST schema from an XML string.
///
/// # Arguments
/// * `xml` - XML schema content
///
/// # Returns
/// Parsed schema or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or a required attribute is
/// missing or invalid.
pub fn parse_schema(xml: &str) -> Result<Schema, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut schema: Option<Schema> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "astSchema" => {
                        schema = Some(parse_schema_root(e)?);
                    }
                    "family" => {
                        let family = parse_family(&mut reader, e)?;
                        schema
                            .as_mut()
                            .ok_or_else(|| {
                                ParseError::structure("family element outside astSchema")
                            })?
                            .add_family(family);
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "astSchema" => {
                        schema = Some(parse_schema_root(e)?);
                    }
                    "family" => {
                        let family = parse_family_attributes(e)?;
                        schema
                            .as_mut()
                            .ok_or_else(|| {
                                ParseError::structure("family element outside astSchema")
                            })?
                            .add_family(family);
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    schema.ok_or_else(|| ParseError::structure("No astSchema element found"))
}

/// Parses an AST schema from an XML file.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn parse_schema_file(path: &std::path::Path) -> Result<Schema, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_schema(&xml)
}

/// Collects the attributes of an element as unescaped `(key, value)` pairs.
fn attributes(e: &BytesStart<'_>, element: &str) -> Result<Vec<(String, String)>, ParseError> {
    let mut out = Vec::new();
    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|_| ParseError::invalid_attr(element, key, raw))?;
        out.push((key.to_string(), value.into_owned()));
    }
    Ok(out)
}

/// Parses the astSchema element attributes.
fn parse_schema_root(e: &BytesStart<'_>) -> Result<Schema, ParseError> {
    let mut namespace = None;

    for (key, value) in attributes(e, "astSchema")? {
        if key == "namespace" {
            namespace = Some(value);
        }
    }

    let namespace = namespace.ok_or_else(|| ParseError::missing_attr("astSchema", "namespace"))?;
    if namespace.is_empty() {
        return Err(ParseError::invalid_attr("astSchema", "namespace", namespace));
    }

    Ok(Schema::new(namespace))
}

/// Parses the family element attributes.
fn parse_family_attributes(e: &BytesStart<'_>) -> Result<NodeFamily, ParseError> {
    let mut name = None;
    let mut noun = None;
    let mut depends_on = None;

    for (key, value) in attributes(e, "family")? {
        match key.as_str() {
            "name" => name = Some(value),
            "noun" => noun = Some(value),
            "dependsOn" => depends_on = Some(value),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("family", "name"))?;
    let noun = noun.unwrap_or_else(|| name.to_lowercase());

    let mut family = NodeFamily::new(name, noun);
    for dependency in depends_on.iter().flat_map(|d| d.split(',')) {
        let dependency = dependency.trim();
        if !dependency.is_empty() {
            family.add_dependency(dependency);
        }
    }

    Ok(family)
}

/// Parses a family element and its children.
fn parse_family(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<NodeFamily, ParseError> {
    let mut family = parse_family_attributes(e)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                match tag_name {
                    "include" => family.add_include(read_text(reader, "include")?),
                    "systemInclude" => {
                        family.add_system_include(read_text(reader, "systemInclude")?)
                    }
                    "accept" => {
                        family.add_accept(parse_accept(e)?);
                        skip_element(reader)?;
                    }
                    "node" => family.add_type(parse_node(reader, e)?),
                    _ => skip_element(reader)?,
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                match tag_name {
                    "accept" => family.add_accept(parse_accept(e)?),
                    "node" => family.add_type(parse_node_attributes(e)?),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(format!(
                    "unterminated family '{}'",
                    family.name
                )));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(family)
}

/// Parses an accept element.
fn parse_accept(e: &BytesStart<'_>) -> Result<AcceptDef, ParseError> {
    let mut method = None;
    let mut returns = None;
    let mut visitor = None;
    let mut header = None;
    let mut param = None;

    for (key, value) in attributes(e, "accept")? {
        match key.as_str() {
            "method" => method = Some(value),
            "returns" => returns = Some(value),
            "visitor" => visitor = Some(value),
            "header" => header = Some(value),
            "param" => param = Some(value),
            _ => {}
        }
    }

    let method = method.ok_or_else(|| ParseError::missing_attr("accept", "method"))?;
    let visitor = visitor.ok_or_else(|| ParseError::missing_attr("accept", "visitor"))?;
    let header = header.ok_or_else(|| ParseError::missing_attr("accept", "header"))?;
    let returns = returns.unwrap_or_else(|| "void".to_string());

    let accept = AcceptDef::new(method, returns, visitor, header);
    Ok(match param {
        Some(param) => accept.with_param(param),
        None => accept,
    })
}

/// Parses the node element attributes.
fn parse_node_attributes(e: &BytesStart<'_>) -> Result<NodeTypeDef, ParseError> {
    let mut name = None;

    for (key, value) in attributes(e, "node")? {
        if key == "name" {
            name = Some(value);
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("node", "name"))?;
    Ok(NodeTypeDef::new(name))
}

/// Parses a node element and its fields.
fn parse_node(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<NodeTypeDef, ParseError> {
    let mut node = parse_node_attributes(e)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name == "field" {
                    node.add_field(parse_field(e)?);
                }
                skip_element(reader)?;
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name == "field" {
                    node.add_field(parse_field(e)?);
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(format!(
                    "unterminated node '{}'",
                    node.name
                )));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(node)
}

/// Parses a field element.
fn parse_field(e: &BytesStart<'_>) -> Result<FieldDef, ParseError> {
    let mut name = None;
    let mut ctor_type = None;
    let mut stored = None;

    for (key, value) in attributes(e, "field")? {
        match key.as_str() {
            "name" => name = Some(value),
            "type" => ctor_type = Some(value),
            "stored" => stored = Some(value),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("field", "name"))?;
    let ctor_type = ctor_type.ok_or_else(|| ParseError::missing_attr("field", "type"))?;
    if ctor_type.trim().is_empty() {
        return Err(ParseError::invalid_attr("field", "type", ctor_type));
    }

    Ok(match stored {
        Some(stored) => FieldDef::with_stored(name, ctor_type, stored),
        None => FieldDef::new(name, ctor_type),
    })
}

/// Reads the text content of the current element, consuming its end tag.
///
/// Entity and character references arrive as separate events and are
/// resolved in place; an unknown entity is an error.
fn read_text(reader: &mut Reader<&[u8]>, element: &str) -> Result<String, ParseError> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(ref t)) => {
                text.push_str(std::str::from_utf8(t.as_ref())?);
            }
            Ok(Event::GeneralRef(ref r)) => {
                let name = std::str::from_utf8(r.as_ref())?;
                match resolve_reference(name) {
                    Some(resolved) => text.push_str(&resolved),
                    None => {
                        return Err(ParseError::structure(format!(
                            "unknown entity '&{name};' in element '{element}'"
                        )));
                    }
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(format!(
                    "unterminated element '{element}'"
                )));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::structure(format!("empty element '{element}'")));
    }
    Ok(text.to_string())
}

/// Resolves a predefined entity (`amp`) or character reference (`#38`, `#x26`).
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    quick_xml::escape::resolve_predefined_entity(name).map(str::to_string)
}

/// Skips the remainder of the current element, including nested children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
