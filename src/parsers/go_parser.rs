//! Filepath: src/parsers/go_parser.rs
//! Tree-sitter based reader for Go sources.
//!
//! Parses a file once and lowers the parts the generator cares about
//! (package clause, imports, type declarations, constants) into an owned
//! model, so callers never hold on to tree-sitter lifetimes.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Language, Node, Parser};

use crate::error::{Result, TypegenError};
use crate::infra::utils::TsNodeUtils;

/// Parsed view of one Go file
#[derive(Debug, Clone, PartialEq)]
pub struct GoFile {
    pub path: PathBuf,
    pub package: String,
    pub imports: Vec<GoImport>,
    pub types: Vec<TypeDecl>,
    pub consts: Vec<ConstDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoImport {
    /// Explicit alias (`foo "example.com/x/bar"`), `_` and `.` included
    pub alias: Option<String>,
    pub path: String,
}

impl GoImport {
    /// Identifier this import is referenced by inside the file.
    /// Without an alias: the last path element, skipping a `/vN` suffix.
    pub fn local_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        let mut parts = self.path.rsplit('/');
        let last = parts.next().unwrap_or(&self.path);
        let is_major = last.len() > 1
            && last.starts_with('v')
            && last[1..].chars().all(|c| c.is_ascii_digit());
        if is_major {
            parts.next().unwrap_or(last)
        } else {
            last
        }
    }
}

/// One `type` spec
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    /// `type A = B`
    pub alias: bool,
    pub type_params: Vec<TypeParam>,
    pub ty: GoType,
    /// Leading `//` comment lines, markers stripped
    pub doc: Vec<String>,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        matches!(self.ty, GoType::Interface)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub constraint: GoType,
}

/// One constant name inside a `const` spec
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    /// Declared (or inherited) type name, only for plain identifiers
    pub ty: Option<String>,
    pub value: Option<ConstValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Str(String),
    Number(String),
    Bool(bool),
}

/// Lowered Go type expression
#[derive(Debug, Clone, PartialEq)]
pub enum GoType {
    Named(String),
    Qualified { package: String, name: String },
    Generic { base: Box<GoType>, args: Vec<GoType> },
    Pointer(Box<GoType>),
    Slice(Box<GoType>),
    Array(Box<GoType>),
    Map { key: Box<GoType>, value: Box<GoType> },
    Struct(Vec<GoField>),
    Interface,
    Func,
    Chan,
    /// Constraint unions (`~int | ~string`)
    Union(Vec<GoType>),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoField {
    /// Empty for embedded fields
    pub names: Vec<String>,
    pub ty: GoType,
    /// Raw tag content without the surrounding quotes
    pub tag: Option<String>,
    pub doc: Vec<String>,
}

impl GoField {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }

    /// Value of `key:"..."` inside the struct tag
    pub fn tag_value(&self, key: &str) -> Option<String> {
        static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"([A-Za-z_][A-Za-z0-9_.-]*):"((?:[^"\\]|\\.)*)""#).expect("static tag regex")
        });
        let tag = self.tag.as_deref()?;
        TAG_RE
            .captures_iter(tag)
            .find(|c| &c[1] == key)
            .map(|c| c[2].to_string())
    }
}

pub struct GoParser {
    language: Language,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Parse `content` as the Go file at `path`. Syntax errors are fatal.
    pub fn parse(&self, content: &str, path: &Path) -> Result<GoFile> {
        let parse_err = |reason: String| TypegenError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| parse_err(format!("load Go grammar: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| parse_err("parser returned no tree".to_string()))?;
        let root = tree.root_node();

        if root.has_error() {
            let reason = match TsNodeUtils::first_error(root) {
                Some(node) => {
                    let p = node.start_position();
                    format!("syntax error at {}:{}", p.row + 1, p.column + 1)
                }
                None => "syntax error".to_string(),
            };
            return Err(parse_err(reason));
        }

        let src = content.as_bytes();
        let mut file = GoFile {
            path: path.to_path_buf(),
            package: String::new(),
            imports: Vec::new(),
            types: Vec::new(),
            consts: Vec::new(),
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    if let Some(id) = TsNodeUtils::first_named_child_of_kind(child, "package_identifier") {
                        file.package = text(id, src).to_string();
                    }
                }
                "import_declaration" => collect_imports(child, src, &mut file.imports),
                "type_declaration" => collect_types(child, src, &mut file.types),
                "const_declaration" => collect_consts(child, src, &mut file.consts),
                _ => {}
            }
        }

        Ok(file)
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

fn text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or_default()
}

fn collect_imports(decl: Node, src: &[u8], out: &mut Vec<GoImport>) {
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => out.extend(import_of(child, src)),
            "import_spec_list" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() == "import_spec" {
                        out.extend(import_of(spec, src));
                    }
                }
            }
            _ => {}
        }
    }
}

fn import_of(spec: Node, src: &[u8]) -> Option<GoImport> {
    let path = spec.child_by_field_name("path")?;
    let alias = spec
        .child_by_field_name("name")
        .map(|n| text(n, src).to_string());
    Some(GoImport {
        alias,
        path: unquote(text(path, src)),
    })
}

fn collect_types(decl: Node, src: &[u8], out: &mut Vec<TypeDecl>) {
    // `type X ...` docs sit above the declaration; grouped specs carry their own
    let grouped = TsNodeUtils::has_child_token(decl, "(");
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else {
            continue;
        };
        let Some(type_node) = spec.child_by_field_name("type") else {
            continue;
        };

        let mut doc = doc_comments(spec, src);
        if doc.is_empty() && !grouped {
            doc = doc_comments(decl, src);
        }

        out.push(TypeDecl {
            name: text(name_node, src).to_string(),
            alias: spec.kind() == "type_alias",
            type_params: spec
                .child_by_field_name("type_parameters")
                .map(|list| type_params(list, src))
                .unwrap_or_default(),
            ty: lower_type(type_node, src),
            doc,
        });
    }
}

fn type_params(list: Node, src: &[u8]) -> Vec<TypeParam> {
    let mut out = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        if decl.kind() != "type_parameter_declaration" {
            continue;
        }
        let constraint = decl
            .child_by_field_name("type")
            .map(|t| lower_type(t, src))
            .unwrap_or_else(|| GoType::Named("any".to_string()));
        let mut names = decl.walk();
        for name in decl.children_by_field_name("name", &mut names) {
            out.push(TypeParam {
                name: text(name, src).to_string(),
                constraint: constraint.clone(),
            });
        }
    }
    out
}

fn collect_consts(decl: Node, src: &[u8], out: &mut Vec<ConstDecl>) {
    // Specs without a type and value repeat the previous spec's type (iota)
    let mut inherited: Option<String> = None;
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if spec.kind() != "const_spec" {
            continue;
        }

        let explicit_ty = spec
            .child_by_field_name("type")
            .filter(|t| t.kind() == "type_identifier")
            .map(|t| text(t, src).to_string());
        let values: Vec<Option<ConstValue>> = spec
            .child_by_field_name("value")
            .map(|list| {
                let mut vc = list.walk();
                list.named_children(&mut vc)
                    .filter(|n| n.kind() != "comment")
                    .map(|n| const_value(n, src))
                    .collect()
            })
            .unwrap_or_default();

        let ty = if values.is_empty() {
            inherited.clone()
        } else {
            explicit_ty.or_else(|| {
                spec.child_by_field_name("value")
                    .and_then(|list| list.named_child(0))
                    .and_then(|v| conversion_target(v, src))
            })
        };
        inherited = ty.clone();

        let mut names = spec.walk();
        for (i, name) in spec.children_by_field_name("name", &mut names).enumerate() {
            out.push(ConstDecl {
                name: text(name, src).to_string(),
                ty: ty.clone(),
                value: values.get(i).cloned().flatten(),
            });
        }
    }
}

/// Type name of a conversion expression such as `Level(3)`
fn conversion_target(node: Node, src: &[u8]) -> Option<String> {
    const BUILTINS: &[&str] = &["len", "cap", "real", "imag", "complex", "min", "max"];
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    let name = text(function, src);
    let is_type = matches!(function.kind(), "identifier" | "type_identifier");
    (is_type && !BUILTINS.contains(&name)).then(|| name.to_string())
}

fn const_value(node: Node, src: &[u8]) -> Option<ConstValue> {
    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            Some(ConstValue::Str(unquote(text(node, src))))
        }
        "int_literal" | "float_literal" => Some(ConstValue::Number(text(node, src).to_string())),
        "true" => Some(ConstValue::Bool(true)),
        "false" => Some(ConstValue::Bool(false)),
        "unary_expression" => {
            let operand = node.child_by_field_name("operand")?;
            let op = node.child_by_field_name("operator").map(|o| text(o, src));
            match (op, operand.kind()) {
                (Some("-"), "int_literal" | "float_literal") => {
                    Some(ConstValue::Number(format!("-{}", text(operand, src))))
                }
                _ => None,
            }
        }
        "parenthesized_expression" => node.named_child(0).and_then(|n| const_value(n, src)),
        _ => None,
    }
}

/// Lower a tree-sitter type node into [`GoType`]
fn lower_type(node: Node, src: &[u8]) -> GoType {
    fn first_named(n: Node) -> Option<Node> {
        n.named_child(0)
    }
    match node.kind() {
        "type_identifier" | "identifier" => GoType::Named(text(node, src).to_string()),
        "qualified_type" => {
            let package = node.child_by_field_name("package").map(|n| text(n, src));
            let name = node.child_by_field_name("name").map(|n| text(n, src));
            match (package, name) {
                (Some(p), Some(n)) => GoType::Qualified {
                    package: p.to_string(),
                    name: n.to_string(),
                },
                _ => GoType::Unknown(text(node, src).to_string()),
            }
        }
        "generic_type" => {
            let base = node
                .child_by_field_name("type")
                .map(|t| lower_type(t, src))
                .unwrap_or_else(|| GoType::Unknown(text(node, src).to_string()));
            let args = node
                .child_by_field_name("type_arguments")
                .map(|list| {
                    let mut c = list.walk();
                    list.named_children(&mut c)
                        .filter(|n| n.kind() != "comment")
                        .map(|n| lower_type(n, src))
                        .collect()
                })
                .unwrap_or_default();
            GoType::Generic {
                base: Box::new(base),
                args,
            }
        }
        "pointer_type" => match first_named(node) {
            Some(inner) => GoType::Pointer(Box::new(lower_type(inner, src))),
            None => GoType::Unknown(text(node, src).to_string()),
        },
        "slice_type" => match node.child_by_field_name("element") {
            Some(el) => GoType::Slice(Box::new(lower_type(el, src))),
            None => GoType::Unknown(text(node, src).to_string()),
        },
        "array_type" | "implicit_length_array_type" => match node.child_by_field_name("element") {
            Some(el) => GoType::Array(Box::new(lower_type(el, src))),
            None => GoType::Unknown(text(node, src).to_string()),
        },
        "map_type" => {
            let key = node.child_by_field_name("key");
            let value = node.child_by_field_name("value");
            match (key, value) {
                (Some(k), Some(v)) => GoType::Map {
                    key: Box::new(lower_type(k, src)),
                    value: Box::new(lower_type(v, src)),
                },
                _ => GoType::Unknown(text(node, src).to_string()),
            }
        }
        "struct_type" => GoType::Struct(struct_fields(node, src)),
        "interface_type" => GoType::Interface,
        "function_type" => GoType::Func,
        "channel_type" => GoType::Chan,
        "parenthesized_type" | "negated_type" => match first_named(node) {
            Some(inner) => lower_type(inner, src),
            None => GoType::Unknown(text(node, src).to_string()),
        },
        "type_elem" | "type_constraint" => {
            let mut c = node.walk();
            let mut parts: Vec<GoType> = node
                .named_children(&mut c)
                .filter(|n| n.kind() != "comment")
                .map(|n| lower_type(n, src))
                .collect();
            match parts.len() {
                0 => GoType::Unknown(text(node, src).to_string()),
                1 => parts.remove(0),
                _ => GoType::Union(parts),
            }
        }
        other => GoType::Unknown(other.to_string()),
    }
}

fn struct_fields(node: Node, src: &[u8]) -> Vec<GoField> {
    let Some(list) = TsNodeUtils::first_named_child_of_kind(node, "field_declaration_list") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = list.walk();
    for field in list.named_children(&mut cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let Some(ty) = field.child_by_field_name("type") else {
            continue;
        };
        let mut nc = field.walk();
        let names = field
            .children_by_field_name("name", &mut nc)
            .map(|n| text(n, src).to_string())
            .collect();
        out.push(GoField {
            names,
            ty: lower_type(ty, src),
            tag: field
                .child_by_field_name("tag")
                .map(|t| unquote(text(t, src))),
            doc: doc_comments(field, src),
        });
    }
    out
}

/// Contiguous `//` or `/* */` comments directly above `node`
fn doc_comments(node: Node, src: &[u8]) -> Vec<String> {
    let mut blocks: Vec<Node> = Vec::new();
    let mut next_row = node.start_position().row;
    let mut cur = node.prev_sibling();
    while let Some(prev) = cur {
        if prev.kind() != "comment" || prev.end_position().row + 1 != next_row {
            break;
        }
        next_row = prev.start_position().row;
        blocks.push(prev);
        cur = prev.prev_sibling();
    }
    blocks.reverse();

    let mut lines = Vec::new();
    for c in blocks {
        let raw = text(c, src);
        if let Some(line) = raw.strip_prefix("//") {
            // Tool directives (//go:generate, //nolint) are not documentation
            if line.starts_with("go:") || line.starts_with("nolint") {
                continue;
            }
            lines.push(line.strip_prefix(' ').unwrap_or(line).trim_end().to_string());
        } else if let Some(body) = raw.strip_prefix("/*").and_then(|b| b.strip_suffix("*/")) {
            lines.extend(
                body.lines()
                    .map(|l| l.trim().trim_start_matches('*').trim().to_string())
                    .filter(|l| !l.is_empty()),
            );
        }
    }
    lines
}

/// Strip Go string quotes and resolve the common escapes
fn unquote(raw: &str) -> String {
    if let Some(inner) = raw.strip_prefix('`').and_then(|r| r.strip_suffix('`')) {
        return inner.to_string();
    }
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
