//! Filepath: src/parsers/ts_emitter.rs
//! Lowers parsed Go declarations into TypeScript declaration blocks.
//!
//! Output follows the block contract: every declaration is preceded by a
//! `// From <origin>` marker, optional JSDoc lines, and is followed by a
//! single blank line.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::core::blocks::ORIGIN_MARKER;
use crate::core::prefix::{DeclNamer, is_exported};
use crate::parsers::go_parser::{ConstValue, GoField, GoFile, GoType, TypeDecl, TypeParam};

/// First line of every generated file
pub const GENERATED_HEADER: &str = "// Code generated by typegen. DO NOT EDIT.";

const UNKNOWN: &str = "unknown";

/// Name resolution scope for one Go package
pub struct PackageScope<'a> {
    pub import_path: &'a str,
    pub namer: &'a DeclNamer,
    /// Import paths of every package being converted
    pub known_packages: &'a HashSet<String>,
}

/// Literal values of "enum" types, keyed by Go type name, in source order
pub type EnumValues = HashMap<String, Vec<String>>;

/// Collect typed constants whose type is an exported named type declared
/// in the same package. A type with any constant whose value is not a plain
/// literal (`Low + 1`, `Level(3)`, inherited `iota`) keeps its base mapping.
pub fn collect_enum_values(files: &[&GoFile]) -> EnumValues {
    let declared: HashSet<&str> = files
        .iter()
        .flat_map(|f| f.types.iter())
        .filter(|t| is_exported(&t.name) && !t.alias && matches!(t.ty, GoType::Named(_)))
        .map(|t| t.name.as_str())
        .collect();

    let mut open: HashSet<&str> = HashSet::new();
    let mut out = EnumValues::new();
    for c in files.iter().flat_map(|f| f.consts.iter()) {
        let Some(ty) = c.ty.as_deref().filter(|ty| declared.contains(ty)) else {
            continue;
        };
        let Some(value) = &c.value else {
            open.insert(ty);
            continue;
        };
        if !is_exported(&c.name) {
            continue;
        }
        let literal = match value {
            ConstValue::Str(s) => quote(s),
            ConstValue::Number(n) => n.clone(),
            ConstValue::Bool(_) => continue,
        };
        let values = out.entry(ty.to_string()).or_default();
        if !values.contains(&literal) {
            values.push(literal);
        }
    }
    out.retain(|ty, _| !open.contains(ty.as_str()));
    out
}

/// Emits the blocks of one file
pub struct FileEmitter<'a> {
    scope: &'a PackageScope<'a>,
    file: &'a GoFile,
    origin: &'a str,
    imports: HashMap<&'a str, &'a str>,
}

impl<'a> FileEmitter<'a> {
    pub fn new(scope: &'a PackageScope<'a>, file: &'a GoFile, origin: &'a str) -> Self {
        let imports = file
            .imports
            .iter()
            .filter(|i| !matches!(i.alias.as_deref(), Some("_" | ".")))
            .map(|i| (i.local_name(), i.path.as_str()))
            .collect();
        Self {
            scope,
            file,
            origin,
            imports,
        }
    }

    /// Append the blocks for every exported type of the file to `out`.
    pub fn emit(&self, enums: &EnumValues, out: &mut Vec<String>) {
        for decl in self.file.types.iter().filter(|t| is_exported(&t.name)) {
            self.emit_type(decl, enums, out);
        }
    }

    fn emit_type(&self, decl: &TypeDecl, enums: &EnumValues, out: &mut Vec<String>) {
        let name = self.scope.namer.name(&decl.name, self.scope.import_path);
        let params: HashSet<&str> = decl.type_params.iter().map(|p| p.name.as_str()).collect();
        let generics = self.type_params(&decl.type_params, &params);

        self.open_block(&decl.doc, out);

        match (&decl.ty, decl.alias) {
            (GoType::Struct(fields), false) => {
                let (extends, members) = self.struct_members(fields, &params, "    ");
                let heritage = if extends.is_empty() {
                    String::new()
                } else {
                    format!(" extends {}", extends.join(", "))
                };
                out.push(format!("export interface {name}{generics}{heritage} {{"));
                out.extend(members);
                out.push("}".to_string());
            }
            (GoType::Interface, false) => {
                out.push(format!("export interface {name}{generics} {{"));
                out.push("}".to_string());
            }
            _ => {
                let rhs = match enums.get(&decl.name) {
                    Some(values) if !decl.alias => values.join(" | "),
                    _ => self.render(&decl.ty, &params),
                };
                out.push(format!("export type {name}{generics} = {rhs};"));
            }
        }
        out.push(String::new());

        if let Some(values) = enums.get(&decl.name).filter(|_| !decl.alias) {
            self.open_block(&[], out);
            out.push(format!(
                "export const {name}Values: readonly {name}[] = [{}];",
                values.join(", ")
            ));
            out.push(String::new());
        }
    }

    fn open_block(&self, doc: &[String], out: &mut Vec<String>) {
        out.push(format!("{ORIGIN_MARKER}{}", self.origin));
        out.extend(jsdoc(doc, ""));
    }

    fn type_params(&self, params: &[TypeParam], names: &HashSet<&str>) -> String {
        if params.is_empty() {
            return String::new();
        }
        let rendered = params
            .iter()
            .map(|p| {
                let constraint = match &p.constraint {
                    GoType::Named(n) if n == "any" || n == "comparable" => None,
                    other => Some(self.render(other, names)),
                };
                match constraint {
                    Some(c) if c != UNKNOWN => format!("{} extends {c}", p.name),
                    _ => p.name.clone(),
                }
            })
            .join(", ");
        format!("<{rendered}>")
    }

    /// `(extends, member lines)` for a struct body
    fn struct_members(
        &self,
        fields: &[GoField],
        params: &HashSet<&str>,
        indent: &str,
    ) -> (Vec<String>, Vec<String>) {
        let mut extends = Vec::new();
        let mut members = Vec::new();

        for field in fields {
            let json = JsonTag::parse(field.tag_value("json").as_deref());
            if json.skip {
                continue;
            }

            if field.is_embedded() {
                match &json.name {
                    // A named embedded field is serialized as a regular member
                    Some(tag_name) => {
                        members.extend(jsdoc(&field.doc, indent));
                        members.push(self.member(tag_name, &field.ty, json.omitempty, params, indent));
                    }
                    None => {
                        let base = match &field.ty {
                            GoType::Pointer(inner) => inner.as_ref(),
                            other => other,
                        };
                        let rendered = self.render(base, params);
                        if rendered != UNKNOWN {
                            extends.push(rendered);
                        }
                    }
                }
                continue;
            }

            for go_name in field.names.iter().filter(|n| is_exported(n)) {
                let key = json.name.as_deref().unwrap_or(go_name);
                members.extend(jsdoc(&field.doc, indent));
                members.push(self.member(key, &field.ty, json.omitempty, params, indent));
            }
        }

        (extends, members)
    }

    fn member(
        &self,
        key: &str,
        ty: &GoType,
        omitempty: bool,
        params: &HashSet<&str>,
        indent: &str,
    ) -> String {
        let optional = omitempty || matches!(ty, GoType::Pointer(_));
        format!(
            "{indent}readonly {}{}: {};",
            property_key(key),
            if optional { "?" } else { "" },
            self.render(ty, params)
        )
    }

    /// TypeScript type expression for `ty`
    pub fn render(&self, ty: &GoType, params: &HashSet<&str>) -> String {
        match ty {
            GoType::Named(n) => self.named(n, params),
            GoType::Qualified { package, name } => self.qualified(package, name),
            GoType::Generic { base, args } => {
                let base = self.render(base, params);
                if base == UNKNOWN {
                    return base;
                }
                let args = args.iter().map(|a| self.render(a, params)).join(", ");
                format!("{base}<{args}>")
            }
            GoType::Pointer(inner) => format!("{} | null", self.render(inner, params)),
            GoType::Slice(inner) => match inner.as_ref() {
                GoType::Named(n) if n == "byte" => "string".to_string(),
                el => format!("readonly {}[] | null", element(&self.render(el, params))),
            },
            GoType::Array(inner) => format!("readonly {}[]", element(&self.render(inner, params))),
            GoType::Map { key, value } => format!(
                "Record<{}, {}>",
                self.render(key, params),
                self.render(value, params)
            ),
            GoType::Struct(fields) => {
                let (extends, members) = self.struct_members(fields, params, "");
                let body = if members.is_empty() {
                    "{}".to_string()
                } else {
                    // Inline members are single-line; drop their doc comments
                    let inline = members
                        .iter()
                        .filter(|m| m.starts_with("readonly "))
                        .join(" ");
                    format!("{{ {inline} }}")
                };
                std::iter::once(body).chain(extends).join(" & ")
            }
            GoType::Union(parts) => parts.iter().map(|p| self.render(p, params)).join(" | "),
            GoType::Interface | GoType::Func | GoType::Chan | GoType::Unknown(_) => UNKNOWN.to_string(),
        }
    }

    fn named(&self, name: &str, params: &HashSet<&str>) -> String {
        if params.contains(name) {
            return name.to_string();
        }
        if let Some(builtin) = builtin(name) {
            return builtin.to_string();
        }
        // Unexported types are never emitted; do not leave a dangling name
        if !is_exported(name) {
            return UNKNOWN.to_string();
        }
        self.scope.namer.name(name, self.scope.import_path)
    }

    fn qualified(&self, package: &str, name: &str) -> String {
        let Some(path) = self.imports.get(package).copied() else {
            return UNKNOWN.to_string();
        };
        if let Some(mapped) = standard_mapping(path, name) {
            return mapped.to_string();
        }
        if self.scope.known_packages.contains(path) && is_exported(name) {
            return self.scope.namer.name(name, path);
        }
        UNKNOWN.to_string()
    }
}

/// Parsed `json:"name,opt,..."` tag
#[derive(Debug, Default, PartialEq, Eq)]
struct JsonTag {
    name: Option<String>,
    omitempty: bool,
    skip: bool,
}

impl JsonTag {
    fn parse(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Self::default();
        };
        if tag == "-" {
            return Self {
                skip: true,
                ..Self::default()
            };
        }
        let mut parts = tag.split(',');
        let name = parts.next().filter(|n| !n.is_empty()).map(str::to_string);
        let omitempty = parts.any(|o| o == "omitempty" || o == "omitzero");
        Self {
            name,
            omitempty,
            skip: false,
        }
    }
}

fn builtin(name: &str) -> Option<&'static str> {
    Some(match name {
        "string" => "string",
        "bool" => "boolean",
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "float32" | "float64" | "byte" | "rune" => "number",
        "any" | "error" | "comparable" | "complex64" | "complex128" => UNKNOWN,
        _ => return None,
    })
}

/// Well-known library types by import path
fn standard_mapping(path: &str, name: &str) -> Option<&'static str> {
    Some(match (path, name) {
        ("time", "Time") => "string",
        ("time", "Duration") => "number",
        ("encoding/json", "RawMessage") => UNKNOWN,
        ("database/sql", "NullString" | "NullTime") => "string | null",
        ("database/sql", "NullInt64" | "NullInt32" | "NullInt16" | "NullFloat64" | "NullByte") => {
            "number | null"
        }
        ("database/sql", "NullBool") => "boolean | null",
        (p, "UUID") if p == "github.com/google/uuid" || p.ends_with("/uuid") => "string",
        _ => return None,
    })
}

/// Parenthesize unions used as array elements
fn element(rendered: &str) -> String {
    if rendered.contains(" | ") || rendered.contains(" & ") {
        format!("({rendered})")
    } else {
        rendered.to_string()
    }
}

fn property_key(key: &str) -> String {
    let mut chars = key.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c == '_' || c == '$' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric());
    if valid { key.to_string() } else { quote(key) }
}

/// TypeScript string literal
pub fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// JSDoc lines for `doc` at `indent`
fn jsdoc(doc: &[String], indent: &str) -> Vec<String> {
    let lines: Vec<String> = doc.iter().map(|l| l.replace("*/", "*\\/")).collect();
    match lines.as_slice() {
        [] => Vec::new(),
        [one] => vec![format!("{indent}/** {one} */")],
        many => std::iter::once(format!("{indent}/**"))
            .chain(many.iter().map(|l| {
                if l.is_empty() {
                    format!("{indent} *")
                } else {
                    format!("{indent} * {l}")
                }
            }))
            .chain(std::iter::once(format!("{indent} */")))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::parsers::GoParser;

    const ROOT: &str = "example.com/m/pkg";

    fn emit(src: &str, known: &[&str]) -> String {
        let file = GoParser::new()
            .parse(src, Path::new("foo/dto.go"))
            .expect("parse");
        let known: HashSet<String> = known.iter().map(|s| s.to_string()).collect();
        let namer = DeclNamer::new(ROOT);
        let scope = PackageScope {
            import_path: "example.com/m/pkg/foo",
            namer: &namer,
            known_packages: &known,
        };
        let enums = collect_enum_values(&[&file]);
        let mut out = Vec::new();
        FileEmitter::new(&scope, &file, "foo/dto.go").emit(&enums, &mut out);
        out.join("\n")
    }

    #[test]
    fn struct_becomes_readonly_interface() {
        let src = r#"package foo

import (
	"time"

	"example.com/m/pkg/baz"
)

// FooReq is a request.
type FooReq struct {
	// ID of the thing
	ID      string     `json:"id"`
	Bar     *Bar       `json:"bar,omitempty"`
	Tags    []string   `json:"tags"`
	Raw     []byte     `json:"raw"`
	At      time.Time  `json:"at"`
	Other   baz.Other  `json:"other"`
	Ignored string     `json:"-"`
	hidden  string
	Counts  map[string]int
}
"#;
        let out = emit(src, &["example.com/m/pkg/baz"]);
        let expected = [
            "// From foo/dto.go",
            "/** FooReq is a request. */",
            "export interface foo_FooReq {",
            "    /** ID of the thing */",
            "    readonly id: string;",
            "    readonly bar?: foo_Bar | null;",
            "    readonly tags: readonly string[] | null;",
            "    readonly raw: string;",
            "    readonly at: string;",
            "    readonly other: baz_Other;",
            "    readonly Counts: Record<string, number>;",
            "}",
            "",
        ]
        .join("\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn embedded_structs_extend() {
        let src = "package foo\n\ntype Base struct{ ID int }\n\ntype Child struct {\n\tBase\n\t*Other\n\tName string `json:\"name\"`\n}\n\ntype Other struct{}\n";
        let out = emit(src, &[]);
        assert!(out.contains("export interface foo_Child extends foo_Base, foo_Other {"), "{out}");
        assert!(out.contains("export interface foo_Other {\n}"), "{out}");
    }

    #[test]
    fn enum_constants_become_unions() {
        let src = "package foo\n\ntype Status string\n\nconst (\n\tStatusOK Status = \"ok\"\n\tStatusErr Status = \"err\"\n)\n\ntype Level int\n\nconst (\n\tLow Level = 1\n\tHigh Level = 10\n)\n";
        let out = emit(src, &[]);
        assert!(out.contains("export type foo_Status = \"ok\" | \"err\";"), "{out}");
        assert!(
            out.contains("// From foo/dto.go\nexport const foo_StatusValues: readonly foo_Status[] = [\"ok\", \"err\"];\n"),
            "{out}"
        );
        assert!(out.contains("export type foo_Level = 1 | 10;"), "{out}");
    }

    #[test]
    fn iota_enums_stay_numeric() {
        let src = "package foo\n\ntype Color int\n\nconst (\n\tRed Color = iota\n\tGreen\n)\n";
        let out = emit(src, &[]);
        assert!(out.contains("export type foo_Color = number;"), "{out}");
        assert!(!out.contains("ColorValues"), "{out}");
    }

    #[test]
    fn computed_constants_keep_the_base_mapping() {
        let src = "package foo\n\ntype Level int\n\nconst (\n\tLow Level = 1\n\tMid Level = Low + 1\n)\n\nconst High = Level(3)\n\ntype Mode string\n\nconst Fast Mode = \"fast\"\n";
        let out = emit(src, &[]);
        assert!(out.contains("export type foo_Level = number;"), "{out}");
        assert!(!out.contains("LevelValues"), "{out}");
        assert!(out.contains("export type foo_Mode = \"fast\";"), "{out}");
    }

    #[test]
    fn conversion_alone_widens_a_literal_enum() {
        let src = "package foo\n\ntype Level int\n\nconst Low Level = 1\n\nconst High = Level(3)\n";
        let out = emit(src, &[]);
        assert!(out.contains("export type foo_Level = number;"), "{out}");
    }

    #[test]
    fn generics_and_unknowns() {
        let src = "package foo\n\ntype Page[T any] struct {\n\tItems []T `json:\"items\"`\n}\n\ntype Num interface{ ~int | ~float64 }\n\ntype Sum[N Num] struct{ Total N }\n\ntype Alias = Page[string]\n\ntype Fn func()\n\ntype Ext = ext.Thing\n";
        let out = emit(src, &[]);
        assert!(out.contains("export interface foo_Page<T> {"), "{out}");
        assert!(out.contains("    readonly items: readonly T[] | null;"), "{out}");
        assert!(out.contains("export interface foo_Sum<N extends foo_Num> {"), "{out}");
        assert!(out.contains("export type foo_Alias = foo_Page<string>;"), "{out}");
        assert!(out.contains("export type foo_Fn = unknown;"), "{out}");
        assert!(out.contains("export type foo_Ext = unknown;"), "{out}");
    }

    #[test]
    fn unexported_types_are_skipped() {
        let out = emit("package foo\n\ntype inner struct{ A int }\n\ntype Outer struct{ In inner }\n", &[]);
        assert!(!out.contains("foo_inner"), "{out}");
        assert!(out.contains("    readonly In: unknown;"), "{out}");
    }

    #[test]
    fn json_tag_parsing() {
        assert_eq!(
            JsonTag::parse(Some("name,omitempty")),
            JsonTag {
                name: Some("name".into()),
                omitempty: true,
                skip: false
            }
        );
        assert!(JsonTag::parse(Some("-")).skip);
        assert_eq!(JsonTag::parse(Some("-,")).name.as_deref(), Some("-"));
        assert_eq!(JsonTag::parse(Some(",omitempty")).name, None);
    }

    #[test]
    fn keys_and_docs() {
        assert_eq!(property_key("ok_1"), "ok_1");
        assert_eq!(property_key("with-dash"), "\"with-dash\"");
        assert_eq!(jsdoc(&["a".into(), "".into(), "b */".into()], "  "), vec![
            "  /**", "   * a", "   *", "   * b *\\/", "   */"
        ]);
    }
}
