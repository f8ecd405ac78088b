//! Declaration block model.
//!
//! Engine output is a header followed by blocks, each opened by a
//! `// From <origin>` marker line. Everything between two markers belongs
//! to the first one, so rendering the header and all block lines joined by
//! `\n` reproduces the input exactly.

use indexmap::IndexMap;

/// Marker prefix opening every block
pub const ORIGIN_MARKER: &str = "// From ";

/// Top-level declaration introducers recognized at column 0
pub const INTRODUCERS: &[&str] = &[
    "export interface ",
    "export type ",
    "export const ",
    "export enum ",
    "export class ",
];

/// One declaration and its surrounding lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationBlock
{
    /// Text after the marker, usually a root-relative source path
    pub origin: String,

    /// Marker line, doc comments, body and trailing blank line(s)
    pub lines: Vec<String>,

    /// Declared name, absent when no introducer line was found
    pub name: Option<String>,
}

impl DeclarationBlock
{
    /// Build a block from its lines; the first line must be the marker.
    pub fn from_lines(lines: Vec<String>) -> Self
    {
        let origin = lines
            .first()
            .and_then(|l| l.strip_prefix(ORIGIN_MARKER))
            .unwrap_or_default()
            .to_string();
        let name = lines
            .iter()
            .find_map(|l| extract_export_name(l));

        Self { origin, lines, name }
    }

    pub fn name(&self) -> Option<&str>
    {
        self.name
            .as_deref()
    }
}

/// Header plus ordered blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations
{
    pub header: Vec<String>,
    pub blocks: Vec<DeclarationBlock>,
}

/// Declared name -> index of the first block declaring it
pub type ExportedNameIndex = IndexMap<String, usize>;

impl Declarations
{
    /// Split engine output into header and blocks.
    pub fn parse(text: &str) -> Self
    {
        let mut header = Vec::new();
        let mut blocks = Vec::new();
        let mut current: Option<Vec<String>> = None;

        for line in text.split('\n')
        {
            if line.starts_with(ORIGIN_MARKER)
            {
                if let Some(done) = current.take()
                {
                    blocks.push(DeclarationBlock::from_lines(done));
                }
                current = Some(vec![line.to_string()]);
                continue;
            }

            match current.as_mut()
            {
                Some(lines) => lines.push(line.to_string()),
                None => header.push(line.to_string()),
            }
        }

        if let Some(done) = current
        {
            blocks.push(DeclarationBlock::from_lines(done));
        }

        Self { header, blocks }
    }

    /// Join header and block lines with `\n`.
    pub fn render(&self) -> String
    {
        self.header
            .iter()
            .chain(
                self.blocks
                    .iter()
                    .flat_map(|b| b.lines.iter()),
            )
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First-seen owner of every declared name, in block order.
    pub fn name_index(&self) -> ExportedNameIndex
    {
        let mut index = ExportedNameIndex::new();
        for (i, block) in self
            .blocks
            .iter()
            .enumerate()
        {
            if let Some(name) = block.name()
            {
                index
                    .entry(name.to_string())
                    .or_insert(i);
            }
        }
        index
    }

    /// Declared names in block order (duplicates included)
    pub fn names(&self) -> impl Iterator<Item = &str>
    {
        self.blocks
            .iter()
            .filter_map(DeclarationBlock::name)
    }

    /// Same header, only the blocks accepted by `keep`.
    pub fn retain_blocks<F>(
        self,
        mut keep: F,
    ) -> Self
    where
        F: FnMut(&DeclarationBlock) -> bool,
    {
        let Self { header, blocks } = self;
        let blocks = blocks
            .into_iter()
            .filter(|b| keep(b))
            .collect();
        Self { header, blocks }
    }
}

/// Declared name of a column-0 `export ...` line, if it is one.
///
/// The name ends at the first space, `{`, `=`, `<`, `(` or `:` (typed
/// `export const` declarations).
pub fn extract_export_name(line: &str) -> Option<String>
{
    let rest = INTRODUCERS
        .iter()
        .find_map(|intro| line.strip_prefix(intro))?;

    let end = rest
        .find([' ', '{', '=', '<', '(', ':'])
        .unwrap_or(rest.len());
    let name = &rest[..end];

    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests
{
    use super::*;

    const SAMPLE: &str = "// Code generated. DO NOT EDIT.\n\n// From foo/dto.go\n/** Request */\nexport interface foo_FooReq {\n    readonly bar: foo_Bar;\n}\n\n// From foo/dto.go\nexport type foo_Bar = string;\n\n// From misc.go\n// no declaration here\n";

    #[test]
    fn splits_header_and_blocks()
    {
        let decls = Declarations::parse(SAMPLE);
        assert_eq!(decls.header, vec!["// Code generated. DO NOT EDIT.", ""]);
        assert_eq!(
            decls
                .blocks
                .len(),
            3
        );

        let first = &decls.blocks[0];
        assert_eq!(first.origin, "foo/dto.go");
        assert_eq!(first.name(), Some("foo_FooReq"));
        assert_eq!(first.lines[1], "/** Request */");
        assert_eq!(
            first
                .lines
                .last()
                .map(String::as_str),
            Some("")
        );

        assert_eq!(decls.blocks[1].name(), Some("foo_Bar"));
        assert_eq!(decls.blocks[2].name(), None);
        assert_eq!(decls.blocks[2].origin, "misc.go");
    }

    #[test]
    fn render_round_trips_exactly()
    {
        for text in [SAMPLE, "", "\n", "no markers at all\n", "// From a.go", "// From a.go\n\n\n"]
        {
            assert_eq!(Declarations::parse(text).render(), text);
        }
    }

    #[test]
    fn name_extraction_stops_at_delimiters()
    {
        assert_eq!(extract_export_name("export interface Foo {").as_deref(), Some("Foo"));
        assert_eq!(extract_export_name("export interface Page<T> {").as_deref(), Some("Page"));
        assert_eq!(extract_export_name("export type Id = string;").as_deref(), Some("Id"));
        assert_eq!(extract_export_name("export type Id=string;").as_deref(), Some("Id"));
        assert_eq!(extract_export_name("export const Values: readonly X[] = [];").as_deref(), Some("Values"));
        assert_eq!(extract_export_name("export class Fn(").as_deref(), Some("Fn"));
        assert_eq!(extract_export_name("export enum Color").as_deref(), Some("Color"));
        assert_eq!(extract_export_name("  export interface Indented {"), None);
        assert_eq!(extract_export_name("export function f() {}"), None);
        assert_eq!(extract_export_name("export interface {"), None);
    }

    #[test]
    fn name_index_keeps_first_owner()
    {
        let text = "// From a.go\nexport type Dup = string;\n\n// From b.go\nexport type Other = Dup;\n\n// From c.go\nexport type Dup = number;\n";
        let decls = Declarations::parse(text);
        let index = decls.name_index();
        assert_eq!(index.get("Dup"), Some(&0));
        assert_eq!(index.get("Other"), Some(&1));
        assert_eq!(
            index
                .keys()
                .collect::<Vec<_>>(),
            vec!["Dup", "Other"]
        );
    }
}
