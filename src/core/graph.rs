//! Reference graph between declaration blocks.
//!
//! Purely syntactic: identifiers on non-comment lines that equal another
//! block's declared name become edges. An unrelated identifier that happens
//! to share a block's name is a reference too.

use std::sync::LazyLock;

use petgraph::graphmap::DiGraphMap;
use regex::Regex;
use tracing::{debug, instrument};

use crate::core::blocks::{DeclarationBlock, Declarations};

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("static identifier regex"));

/// Directed graph over declared names; `a -> b` when `a` mentions `b`
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph<'a>
{
    graph: DiGraphMap<&'a str, ()>,
}

impl<'a> ReferenceGraph<'a>
{
    /// Build the graph for every named block in `decls`.
    ///
    /// Names declared by several blocks get the union of their edges.
    #[instrument(level = "debug", skip_all, fields(blocks = decls.blocks.len()))]
    pub fn build(decls: &'a Declarations) -> Self
    {
        let mut graph = DiGraphMap::new();
        for name in decls.names()
        {
            graph.add_node(name);
        }

        for block in &decls.blocks
        {
            let Some(name) = block.name()
            else
            {
                continue;
            };

            for line in code_lines(block)
            {
                for token in IDENT_RE
                    .find_iter(line)
                    .map(|m| m.as_str())
                {
                    if token != name && graph.contains_node(token)
                    {
                        graph.add_edge(name, token, ());
                    }
                }
            }
        }

        debug!(nodes = graph.node_count(), edges = graph.edge_count(), "reference graph built");
        Self { graph }
    }

    /// Names directly referenced by `name`, sorted
    pub fn references<'b>(
        &'b self,
        name: &'b str,
    ) -> Vec<&'b str>
    {
        let mut out: Vec<&'b str> = self
            .graph()
            .neighbors(name)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool
    {
        self.graph()
            .contains_node(name)
    }

    /// Borrow the graph with keys shortened to the caller's lifetime
    pub fn graph<'b>(&'b self) -> &'b DiGraphMap<&'b str, ()>
    {
        &self.graph
    }
}

/// Block lines that are not comments
pub fn code_lines(block: &DeclarationBlock) -> impl Iterator<Item = &str>
{
    block
        .lines
        .iter()
        .map(String::as_str)
        .filter(|l| !is_comment_line(l))
}

/// `//`, `/*` and `*` lines (after trimming) are comments
pub fn is_comment_line(line: &str) -> bool
{
    let t = line.trim();
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*')
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn decls(text: &str) -> Declarations
    {
        Declarations::parse(text)
    }

    #[test]
    fn records_edges_to_known_names_only()
    {
        let d = decls(
            "// From a.go\nexport interface A {\n    readonly b: B;\n    readonly x: Missing;\n    readonly self_ref: A;\n}\n\n// From b.go\nexport type B = C[];\n\n// From c.go\nexport type C = string;\n",
        );
        let g = ReferenceGraph::build(&d);
        assert_eq!(g.references("A"), vec!["B"]);
        assert_eq!(g.references("B"), vec!["C"]);
        assert!(g.references("C").is_empty());
        assert!(!g.contains("Missing"));
    }

    #[test]
    fn comment_lines_do_not_create_edges()
    {
        let d = decls(
            "// From a.go\n/**\n * Mentions B in docs\n */\n// B again\nexport interface A {\n    /* B */\n}\n\n// From b.go\nexport type B = string;\n",
        );
        let g = ReferenceGraph::build(&d);
        assert!(g.references("A").is_empty());
    }

    #[test]
    fn duplicate_declarations_union_their_edges()
    {
        let d = decls(
            "// From a.go\nexport type Dup = X;\n\n// From b.go\nexport type Dup = Y;\n\n// From x.go\nexport type X = string;\n\n// From y.go\nexport type Y = number;\n",
        );
        let g = ReferenceGraph::build(&d);
        assert_eq!(g.references("Dup"), vec!["X", "Y"]);
    }

    #[test]
    fn word_boundaries_are_respected()
    {
        let d = decls("// From a.go\nexport type A = BB | B_2 | xB;\n\n// From b.go\nexport type B = string;\n");
        let g = ReferenceGraph::build(&d);
        assert!(g.references("A").is_empty());
    }

    #[test]
    fn comment_detection()
    {
        assert!(is_comment_line("  // x"));
        assert!(is_comment_line("/** doc"));
        assert!(is_comment_line("   * continued"));
        assert!(!is_comment_line("export type A = B; // trailing"));
        assert!(!is_comment_line(""));
    }
}
