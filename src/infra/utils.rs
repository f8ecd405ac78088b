//! Filepath: src/infra/utils.rs
//! Tree-sitter node helpers organized as associated fns on a
//! small struct, keeping call sites ergonomic and testable.

// Tree-sitter types for node helpers
use tree_sitter::Node;

/// Common Tree-sitter node helpers
pub struct TsNodeUtils;

impl TsNodeUtils
{
    /// First named child whose kind equals `kind`
    pub fn first_named_child_of_kind<'a>(
        node: Node<'a>,
        kind: &str,
    ) -> Option<Node<'a>>
    {
        let mut cursor = node.walk();

        // Linear scan; declaration nodes have few children
        let found = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == kind);
        found
    }

    /// Whether `node` has a direct (possibly anonymous) child token `kind`
    pub fn has_child_token(
        node: Node,
        kind: &str,
    ) -> bool
    {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|c| c.kind() == kind);
        found
    }

    /// Depth-first search for the first ERROR or MISSING node
    pub fn first_error(node: Node) -> Option<Node>
    {
        if node.is_error() || node.is_missing()
        {
            return Some(node);
        }

        // Only descend into subtrees that contain an error
        if !node.has_error()
        {
            return None;
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .children(&mut cursor)
            .collect();
        children
            .into_iter()
            .find_map(Self::first_error)
    }
}
