//! Deduplication of repeated declarations.

use tracing::{debug, instrument};

use crate::core::blocks::Declarations;

/// Keep the first block for every declared name.
///
/// A later block with a seen name is dropped whole: marker, attached
/// comments, body and its trailing blank line. Unnamed blocks pass through.
#[instrument(level = "debug", skip_all, fields(blocks = decls.blocks.len()))]
pub fn deduplicate(decls: Declarations) -> Declarations
{
    let owners = decls.name_index();
    let before = decls
        .blocks
        .len();

    let mut position = 0;
    let out = decls.retain_blocks(|b| {
        let i = position;
        position += 1;
        b.name()
            .is_none_or(|name| owners.get(name) == Some(&i))
    });

    let dropped = before - out.blocks.len();
    if dropped > 0
    {
        debug!(dropped, "duplicate declarations removed");
    }
    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn first_duplicate_wins_with_its_comments()
    {
        let text = "// hdr\n\n// From a.go\n/** first */\nexport type Dup = string;\n\n// From b.go\nexport type Keep = Dup;\n\n// From c.go\n/** second */\nexport type Dup = number;\n\n// From d.go\nexport type Tail = string;\n";
        let out = deduplicate(Declarations::parse(text));

        assert_eq!(
            out.render(),
            "// hdr\n\n// From a.go\n/** first */\nexport type Dup = string;\n\n// From b.go\nexport type Keep = Dup;\n\n// From d.go\nexport type Tail = string;\n"
        );
    }

    #[test]
    fn trailing_duplicate_leaves_no_residue()
    {
        let text = "// From a.go\nexport type Dup = string;\n\n// From b.go\nexport type Dup = string;\n";
        let out = deduplicate(Declarations::parse(text));
        assert_eq!(out.render(), "// From a.go\nexport type Dup = string;\n");
    }

    #[test]
    fn survivors_are_the_indexed_owners_in_order()
    {
        let text = "// From a.go\nexport type B = A;\n\n// From b.go\nexport type A = string;\n\n// From c.go\nexport type B = number;\n\n// From d.go\nexport type A = number;\n";
        let decls = Declarations::parse(text);
        let owners: Vec<String> = decls
            .name_index()
            .values()
            .map(|&i| decls.blocks[i].origin.clone())
            .collect();

        let out = deduplicate(decls);
        let kept: Vec<String> = out
            .blocks
            .iter()
            .map(|b| b.origin.clone())
            .collect();
        assert_eq!(kept, owners);
        assert_eq!(kept, vec!["a.go", "b.go"]);
    }

    #[test]
    fn unnamed_blocks_are_kept()
    {
        let text = "// From a.go\n// nothing\n\n// From a.go\n// nothing\n";
        let decls = Declarations::parse(text);
        assert_eq!(deduplicate(decls.clone()), decls);
    }
}
