//! Interface filter: drops every block declaring an interface-only type.

use tracing::{debug, instrument};

use crate::core::{blocks::Declarations, classify::InterfaceExclusionSet};

/// Remove blocks whose name is excluded, even when they were pulled in as
/// a dependency. Header and unnamed blocks are kept.
#[instrument(level = "debug", skip_all, fields(excluded = excluded.len()))]
pub fn filter_interface_types(
    decls: Declarations,
    excluded: &InterfaceExclusionSet,
) -> Declarations
{
    if excluded.is_empty()
    {
        return decls;
    }

    let before = decls
        .blocks
        .len();
    let out = decls.retain_blocks(|b| {
        b.name()
            .is_none_or(|n| !excluded.contains(n))
    });

    debug!(removed = before - out.blocks.len(), "interface blocks removed");
    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn removes_excluded_names_even_when_referenced()
    {
        let text = "// hdr\n// From foo/a.go\nexport interface foo_Tx {\n}\n\n// From foo/b.go\nexport interface foo_Uses {\n    readonly tx: foo_Tx;\n}\n\n// From foo/c.go\n// stray\n";
        let decls = Declarations::parse(text);
        let excluded: InterfaceExclusionSet = ["foo_Tx".to_string()].into();

        let out = filter_interface_types(decls, &excluded);
        assert_eq!(out.header, vec!["// hdr"]);
        let origins: Vec<_> = out
            .blocks
            .iter()
            .map(|b| b.origin.as_str())
            .collect();
        assert_eq!(origins, vec!["foo/b.go", "foo/c.go"]);
    }

    #[test]
    fn empty_exclusion_set_is_noop()
    {
        let text = "// From a.go\nexport interface A {\n}\n";
        let decls = Declarations::parse(text);
        let out = filter_interface_types(decls.clone(), &InterfaceExclusionSet::new());
        assert_eq!(out, decls);
    }
}
