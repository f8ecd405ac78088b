//! Whitelist selection and dependency closure.

use std::collections::HashSet;

use petgraph::visit::{Bfs, VisitMap};
use regex::Regex;
use tracing::{debug, instrument};

use crate::{
    core::{blocks::Declarations, graph::ReferenceGraph},
    error::{Result, TypegenError},
};

/// Compiled caller filters; both absent means "keep everything"
#[derive(Debug, Clone, Default)]
pub struct Filters
{
    /// Matched against each block's origin
    pub origin: Option<Regex>,

    /// Matched against each block's declared name
    pub name: Option<Regex>,
}

impl Filters
{
    /// Compile the include patterns; empty strings disable a filter.
    pub fn compile(
        include: &str,
        include_type: &str,
    ) -> Result<Self>
    {
        Ok(Self {
            origin: compile_pattern("include", include)?,
            name: compile_pattern("include-type", include_type)?,
        })
    }

    pub fn is_active(&self) -> bool
    {
        self.origin
            .is_some()
            || self
                .name
                .is_some()
    }

    /// Initial selection test for one block
    pub fn matches(
        &self,
        origin: &str,
        name: &str,
    ) -> bool
    {
        let origin_ok = self
            .origin
            .as_ref()
            .is_none_or(|re| re.is_match(origin));
        let name_ok = self
            .name
            .as_ref()
            .is_none_or(|re| re.is_match(name));
        origin_ok && name_ok
    }
}

fn compile_pattern(
    flag: &'static str,
    pattern: &str,
) -> Result<Option<Regex>>
{
    if pattern.is_empty()
    {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| TypegenError::InvalidPattern { flag, pattern: pattern.to_string(), source })
}

/// Keep the blocks matching `filters` plus everything they reference,
/// transitively. Unnamed blocks are dropped while a filter is active.
#[instrument(level = "debug", skip_all, fields(active = filters.is_active()))]
pub fn filter_by_whitelist(
    decls: Declarations,
    filters: &Filters,
) -> Declarations
{
    if !filters.is_active()
    {
        return decls;
    }

    let selected: HashSet<String> = {
        let graph = ReferenceGraph::build(&decls);
        let seeds: Vec<&str> = decls
            .blocks
            .iter()
            .filter_map(|b| {
                b.name()
                    .filter(|name| filters.matches(&b.origin, name))
            })
            .collect();

        debug!(seeds = seeds.len(), "initial selection");
        closure(&graph, &seeds)
    };

    decls.retain_blocks(|b| {
        b.name()
            .is_some_and(|n| selected.contains(n))
    })
}

/// Every name reachable from `seeds` (seeds included).
pub fn closure(
    graph: &ReferenceGraph<'_>,
    seeds: &[&str],
) -> HashSet<String>
{
    let g = graph.graph();
    let mut known = seeds
        .iter()
        .copied()
        .filter(|s| g.contains_node(*s));

    let mut seen: HashSet<String> = HashSet::new();
    let Some(first) = known.next()
    else
    {
        return seen;
    };

    // One traversal for all seeds so shared dependencies are visited once
    let mut bfs = Bfs::new(g, first);
    for seed in known
    {
        if bfs
            .discovered
            .visit(seed)
        {
            bfs.stack
                .push_back(seed);
        }
    }

    while let Some(node) = bfs.next(g)
    {
        seen.insert(node.to_string());
    }

    debug!(selected = seen.len(), "closure expanded");
    seen
}
