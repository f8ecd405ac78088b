//! Declaration-name prefixing.
//!
//! Every package below the root gets a prefix derived from its relative
//! import path so identically named types in different packages do not
//! collide once flattened into a single declaration file.

use std::{fmt, sync::Arc};

/// Guard token for prefixes that would otherwise start with a non-letter
pub const GUARD_TOKEN: &str = "pkg_";

/// Caller-supplied rename hook: `(declared_name, package_import_path) -> name`
pub type TypeNameMapper = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Prefix for `import_path` relative to `root_import_path`.
///
/// The root package itself gets an empty prefix. Otherwise `/` becomes
/// `__`, each of `-`, `.` and `@` becomes `_`, [`GUARD_TOKEN`] is prepended
/// when the first character is not an ASCII letter or `_`, and a trailing
/// `_` separates the prefix from the declared name.
pub fn prefix_for_import_path(
    root_import_path: &str,
    import_path: &str,
) -> String
{
    let rel = import_path
        .strip_prefix(root_import_path)
        .unwrap_or(import_path);
    let rel = rel.trim_start_matches('/');
    if rel.is_empty()
    {
        return String::new();
    }

    let mut prefix = String::with_capacity(rel.len() + GUARD_TOKEN.len() + 1);
    for ch in rel.chars()
    {
        match ch
        {
            '/' => prefix.push_str("__"),
            '-' | '.' | '@' => prefix.push('_'),
            c => prefix.push(c),
        }
    }

    let starts_ok = prefix
        .chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
    if !starts_ok
    {
        prefix.insert_str(0, GUARD_TOKEN);
    }

    prefix.push('_');
    prefix
}

/// Go export rule: the first character is an uppercase letter.
pub fn is_exported(name: &str) -> bool
{
    name.chars()
        .next()
        .is_some_and(char::is_uppercase)
}

/// Computes the emitted name of a Go type.
///
/// Shared by the conversion engine and the interface classifier so the
/// exclusion set always matches what the engine writes.
#[derive(Clone)]
pub struct DeclNamer
{
    root_import_path: String,
    strip_prefix: bool,
    mapper: Option<TypeNameMapper>,
}

impl DeclNamer
{
    pub fn new(root_import_path: impl Into<String>) -> Self
    {
        Self {
            root_import_path: root_import_path.into(),
            strip_prefix: false,
            mapper: None,
        }
    }

    /// Emit bare Go names instead of prefixed ones.
    pub fn with_strip_prefix(
        mut self,
        strip: bool,
    ) -> Self
    {
        self.strip_prefix = strip;
        self
    }

    /// Install (or clear) the rename hook.
    pub fn with_mapper(
        mut self,
        mapper: Option<TypeNameMapper>,
    ) -> Self
    {
        self.mapper = mapper;
        self
    }

    pub fn root_import_path(&self) -> &str
    {
        &self.root_import_path
    }

    /// Prefix for a package under this namer's root.
    pub fn prefix(
        &self,
        import_path: &str,
    ) -> String
    {
        prefix_for_import_path(&self.root_import_path, import_path)
    }

    /// Emitted name of `go_name` declared in package `import_path`.
    pub fn name(
        &self,
        go_name: &str,
        import_path: &str,
    ) -> String
    {
        if let Some(mapper) = &self.mapper
        {
            return mapper(go_name, import_path);
        }
        if self.strip_prefix
        {
            return go_name.to_string();
        }
        format!("{}{}", self.prefix(import_path), go_name)
    }
}

impl fmt::Debug for DeclNamer
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.debug_struct("DeclNamer")
            .field("root_import_path", &self.root_import_path)
            .field("strip_prefix", &self.strip_prefix)
            .field("mapper", &self.mapper.is_some())
            .finish()
    }
}
