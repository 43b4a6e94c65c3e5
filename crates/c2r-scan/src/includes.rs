//! Include extraction and dependency lookup.
//!
//! Only quoted includes ending in `.h` are considered project-local; angle
//! bracket includes are assumed to be available on the translation side and
//! are never bundled.
//!
//! Lookups run against a [`SourceIndex`] of every `.c`/`.h` file in the input
//! tree, so one run walks the tree once no matter how many includes there
//! are.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::LazyLock;

use c2r_core::IncludeMatch;
use regex::Regex;

use crate::error::ScanError;
use crate::scanner::{relative_path, walk_files};

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\x{FEFF}?[ \t]*#[ \t]*include[ \t]*"([^"\r\n]+)\.h""#).expect("valid regex")
});

/// Extract quoted include base names (without `.h`) in source order.
///
/// Duplicates are kept.
#[must_use]
pub fn extract_includes(source: &str) -> Vec<String> {
    INCLUDE_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SourceKind {
    Header,
    Source,
}

impl SourceKind {
    fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".h") {
            Some(Self::Header)
        } else if name.ends_with(".c") {
            Some(Self::Source)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedFile {
    /// Relative path with extension, `/`-separated.
    path: String,
    /// Relative path without the `.c`/`.h` extension.
    stem_path: String,
    file_name: String,
    file_stem: String,
    kind: SourceKind,
}

/// Every `.c` and `.h` file of an input tree, in walk order.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    files: Vec<IndexedFile>,
}

impl SourceIndex {
    /// Walk `root` once and index its C sources and headers.
    ///
    /// # Errors
    ///
    /// Propagates [`ScanError`] from the walk.
    pub fn build(root: &Path) -> Result<Self, ScanError> {
        let paths = walk_files(root)?
            .iter()
            .map(|p| relative_path(root, p))
            .collect::<Vec<_>>();
        Ok(Self::from_relative_paths(paths))
    }

    /// Build an index from already relative, `/`-separated paths.
    /// Paths that are not `.c`/`.h` files are ignored.
    #[must_use]
    pub fn from_relative_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files = paths
            .into_iter()
            .filter_map(|p| {
                let path: String = p.into();
                let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
                let kind = SourceKind::from_file_name(&file_name)?;
                let stem_path = path[..path.len() - 2].to_string();
                let file_stem = file_name[..file_name.len() - 2].to_string();
                Some(IndexedFile {
                    path,
                    stem_path,
                    file_name,
                    file_stem,
                    kind,
                })
            })
            .collect();
        Self { files }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Relative paths of the files matching the include base name `base`.
    ///
    /// Results are ordered by path without extension, headers before
    /// sources, so `a.h` precedes `a.c`.
    #[must_use]
    pub fn find_matches(&self, base: &str, mode: IncludeMatch) -> Vec<String> {
        let base = normalize_base(base);
        if base.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<&IndexedFile> = self
            .files
            .iter()
            .filter(|file| match mode {
                IncludeMatch::Exact => matches_exact(file, base),
                IncludeMatch::Prefix => matches_prefix(file, base),
            })
            .collect();
        matches.sort_by(|a, b| match a.stem_path.cmp(&b.stem_path) {
            Ordering::Equal => a.kind.cmp(&b.kind),
            other => other,
        });
        matches.into_iter().map(|f| f.path.clone()).collect()
    }
}

/// One-shot lookup: index `root` and return the matches for `base`.
///
/// # Errors
///
/// Propagates [`ScanError`] from the walk.
pub fn find_matches(root: &Path, base: &str, mode: IncludeMatch) -> Result<Vec<String>, ScanError> {
    Ok(SourceIndex::build(root)?.find_matches(base, mode))
}

/// Drop leading `./` and `../` segments; lookups are tree-wide, not relative
/// to the including file.
fn normalize_base(base: &str) -> &str {
    let mut base = base.trim();
    loop {
        if let Some(rest) = base.strip_prefix("./") {
            base = rest;
        } else if let Some(rest) = base.strip_prefix("../") {
            base = rest;
        } else {
            return base;
        }
    }
}

fn matches_exact(file: &IndexedFile, base: &str) -> bool {
    if base.contains('/') {
        file.stem_path == base
            || file
                .stem_path
                .strip_suffix(base)
                .is_some_and(|head| head.ends_with('/'))
    } else {
        file.file_stem == base
    }
}

fn matches_prefix(file: &IndexedFile, base: &str) -> bool {
    let last = base.rsplit('/').next().unwrap_or(base);
    file.file_name.starts_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("#include \"a.h\"\n", vec!["a"])]
    #[case("#include <stdio.h>\n#include \"b.h\"\n", vec!["b"])]
    #[case("  #  include   \"spaced.h\"\n", vec!["spaced"])]
    #[case("#include\"tight.h\"\n", vec!["tight"])]
    #[case("#include \"net/sock.h\"\n", vec!["net/sock"])]
    #[case("#include \"a.hpp\"\n", vec![])]
    #[case("#include \"a.c\"\n", vec![])]
    #[case("#include \"a.h\" // see \"b.h\"\n", vec!["a"])]
    #[case("int x; #include \"inline.h\"\n", vec![])]
    #[case("#include \"a.h\"\r\n#include \"b.h\"\r\n", vec!["a", "b"])]
    #[case("\u{FEFF}#include \"bom.h\"\n#include \"b.h\"\n", vec!["bom", "b"])]
    #[case("", vec![])]
    fn extracts_quoted_includes(#[case] source: &str, #[case] expected: Vec<&str>) {
        assert_eq!(extract_includes(source), expected);
    }

    #[test]
    fn keeps_duplicates_in_source_order() {
        let source = "#include \"b.h\"\n#include \"a.h\"\n#include \"b.h\"\n";
        assert_eq!(extract_includes(source), vec!["b", "a", "b"]);
    }

    fn index() -> SourceIndex {
        SourceIndex::from_relative_paths([
            "a.c",
            "a.h",
            "foo.h",
            "foobar.h",
            "lib/foo.c",
            "net/sock.h",
            "vendor/net/sock.h",
            "sock.h",
            "README.md",
            "test-foo.c",
        ])
    }

    #[test]
    fn index_ignores_non_c_files() {
        assert_eq!(index().len(), 9);
    }

    #[test]
    fn exact_match_orders_header_before_source() {
        assert_eq!(index().find_matches("a", IncludeMatch::Exact), vec!["a.h", "a.c"]);
    }

    #[test]
    fn exact_match_ignores_longer_names() {
        assert_eq!(
            index().find_matches("foo", IncludeMatch::Exact),
            vec!["foo.h", "lib/foo.c"]
        );
    }

    #[test]
    fn prefix_match_reproduces_legacy_over_matching() {
        assert_eq!(
            index().find_matches("foo", IncludeMatch::Prefix),
            vec!["foo.h", "foobar.h", "lib/foo.c"]
        );
    }

    #[test]
    fn exact_match_with_directory_respects_segment_boundary() {
        assert_eq!(
            index().find_matches("net/sock", IncludeMatch::Exact),
            vec!["net/sock.h", "vendor/net/sock.h"]
        );
        assert!(index().find_matches("et/sock", IncludeMatch::Exact).is_empty());
    }

    #[test]
    fn relative_prefixes_are_stripped() {
        assert_eq!(
            index().find_matches("../net/sock", IncludeMatch::Exact),
            vec!["net/sock.h", "vendor/net/sock.h"]
        );
        assert_eq!(index().find_matches("./a", IncludeMatch::Exact), vec!["a.h", "a.c"]);
    }

    #[test]
    fn unknown_or_empty_base_matches_nothing() {
        assert!(index().find_matches("missing", IncludeMatch::Exact).is_empty());
        assert!(index().find_matches("", IncludeMatch::Prefix).is_empty());
    }

    #[test]
    fn find_matches_walks_the_tree() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("a.h"), "").unwrap();
        std::fs::write(tmp.path().join("src/a.c"), "").unwrap();
        std::fs::write(tmp.path().join(".a.h"), "").unwrap();

        let matches = find_matches(tmp.path(), "a", IncludeMatch::Exact).unwrap();
        assert_eq!(matches, vec!["a.h", "src/a.c"]);
    }
}
