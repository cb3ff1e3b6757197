// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module key resolution
//!
//! Bundled modules are identified by absolute, `/`-delimited keys. Nothing
//! here touches the file system; keys are plain strings.

/// Resolve `relative` against the directory containing `base`.
///
/// `..` pops a segment, `.` is skipped and anything else is pushed. A rooted
/// `relative` starts over from `/`. Popping past the root leaves the key at
/// `/`; well-formed bundles never do that.
pub fn resolve(base: &str, relative: &str) -> String {
    let (mut segments, relative) = match relative.strip_prefix('/') {
        Some(rooted) => (Vec::new(), rooted),
        None => {
            let mut dir: Vec<&str> = base.split('/').skip(1).collect();
            dir.pop();
            (dir, relative)
        }
    };

    for segment in relative.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." => {}
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Directory part of a module filename (last segment removed)
pub fn dirname(filename: &str) -> &str {
    match filename.rfind('/') {
        Some(pos) => &filename[..pos],
        None => "",
    }
}

/// `file://` URL for a module filename
pub fn file_url(filename: &str) -> String {
    let root = if filename.starts_with('/') { "" } else { "/" };
    format!("file://{}{}", root, filename)
}

/// Whether a specifier is path-like rather than a bare package name
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sibling() {
        assert_eq!(resolve("/a/b/c", "./d"), "/a/b/d");
        assert_eq!(resolve("/a/b/c", "d/e"), "/a/b/d/e");
    }

    #[test]
    fn test_resolve_parent() {
        assert_eq!(resolve("/a/b/c", "../d"), "/a/d");
        assert_eq!(resolve("/a/b/c.js", "../../x.js"), "/x.js");
        assert_eq!(resolve("/a/b/c", "./d/../e"), "/a/b/e");
    }

    #[test]
    fn test_resolve_past_root() {
        assert_eq!(resolve("/a", "../../x"), "/x");
    }

    #[test]
    fn test_resolve_from_root_module() {
        assert_eq!(resolve("/index.js", "./lib/util.js"), "/lib/util.js");
    }

    #[test]
    fn test_resolve_rooted_specifier() {
        assert_eq!(resolve("/src/main.js", "/vendor/x.js"), "/vendor/x.js");
        assert_eq!(resolve("/a/b/c", "/d/../e"), "/e");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/src/lib/a.js"), "/src/lib");
        assert_eq!(dirname("/a.js"), "");
        assert_eq!(dirname("a.js"), "");
        assert_eq!(dirname(""), "");
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url("/src/a.js"), "file:///src/a.js");
        assert_eq!(file_url("src/a.js"), "file:///src/a.js");
        assert_eq!(file_url(""), "file:///");
    }

    #[test]
    fn test_is_relative() {
        assert!(is_relative("./a"));
        assert!(is_relative("../a"));
        assert!(is_relative("/abs"));
        assert!(is_relative(".."));
        assert!(!is_relative("lodash"));
        assert!(!is_relative("@scope/pkg"));
        assert!(!is_relative(".hidden"));
    }
}
