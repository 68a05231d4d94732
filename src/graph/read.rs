//! Building the graph from files on disk.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use jwalk::WalkDir;
use regex::Regex;

use super::{Graph, GraphError, NodeId};

/// `#include "path"` with optional blanks around `#`.
///
/// `[ \t]` instead of `\s`: the regex crate is built without Unicode classes.
static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[ \t]*#[ \t]*include[ \t]*"([^"]+)""#).unwrap());

/// Remove a `.c` or `.h` extension, if present.
fn strip_source_ext(name: &str) -> Option<&str> {
    name.strip_suffix(".h").or_else(|| name.strip_suffix(".c"))
}

/// Node name referenced by an include line.
///
/// Absolute paths, `./` prefixes and any `..` component are ignored, they
/// can point outside the indexed tree.
pub(super) fn include_target(line: &str) -> Option<&str> {
    let path = INCLUDE.captures(line)?.get(1)?.as_str();
    if path.starts_with('.') || path.starts_with('/') {
        return None;
    }
    if Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(strip_source_ext(path).unwrap_or(path))
}

/// Directory part of a node name, `None` at the root.
fn name_dir(name: &str) -> Option<&str> {
    name.rfind('/').map(|ix| &name[..ix])
}

impl Graph<'_> {
    /// Add the file at `path` as node `name`, with an edge per `#include`.
    pub fn read_file(&mut self, path: &Path, name: &str) -> Result<NodeId, GraphError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Io(path.to_path_buf(), e))?;
        Ok(self.read_source(&source, name))
    }

    /// Same as [`Graph::read_file`] for in-memory source text.
    pub fn read_source(&mut self, source: &str, name: &str) -> NodeId {
        let node = self.node(name);
        let dir = name_dir(name);

        let mut lines = 0;
        for line in source.lines() {
            lines += 1;
            if let Some(target) = include_target(line) {
                let dst = self.resolve(dir, target);
                self.link(node, dst);
            }
        }

        self.get_mut(node).size = lines;
        node
    }

    /// Node for `target` included from a file in `dir`.
    ///
    /// A known node next to the including file wins, like the quoted
    /// include search of a C compiler. Otherwise the include is taken
    /// relative to the root.
    fn resolve(&mut self, dir: Option<&str>, target: &str) -> NodeId {
        if let Some(dir) = dir
            && let Some(id) = self.find(&format!("{dir}/{target}"))
        {
            return id;
        }
        self.node(target)
    }

    /// Add a node for every `.c` or `.h` file below `root`.
    ///
    /// Nodes are named by their path relative to `root` without extension,
    /// matching how includes are written relative to the include root. All
    /// files of one call share one color.
    pub fn read_dir(&mut self, root: &Path) -> Result<usize, GraphError> {
        if !root.is_dir() {
            return Err(GraphError::Io(
                root.to_path_buf(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        let color = self.next_color();
        let files: Vec<(PathBuf, String)> = WalkDir::new(root)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let path = e.path();
                let relative = path.strip_prefix(root).ok()?;
                let relative = relative.to_string_lossy().replace('\\', "/");
                let name = strip_source_ext(&relative)?.to_string();
                Some((path, name))
            })
            .collect();

        // Every file gets its node first so sibling includes can find it
        for (_, name) in &files {
            let node = self.node(name);
            self.get_mut(node).color = color;
        }

        for (path, name) in &files {
            self.read_file(path, name)?;
        }

        crate::debug!("graph"; "read {} files from {}", files.len(), root.display());
        Ok(files.len())
    }
}
