//! `hotloop graph`: include graph of source directories as Graphviz DOT.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::arena::{Arena, ChunkCache};
use crate::config::HotConfig;
use crate::graph::Graph;
use crate::log;
use crate::utils::path::resolve_path;

pub fn print_graph(config: &HotConfig, dirs: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let dirs: Vec<PathBuf> = if dirs.is_empty() {
        config.watch.paths.clone()
    } else {
        dirs.iter()
            .map(|dir| resolve_path(dir, config.get_root()))
            .collect()
    };

    let dot = render(&dirs)?;

    match output {
        Some(path) => {
            std::fs::write(path, dot)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log!("graph"; "wrote {}", path.display());
        }
        // Nothing else may go to stdout here
        None => print!("{dot}"),
    }
    Ok(())
}

/// Read, reduce and rank `dirs`, then render DOT.
fn render(dirs: &[PathBuf]) -> Result<String> {
    let cache = ChunkCache::new();
    let arena = Arena::new(&cache);
    let mut graph = Graph::new(&arena);

    for dir in dirs {
        graph
            .read_dir(dir)
            .with_context(|| format!("failed to read {}", dir.display()))?;
    }

    let transitive = graph.transitive_reduce()?;
    let ranks = graph.rank()?;
    crate::debug!(
        "graph";
        "{} nodes, {} edges ({} transitive), {} ranks",
        graph.len(),
        graph.edge_count(),
        transitive,
        ranks
    );

    Ok(graph.to_dot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_render_multiple_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("src/main.c"), "#include \"util.h\"\n").unwrap();
        fs::write(dir.path().join("lib/util.h"), "int util(void);\n").unwrap();

        let dot = render(&[dir.path().join("src"), dir.path().join("lib")]).unwrap();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("\"main\" -> \"util\""));
    }

    #[test]
    fn test_render_cycle_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.h"), "#include \"b.h\"\n").unwrap();
        fs::write(dir.path().join("b.h"), "#include \"a.h\"\n").unwrap();

        let err = render(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_print_graph_to_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.c"), "int main(void) { return 0; }\n").unwrap();
        let out = dir.path().join("deps.dot");

        let config = crate::config::test_parse_config("");
        print_graph(&config, &[dir.path().to_path_buf()], Some(&out)).unwrap();
        assert!(fs::read_to_string(out).unwrap().contains("\"main\""));
    }
}
