use std::fmt::{self, Write};

use super::Graph;

/// A node name as a quoted DOT identifier.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for c in self.0.chars() {
            if matches!(c, '"' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(c)?;
        }
        f.write_char('"')
    }
}

impl Graph<'_> {
    /// Write the graph in Graphviz `dot` notation.
    ///
    /// Nodes sharing a rank are grouped in one `rank=same` cluster and only
    /// non-transitive edges are emitted. Call [`Graph::rank`] (and usually
    /// [`Graph::transitive_reduce`]) first.
    pub fn write_dot(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "digraph {{")?;
        writeln!(out, "  layout=dot;")?;
        writeln!(out, "  ranksep=1.0;")?;
        writeln!(
            out,
            "  node[style=filled,fillcolor=\"#ffffff\",colorscheme=set19];"
        )?;
        writeln!(out, "  edge[color=\"#bbbbbb\"];")?;

        for rank in 0..self.rank_count {
            write!(out, "  {{ rank=same;")?;
            for node in self.nodes.iter().filter(|n| n.rank == rank) {
                write!(out, " {};", Quoted(node.name))?;
            }
            writeln!(out, " }}")?;
        }

        for node in &self.nodes {
            let name = Quoted(node.name);
            // set19 is 1-based
            writeln!(out, "  {}[color={}];", name, node.color % 9 + 1)?;
            for edge in node.edges.iter().filter(|e| !e.transitive) {
                writeln!(out, "  {} -> {};", name, Quoted(self.get(edge.to).name))?;
            }
        }

        writeln!(out, "}}")
    }

    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_dot(&mut out);
        out
    }
}
