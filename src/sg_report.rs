// plain-text rendering of a network: cost table, links, live structure

use std::fmt::Write;

use crate::sg_graph::{Edge, NetworkGraph};
use crate::sg_matrix::SymMatrix;

const CELL_WIDTH: usize = 3;

/// One line per row, cells right-aligned in 3-wide columns
pub fn render_matrix(matrix: &SymMatrix) -> String {
    let mut out = String::new();
    for i in 0..matrix.size() {
        for cost in matrix.row(i) {
            let _ = write!(out, "{:>width$} ", cost, width = CELL_WIDTH);
        }
        out.push('\n');
    }
    out
}

pub fn render_edges(edges: &[Edge]) -> String {
    let mut out = String::new();
    for edge in edges {
        let _ = writeln!(out, "{:>3} - {:<3} cost {}", edge.left, edge.right, edge.cost);
    }
    out
}

/// Each structure link once, smaller id first, then the total
pub fn render_structure(structure: &SymMatrix) -> String {
    let mut out = String::new();
    let mut total = 0;
    for (i, j, cost) in structure.upper_entries() {
        let _ = writeln!(out, "{} node and {} node has {} cost.", i, j, cost);
        total += cost;
    }
    let _ = writeln!(out, "total cost {}", total);
    out
}

/// Everything the `generate` front end prints
pub fn render_network(graph: &NetworkGraph) -> String {
    format!(
        "{}\nLinks ({}):\n{}\nSpanning structure ({} eligible nodes):\n{}",
        render_matrix(graph.costs()),
        graph.edges().len(),
        render_edges(graph.edges()),
        graph.eligible_count(),
        render_structure(graph.structure())
    )
}
