use crate::graph::ForestGraph;

pub(crate) fn render_edges(graph: &ForestGraph) -> String {
    let mut out = String::new();
    for (a, b) in graph.edges() {
        out.push_str(a);
        out.push('\t');
        out.push_str(b);
        out.push('\n');
    }
    out
}
