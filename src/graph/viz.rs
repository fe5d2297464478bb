use crate::graph::RouteGraph;

pub fn render_dot(graph: &RouteGraph) -> String {
    let mut out = String::from("digraph locograph {\n");
    for node in &graph.nodes {
        let label = format!("{} ({})", node.label, node.region);
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\"];\n",
            node.id.as_str(),
            escape_dot_label(&label)
        ));
    }
    for edge in &graph.edges {
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
            edge.source.as_str(),
            edge.target.as_str(),
            escape_dot_label(&edge.locomotives.join(", "))
        ));
    }
    out.push_str("}\n");
    out
}

fn escape_dot_label(label: &str) -> String {
    label.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IdentifierResolver, LookupEntry, RequirementRow};
    use crate::graph::build_graph;

    #[test]
    fn render_dot_emits_nodes_and_directed_edges() {
        let resolver = IdentifierResolver::new(&[
            LookupEntry {
                canonical_name: "RouteA".to_string(),
                short_name: "RTA".to_string(),
                region: "US".to_string(),
            },
            LookupEntry {
                canonical_name: "RouteB".to_string(),
                short_name: "RTB".to_string(),
                region: "DE".to_string(),
            },
        ]);
        let rows = vec![RequirementRow {
            route: "RTA".to_string(),
            locomotive: "Loco1".to_string(),
            required_dlcs: vec!["RTB".to_string()],
        }];
        let dot = render_dot(&build_graph(&rows, &resolver));

        assert!(dot.starts_with("digraph locograph {"));
        assert!(dot.contains("\"RTA\" [label=\"RTA (US)\"];"));
        assert!(dot.contains("\"RTA\" -> \"RTB\" [label=\"Loco1\"];"));
        assert!(dot.ends_with("}\n"));
    }
}
