//! Feature graph rendering for `trellis graph` and `trellis roots`.
//!
//! Graphs can be cyclic and share nodes, so rendering tracks which nodes it
//! has already expanded. A node met again is printed with a "(see above)"
//! marker and its children are not repeated. Nodes are expanded in
//! pre-order: `depends_on` children first, then `dependants`.

use std::collections::HashSet;
use std::io::{self, Write};

use serde_json::{Value, json};

use super::color::{bold, colorize_feature, dimmed, info};
use super::{OutputConfig, OutputMode};
use crate::graph::{FeatureForest, FeatureGraph, NodeId, NodeRef};

const SEE_ABOVE: &str = "(see above)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    DependsOn,
    Dependant,
}

struct Glyphs {
    root: &'static str,
    branch: &'static str,
    corner: &'static str,
    pipe: &'static str,
    space: &'static str,
    depends_on: &'static str,
    dependant: &'static str,
}

impl Glyphs {
    fn new(config: &OutputConfig) -> Self {
        if config.use_ascii {
            Self {
                root: "*",
                branch: "|-- ",
                corner: "`-- ",
                pipe: "|   ",
                space: "    ",
                depends_on: "->",
                dependant: "<-",
            }
        } else {
            Self {
                root: "◆",
                branch: "├── ",
                corner: "└── ",
                pipe: "│   ",
                space: "    ",
                depends_on: "→",
                dependant: "←",
            }
        }
    }

    fn arrow(&self, relation: Relation) -> &'static str {
        match relation {
            Relation::DependsOn => self.depends_on,
            Relation::Dependant => self.dependant,
        }
    }
}

struct Pending<'a> {
    node: NodeRef<'a>,
    relation: Option<Relation>,
    prefix: String,
    is_last: bool,
}

/// Print the graph around one feature.
///
/// Renders a tree like:
/// ```text
/// ◆ Checkout [Shop@1.0]
/// ├── → Payment [Shop@1.0]
/// │   └── ← Checkout [Shop@1.0] (see above)
/// └── ← Order history [Shop@1.0]
/// ```
pub fn print_feature_graph(graph: &FeatureGraph, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_graph_text(&mut handle, graph, &config),
        OutputMode::Json => write_pretty(&mut handle, &graph_to_json(graph)),
    }
}

/// Print the graphs of all root features.
pub fn print_forest(forest: &FeatureForest, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_forest_text(&mut handle, forest, &config),
        OutputMode::Json => write_pretty(&mut handle, &forest_to_json(forest)),
    }
}

fn write_pretty<W: Write>(w: &mut W, value: &Value) -> io::Result<()> {
    let output = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{output}")
}

/// Render one feature graph as text.
pub fn write_graph_text<W: Write>(
    w: &mut W,
    graph: &FeatureGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    write_node_text(w, graph.root(), &mut HashSet::new(), config)
}

/// Render every root of a forest as text, one tree per root.
///
/// Expansion state is shared between trees, so a root already shown inside
/// an earlier tree is listed with the "(see above)" marker.
pub fn write_forest_text<W: Write>(
    w: &mut W,
    forest: &FeatureForest,
    config: &OutputConfig,
) -> io::Result<()> {
    let mut expanded = HashSet::new();
    for (i, root) in forest.roots().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        write_node_text(w, root, &mut expanded, config)?;
    }
    Ok(())
}

fn write_node_text<W: Write>(
    w: &mut W,
    root: NodeRef<'_>,
    expanded: &mut HashSet<NodeId>,
    config: &OutputConfig,
) -> io::Result<()> {
    let glyphs = Glyphs::new(config);
    let mut stack = vec![Pending {
        node: root,
        relation: None,
        prefix: String::new(),
        is_last: true,
    }];

    while let Some(entry) = stack.pop() {
        let repeated = !expanded.insert(entry.node.id());
        let label = colorize_feature(entry.node.feature(), config);
        let marker = if repeated {
            format!(" {}", dimmed(SEE_ABOVE, config))
        } else {
            String::new()
        };

        match entry.relation {
            None => {
                let icon = bold(&info(glyphs.root, config), config);
                writeln!(w, "{icon} {label}{marker}")?;
            }
            Some(relation) => {
                let connector = if entry.is_last {
                    glyphs.corner
                } else {
                    glyphs.branch
                };
                writeln!(
                    w,
                    "{}{} {}{}",
                    dimmed(&format!("{}{connector}", entry.prefix), config),
                    dimmed(glyphs.arrow(relation), config),
                    label,
                    marker
                )?;
            }
        }

        if repeated {
            continue;
        }

        let child_prefix = match entry.relation {
            None => String::new(),
            Some(_) if entry.is_last => format!("{}{}", entry.prefix, glyphs.space),
            Some(_) => format!("{}{}", entry.prefix, glyphs.pipe),
        };
        let children: Vec<(Relation, NodeRef<'_>)> = entry
            .node
            .depends_on()
            .map(|n| (Relation::DependsOn, n))
            .chain(entry.node.dependants().map(|n| (Relation::Dependant, n)))
            .collect();
        let count = children.len();

        // Reversed so the first child is popped first
        for (i, (relation, node)) in children.into_iter().enumerate().rev() {
            stack.push(Pending {
                node,
                relation: Some(relation),
                prefix: child_prefix.clone(),
                is_last: i + 1 == count,
            });
        }
    }

    Ok(())
}

/// Convert one feature graph to JSON.
#[must_use]
pub fn graph_to_json(graph: &FeatureGraph) -> Value {
    node_to_json(graph.root(), &mut HashSet::new())
}

/// Convert a forest to a JSON array of root graphs, sharing expansion
/// state between them.
#[must_use]
pub fn forest_to_json(forest: &FeatureForest) -> Value {
    let mut expanded = HashSet::new();
    Value::Array(
        forest
            .roots()
            .map(|root| node_to_json(root, &mut expanded))
            .collect(),
    )
}

fn node_to_json(node: NodeRef<'_>, expanded: &mut HashSet<NodeId>) -> Value {
    let feature = node.feature();
    let mut obj = json!({
        "product": feature.product,
        "group": feature.group,
        "title": feature.title,
        "version": feature.version,
    });

    if !expanded.insert(node.id()) {
        obj["expanded"] = json!(false);
        return obj;
    }

    obj["expanded"] = json!(true);
    let depends_on: Vec<Value> = node
        .depends_on()
        .map(|child| node_to_json(child, expanded))
        .collect();
    let dependants: Vec<Value> = node
        .dependants()
        .map(|child| node_to_json(child, expanded))
        .collect();
    obj["depends_on"] = Value::Array(depends_on);
    obj["dependants"] = Value::Array(dependants);
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Feature, FeatureId, InvocationMap, Scope};
    use crate::graph::{ConflictPolicy, ScopeGraph};

    /// Calling -> Called -> Another, with Unlinked standing alone
    fn sample() -> (Vec<Feature>, InvocationMap) {
        let catalog = vec![
            Feature::new(FeatureId::new("P", "", "Calling", "1"), ["Foo()"]),
            Feature::new(FeatureId::new("P", "", "Called", "1"), ["Bar()"]),
            Feature::new(FeatureId::new("P", "", "Unlinked", "1"), ["Baz()"]),
            Feature::new(FeatureId::new("P", "", "Another", "1"), ["JuiceBar()"]),
        ];
        let mut invocations = InvocationMap::new();
        invocations.insert("Foo()".into(), vec!["Bar()".into()]);
        invocations.insert("Bar()".into(), vec!["JuiceBar()".into()]);
        (catalog, invocations)
    }

    fn render_graph(title: &str, config: &OutputConfig) -> String {
        let (catalog, invocations) = sample();
        let graph = ScopeGraph::new(
            &catalog,
            &Scope::new("P", "1"),
            &invocations,
            ConflictPolicy::FirstWins,
        )
        .unwrap();
        let feature = graph.find_by_title(title).unwrap();
        let result = graph.feature_graph(&feature.id).unwrap();

        let mut buffer = Vec::new();
        write_graph_text(&mut buffer, &result, config).expect("tree rendering should succeed");
        String::from_utf8(buffer).expect("output should be valid UTF-8")
    }

    #[test]
    fn test_graph_text_unicode() {
        let output = render_graph("Called", &OutputConfig::new(false, false));

        assert_eq!(
            output,
            "\
◆ Called [P@1]
├── → Another [P@1]
│   └── ← Called [P@1] (see above)
└── ← Calling [P@1]
    └── → Called [P@1] (see above)
"
        );
    }

    #[test]
    fn test_graph_text_ascii() {
        let output = render_graph("Calling", &OutputConfig::new(true, false));

        assert!(output.starts_with("* Calling [P@1]\n"), "got: {output}");
        assert!(output.contains("`-- -> Called [P@1]"), "got: {output}");
        assert!(output.contains("<- Calling [P@1] (see above)"), "got: {output}");
    }

    #[test]
    fn test_forest_text_shares_expansion() {
        let (catalog, invocations) = sample();
        let graph = ScopeGraph::new(
            &catalog,
            &Scope::new("P", "1"),
            &invocations,
            ConflictPolicy::FirstWins,
        )
        .unwrap();
        let forest = graph.top_level_graphs();

        let mut buffer = Vec::new();
        write_forest_text(&mut buffer, &forest, &OutputConfig::new(true, false)).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let root_lines: Vec<&str> = output.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(root_lines, vec!["* Calling [P@1]", "* Unlinked [P@1]"]);
        assert_eq!(output.matches("(see above)").count(), 2);
    }

    #[test]
    fn test_graph_json_marks_repeated_nodes() {
        let (catalog, invocations) = sample();
        let graph = ScopeGraph::new(
            &catalog,
            &Scope::new("P", "1"),
            &invocations,
            ConflictPolicy::FirstWins,
        )
        .unwrap();
        let feature = graph.find_by_title("Calling").unwrap();
        let result = graph.feature_graph(&feature.id).unwrap();

        let json = graph_to_json(&result);

        assert_eq!(json["title"], "Calling");
        assert_eq!(json["expanded"], true);
        let called = &json["depends_on"][0];
        assert_eq!(called["title"], "Called");
        assert_eq!(called["dependants"][0]["title"], "Calling");
        assert_eq!(called["dependants"][0]["expanded"], false);
        assert!(called["dependants"][0].get("depends_on").is_none());
    }
}
