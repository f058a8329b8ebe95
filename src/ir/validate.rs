use crate::ir::{Attribute, Graph, IrError};
use std::collections::HashSet;

impl Graph {
    /// Checks that every referenced value is defined before use and that no
    /// value is defined twice. Sub-graphs see every value visible to the node
    /// that owns them and may not redefine any of those values.
    pub fn validate(&self) -> Result<(), IrError> {
        check_graph(self, &HashSet::new())
    }
}

fn check_graph(graph: &Graph, outer: &HashSet<String>) -> Result<(), IrError> {
    let duplicate = |name: &str| IrError::DuplicateName {
        graph: graph.name.clone(),
        name: name.to_string(),
    };

    let mut declared = HashSet::new();
    for output in &graph.outputs {
        if !declared.insert(output.name.as_str()) {
            return Err(duplicate(&output.name));
        }
    }

    let mut visible = outer.clone();
    let mut local: HashSet<String> = HashSet::new();
    for input in &graph.inputs {
        if !local.insert(input.name.clone()) {
            return Err(duplicate(&input.name));
        }
        visible.insert(input.name.clone());
    }
    // An initializer may back a graph input of the same name.
    let mut initialized = HashSet::new();
    for init in &graph.initializers {
        if !initialized.insert(init.name.as_str()) {
            return Err(duplicate(&init.name));
        }
        visible.insert(init.name.clone());
        local.insert(init.name.clone());
    }

    for node in &graph.nodes {
        for input in &node.inputs {
            if !input.is_empty() && !visible.contains(input) {
                return Err(IrError::UndefinedReference {
                    graph: graph.name.clone(),
                    op_type: node.op_type.clone(),
                    name: input.clone(),
                });
            }
        }

        for attr in node.attributes.values() {
            if let Attribute::Graph(body) = attr {
                check_graph(body, &visible)?;
            }
        }

        for output in &node.outputs {
            if output.is_empty() {
                continue;
            }
            if outer.contains(output) || !local.insert(output.clone()) {
                return Err(duplicate(output));
            }
            visible.insert(output.clone());
        }
    }

    for output in &graph.outputs {
        if !visible.contains(&output.name) {
            return Err(IrError::UndefinedReference {
                graph: graph.name.clone(),
                op_type: "output".to_string(),
                name: output.name.clone(),
            });
        }
    }

    Ok(())
}
