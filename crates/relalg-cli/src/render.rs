//! Renders a translated [`RaNode`] tree either as serialized JSON or as
//! an indented, S-expression-like tree for terminal reading.

use relalg_core::{RaKind, RaNode};

pub fn render_json(node: &RaNode) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(node)?)
}

pub fn render_tree(node: &RaNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_node(out: &mut String, node: &RaNode, depth: usize) {
    indent(out, depth);
    match &node.kind {
        RaKind::Relation { relation } => {
            out.push_str(&format!("Relation({})\n", relation.name));
        }
        RaKind::Projection { child, columns } => {
            let cols = columns
                .iter()
                .map(|c| c.display_name())
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("Projection[{cols}]\n"));
            write_node(out, child, depth + 1);
        }
        RaKind::Selection { child, predicate } => {
            out.push_str(&format!("Selection[{}]\n", predicate.display_name()));
            write_node(out, child, depth + 1);
        }
        RaKind::RenameRelation { child, new_alias } => {
            out.push_str(&format!("RenameRelation[{new_alias}]\n"));
            write_node(out, child, depth + 1);
        }
        RaKind::RenameColumns { child, mapping } => {
            out.push_str(&format!("RenameColumns[{mapping:?}]\n"));
            write_node(out, child, depth + 1);
        }
        RaKind::OrderBy { child, columns, .. } => {
            out.push_str(&format!("OrderBy[{}]\n", columns.join(", ")));
            write_node(out, child, depth + 1);
        }
        RaKind::GroupBy {
            child,
            group_columns,
            ..
        } => {
            out.push_str(&format!("GroupBy[{}]\n", group_columns.join(", ")));
            write_node(out, child, depth + 1);
        }
        RaKind::CrossJoin { left, right } => {
            out.push_str("CrossJoin\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::InnerJoin { left, right, .. } => {
            out.push_str("InnerJoin\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::LeftOuterJoin { left, right, .. } => {
            out.push_str("LeftOuterJoin\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::RightOuterJoin { left, right, .. } => {
            out.push_str("RightOuterJoin\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::FullOuterJoin { left, right, .. } => {
            out.push_str("FullOuterJoin\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::SemiJoin { left, right, .. } => {
            out.push_str("SemiJoin\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::AntiJoin { left, right, .. } => {
            out.push_str("AntiJoin\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::Union { left, right } => {
            out.push_str("Union\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::Intersect { left, right } => {
            out.push_str("Intersect\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::Difference { left, right } => {
            out.push_str("Difference\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        RaKind::Division { left, right } => {
            out.push_str("Division\n");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relalg_core::{Catalog, Column, DataType, InMemoryCatalog, Relation};

    #[test]
    fn renders_a_relation_leaf() {
        let catalog =
            InMemoryCatalog::new().with_relation(Relation::new("r", vec![Column::new("a", DataType::Number)]));
        let relation = catalog.lookup("r").unwrap();
        let node = RaNode::new(RaKind::Relation { relation });
        assert_eq!(render_tree(&node), "Relation(r)\n");
    }
}
