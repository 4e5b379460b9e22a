use talent_calc::config::CalcConfig;
use talent_calc::engine::NodeState;
use talent_calc::tree::NodeType;
use talent_calc::{Calculator, TalentTree};

pub fn run(
    tree: TalentTree,
    config: &CalcConfig,
    loadout: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut calc = Calculator::new(tree, config);
    if let Some(loadout) = loadout {
        calc.import_loadout(loadout)?;
    }
    let engine = calc.engine();
    let tree = calc.tree();

    println!(
        "Tree {} (spec {} {} {})",
        tree.tree_id, tree.spec_id, tree.spec_name, tree.class_name
    );
    println!("  {}", calc.summary());
    for sub_tree in tree.sub_trees() {
        let marker = if engine.active_sub_tree() == Some(sub_tree.id) { "*" } else { " " };
        println!("  {marker} sub-tree {} {}", sub_tree.id, sub_tree.name);
    }

    let hidden = tree.all_nodes().filter(|n| !tree.is_visible(n.id)).count();
    println!("\n{} visible nodes ({} hidden)", tree.visible_nodes().count(), hidden);

    for node in tree.visible_nodes() {
        let name = node
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");
        let parents = tree.edge_index().parents(node.id);
        let requires = if parents.is_empty() {
            String::new()
        } else {
            let ids: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
            format!("  <- {}", ids.join(","))
        };
        println!(
            "  {:>6} {:<5} {:<8} {}/{} {:<8} {}{}",
            node.id,
            node.kind,
            type_label(node.node_type),
            calc.selection().ranks(node.id),
            node.max_ranks,
            engine.node_state(node.id).map(state_label).unwrap_or("-"),
            name,
            requires
        );
    }
    Ok(())
}

fn type_label(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Single => "single",
        NodeType::Tiered => "tiered",
        NodeType::Choice => "choice",
        NodeType::SubTreeSelection => "subtree",
    }
}

fn state_label(state: NodeState) -> &'static str {
    match state {
        NodeState::Locked => "locked",
        NodeState::Unlocked => "unlocked",
        NodeState::Active => "active",
        NodeState::Maxed => "maxed",
    }
}
