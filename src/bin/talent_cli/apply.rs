use talent_calc::config::CalcConfig;
use talent_calc::{loadout, Calculator, MutationOutcome, TalentTree};

pub fn apply(
    tree: TalentTree,
    config: &CalcConfig,
    start: Option<&str>,
    toggles: &[u32],
    decrements: &[u32],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut calc = Calculator::new(tree, config);
    if let Some(start) = start {
        calc.import_loadout(start)?;
    }

    for &node_id in toggles {
        report("toggle", node_id, calc.toggle(node_id));
    }
    for &node_id in decrements {
        report("decrement", node_id, calc.decrement(node_id));
    }

    println!("{}", calc.summary());
    println!("{}", calc.export_loadout());
    Ok(())
}

pub fn decode(tree: TalentTree, input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let selection = loadout::decode(input, &tree)?;
    println!("{} selected nodes for tree {}", selection.len(), tree.tree_id);
    for (id, s) in selection.iter() {
        let node = tree.node(id);
        let entry = match (node, s.choice_index) {
            (Some(node), Some(choice)) => node.entries.get(usize::from(choice)),
            (Some(node), None) => node.entries.first(),
            _ => None,
        };
        let name = entry.map(|e| e.name.as_str()).unwrap_or("");
        let max = node.map(|n| n.max_ranks).unwrap_or(0);
        println!("  {:>6} {}/{} {}", id, s.ranks_purchased, max, name);
    }
    let spent = selection.spent();
    let limits = tree.point_limits();
    println!(
        "class {}/{}  spec {}/{}  hero {}/{}",
        spent.class, limits.class, spent.spec, limits.spec, spent.hero, limits.hero
    );
    Ok(())
}

fn report(action: &str, node_id: u32, outcome: MutationOutcome) {
    match outcome {
        MutationOutcome::Applied => {}
        MutationOutcome::Ignored => eprintln!("{action} {node_id}: nothing to do"),
        MutationOutcome::Rejected(reason) => eprintln!("{action} {node_id}: rejected ({reason:?})"),
    }
}
