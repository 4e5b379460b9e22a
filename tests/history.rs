mod common;

use common::{DIAMOND_TREE, calculator, selected_ids, tree};
use talent_calc::Calculator;
use talent_calc::config::CalcConfig;

#[test]
fn test_undo_redo_restore_selection() {
    let mut calc = calculator(DIAMOND_TREE);
    assert!(!calc.can_undo());

    calc.toggle(1);
    calc.toggle(5);
    assert_eq!(calc.history_len(), 3);

    assert!(calc.undo());
    assert_eq!(selected_ids(calc.selection()), vec![1]);
    assert!(calc.undo());
    assert!(calc.selection().is_empty());
    assert!(!calc.undo());

    assert!(calc.redo());
    assert!(calc.redo());
    assert_eq!(selected_ids(calc.selection()), vec![1, 5]);
    assert!(!calc.redo());
}

#[test]
fn test_new_mutation_drops_redo_branch() {
    let mut calc = calculator(DIAMOND_TREE);
    calc.toggle(1);
    calc.toggle(2);
    calc.undo();
    assert!(calc.can_redo());

    calc.toggle(5);
    assert!(!calc.can_redo());
    assert_eq!(selected_ids(calc.selection()), vec![1, 5]);
}

#[test]
fn test_rejected_and_ignored_mutations_are_not_recorded() {
    let mut calc = calculator(DIAMOND_TREE);
    calc.toggle(999);
    calc.decrement(1);
    assert_eq!(calc.history_len(), 1);
}

#[test]
fn test_drag_is_one_history_entry() {
    let mut calc = calculator(DIAMOND_TREE);
    calc.toggle(1);
    calc.start_paint(1);
    calc.paint_enter(2);
    calc.paint_enter(4);
    assert_eq!(calc.history_len(), 2);
    calc.stop_paint();
    assert_eq!(calc.history_len(), 3);

    calc.undo();
    assert_eq!(selected_ids(calc.selection()), vec![1]);
    calc.redo();
    assert_eq!(selected_ids(calc.selection()), vec![1, 2, 3, 4]);
}

#[test]
fn test_undo_during_drag_commits_it_first() {
    let mut calc = calculator(DIAMOND_TREE);
    calc.toggle(1);
    calc.start_paint(1);
    calc.paint_enter(2);

    assert!(calc.undo());
    assert!(!calc.engine().is_painting());
    assert_eq!(selected_ids(calc.selection()), vec![1]);
}

#[test]
fn test_history_depth_is_bounded() {
    let mut config = CalcConfig::default();
    config.history_depth = 3;
    let mut calc = Calculator::new(tree(DIAMOND_TREE), &config);
    for _ in 0..5 {
        calc.toggle(5);
    }
    assert_eq!(calc.history_len(), 3);

    assert!(calc.undo());
    assert!(calc.undo());
    assert!(!calc.undo());
}

#[test]
fn test_reset_during_drag_keeps_drag_as_its_own_step() {
    let mut calc = calculator(DIAMOND_TREE);
    calc.toggle(1);
    calc.start_paint(1);
    calc.paint_enter(2);
    calc.reset();
    assert!(calc.selection().is_empty());
    assert!(!calc.engine().is_painting());

    calc.undo();
    assert_eq!(selected_ids(calc.selection()), vec![1, 2]);
    calc.undo();
    assert_eq!(selected_ids(calc.selection()), vec![1]);
}

#[test]
fn test_reset_is_undoable() {
    let mut calc = calculator(DIAMOND_TREE);
    calc.toggle(4);
    calc.reset();
    assert!(calc.selection().is_empty());
    calc.undo();
    assert_eq!(selected_ids(calc.selection()), vec![1, 2, 3, 4]);
}
