//! Property tests for lamp bookkeeping.

use super::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_names() -> impl Strategy<Value = Vec<String>> {
    // Small alphabet so duplicates are common.
    proptest::collection::vec("[a-c]{1,2}", 0..30)
}

proptest! {
    #[test]
    fn prop_snapshot_counts_distinct_names(names in arb_names()) {
        let mut home = HomeState::empty();
        for name in &names {
            home.add_lamp(name);
        }

        let distinct: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(home.snapshot().len(), distinct.len());
    }

    #[test]
    fn prop_add_reports_first_occurrence_only(names in arb_names()) {
        let mut home = HomeState::new();
        let mut seen: HashSet<String> = HashSet::from([DEFAULT_LAMP.to_string()]);

        for name in &names {
            prop_assert_eq!(home.add_lamp(name), seen.insert(name.clone()));
        }
        prop_assert_eq!(home.snapshot().len(), seen.len());
    }

    #[test]
    fn prop_set_lamp_changes_one_field(
        names in arb_names(),
        target in "[a-c]{1,2}",
        on in any::<bool>(),
    ) {
        let mut home = HomeState::new();
        for name in &names {
            home.add_lamp(name);
        }
        let before = home.snapshot();

        match home.set_lamp(&target, on) {
            Ok(()) => {
                let after = home.snapshot();
                prop_assert_eq!(after.len(), before.len());
                for (old, new) in before.iter().zip(&after) {
                    prop_assert_eq!(&old.name, &new.name);
                    if old.name == target {
                        prop_assert_eq!(new.on, on);
                    } else {
                        prop_assert_eq!(new.on, old.on);
                    }
                }
            }
            Err(err) => {
                prop_assert_eq!(err, ToolError::StateNotFound(target.clone()));
                prop_assert_eq!(home.snapshot(), before);
            }
        }
    }
}
