use fluent_dom::{memory_builder, BuildError, Target};
use proptest::prelude::*;

fn tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["div", "span", "p", "li", "ul", "em"]).prop_map(|t| t.to_string())
}

proptest! {
    // One receiver-less append pops exactly one element and parents it to
    // whatever the target resolves to after the pop.
    #[test]
    fn test_append_spawned_pops_one(tags in prop::collection::vec(tag(), 1..8), spawned_mode in any::<bool>()) {
        let (mut b, root) = memory_builder("body").unwrap();
        for t in &tags {
            b.spawn(t).unwrap();
        }
        if spawned_mode {
            b.to_spawned();
        }
        let child = *b.last_spawned().unwrap();
        let before = b.spawned_len();

        let result = b.append_spawned().map(|_| ());

        if spawned_mode && tags.len() == 1 {
            let unresolved = matches!(result, Err(BuildError::Unresolved { target: Target::Spawned }));
            prop_assert!(unresolved, "expected an unresolved spawned receiver, got {:?}", result);
            prop_assert_eq!(b.spawned_len(), before);
            prop_assert_eq!(b.dom().parent(child), None);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(b.spawned_len(), before - 1);
            let expected = if spawned_mode { *b.last_spawned().unwrap() } else { root };
            prop_assert_eq!(b.dom().parent(child), Some(expected));
        }
    }

    // Folding the whole stack in spawned mode nests every tag inside the first
    // one, in spawn order.
    #[test]
    fn test_folding_the_stack_nests_in_order(tags in prop::collection::vec(tag(), 2..6)) {
        let (mut b, root) = memory_builder("body").unwrap();
        for t in &tags {
            b.spawn(t).unwrap();
        }
        b.to_spawned();
        for _ in 1..tags.len() {
            b.append_spawned().unwrap();
        }
        b.to_main().append_spawned().unwrap();

        let open: String = tags.iter().map(|t| format!("<{t}>")).collect();
        let close: String = tags.iter().rev().map(|t| format!("</{t}>")).collect();
        prop_assert_eq!(b.dom().inner_html(root), format!("{open}{close}"));
        prop_assert_eq!(b.spawned_len(), 0);
    }
}
