//! Property tests for the location ordering
//!
//! The whole engine leans on locations forming a strict total order, so the
//! ordering axioms get checked wholesale over a small dense space (small
//! bounds make collisions, and therefore the equality cases, common).

use std::cmp::Ordering;

use canto_outline::Location;
use proptest::prelude::*;

fn location() -> impl Strategy<Value = Location> {
    (0..4i32, 0..4i32, -1..5i32, proptest::option::of(0..5i32)).prop_map(
        |(work, chapter, verse, up_to)| {
            let location = Location::new(work, chapter, verse);
            match up_to {
                Some(up_to) => location.up_to(up_to),
                None => location,
            }
        },
    )
}

proptest! {
    #[test]
    fn antisymmetric(a in location(), b in location()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn transitive(a in location(), b in location(), c in location()) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn trichotomous(a in location(), b in location()) {
        let relations = [a < b, a == b, a > b];
        prop_assert_eq!(relations.iter().filter(|&&r| r).count(), 1);
    }

    #[test]
    fn equality_agrees_with_ordering(a in location(), b in location()) {
        prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
    }

    #[test]
    fn range_end_never_participates(a in location(), up_to in 0..5i32) {
        prop_assert_eq!(a, a.up_to(up_to));
        prop_assert_eq!(a.cmp(&a.up_to(up_to)), Ordering::Equal);
    }
}
