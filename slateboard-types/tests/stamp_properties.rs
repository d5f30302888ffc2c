//! Property-based tests for the stamp total order.
//!
//! For all stamps a, b with differing times the comparison must agree
//! with time order; with equal times it must agree with origin order.
//! Together with antisymmetry this gives a strict total order over all
//! stamps ever created.

use proptest::prelude::*;
use slateboard_types::{OriginId, Stamp, Timestamp};
use std::cmp::Ordering;

fn origin_strategy() -> impl Strategy<Value = OriginId> {
    prop::string::string_regex("[a-z]{1,8}")
        .unwrap()
        .prop_map(OriginId::new)
}

fn stamp_strategy() -> impl Strategy<Value = Stamp> {
    (origin_strategy(), 0u64..1_000_000)
        .prop_map(|(origin, t)| Stamp::new(origin, Timestamp::from_millis(t)))
}

proptest! {
    #[test]
    fn time_order_dominates(a in stamp_strategy(), b in stamp_strategy()) {
        if a.time != b.time {
            prop_assert_eq!(a.cmp(&b), a.time.cmp(&b.time));
        }
    }

    #[test]
    fn origin_breaks_ties(origin_a in origin_strategy(), origin_b in origin_strategy(), t in 0u64..1_000_000) {
        let a = Stamp::new(origin_a.clone(), Timestamp::from_millis(t));
        let b = Stamp::new(origin_b.clone(), Timestamp::from_millis(t));
        prop_assert_eq!(a.cmp(&b), origin_a.cmp(&origin_b));
    }

    #[test]
    fn comparison_is_antisymmetric(a in stamp_strategy(), b in stamp_strategy()) {
        match a.cmp(&b) {
            Ordering::Less => prop_assert_eq!(b.cmp(&a), Ordering::Greater),
            Ordering::Greater => prop_assert_eq!(b.cmp(&a), Ordering::Less),
            Ordering::Equal => prop_assert_eq!(&a, &b),
        }
    }

    #[test]
    fn distinct_stamps_have_distinct_identity_hashes(a in stamp_strategy(), b in stamp_strategy()) {
        // 64-bit collisions are possible in principle; over this input
        // space they would indicate a mixing bug.
        if a != b {
            prop_assert_ne!(a.identity_hash(), b.identity_hash());
        }
    }
}
