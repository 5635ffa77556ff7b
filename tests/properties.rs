//! Property-based tests for the algebraic laws the ID/Event trees and
//! Stamp verbs must hold regardless of input shape.

use itc::{
    Comparison, Counter, EventNormalise, EventTree, IdNormalise, IdTree, Join, Leq, Split, Stamp,
    Sum,
};
use proptest::prelude::*;

fn arb_id() -> impl Strategy<Output = IdTree> {
    let leaf = prop_oneof![Just(IdTree::zero()), Just(IdTree::one())];
    leaf.prop_recursive(6, 64, 2, |inner| {
        (inner.clone(), inner).prop_map(|(l, r)| IdTree::node(l, r).normalise())
    })
}

fn arb_event() -> impl Strategy<Output = EventTree> {
    let leaf = (0u32..20).prop_map(|n| EventTree::leaf(n as Counter));
    leaf.prop_recursive(6, 64, 2, |inner| {
        (0u32..20, inner.clone(), inner)
            .prop_map(|(n, l, r)| EventTree::node(n as Counter, l, r).normalise())
    })
}

/// Fork a seed Stamp into `2^depth` Stamps that partition its ID interval.
fn fork_n(s: Stamp, depth: u32) -> Vec<Stamp> {
    if depth == 0 {
        return vec![s];
    }
    let (left, right) = s.fork();
    let mut leaves = fork_n(left, depth - 1);
    leaves.extend(fork_n(right, depth - 1));
    leaves
}

proptest! {
    /// `normalise` on an ID tree is idempotent.
    #[test]
    fn id_normalise_is_idempotent(id in arb_id()) {
        prop_assert_eq!(id.clone().normalise(), id);
    }

    /// Invariant 2: Event trees are already in normal form after
    /// `normalise`, so normalising again changes nothing.
    #[test]
    fn event_normalise_is_idempotent(ev in arb_event()) {
        prop_assert_eq!(ev.clone().normalise(), ev);
    }

    /// Invariant 3: splitting an ID then summing the two halves
    /// reconstructs the original (split halves are always disjoint).
    #[test]
    fn split_then_sum_round_trips(id in arb_id()) {
        let (left, right) = id.split();
        let summed = left.sum(&right).expect("split halves are always disjoint");
        prop_assert_eq!(summed, id);
    }

    /// Invariant 4: `join` is commutative.
    #[test]
    fn event_join_is_commutative(a in arb_event(), b in arb_event()) {
        prop_assert_eq!(a.join(&b).unwrap(), b.join(&a).unwrap());
    }

    /// Invariant 5: `join` is idempotent.
    #[test]
    fn event_join_is_idempotent(a in arb_event()) {
        prop_assert_eq!(a.join(&a).unwrap(), a);
    }

    /// Invariant 6: `join` is associative.
    #[test]
    fn event_join_is_associative(a in arb_event(), b in arb_event(), c in arb_event()) {
        let ab_c = a.join(&b).unwrap().join(&c).unwrap();
        let a_bc = a.join(&b.join(&c).unwrap()).unwrap();
        prop_assert_eq!(ab_c, a_bc);
    }

    /// Invariant 7: every Event is `leq` its join with any other Event.
    #[test]
    fn event_leq_join_upper_bound(a in arb_event(), b in arb_event()) {
        let joined = a.join(&b).unwrap();
        prop_assert!(a.leq(&joined));
        prop_assert!(b.leq(&joined));
    }

    /// Invariant 8: `leq` is reflexive.
    #[test]
    fn event_leq_is_reflexive(a in arb_event()) {
        prop_assert!(a.leq(&a));
    }

    /// `event_advance` never decreases causal history: the advanced
    /// Stamp's Event is always `>=` the original's.
    #[test]
    fn event_advance_is_monotonic(depth in 0u32..3) {
        for s in fork_n(Stamp::new_seed(), depth) {
            let advanced = s.event_advance().unwrap();
            prop_assert!(s.compare(&advanced) != Comparison::GreaterThan);
        }
    }

    /// Stamps forked from a common ancestor and advanced independently
    /// compare as concurrent in both directions.
    #[test]
    fn independent_advances_are_concurrent(depth in 1u32..3) {
        let leaves = fork_n(Stamp::new_seed(), depth);
        let advanced: Vec<Stamp> = leaves.into_iter().map(|s| s.event_advance().unwrap()).collect();
        for i in 0..advanced.len() {
            for j in 0..advanced.len() {
                if i != j {
                    prop_assert_eq!(advanced[i].compare(&advanced[j]), Comparison::Concurrent);
                }
            }
        }
    }

    /// `new_peek` keeps the Event, erases ownership, and is a causal
    /// no-op (compares equal to its source).
    #[test]
    fn peek_preserves_event_and_compares_equal(depth in 0u32..3) {
        for s in fork_n(Stamp::new_seed(), depth) {
            let advanced = s.event_advance().unwrap();
            let peek = advanced.new_peek();
            prop_assert_eq!(advanced.compare(&peek), Comparison::Equal);
        }
    }

    /// Wire round-trips are lossless for both trees independently of
    /// shape.
    #[test]
    fn wire_round_trips_for_arbitrary_trees(id in arb_id(), ev in arb_event()) {
        let mut id_buf = vec![0u8; 256];
        let id_len = itc::wire::serialise_id(&id, &mut id_buf).unwrap();
        let (id_decoded, id_consumed) = itc::wire::deserialise_id(&id_buf[..id_len]).unwrap();
        prop_assert_eq!(id_consumed, id_len);
        prop_assert_eq!(id_decoded, id);

        let mut ev_buf = vec![0u8; 256];
        let ev_len = itc::wire::serialise_event(&ev, &mut ev_buf).unwrap();
        let (ev_decoded, ev_consumed) = itc::wire::deserialise_event(&ev_buf[..ev_len]).unwrap();
        prop_assert_eq!(ev_consumed, ev_len);
        prop_assert_eq!(ev_decoded, ev);
    }
}

/// A two-party send/receive exchange converges: after `a` sends to `b` and
/// `b` receives, `b`'s Stamp causally dominates the pre-send `a`.
#[test]
fn send_receive_converges() {
    let (a, b) = Stamp::new_seed().fork();
    let (a_after_send, token) = a.send().unwrap();
    let b_after_receive = b.receive(&token).unwrap();
    assert_ne!(a_after_send.compare(&b_after_receive), Comparison::GreaterThan);
}
