//! The Event tree: a causal counter lattice indexed by the positions an
//! `IdTree` can own.

use std::cmp;

use crate::cost::Cost;
use crate::error::{ItcError, Status};
use crate::id::IdTree;

/// The integer type backing every Event counter.
///
/// `u32` by default; enable the `counter64` feature for `u64`. 32-bit
/// counters saturate after about 4*10^9 events witnessed by a single node;
/// 64-bit counters after about 1.8*10^19.
#[cfg(not(feature = "counter64"))]
pub type Counter = u32;
#[cfg(feature = "counter64")]
pub type Counter = u64;

/// A node in an Event tree. The counter at a node is the base count for the
/// whole subtree; each child's counter is *additional* on top of that base.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTree {
    Leaf { n: Counter },
    Node {
        n: Counter,
        left: Box<EventTree>,
        right: Box<EventTree>,
    },
}

impl EventTree {
    pub fn zero() -> EventTree {
        EventTree::leaf(0)
    }

    pub fn leaf(n: Counter) -> EventTree {
        EventTree::Leaf { n }
    }

    pub fn node(n: Counter, left: EventTree, right: EventTree) -> EventTree {
        EventTree::Node {
            n,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// The base counter at this node.
    pub fn n(&self) -> Counter {
        match self {
            EventTree::Leaf { n } => *n,
            EventTree::Node { n, .. } => *n,
        }
    }

    /// The largest effective counter anywhere in this tree.
    pub fn max(&self) -> Counter {
        match self {
            EventTree::Leaf { n } => *n,
            EventTree::Node { n, left, right } => {
                n.saturating_add(cmp::max(left.max(), right.max()))
            }
        }
    }

    /// The smallest effective counter anywhere in this tree.
    pub fn min(&self) -> Counter {
        match self {
            EventTree::Leaf { n } => *n,
            EventTree::Node { n, left, right } => {
                n.saturating_add(cmp::min(left.min(), right.min()))
            }
        }
    }

    /// Collapse to the single leaf holding `max(self)`.
    pub fn maximise(&self) -> EventTree {
        EventTree::leaf(self.max())
    }

    /// Add `m` to this node's base counter.
    pub fn lift(&self, m: Counter) -> Status<EventTree> {
        let add = |n: Counter| n.checked_add(m).ok_or(ItcError::EventCounterOverflow);
        match self {
            EventTree::Leaf { n } => Ok(EventTree::leaf(add(*n)?)),
            EventTree::Node { n, left, right } => Ok(EventTree::node(
                add(*n)?,
                left.as_ref().clone(),
                right.as_ref().clone(),
            )),
        }
    }

    /// Like `lift`, but saturates instead of erroring. Used internally by
    /// `leq`, which has no error channel of its own.
    fn lift_saturating(&self, m: Counter) -> EventTree {
        match self {
            EventTree::Leaf { n } => EventTree::leaf(n.saturating_add(m)),
            EventTree::Node { n, left, right } => EventTree::node(
                n.saturating_add(m),
                left.as_ref().clone(),
                right.as_ref().clone(),
            ),
        }
    }

    /// Subtract `m` from this node's base counter. `m` must not exceed the
    /// base (checked, used by `normalise`'s lift-sink-sink rewrite).
    fn sink(&self, m: Counter) -> Status<EventTree> {
        let sub = |n: Counter| n.checked_sub(m).ok_or(ItcError::EventCounterUnderflow);
        match self {
            EventTree::Leaf { n } => Ok(EventTree::leaf(sub(*n)?)),
            EventTree::Node { n, left, right } => Ok(EventTree::node(
                sub(*n)?,
                left.as_ref().clone(),
                right.as_ref().clone(),
            )),
        }
    }

    /// Checks invariants E1-E4: every internal node has at least one child
    /// subtree whose minimum is 0 (E3). Overflow (E4) cannot be observed
    /// directly since `Counter` arithmetic is checked at every mutation
    /// site; `validate` only re-checks the structural shape.
    pub fn validate(&self) -> Status<()> {
        match self {
            EventTree::Leaf { .. } => Ok(()),
            EventTree::Node { left, right, .. } => {
                left.validate()?;
                right.validate()?;
                if left.min() != 0 && right.min() != 0 {
                    return Err(ItcError::CorruptEvent);
                }
                Ok(())
            }
        }
    }

    /// Cheaply inflate along the positions `id` owns. Returns the (possibly
    /// unchanged) tree and whether anything was altered.
    pub fn fill(&self, id: &IdTree) -> Status<(EventTree, bool)> {
        if id.is_zero() {
            return Ok((self.clone(), false));
        }
        if id.is_one() {
            let filled = self.maximise();
            let changed = filled != *self;
            return Ok((filled, changed));
        }
        let EventTree::Node { n, left: e_left, right: e_right } = self else {
            // `self` is a leaf but `id` is a node: there is no substructure
            // left in the Event tree to exploit further.
            return Ok((self.clone(), false));
        };
        let IdTree::Node { left: i_left, right: i_right } = id else {
            unreachable!("id.is_zero()/id.is_one() handled above")
        };

        if i_left.is_one() {
            let (eprime_right, _) = e_right.fill(i_right)?;
            let new_left = EventTree::leaf(cmp::max(e_left.max(), eprime_right.min()));
            let result = EventTree::node(*n, new_left, eprime_right).normalise();
            let changed = result != *self;
            Ok((result, changed))
        } else if i_right.is_one() {
            let (eprime_left, _) = e_left.fill(i_left)?;
            let new_right = EventTree::leaf(cmp::max(e_right.max(), eprime_left.min()));
            let result = EventTree::node(*n, eprime_left, new_right).normalise();
            let changed = result != *self;
            Ok((result, changed))
        } else {
            let (new_left, changed_left) = e_left.fill(i_left)?;
            let (new_right, changed_right) = e_right.fill(i_right)?;
            let result = EventTree::node(*n, new_left, new_right).normalise();
            Ok((result.clone(), changed_left || changed_right || result != *self))
        }
    }

    /// Expensively inflate along the positions `id` owns, adding new
    /// structure. Only meaningful once `fill` has reported no change.
    /// Returns the grown tree and the cost (recursion depth) of the new
    /// structure, used by the caller to pick the cheaper of two options.
    pub fn grow(&self, id: &IdTree) -> Status<(EventTree, Cost)> {
        match self {
            EventTree::Leaf { n } => {
                if id.is_one() {
                    let grown = n.checked_add(1).ok_or(ItcError::EventCounterOverflow)?;
                    Ok((EventTree::leaf(grown), Cost::zero()))
                } else {
                    let widened = EventTree::node(*n, EventTree::zero(), EventTree::zero());
                    let (grown, cost) = widened.grow(id)?;
                    Ok((grown, cost.shift()))
                }
            }
            EventTree::Node { n, left, right } => {
                let IdTree::Node { left: i_left, right: i_right } = id else {
                    unreachable!("an Event node must be paired with an Id node here")
                };

                if i_left.is_zero() {
                    let (eprime_right, c_right) = right.grow(i_right)?;
                    Ok((
                        EventTree::node(*n, left.as_ref().clone(), eprime_right),
                        c_right + 1,
                    ))
                } else if i_right.is_zero() {
                    let (eprime_left, c_left) = left.grow(i_left)?;
                    Ok((
                        EventTree::node(*n, eprime_left, right.as_ref().clone()),
                        c_left + 1,
                    ))
                } else {
                    let (eprime_left, c_left) = left.grow(i_left)?;
                    let (eprime_right, c_right) = right.grow(i_right)?;
                    // On a tie, grow the right side and leave the left alone.
                    if c_left < c_right {
                        Ok((
                            EventTree::node(*n, eprime_left, right.as_ref().clone()),
                            c_left + 1,
                        ))
                    } else {
                        Ok((
                            EventTree::node(*n, left.as_ref().clone(), eprime_right),
                            c_right + 1,
                        ))
                    }
                }
            }
        }
    }
}

/// Rewrite to normal form: in every internal node, at least one child's
/// minimum is sunk to 0.
pub trait Normalise {
    fn normalise(self) -> Self;
}

impl Normalise for EventTree {
    fn normalise(self) -> EventTree {
        match self {
            EventTree::Leaf { .. } => self,
            EventTree::Node { n, left, right } => {
                let left = left.normalise();
                let right = right.normalise();

                if let (EventTree::Leaf { n: m1 }, EventTree::Leaf { n: m2 }) = (&left, &right) {
                    if m1 == m2 {
                        return EventTree::leaf(n.saturating_add(*m1));
                    }
                }

                // Already-normalised subtrees have min == n(), by induction.
                let m = cmp::min(left.n(), right.n());
                let sunk_left = left
                    .sink(m)
                    .expect("m = min(left.n(), right.n()) never exceeds left.n()");
                let sunk_right = right
                    .sink(m)
                    .expect("m = min(left.n(), right.n()) never exceeds right.n()");

                EventTree::node(n.saturating_add(m), sunk_left, sunk_right)
            }
        }
    }
}

/// The lattice join: point-wise maximum.
pub trait Join: Sized {
    fn join(&self, other: &Self) -> Status<Self>;
}

impl Join for EventTree {
    fn join(&self, other: &EventTree) -> Status<EventTree> {
        match (self, other) {
            (EventTree::Leaf { n: n1 }, EventTree::Leaf { n: n2 }) => {
                Ok(EventTree::leaf(cmp::max(*n1, *n2)))
            }
            (EventTree::Leaf { n: n1 }, EventTree::Node { .. }) => {
                let widened = EventTree::node(*n1, EventTree::zero(), EventTree::zero());
                widened.join(other)
            }
            (EventTree::Node { .. }, EventTree::Leaf { n: n2 }) => {
                let widened = EventTree::node(*n2, EventTree::zero(), EventTree::zero());
                self.join(&widened)
            }
            (
                EventTree::Node { n: n1, left: l1, right: r1 },
                EventTree::Node { n: n2, left: l2, right: r2 },
            ) => {
                if n1 > n2 {
                    other.join(self)
                } else {
                    let d = n2 - n1;
                    let new_left = l1.join(&l2.lift(d)?)?;
                    let new_right = r1.join(&r2.lift(d)?)?;
                    Ok(EventTree::node(*n1, new_left, new_right).normalise())
                }
            }
        }
    }
}

/// The partial order on Event trees: `self <= other`.
pub trait Leq {
    fn leq(&self, other: &Self) -> bool;
}

impl Leq for EventTree {
    fn leq(&self, other: &EventTree) -> bool {
        match (self, other) {
            (EventTree::Leaf { n: n1 }, EventTree::Leaf { n: n2 }) => n1 <= n2,
            (EventTree::Leaf { n: n1 }, EventTree::Node { n: n2, .. }) => n1 <= n2,
            (EventTree::Node { n: n1, left, right }, EventTree::Leaf { n: n2 }) => {
                n1 <= n2
                    && left.lift_saturating(*n1).leq(&EventTree::leaf(*n2))
                    && right.lift_saturating(*n1).leq(&EventTree::leaf(*n2))
            }
            (
                EventTree::Node { n: n1, left: l1, right: r1 },
                EventTree::Node { n: n2, left: l2, right: r2 },
            ) => {
                n1 <= n2
                    && l1.lift_saturating(*n1).leq(&l2.lift_saturating(*n2))
                    && r1.lift_saturating(*n1).leq(&r2.lift_saturating(*n2))
            }
        }
    }
}
