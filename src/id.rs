//! The ID tree: a recursive partition of the half-open unit interval
//! `[0,1)` used to track which process owns which slice of identity space.

use crate::error::{ItcError, Status};

/// A node in an ID tree.
///
/// A leaf owns either its whole interval (`owner: true`, the "seed" case)
/// or none of it (`owner: false`, "null"). An internal node splits its
/// interval in half between `left` and `right` and never owns anything
/// itself (invariant I3).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdTree {
    Leaf { owner: bool },
    Node { left: Box<IdTree>, right: Box<IdTree> },
}

impl IdTree {
    /// The null leaf: owns nothing.
    pub fn zero() -> IdTree {
        IdTree::Leaf { owner: false }
    }

    /// The seed leaf: owns the entire interval.
    pub fn one() -> IdTree {
        IdTree::Leaf { owner: true }
    }

    pub fn node(left: IdTree, right: IdTree) -> IdTree {
        IdTree::Node {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, IdTree::Leaf { owner: false })
    }

    pub fn is_one(&self) -> bool {
        matches!(self, IdTree::Leaf { owner: true })
    }

    /// Checks invariants I1-I4: leaves have no children (trivial in this
    /// representation), internal nodes are non-owning (also trivial - the
    /// type has no owner field on `Node`), and no internal node has two
    /// identical leaf children (those must already be collapsed, I4).
    pub fn validate(&self) -> Status<()> {
        match self {
            IdTree::Leaf { .. } => Ok(()),
            IdTree::Node { left, right } => {
                left.validate()?;
                right.validate()?;
                if let (IdTree::Leaf { owner: o1 }, IdTree::Leaf { owner: o2 }) =
                    (left.as_ref(), right.as_ref())
                {
                    if o1 == o2 {
                        return Err(ItcError::CorruptId);
                    }
                }
                Ok(())
            }
        }
    }
}

/// Rewrite to normal form: collapse `(0,0)` to `0` and `(1,1)` to `1`.
pub trait Normalise {
    fn normalise(self) -> Self;
}

impl Normalise for IdTree {
    fn normalise(self) -> IdTree {
        match self {
            IdTree::Leaf { .. } => self,
            IdTree::Node { left, right } => {
                let left = left.normalise();
                let right = right.normalise();

                if let (IdTree::Leaf { owner: o1 }, IdTree::Leaf { owner: o2 }) = (&left, &right) {
                    if o1 == o2 {
                        return IdTree::Leaf { owner: *o1 };
                    }
                }

                IdTree::node(left, right)
            }
        }
    }
}

/// Split an ID into two halves owning disjoint, union-complete intervals.
pub trait Split {
    fn split(&self) -> (IdTree, IdTree);
}

impl Split for IdTree {
    fn split(&self) -> (IdTree, IdTree) {
        match self {
            IdTree::Leaf { owner: false } => (IdTree::zero(), IdTree::zero()),
            IdTree::Leaf { owner: true } => (
                IdTree::node(IdTree::one(), IdTree::zero()),
                IdTree::node(IdTree::zero(), IdTree::one()),
            ),
            IdTree::Node { left, right } if left.is_zero() => {
                let (i1, i2) = right.split();
                (
                    IdTree::node(IdTree::zero(), i1),
                    IdTree::node(IdTree::zero(), i2),
                )
            }
            IdTree::Node { left, right } if right.is_zero() => {
                let (i1, i2) = left.split();
                (
                    IdTree::node(i1, IdTree::zero()),
                    IdTree::node(i2, IdTree::zero()),
                )
            }
            IdTree::Node { left, right } => (
                IdTree::node(left.as_ref().clone(), IdTree::zero()),
                IdTree::node(IdTree::zero(), right.as_ref().clone()),
            ),
        }
    }
}

/// Merge two IDs that own disjoint intervals back into one.
pub trait Sum: Sized {
    fn sum(&self, other: &Self) -> Status<Self>;
}

impl Sum for IdTree {
    fn sum(&self, other: &IdTree) -> Status<IdTree> {
        if self.is_zero() {
            return Ok(other.clone());
        }
        if other.is_zero() {
            return Ok(self.clone());
        }
        if self.is_one() || other.is_one() {
            // Neither side is zero, and one side owns the whole interval:
            // the two inevitably overlap.
            return Err(ItcError::OverlappingIdInterval);
        }

        match (self, other) {
            (
                IdTree::Node { left: l1, right: r1 },
                IdTree::Node { left: l2, right: r2 },
            ) => {
                let left = l1.sum(l2)?;
                let right = r1.sum(r2)?;
                Ok(IdTree::node(left, right).normalise())
            }
            _ => unreachable!("both zero/one cases are handled above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_one_is_one() {
        assert_eq!(IdTree::one().normalise(), IdTree::one());
    }

    #[test]
    fn norm_zero_is_zero() {
        assert_eq!(IdTree::zero().normalise(), IdTree::zero());
    }

    #[test]
    fn norm_0_0_is_0() {
        let idt = IdTree::node(IdTree::zero(), IdTree::zero());
        assert_eq!(idt.normalise(), IdTree::zero());
    }

    #[test]
    fn norm_1_1_is_1() {
        let idt = IdTree::node(IdTree::one(), IdTree::one());
        assert_eq!(idt.normalise(), IdTree::one());
    }

    #[test]
    fn norm_1_0_is_unchanged() {
        let idt = IdTree::node(IdTree::one(), IdTree::zero());
        assert_eq!(idt.clone().normalise(), idt);
    }

    #[test]
    fn norm_nested_1_1_1_is_1() {
        let idt = IdTree::node(IdTree::one(), IdTree::node(IdTree::one(), IdTree::one()));
        assert_eq!(idt.normalise(), IdTree::one());
    }

    #[test]
    fn split_one() {
        assert_eq!(
            IdTree::one().split(),
            (
                IdTree::node(IdTree::one(), IdTree::zero()),
                IdTree::node(IdTree::zero(), IdTree::one()),
            )
        );
    }

    #[test]
    fn split_zero() {
        assert_eq!(IdTree::zero().split(), (IdTree::zero(), IdTree::zero()));
    }

    /// Splitting an already-split ID recurses into the owning side only.
    #[test]
    fn split_0_1() {
        let idt = IdTree::node(IdTree::zero(), IdTree::one());
        assert_eq!(
            idt.split(),
            (
                IdTree::node(IdTree::zero(), IdTree::node(IdTree::one(), IdTree::zero())),
                IdTree::node(IdTree::zero(), IdTree::node(IdTree::zero(), IdTree::one())),
            )
        );
    }

    #[test]
    fn split_disjointness_round_trips_via_sum() {
        let idt = IdTree::node(IdTree::one(), IdTree::zero());
        let (i1, i2) = idt.split();
        let summed = i1.sum(&i2).expect("split halves are always disjoint");
        assert_eq!(summed, idt);
    }

    #[test]
    fn sum_of_two_seeds_overlaps() {
        assert_eq!(
            IdTree::one().sum(&IdTree::one()),
            Err(ItcError::OverlappingIdInterval)
        );
    }

    #[test]
    fn sum_zero_is_identity() {
        let idt = IdTree::node(IdTree::one(), IdTree::zero());
        assert_eq!(idt.sum(&IdTree::zero()).unwrap(), idt);
        assert_eq!(IdTree::zero().sum(&idt).unwrap(), idt);
    }

    #[test]
    fn validate_rejects_uncollapsed_pairs() {
        let bad = IdTree::Node {
            left: Box::new(IdTree::zero()),
            right: Box::new(IdTree::zero()),
        };
        assert_eq!(bad.validate(), Err(ItcError::CorruptId));
    }

    #[test]
    fn validate_accepts_normal_form() {
        let ok = IdTree::node(IdTree::one(), IdTree::zero());
        assert_eq!(ok.validate(), Ok(()));
    }
}
