//! A Stamp pairs one ID with one Event: the user-facing causality object.

use tracing::instrument;

use crate::error::{ItcError, Status};
use crate::event::{EventTree, Join, Leq};
use crate::id::{IdTree, Normalise as IdNormalise, Split, Sum};

/// The result of comparing two Stamps' causal history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    GreaterThan,
    Equal,
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    id: IdTree,
    event: EventTree,
}

impl Stamp {
    /// The initial Stamp: owns the whole interval, no events witnessed yet.
    pub fn new_seed() -> Stamp {
        Stamp {
            id: IdTree::one(),
            event: EventTree::zero(),
        }
    }

    pub(crate) fn from_parts(id: IdTree, event: EventTree) -> Status<Stamp> {
        id.validate()?;
        event.validate()?;
        Ok(Stamp { id, event })
    }

    pub(crate) fn id_ref(&self) -> &IdTree {
        &self.id
    }

    pub(crate) fn event_ref(&self) -> &EventTree {
        &self.event
    }

    /// Build a Stamp from an existing ID and Event tree.
    ///
    /// Gated behind `extended`: exploding/rebuilding a Stamp from its raw
    /// components is introspection outside the core four-verb API.
    #[cfg(feature = "extended")]
    pub fn new(id: IdTree, event: EventTree) -> Status<Stamp> {
        Self::from_parts(id, event)
    }

    /// The ID component. See [`Stamp::new`] for why this is `extended`-gated.
    #[cfg(feature = "extended")]
    pub fn id(&self) -> &IdTree {
        &self.id
    }

    /// The Event component. See [`Stamp::new`] for why this is
    /// `extended`-gated.
    #[cfg(feature = "extended")]
    pub fn event(&self) -> &EventTree {
        &self.event
    }

    /// Clone this Stamp, keeping its causal history but giving up the
    /// ability to create new events (null ID).
    pub fn new_peek(&self) -> Stamp {
        Stamp {
            id: IdTree::zero(),
            event: self.event.clone(),
        }
    }

    /// Split the ID in two, giving both halves a clone of the current
    /// Event history.
    #[instrument(level = "debug", skip(self))]
    pub fn fork(&self) -> (Stamp, Stamp) {
        let (left, right) = self.id.split();
        (
            Stamp {
                id: left,
                event: self.event.clone(),
            },
            Stamp {
                id: right,
                event: self.event.clone(),
            },
        )
    }

    /// Inflate the Event along the interval this Stamp's ID owns. Tries the
    /// cheap `fill` first, falling back to `grow`. A no-op on a peek Stamp
    /// (null ID): `fill` reports no change and `grow` has nothing to own.
    #[instrument(level = "debug", skip(self))]
    pub fn event_advance(&self) -> Status<Stamp> {
        let (filled, did_fill) = self.event.fill(&self.id)?;
        if did_fill {
            return Ok(Stamp {
                id: self.id.clone(),
                event: filled,
            });
        }
        if self.id.is_zero() {
            // Peek stamps own nothing: grow would have no owned side to
            // descend into, so there is nothing further to do.
            return Ok(self.clone());
        }
        let (grown, _cost) = self.event.grow(&self.id)?;
        Ok(Stamp {
            id: self.id.clone(),
            event: grown,
        })
    }

    /// Merge two Stamps: sum their IDs (must own disjoint intervals) and
    /// lattice-join their Events.
    #[instrument(level = "debug", skip(self, other))]
    pub fn join(&self, other: &Stamp) -> Status<Stamp> {
        let id = self.id.sum(&other.id)?.normalise();
        let event = self.event.join(&other.event)?;
        Ok(Stamp { id, event })
    }

    /// Compare causal history. `Equal` when both Events agree exactly,
    /// `LessThan`/`GreaterThan` when one happens-before the other, and
    /// `Concurrent` when neither does.
    pub fn compare(&self, other: &Stamp) -> Comparison {
        let le = self.event.leq(&other.event);
        let ge = other.event.leq(&self.event);
        match (le, ge) {
            (true, true) => Comparison::Equal,
            (true, false) => Comparison::LessThan,
            (false, true) => Comparison::GreaterThan,
            (false, false) => Comparison::Concurrent,
        }
    }

    /// Derived verb: inflate then peek, handing the peek half to a
    /// recipient while keeping the inflated original.
    pub fn send(&self) -> Status<(Stamp, Stamp)> {
        let advanced = self.event_advance()?;
        let peek = advanced.new_peek();
        Ok((advanced, peek))
    }

    /// Derived verb: absorb another Stamp's (usually a peek's) history and
    /// inflate.
    pub fn receive(&self, other: &Stamp) -> Status<Stamp> {
        self.join(other)?.event_advance()
    }

    /// Derived verb: join then fork, the two-way analogue of send/receive
    /// used when both parties keep an active Stamp afterwards.
    pub fn sync(&self, other: &Stamp) -> Status<(Stamp, Stamp)> {
        Ok(self.join(other)?.fork())
    }

    /// Validate both components are individually well-formed.
    pub fn validate(&self) -> Status<()> {
        self.id.validate().map_err(|_| ItcError::CorruptStamp)?;
        self.event.validate().map_err(|_| ItcError::CorruptStamp)?;
        Ok(())
    }
}
