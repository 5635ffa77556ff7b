//! # Interval Tree Clocks
//!
//! Causality tracking for dynamic distributed systems, per
//! <http://gsd.di.uminho.pt/members/cbm/ps/itc2008.pdf>. Unlike vector
//! clocks, an ITC encodes process identity as an interval of the unit line
//! carried inside the clock itself, so identities can be forked and joined
//! without a registry of known participants.
//!
//! # Usage
//!
//! ```
//! use itc::{Comparison, Stamp};
//!
//! let s = Stamp::new_seed();
//!
//! let (s1, s2) = s.fork();
//! let s1prime = s1.event_advance().unwrap();
//! let s2prime = s2.event_advance().unwrap();
//! let s3 = s2prime.join(&s1).unwrap();
//!
//! assert_eq!(s1prime.compare(&s2prime), Comparison::Concurrent);
//! assert_ne!(s2prime.compare(&s3), Comparison::GreaterThan);
//! ```
//!
//! This crate implements the four core verbs (`fork`, `event_advance`,
//! `join`, `new_peek`), the three derived verbs (`send`, `receive`,
//! `sync`), a partial order over causal history (`compare`), and a compact
//! binary wire codec for exchanging Stamps between processes.

pub mod cost;
pub mod error;
pub mod event;
pub mod id;
pub mod stamp;
pub mod wire;

#[cfg(feature = "ascii")]
pub mod ascii;
#[cfg(feature = "serde")]
pub mod serde_compat;

pub use error::{ItcError, Status};
pub use event::{Counter, EventTree, Join, Leq, Normalise as EventNormalise};
pub use id::{IdTree, Normalise as IdNormalise, Split, Sum};
pub use stamp::{Comparison, Stamp};
