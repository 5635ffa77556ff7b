//! Compact tuple-form serde for `IdTree`, `EventTree`, and `Stamp`, e.g.
//! `{"id":[[1,0],0],"event":[[1,1,0],0,0]}` rather than the verbose
//! tagged-enum form the derives on `IdTree`/`EventTree` themselves produce.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::event::EventTree;
use crate::id::IdTree;
use crate::stamp::Stamp;

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TupleIdTree {
    Leaf(u8),
    Node(Box<TupleIdTree>, Box<TupleIdTree>),
}

impl From<&IdTree> for TupleIdTree {
    fn from(id_tree: &IdTree) -> Self {
        match id_tree {
            IdTree::Leaf { owner } => TupleIdTree::Leaf(*owner as u8),
            IdTree::Node { left, right } => TupleIdTree::Node(
                Box::new(TupleIdTree::from(left.as_ref())),
                Box::new(TupleIdTree::from(right.as_ref())),
            ),
        }
    }
}

impl From<&TupleIdTree> for IdTree {
    fn from(tuple_id_tree: &TupleIdTree) -> Self {
        match tuple_id_tree {
            TupleIdTree::Leaf(owner) => IdTree::Leaf { owner: *owner == 1 },
            TupleIdTree::Node(left, right) => IdTree::Node {
                left: Box::new(IdTree::from(left.as_ref())),
                right: Box::new(IdTree::from(right.as_ref())),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TupleEventTree {
    Leaf(u32),
    Node(Box<TupleEventTree>, u32, Box<TupleEventTree>),
}

impl From<&EventTree> for TupleEventTree {
    fn from(event_tree: &EventTree) -> Self {
        match event_tree {
            EventTree::Leaf { n } => TupleEventTree::Leaf(*n as u32),
            EventTree::Node { n, left, right } => TupleEventTree::Node(
                Box::new(TupleEventTree::from(left.as_ref())),
                *n as u32,
                Box::new(TupleEventTree::from(right.as_ref())),
            ),
        }
    }
}

impl From<&TupleEventTree> for EventTree {
    fn from(tuple_event_tree: &TupleEventTree) -> Self {
        match tuple_event_tree {
            TupleEventTree::Leaf(n) => EventTree::leaf(*n as crate::event::Counter),
            TupleEventTree::Node(left, n, right) => EventTree::node(
                *n as crate::event::Counter,
                EventTree::from(left.as_ref()),
                EventTree::from(right.as_ref()),
            ),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TupleStamp {
    id: TupleIdTree,
    event: TupleEventTree,
}

impl Serialize for Stamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        TupleStamp {
            id: TupleIdTree::from(self.id_ref()),
            event: TupleEventTree::from(self.event_ref()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Stamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let TupleStamp { id, event } = Deserialize::deserialize(deserializer)?;
        Stamp::from_parts(IdTree::from(&id), EventTree::from(&event))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stamp_round_trips() {
        let stamp = Stamp::new_seed();
        let serialized = serde_json::to_string(&stamp).unwrap();
        assert_eq!(serialized, "{\"id\":1,\"event\":0}");
        let new_stamp: Stamp = serde_json::from_str(&serialized).unwrap();
        assert_eq!(stamp, new_stamp);
    }

    #[test]
    fn complex_stamp_round_trips() {
        let stamp = Stamp::from_parts(
            IdTree::node(IdTree::node(IdTree::one(), IdTree::zero()), IdTree::zero()),
            EventTree::node(
                0,
                EventTree::node(1, EventTree::leaf(1), EventTree::zero()),
                EventTree::zero(),
            ),
        )
        .unwrap();
        let serialized = serde_json::to_string(&stamp).unwrap();
        assert_eq!(serialized, "{\"id\":[[1,0],0],\"event\":[[1,1,0],0,0]}");
        let new_stamp: Stamp = serde_json::from_str(&serialized).unwrap();
        assert_eq!(stamp, new_stamp);
    }
}
