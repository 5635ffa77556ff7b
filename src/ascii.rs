//! ASCII rendering of `IdTree`, `EventTree`, and `Stamp`, handy for logging
//! and debugging when the `tracing` output isn't enough. Not a wire format:
//! there is no length-prefixing or escaping, so a rendered tree cannot be
//! told apart from one embedded inside a larger string.
//!
//! IDs render as `0`, `1`, or `(left,right)`. Events render as a leaf
//! counter, or `(n,left,right)` for an internal node. A Stamp renders as
//! `id:event`.

use crate::event::{Counter, EventTree};
use crate::id::IdTree;
use crate::stamp::Stamp;

pub fn id_to_ascii(id: &IdTree) -> String {
    match id {
        IdTree::Leaf { owner: false } => "0".to_string(),
        IdTree::Leaf { owner: true } => "1".to_string(),
        IdTree::Node { left, right } => {
            format!("({},{})", id_to_ascii(left), id_to_ascii(right))
        }
    }
}

pub fn event_to_ascii(event: &EventTree) -> String {
    match event {
        EventTree::Leaf { n } => n.to_string(),
        EventTree::Node { n, left, right } => {
            format!("({},{},{})", n, event_to_ascii(left), event_to_ascii(right))
        }
    }
}

pub fn stamp_to_ascii(stamp: &Stamp) -> String {
    format!(
        "{}:{}",
        id_to_ascii(stamp.id_ref()),
        event_to_ascii(stamp.event_ref())
    )
}

/// Parse the output of [`id_to_ascii`].
pub fn id_from_ascii(s: &str) -> Option<IdTree> {
    let mut chars = s.chars().peekable();
    let tree = parse_id(&mut chars)?;
    if chars.next().is_some() {
        return None;
    }
    Some(tree)
}

fn parse_id(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<IdTree> {
    match chars.next()? {
        '0' => Some(IdTree::zero()),
        '1' => Some(IdTree::one()),
        '(' => {
            let left = parse_id(chars)?;
            if chars.next()? != ',' {
                return None;
            }
            let right = parse_id(chars)?;
            if chars.next()? != ')' {
                return None;
            }
            Some(IdTree::node(left, right))
        }
        _ => None,
    }
}

/// Parse the output of [`event_to_ascii`].
pub fn event_from_ascii(s: &str) -> Option<EventTree> {
    let mut chars = s.chars().peekable();
    let tree = parse_event(&mut chars)?;
    if chars.next().is_some() {
        return None;
    }
    Some(tree)
}

fn parse_event(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<EventTree> {
    if chars.peek() == Some(&'(') {
        chars.next();
        let n = parse_number(chars)?;
        if chars.next()? != ',' {
            return None;
        }
        let left = parse_event(chars)?;
        if chars.next()? != ',' {
            return None;
        }
        let right = parse_event(chars)?;
        if chars.next()? != ')' {
            return None;
        }
        Some(EventTree::node(n, left, right))
    } else {
        Some(EventTree::leaf(parse_number(chars)?))
    }
}

fn parse_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<Counter> {
    let mut digits = String::new();
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
