//! The compact, length-prefixed, network-endian wire codec for ID, Event,
//! and Stamp trees.
//!
//! This is the external interface for transmitting Stamps between
//! processes. It is self-delimiting but not self-authenticating:
//! callers that need integrity must add their own checksum around the
//! encoded bytes.

use crate::error::{ItcError, Status};
use crate::event::{Counter, EventTree};
use crate::id::IdTree;
use crate::stamp::Stamp;

const NULL_ID_HEADER: u8 = 0x00;
const PARENT_ID_HEADER: u8 = 0x01;
const SEED_ID_HEADER: u8 = 0x02;

const EVENT_IS_PARENT_BIT: u8 = 0x80;
const EVENT_RESERVED_MASK: u8 = 0x78;
const EVENT_LEN_MASK: u8 = 0x07;

const STAMP_RESERVED_MASK: u8 = 0xF0;

fn push_checked(buf: &mut [u8], offset: &mut usize, byte: u8) -> Status<()> {
    let slot = buf.get_mut(*offset).ok_or(ItcError::InsufficientResources)?;
    *slot = byte;
    *offset += 1;
    Ok(())
}

fn push_slice_checked(buf: &mut [u8], offset: &mut usize, bytes: &[u8]) -> Status<()> {
    let end = offset
        .checked_add(bytes.len())
        .ok_or(ItcError::InsufficientResources)?;
    let slot = buf
        .get_mut(*offset..end)
        .ok_or(ItcError::InsufficientResources)?;
    slot.copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

fn take_byte(buf: &[u8], offset: &mut usize, err: ItcError) -> Status<u8> {
    let byte = *buf.get(*offset).ok_or(err)?;
    *offset += 1;
    Ok(byte)
}

fn take_slice<'a>(buf: &'a [u8], offset: &mut usize, len: usize, err: ItcError) -> Status<&'a [u8]> {
    let end = offset.checked_add(len).ok_or(err)?;
    let slice = buf.get(*offset..end).ok_or(err)?;
    *offset = end;
    Ok(slice)
}

// --- ID ---------------------------------------------------------------

fn serialise_id_into(id: &IdTree, buf: &mut [u8], offset: &mut usize) -> Status<()> {
    match id {
        IdTree::Leaf { owner: false } => push_checked(buf, offset, NULL_ID_HEADER),
        IdTree::Leaf { owner: true } => push_checked(buf, offset, SEED_ID_HEADER),
        IdTree::Node { left, right } => {
            push_checked(buf, offset, PARENT_ID_HEADER)?;
            serialise_id_into(left, buf, offset)?;
            serialise_id_into(right, buf, offset)
        }
    }
}

/// Serialise `id` into `buf`, returning the number of bytes written.
pub fn serialise_id(id: &IdTree, buf: &mut [u8]) -> Status<usize> {
    id.validate().map_err(|_| ItcError::CorruptId)?;
    let mut offset = 0;
    serialise_id_into(id, buf, &mut offset)?;
    Ok(offset)
}

fn deserialise_id_from(buf: &[u8], offset: &mut usize) -> Status<IdTree> {
    match take_byte(buf, offset, ItcError::CorruptId)? {
        NULL_ID_HEADER => Ok(IdTree::zero()),
        SEED_ID_HEADER => Ok(IdTree::one()),
        PARENT_ID_HEADER => {
            let left = deserialise_id_from(buf, offset)?;
            let right = deserialise_id_from(buf, offset)?;
            Ok(IdTree::node(left, right))
        }
        _ => Err(ItcError::CorruptId),
    }
}

/// Deserialise an ID from the start of `buf`, returning the tree and the
/// number of bytes consumed.
pub fn deserialise_id(buf: &[u8]) -> Status<(IdTree, usize)> {
    let mut offset = 0;
    let id = deserialise_id_from(buf, &mut offset)?;
    id.validate().map_err(|_| ItcError::CorruptId)?;
    Ok((id, offset))
}

// --- Event --------------------------------------------------------------

fn counter_byte_len(n: Counter) -> u8 {
    let mut v = n;
    let mut len = 0u8;
    loop {
        v >>= 8;
        len += 1;
        if v == 0 {
            break;
        }
    }
    len
}

fn serialise_event_into(event: &EventTree, buf: &mut [u8], offset: &mut usize) -> Status<()> {
    let is_parent = matches!(event, EventTree::Node { .. });
    let n = event.n();
    let len = counter_byte_len(n);
    let header = (if is_parent { EVENT_IS_PARENT_BIT } else { 0 }) | (len - 1);
    push_checked(buf, offset, header)?;

    let full = n.to_be_bytes();
    let minimal = &full[full.len() - len as usize..];
    push_slice_checked(buf, offset, minimal)?;

    if let EventTree::Node { left, right, .. } = event {
        serialise_event_into(left, buf, offset)?;
        serialise_event_into(right, buf, offset)?;
    }
    Ok(())
}

/// Serialise `event` into `buf`, returning the number of bytes written.
pub fn serialise_event(event: &EventTree, buf: &mut [u8]) -> Status<usize> {
    event.validate().map_err(|_| ItcError::CorruptEvent)?;
    let mut offset = 0;
    serialise_event_into(event, buf, &mut offset)?;
    Ok(offset)
}

fn counter_from_be_bytes(bytes: &[u8]) -> Counter {
    let mut value: Counter = 0;
    for &b in bytes {
        value = (value << 8) | (b as Counter);
    }
    value
}

fn deserialise_event_from(buf: &[u8], offset: &mut usize) -> Status<EventTree> {
    let header = take_byte(buf, offset, ItcError::CorruptEvent)?;
    if header & EVENT_RESERVED_MASK != 0 {
        return Err(ItcError::CorruptEvent);
    }
    let is_parent = header & EVENT_IS_PARENT_BIT != 0;
    let len = (header & EVENT_LEN_MASK) + 1;

    if len as usize > std::mem::size_of::<Counter>() {
        return Err(ItcError::EventUnsupportedCounterSize);
    }

    let counter_bytes = take_slice(buf, offset, len as usize, ItcError::CorruptEvent)?;
    let n = counter_from_be_bytes(counter_bytes);

    if is_parent {
        let left = deserialise_event_from(buf, offset)?;
        let right = deserialise_event_from(buf, offset)?;
        Ok(EventTree::node(n, left, right))
    } else {
        Ok(EventTree::leaf(n))
    }
}

/// Deserialise an Event from the start of `buf`, returning the tree and the
/// number of bytes consumed.
pub fn deserialise_event(buf: &[u8]) -> Status<(EventTree, usize)> {
    let mut offset = 0;
    let event = deserialise_event_from(buf, &mut offset)?;
    event.validate().map_err(|_| ItcError::CorruptEvent)?;
    Ok((event, offset))
}

// --- Stamp ----------------------------------------------------------------

fn minimal_u32_bytes(n: u32) -> ([u8; 4], u8) {
    let full = n.to_be_bytes();
    let mut v = n;
    let mut len = 0u8;
    loop {
        v >>= 8;
        len += 1;
        if v == 0 {
            break;
        }
    }
    (full, len)
}

/// Serialise `stamp` into `buf`, returning the number of bytes written.
pub fn serialise_stamp(stamp: &Stamp, buf: &mut [u8]) -> Status<usize> {
    stamp.validate().map_err(|_| ItcError::CorruptStamp)?;

    // Encode each component into its own scratch buffer first so their
    // final lengths are known before the header/length fields are
    // written.
    let mut id_scratch = vec![0u8; buf.len()];
    let id_len = serialise_id(stamp.id_ref(), &mut id_scratch)?;
    let mut event_scratch = vec![0u8; buf.len()];
    let event_len = serialise_event(stamp.event_ref(), &mut event_scratch)?;

    let (id_len_full, id_len_len) = minimal_u32_bytes(id_len as u32);
    let (event_len_full, event_len_len) = minimal_u32_bytes(event_len as u32);

    if id_len_len > 4 || event_len_len > 4 {
        return Err(ItcError::InsufficientResources);
    }

    let header = ((id_len_len - 1) << 2) | (event_len_len - 1);

    let mut offset = 0;
    push_checked(buf, &mut offset, header)?;
    push_slice_checked(buf, &mut offset, &id_len_full[4 - id_len_len as usize..])?;
    push_slice_checked(buf, &mut offset, &id_scratch[..id_len])?;
    push_slice_checked(
        buf,
        &mut offset,
        &event_len_full[4 - event_len_len as usize..],
    )?;
    push_slice_checked(buf, &mut offset, &event_scratch[..event_len])?;

    Ok(offset)
}

/// Deserialise a Stamp from `buf`. The entire buffer must be consumed;
/// trailing bytes are treated as corruption.
pub fn deserialise_stamp(buf: &[u8]) -> Status<Stamp> {
    let mut offset = 0;
    let header = take_byte(buf, &mut offset, ItcError::CorruptStamp)?;
    if header & STAMP_RESERVED_MASK != 0 {
        return Err(ItcError::CorruptStamp);
    }
    let id_len_len = ((header >> 2) & 0x03) + 1;
    let event_len_len = (header & 0x03) + 1;

    let id_len_bytes = take_slice(buf, &mut offset, id_len_len as usize, ItcError::CorruptStamp)?;
    let id_len = u32_from_be_bytes(id_len_bytes) as usize;
    let id_bytes = take_slice(buf, &mut offset, id_len, ItcError::CorruptStamp)?;
    let (id, id_consumed) = deserialise_id(id_bytes).map_err(|_| ItcError::CorruptId)?;
    if id_consumed != id_len {
        return Err(ItcError::CorruptId);
    }

    let event_len_bytes = take_slice(
        buf,
        &mut offset,
        event_len_len as usize,
        ItcError::CorruptStamp,
    )?;
    let event_len = u32_from_be_bytes(event_len_bytes) as usize;
    let event_bytes = take_slice(buf, &mut offset, event_len, ItcError::CorruptStamp)?;
    let (event, event_consumed) =
        deserialise_event(event_bytes).map_err(|_| ItcError::CorruptEvent)?;
    if event_consumed != event_len {
        return Err(ItcError::CorruptEvent);
    }

    if offset != buf.len() {
        return Err(ItcError::CorruptStamp);
    }

    Stamp::from_parts(id, event)
}

fn u32_from_be_bytes(bytes: &[u8]) -> u32 {
    let mut value: u32 = 0;
    for &b in bytes {
        value = (value << 8) | b as u32;
    }
    value
}
