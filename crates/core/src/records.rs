//! In-memory operations over a loaded record list.

use serde_json::Value;

use crate::{model::STATUS_FIELD, Record, StoreError};

/// What [`upsert`] did with the incoming record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A record with the same id existed and was replaced at `index`.
    Replaced {
        /// Position of the replaced record.
        index: usize,
    },
    /// The record was appended under a freshly assigned id.
    Appended {
        /// The id written into the record.
        id: i64,
    },
}

/// Id for the next appended record: the LAST record's id plus one, or `1`
/// for an empty list.
///
/// This is not the maximum id. `[{id: 3}, {id: 1}]` yields `4`, and a list
/// whose tail was reordered can hand out an id that is already taken. A
/// last record without an integer id counts as `0`.
///
/// Fails with [`StoreError::IdExhausted`] when the last id is `i64::MAX`.
pub fn next_id(records: &[Record]) -> Result<i64, StoreError> {
    let Some(last) = records.last() else {
        return Ok(1);
    };
    let last_id = last.id().unwrap_or(0);
    last_id
        .checked_add(1)
        .ok_or(StoreError::IdExhausted { last: last_id })
}

/// Replaces the record whose `id` equals the incoming one, or appends the
/// incoming record under [`next_id`].
///
/// An incoming `id` that matches nothing is overwritten. The list is left
/// untouched when no id can be assigned.
pub fn upsert(records: &mut Vec<Record>, mut incoming: Record) -> Result<Upsert, StoreError> {
    let existing = incoming
        .id_value()
        .and_then(|id| records.iter().position(|r| r.id_value() == Some(id)));

    match existing {
        Some(index) => {
            records[index] = incoming;
            Ok(Upsert::Replaced { index })
        }
        None => {
            let id = next_id(records)?;
            incoming.set_id(id);
            records.push(incoming);
            Ok(Upsert::Appended { id })
        }
    }
}

/// Sets the `status` of the record with `id`, leaving its other fields alone.
///
/// `None` removes the field.
pub fn set_status(records: &mut [Record], id: i64, status: Option<Value>) -> Result<(), StoreError> {
    let record = records
        .iter_mut()
        .find(|r| r.id() == Some(id))
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

    match status {
        Some(status) => {
            record.insert(STATUS_FIELD, status);
        }
        None => {
            record.remove(STATUS_FIELD);
        }
    }
    Ok(())
}

/// Drops every record whose id equals `id`. Returns how many went away.
pub fn remove(records: &mut Vec<Record>, id: i64) -> usize {
    let before = records.len();
    records.retain(|r| r.id() != Some(id));
    before - records.len()
}
