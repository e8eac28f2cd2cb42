//! Drag-and-drop reordering over the two list scopes of a [`Store`].
//!
//! A gesture is reduced to a [`DragEnd`] (where it started, where it was
//! dropped, if anywhere) and applied as one remove-and-reinsert splice on a
//! copy of the store.

use std::fmt;

use tracing::{debug, trace};

use crate::model::Store;
use crate::store::{EditError, Target, check_index};

const TABLES_ID: &str = "tables";
const ATTRIBUTES_PREFIX: &str = "attributes-";

/// The ordered list a gesture operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Tables,
    Attributes { table: usize },
}

impl Scope {
    /// Parse a drop-target id: `tables` or `attributes-<table index>`.
    pub fn from_droppable_id(id: &str) -> Option<Self> {
        if id == TABLES_ID {
            return Some(Self::Tables);
        }
        let digits = id.strip_prefix(ATTRIBUTES_PREFIX)?;
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'));
        if !canonical {
            return None;
        }
        digits
            .parse::<usize>()
            .ok()
            .map(|table| Self::Attributes { table })
    }

    pub fn droppable_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Tables => f.write_str(TABLES_ID),
            Scope::Attributes { table } => write!(f, "{}{}", ATTRIBUTES_PREFIX, table),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation {
    pub scope: Scope,
    pub index: usize,
}

impl DropLocation {
    pub fn new(scope: Scope, index: usize) -> Self {
        Self { scope, index }
    }
}

/// A completed drag gesture. `destination` is `None` when the item was
/// dropped outside any target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

impl DragEnd {
    pub fn new(source: DropLocation, destination: Option<DropLocation>) -> Self {
        Self { source, destination }
    }

    /// Build an event from raw drop-target ids.
    pub fn from_ids(
        source_id: &str,
        source_index: usize,
        destination: Option<(&str, usize)>,
    ) -> Result<Self, EditError> {
        let parse = |id: &str| {
            Scope::from_droppable_id(id).ok_or_else(|| EditError::UnknownScope(id.to_string()))
        };

        let source = DropLocation::new(parse(source_id)?, source_index);
        let destination = match destination {
            Some((id, index)) => Some(DropLocation::new(parse(id)?, index)),
            None => None,
        };
        Ok(Self::new(source, destination))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Moved(Store),
    /// Dropped outside any target.
    Cancelled,
    /// Dropped into a different scope than it started in.
    Rejected,
}

impl DragOutcome {
    pub fn moved(self) -> Option<Store> {
        match self {
            DragOutcome::Moved(store) => Some(store),
            _ => None,
        }
    }
}

/// Move the element at `from` to position `to`, shifting the rest.
pub fn move_item<T>(
    items: &mut Vec<T>,
    from: usize,
    to: usize,
    what: Target,
) -> Result<(), EditError> {
    check_index(what, from, items.len())?;
    check_index(what, to, items.len())?;
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

pub fn reorder(store: &Store, scope: Scope, from: usize, to: usize) -> Result<Store, EditError> {
    let mut next = store.clone();
    match scope {
        Scope::Tables => move_item(&mut next.tables, from, to, Target::Table)?,
        Scope::Attributes { table } => {
            check_index(Target::Table, table, next.tables.len())?;
            move_item(&mut next.tables[table].attributes, from, to, Target::Attribute)?;
        }
    }
    trace!(%scope, from, to, "reordered");
    Ok(next)
}

pub fn apply_drag(store: &Store, drag: &DragEnd) -> Result<DragOutcome, EditError> {
    let Some(destination) = drag.destination else {
        debug!(source = %drag.source.scope, "drag cancelled");
        return Ok(DragOutcome::Cancelled);
    };

    if destination.scope != drag.source.scope {
        debug!(
            source = %drag.source.scope,
            destination = %destination.scope,
            "cross-scope drop ignored"
        );
        return Ok(DragOutcome::Rejected);
    }

    reorder(store, drag.source.scope, drag.source.index, destination.index).map(DragOutcome::Moved)
}
