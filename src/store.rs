//! Copy-on-write edits over [`Store`] snapshots.
//!
//! Every operation borrows the current snapshot and returns a new one; the
//! input is never modified. Indices must come from the snapshot being edited.
//! An index out of range is reported as [`EditError::IndexOutOfRange`] and is
//! never clamped.

use std::fmt;

use tracing::trace;

use crate::model::{Attribute, AttributeField, FieldKind, FieldValue, Store, Table};
use crate::reorder::{self, DragEnd, DragOutcome, Scope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Table,
    Attribute,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Table => f.write_str("table"),
            Target::Attribute => f.write_str("attribute"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("{what} index {index} out of range (length {len})")]
    IndexOutOfRange { what: Target, index: usize, len: usize },
    #[error("Field {field} expects a {expected} value, got {got}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    #[error("Unknown attribute field: {0}")]
    UnknownField(String),
    #[error("Unknown drop target: {0}")]
    UnknownScope(String),
}

pub(crate) fn check_index(what: Target, index: usize, len: usize) -> Result<(), EditError> {
    if index < len {
        Ok(())
    } else {
        Err(EditError::IndexOutOfRange { what, index, len })
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "string",
        FieldKind::OptionalText => "string or clear",
        FieldKind::Flag => "boolean",
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, table: usize) -> Option<&Table> {
        self.tables.get(table)
    }

    pub fn attribute(&self, table: usize, attribute: usize) -> Option<&Attribute> {
        self.tables.get(table)?.attributes.get(attribute)
    }

    pub fn add_table(&self) -> Store {
        let mut next = self.clone();
        next.tables.push(Table::default());
        trace!(tables = next.tables.len(), "table added");
        next
    }

    pub fn delete_table(&self, table: usize) -> Result<Store, EditError> {
        check_index(Target::Table, table, self.tables.len())?;
        let mut next = self.clone();
        next.tables.remove(table);
        trace!(table, "table deleted");
        Ok(next)
    }

    pub fn add_attribute(&self, table: usize) -> Result<Store, EditError> {
        check_index(Target::Table, table, self.tables.len())?;
        let mut next = self.clone();
        next.tables[table].attributes.push(Attribute::default());
        trace!(table, "attribute added");
        Ok(next)
    }

    pub fn delete_attribute(&self, table: usize, attribute: usize) -> Result<Store, EditError> {
        self.check_attribute(table, attribute)?;
        let mut next = self.clone();
        next.tables[table].attributes.remove(attribute);
        trace!(table, attribute, "attribute deleted");
        Ok(next)
    }

    /// Set one field of one attribute. The value must fit the field's kind:
    /// text for `name`/`type`, text or [`FieldValue::Clear`] for
    /// `defaultValue`, a flag for the booleans.
    pub fn set_attribute_field(
        &self,
        table: usize,
        attribute: usize,
        field: AttributeField,
        value: FieldValue,
    ) -> Result<Store, EditError> {
        self.check_attribute(table, attribute)?;

        let mut next = self.clone();
        let attr = &mut next.tables[table].attributes[attribute];
        match (field, value) {
            (AttributeField::Name, FieldValue::Text(s)) => attr.name = s,
            (AttributeField::Type, FieldValue::Text(s)) => attr.typ = s,
            (AttributeField::DefaultValue, FieldValue::Text(s)) => attr.default_value = Some(s),
            (AttributeField::DefaultValue, FieldValue::Clear) => attr.default_value = None,
            (AttributeField::Nullable, FieldValue::Flag(b)) => attr.nullable = b,
            (AttributeField::AutoIncrement, FieldValue::Flag(b)) => attr.auto_increment = b,
            (AttributeField::PrimaryKey, FieldValue::Flag(b)) => attr.primary_key = b,
            (field, value) => {
                return Err(EditError::TypeMismatch {
                    field: field.as_str(),
                    expected: kind_name(field.kind()),
                    got: value.kind_name(),
                });
            }
        }
        trace!(table, attribute, field = field.as_str(), "attribute field set");
        Ok(next)
    }

    pub fn reorder(&self, scope: Scope, from: usize, to: usize) -> Result<Store, EditError> {
        reorder::reorder(self, scope, from, to)
    }

    pub fn apply_drag(&self, drag: &DragEnd) -> Result<DragOutcome, EditError> {
        reorder::apply_drag(self, drag)
    }

    fn check_attribute(&self, table: usize, attribute: usize) -> Result<(), EditError> {
        check_index(Target::Table, table, self.tables.len())?;
        check_index(Target::Attribute, attribute, self.tables[table].attributes.len())
    }
}
