use serde::{Deserialize, Serialize};

/// One immutable snapshot of the whole editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub auto_increment: bool,
    pub primary_key: bool,
}

impl Table {
    /// Display label for the table at `index`, e.g. "Table 1".
    pub fn label(index: usize) -> String {
        format!("Table {}", index + 1)
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: AttributeField) -> FieldValue {
        match field {
            AttributeField::Name => FieldValue::Text(self.name.clone()),
            AttributeField::Type => FieldValue::Text(self.typ.clone()),
            AttributeField::Nullable => FieldValue::Flag(self.nullable),
            AttributeField::DefaultValue => match &self.default_value {
                Some(v) => FieldValue::Text(v.clone()),
                None => FieldValue::Clear,
            },
            AttributeField::AutoIncrement => FieldValue::Flag(self.auto_increment),
            AttributeField::PrimaryKey => FieldValue::Flag(self.primary_key),
        }
    }
}

/// The key set of [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeField {
    Name,
    Type,
    Nullable,
    DefaultValue,
    AutoIncrement,
    PrimaryKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    OptionalText,
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    /// Resets an optional field to none.
    Clear,
}

impl AttributeField {
    pub const ALL: [AttributeField; 6] = [
        Self::Name,
        Self::Type,
        Self::Nullable,
        Self::DefaultValue,
        Self::AutoIncrement,
        Self::PrimaryKey,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "type" | "typ" => Some(Self::Type),
            "nullable" => Some(Self::Nullable),
            "defaultValue" | "default_value" | "default" => Some(Self::DefaultValue),
            "autoIncrement" | "auto_increment" => Some(Self::AutoIncrement),
            "primaryKey" | "primary_key" | "pk" => Some(Self::PrimaryKey),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::Nullable => "nullable",
            Self::DefaultValue => "defaultValue",
            Self::AutoIncrement => "autoIncrement",
            Self::PrimaryKey => "primaryKey",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Name | Self::Type => FieldKind::Text,
            Self::DefaultValue => FieldKind::OptionalText,
            Self::Nullable | Self::AutoIncrement | Self::PrimaryKey => FieldKind::Flag,
        }
    }
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "string",
            FieldValue::Flag(_) => "boolean",
            FieldValue::Clear => "clear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attribute() {
        let attr = Attribute::default();
        assert_eq!(attr.name, "");
        assert_eq!(attr.typ, "");
        assert!(!attr.nullable);
        assert!(!attr.auto_increment);
        assert!(!attr.primary_key);
        assert_eq!(attr.default_value, None);
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in AttributeField::ALL {
            assert_eq!(AttributeField::from_str(field.as_str()), Some(field));
        }
        assert_eq!(AttributeField::from_str("primary_key"), Some(AttributeField::PrimaryKey));
        assert_eq!(AttributeField::from_str("colour"), None);
    }

    #[test]
    fn test_attribute_json_keys() {
        let mut attr = Attribute::new("id", "int");
        attr.primary_key = true;
        let json = serde_json::to_value(&attr).unwrap();

        assert_eq!(json["type"], "int");
        assert_eq!(json["primaryKey"], true);
        assert_eq!(json["autoIncrement"], false);
        assert!(json.get("defaultValue").is_none());

        attr.default_value = Some("0".into());
        let json = serde_json::to_string(&attr).unwrap();
        let back: Attribute = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attr);
    }

    #[test]
    fn test_table_label() {
        assert_eq!(Table::label(0), "Table 1");
        assert_eq!(Table::label(4), "Table 5");
    }
}
