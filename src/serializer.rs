//! Serializer for converting a store snapshot to ERD notation.

use unicode_width::UnicodeWidthStr;

use crate::model::{Attribute, Store, Table};

pub struct ErdOptions {
    /// Spaces before each attribute line
    pub indent: usize,
    /// Pad names and types so modifiers line up
    pub align_columns: bool,
}

impl Default for ErdOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            align_columns: true,
        }
    }
}

/// Serialize a Store to ERD notation string.
pub fn serialize(store: &Store) -> String {
    serialize_with(store, &ErdOptions::default())
}

pub fn serialize_with(store: &Store, options: &ErdOptions) -> String {
    let mut output = String::new();

    for (i, table) in store.tables.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        serialize_table(&mut output, i, table, options);
    }

    output
}

/// Entity name for the table at `index`. Tables carry no name of their own,
/// so the label is used without its space.
pub fn entity_name(index: usize) -> String {
    Table::label(index).replace(' ', "")
}

fn attribute_name(index: usize, attr: &Attribute) -> String {
    if attr.name.trim().is_empty() {
        format!("attribute{}", index + 1)
    } else {
        attr.name.trim().replace(char::is_whitespace, "_")
    }
}

fn attribute_type(attr: &Attribute) -> String {
    let typ = attr.typ.split_whitespace().collect::<Vec<_>>().join("_");
    if typ.is_empty() { "unknown".to_string() } else { typ }
}

fn serialize_table(output: &mut String, index: usize, table: &Table, options: &ErdOptions) {
    output.push_str(&format!("entity {} {{\n", entity_name(index)));

    let rows: Vec<(String, String, String)> = table
        .attributes
        .iter()
        .enumerate()
        .map(|(i, a)| (attribute_name(i, a), attribute_type(a), modifiers(a)))
        .collect();

    let (name_width, type_width) = if options.align_columns {
        rows.iter().fold((0, 0), |(nw, tw), (name, typ, _)| {
            (nw.max(name.width()), tw.max(typ.width()))
        })
    } else {
        (0, 0)
    };

    for (name, typ, mods) in &rows {
        let mut line = " ".repeat(options.indent);
        line.push_str(name);
        pad(&mut line, name.width(), name_width);
        line.push(' ');
        line.push_str(typ);
        if !mods.is_empty() {
            pad(&mut line, typ.width(), type_width);
            line.push(' ');
            line.push_str(mods);
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output.push_str("}\n");
}

fn pad(line: &mut String, width: usize, target: usize) {
    for _ in width..target {
        line.push(' ');
    }
}

fn modifiers(attr: &Attribute) -> String {
    let mut parts: Vec<String> = Vec::new();

    // Serialize modifiers in order: pk, not null, autoincrement, default
    if attr.primary_key {
        parts.push("pk".to_string());
    } else if !attr.nullable {
        parts.push("not null".to_string());
    }
    if attr.auto_increment {
        parts.push("autoincrement".to_string());
    }

    if let Some(val) = &attr.default_value {
        // Check if it's a function call (e.g., NOW())
        let is_function_call = val.contains('(') && val.ends_with(')');
        let needs_quote = !is_function_call
            && (val.is_empty()
                || val.contains(char::is_whitespace)
                || val.starts_with('\'')
                || val.contains('"'));
        if needs_quote {
            let escaped = val.replace('\\', "\\\\").replace('"', "\\\"");
            parts.push(format!("default \"{}\"", escaped));
        } else {
            parts.push(format!("default {}", val));
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Store, Table};
    use pretty_assertions::assert_eq;

    fn users() -> Store {
        let mut id = Attribute::new("id", "int");
        id.primary_key = true;
        id.auto_increment = true;

        let mut email = Attribute::new("email", "varchar");
        email.default_value = Some("no one".to_string());

        let mut note = Attribute::new("note", "text");
        note.nullable = true;

        Store {
            tables: vec![Table {
                attributes: vec![id, email, note],
            }],
        }
    }

    #[test]
    fn test_serialize_simple_entity() {
        let result = serialize(&users());
        assert_eq!(
            result,
            "entity Table1 {\n    \
             id    int     pk autoincrement\n    \
             email varchar not null default \"no one\"\n    \
             note  text\n\
             }\n"
        );
    }

    #[test]
    fn test_serialize_unaligned() {
        let options = ErdOptions {
            indent: 2,
            align_columns: false,
        };
        let result = serialize_with(&users(), &options);
        assert!(result.contains("\n  id int pk autoincrement\n"));
        assert!(result.contains("\n  note text\n"));
    }

    #[test]
    fn test_serialize_placeholders() {
        let store = Store::new().add_table().add_attribute(0).unwrap();
        let result = serialize(&store);
        assert_eq!(result, "entity Table1 {\n    attribute1 unknown not null\n}\n");
    }

    #[test]
    fn test_serialize_multiple_tables() {
        let store = Store::new().add_table().add_table();
        let result = serialize(&store);
        assert_eq!(result, "entity Table1 {\n}\n\nentity Table2 {\n}\n");
    }

    #[test]
    fn test_serialize_function_default() {
        let mut created = Attribute::new("created_at", "timestamp");
        created.default_value = Some("NOW()".to_string());
        let store = Store {
            tables: vec![Table {
                attributes: vec![created],
            }],
        };
        assert!(serialize(&store).contains("created_at timestamp not null default NOW()"));
    }

    #[test]
    fn test_serialize_spaced_type_and_quoted_default() {
        let mut ratio = Attribute::new("ratio", " double  precision ");
        ratio.default_value = Some("say \"hi\"".to_string());
        let store = Store {
            tables: vec![Table {
                attributes: vec![ratio],
            }],
        };
        let result = serialize(&store);
        assert_eq!(
            result,
            "entity Table1 {\n    ratio double_precision not null default \"say \\\"hi\\\"\"\n}\n"
        );
    }

    #[test]
    fn test_align_uses_display_width() {
        let store = Store {
            tables: vec![Table {
                attributes: vec![Attribute::new("名前", "text"), Attribute::new("abc", "int")],
            }],
        };
        let result = serialize(&store);
        assert!(result.contains("    名前 text not null\n"));
        assert!(result.contains("    abc  int  not null\n"));
    }
}
