pub mod model;
pub mod reorder;
pub mod script;
pub mod serializer;
pub mod store;

use wasm_bindgen::prelude::*;

use model::{AttributeField, FieldValue, Store};
use reorder::{DragEnd, DragOutcome};
use store::EditError;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a JSON store snapshot as ERD notation
#[wasm_bindgen(js_name = "storeToErd")]
pub fn store_to_erd(json: &str) -> Result<String, String> {
    let store: Store = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(serializer::serialize(&store))
}

/// Editor state owned by the page. Each call swaps in a new snapshot, or
/// keeps the current one when the edit fails.
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct SchemaEditor {
    store: Store,
}

impl SchemaEditor {
    pub fn store(&self) -> &Store {
        &self.store
    }

    fn commit(&mut self, next: Result<Store, EditError>) -> Result<(), String> {
        self.store = next.map_err(|e| e.to_string())?;
        Ok(())
    }

    fn set_field(
        &mut self,
        table: u32,
        attribute: u32,
        field: &str,
        value: FieldValue,
    ) -> Result<(), String> {
        let field = AttributeField::from_str(field)
            .ok_or_else(|| EditError::UnknownField(field.to_string()).to_string())?;
        let next = self
            .store
            .set_attribute_field(table as usize, attribute as usize, field, value);
        self.commit(next)
    }
}

#[wasm_bindgen]
impl SchemaEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SchemaEditor {
        Self::default()
    }

    #[wasm_bindgen(js_name = "fromJson")]
    pub fn from_json(json: &str) -> Result<SchemaEditor, String> {
        let store = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(Self { store })
    }

    #[wasm_bindgen(js_name = "tableCount")]
    pub fn table_count(&self) -> u32 {
        self.store.len() as u32
    }

    #[wasm_bindgen(js_name = "attributeCount")]
    pub fn attribute_count(&self, table: u32) -> Option<u32> {
        self.store
            .table(table as usize)
            .map(|t| t.attributes.len() as u32)
    }

    #[wasm_bindgen(js_name = "addTable")]
    pub fn add_table(&mut self) {
        self.store = self.store.add_table();
    }

    #[wasm_bindgen(js_name = "deleteTable")]
    pub fn delete_table(&mut self, table: u32) -> Result<(), String> {
        let next = self.store.delete_table(table as usize);
        self.commit(next)
    }

    #[wasm_bindgen(js_name = "addAttribute")]
    pub fn add_attribute(&mut self, table: u32) -> Result<(), String> {
        let next = self.store.add_attribute(table as usize);
        self.commit(next)
    }

    #[wasm_bindgen(js_name = "deleteAttribute")]
    pub fn delete_attribute(&mut self, table: u32, attribute: u32) -> Result<(), String> {
        let next = self.store.delete_attribute(table as usize, attribute as usize);
        self.commit(next)
    }

    /// Set `name`, `type` or `defaultValue`.
    #[wasm_bindgen(js_name = "setTextField")]
    pub fn set_text_field(
        &mut self,
        table: u32,
        attribute: u32,
        field: &str,
        value: &str,
    ) -> Result<(), String> {
        self.set_field(table, attribute, field, FieldValue::Text(value.to_string()))
    }

    /// Set `nullable`, `autoIncrement` or `primaryKey`.
    #[wasm_bindgen(js_name = "setFlagField")]
    pub fn set_flag_field(
        &mut self,
        table: u32,
        attribute: u32,
        field: &str,
        value: bool,
    ) -> Result<(), String> {
        self.set_field(table, attribute, field, FieldValue::Flag(value))
    }

    #[wasm_bindgen(js_name = "clearDefaultValue")]
    pub fn clear_default_value(&mut self, table: u32, attribute: u32) -> Result<(), String> {
        let next = self.store.set_attribute_field(
            table as usize,
            attribute as usize,
            AttributeField::DefaultValue,
            FieldValue::Clear,
        );
        self.commit(next)
    }

    /// Feed a drag-end result. Returns whether the store changed.
    #[wasm_bindgen(js_name = "onDragEnd")]
    pub fn on_drag_end(
        &mut self,
        source_id: &str,
        source_index: u32,
        destination_id: Option<String>,
        destination_index: Option<u32>,
    ) -> Result<bool, String> {
        let destination = match (destination_id.as_deref(), destination_index) {
            (Some(id), Some(index)) => Some((id, index as usize)),
            (None, None) => None,
            (Some(id), None) => return Err(format!("Drop target {} has no index", id)),
            (None, Some(index)) => return Err(format!("Drop index {} has no target", index)),
        };
        let drag = DragEnd::from_ids(source_id, source_index as usize, destination)
            .map_err(|e| e.to_string())?;

        match self.store.apply_drag(&drag).map_err(|e| e.to_string())? {
            DragOutcome::Moved(next) => {
                let changed = next != self.store;
                self.store = next;
                Ok(changed)
            }
            DragOutcome::Cancelled | DragOutcome::Rejected => Ok(false),
        }
    }

    /// Current snapshot as a plain JS object
    pub fn snapshot(&self) -> Result<JsValue, String> {
        let json = self.to_json()?;
        js_sys::JSON::parse(&json).map_err(|_| "Failed to parse snapshot JSON".to_string())
    }

    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(&self.store).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "toErd")]
    pub fn to_erd(&self) -> String {
        serializer::serialize(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_edits() {
        let mut editor = SchemaEditor::new();
        editor.add_table();
        editor.add_attribute(0).unwrap();
        editor.set_text_field(0, 0, "name", "id").unwrap();
        editor.set_text_field(0, 0, "type", "int").unwrap();
        editor.set_flag_field(0, 0, "primaryKey", true).unwrap();

        let attr = editor.store().attribute(0, 0).unwrap();
        assert_eq!(attr.name, "id");
        assert_eq!(attr.typ, "int");
        assert!(attr.primary_key);
        assert_eq!(editor.attribute_count(0), Some(1));
        assert_eq!(editor.attribute_count(1), None);
    }

    #[test]
    fn test_editor_keeps_snapshot_on_error() {
        let mut editor = SchemaEditor::new();
        editor.add_table();
        editor.add_attribute(0).unwrap();
        let before = editor.store().clone();

        assert!(editor.delete_table(3).is_err());
        assert!(editor.set_flag_field(0, 0, "name", true).is_err());
        assert!(editor.set_text_field(0, 0, "colour", "red").is_err());
        assert_eq!(editor.store(), &before);
    }

    #[test]
    fn test_editor_drag() {
        let mut editor = SchemaEditor::new();
        editor.add_table();
        for name in ["a", "b", "c"] {
            editor.add_attribute(0).unwrap();
            let last = editor.attribute_count(0).unwrap() - 1;
            editor.set_text_field(0, last, "name", name).unwrap();
        }

        let moved = editor
            .on_drag_end("attributes-0", 2, Some("attributes-0".to_string()), Some(0))
            .unwrap();
        assert!(moved);

        let cancelled = editor.on_drag_end("attributes-0", 0, None, None).unwrap();
        assert!(!cancelled);

        let rejected = editor
            .on_drag_end("attributes-0", 0, Some("tables".to_string()), Some(0))
            .unwrap();
        assert!(!rejected);

        let names: Vec<&str> = editor.store().tables[0]
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        assert!(editor.on_drag_end("tables", 0, Some("tables".to_string()), Some(1)).is_err());
    }

    #[test]
    fn test_editor_drag_same_index_unchanged() {
        let mut editor = SchemaEditor::new();
        editor.add_table();
        editor.add_table();
        editor.add_attribute(1).unwrap();
        let before = editor.store().clone();

        let changed = editor
            .on_drag_end("tables", 1, Some("tables".to_string()), Some(1))
            .unwrap();
        assert!(!changed);
        assert_eq!(editor.store(), &before);

        let changed = editor
            .on_drag_end("tables", 1, Some("tables".to_string()), Some(0))
            .unwrap();
        assert!(changed);
        assert_eq!(editor.store().tables[0].attributes.len(), 1);
    }

    #[test]
    fn test_editor_drag_half_destination() {
        let mut editor = SchemaEditor::new();
        editor.add_table();
        editor.add_table();
        let before = editor.store().clone();

        assert!(editor.on_drag_end("tables", 0, Some("tables".to_string()), None).is_err());
        assert!(editor.on_drag_end("tables", 0, None, Some(1)).is_err());
        assert_eq!(editor.store(), &before);
    }

    #[test]
    fn test_json_round_trip_and_erd() {
        let mut editor = SchemaEditor::new();
        editor.add_table();
        editor.add_attribute(0).unwrap();
        editor.set_text_field(0, 0, "name", "id").unwrap();
        editor.set_text_field(0, 0, "type", "int").unwrap();
        editor.set_flag_field(0, 0, "primaryKey", true).unwrap();

        let json = editor.to_json().unwrap();
        let restored = SchemaEditor::from_json(&json).unwrap();
        assert_eq!(restored.store(), editor.store());

        assert_eq!(store_to_erd(&json).unwrap(), "entity Table1 {\n    id int pk\n}\n");
        assert_eq!(editor.to_erd(), store_to_erd(&json).unwrap());
        assert!(store_to_erd("{").is_err());
    }
}
