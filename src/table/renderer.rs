//! Table renderer
//!
//! Projects a slice of records into an HTML table with per-row Edit and
//! Delete buttons. Holds no data between renders. Draws through the
//! `Surface` port; `Document` is the default.

use crate::dom::{Document, EventKind, ListenerId, Surface, SurfaceEvent};
use crate::record::{validate_records, Record, UserId};
use crate::table::error::{TableError, TableResult};
use crate::table::format::{format_cell, format_header_name, header_columns};
use serde_json::Value;
use std::rc::Rc;

pub type UpdateCallback = Box<dyn Fn(Record)>;
pub type DeleteCallback = Box<dyn Fn(UserId)>;

/// Row action hooks
#[derive(Default)]
pub struct TableCallbacks {
    on_update: Option<UpdateCallback>,
    on_delete: Option<DeleteCallback>,
}

impl TableCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: called with the row's record when Edit is clicked
    pub fn on_update(mut self, callback: impl Fn(Record) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Builder method: called with the row's userId when Delete is clicked
    pub fn on_delete(mut self, callback: impl Fn(UserId) + 'static) -> Self {
        self.on_delete = Some(Box::new(callback));
        self
    }
}

/// Presentation settings for the table
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Class of the section shown/hidden with the table
    pub section_class: String,
    pub max_cell_len: usize,
    /// Text for missing or empty cells
    pub placeholder: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            section_class: "tableSection".to_string(),
            max_cell_len: 100,
            placeholder: "-".to_string(),
        }
    }
}

pub struct TableRenderer<S: Surface = Document> {
    doc: S,
    container: S::Node,
    callbacks: Rc<TableCallbacks>,
    listeners: Vec<ListenerId>,
    options: TableOptions,
    row_count: usize,
}

impl<S: Surface> TableRenderer<S> {
    pub fn new(doc: &S, container_id: &str, callbacks: TableCallbacks) -> TableResult<Self> {
        Self::with_options(doc, container_id, callbacks, TableOptions::default())
    }

    pub fn with_options(
        doc: &S,
        container_id: &str,
        callbacks: TableCallbacks,
        options: TableOptions,
    ) -> TableResult<Self> {
        if container_id.trim().is_empty() {
            return Err(TableError::EmptyContainerId);
        }
        let container = doc
            .get_element_by_id(container_id)
            .ok_or_else(|| TableError::ContainerNotFound(container_id.to_string()))?;

        Ok(Self {
            doc: doc.clone(),
            container,
            callbacks: Rc::new(callbacks),
            listeners: Vec::new(),
            options,
            row_count: 0,
        })
    }

    /// Rebuild the table from `records`; returns the number of rows drawn
    pub fn render(&mut self, records: &[Record]) -> usize {
        self.cleanup();

        if records.is_empty() {
            self.hide();
            return 0;
        }
        self.set_section_display("block");

        let columns = header_columns(&records[0]);

        let wrapper = self.doc.create_element("div");
        self.doc.add_class(&wrapper, "table-wrapper");

        let header = self.doc.create_element("div");
        self.doc.add_class(&header, "table-header");
        let count = self.doc.create_element("h3");
        self.doc.set_text(&count, &format!("Total Items: {}", records.len()));
        self.doc.append_child(&header, &count);
        self.doc.append_child(&wrapper, &header);

        let table = self.doc.create_element("table");
        self.doc.add_class(&table, "data-table");
        let head = self.build_head(&columns);
        self.doc.append_child(&table, &head);

        let body = self.doc.create_element("tbody");
        for (index, record) in records.iter().enumerate() {
            let row = self.build_row(index, record, &columns);
            self.doc.append_child(&body, &row);
        }
        self.doc.append_child(&table, &body);
        self.doc.append_child(&wrapper, &table);
        self.doc.append_child(&self.container, &wrapper);

        self.row_count = records.len();
        tracing::debug!("Rendered table: {} rows, {} columns", records.len(), columns.len());
        self.row_count
    }

    /// Render untyped data, as read from storage or the wire
    ///
    /// Anything but an array of objects hides the table and is reported.
    pub fn render_value(&mut self, data: &Value) -> TableResult<usize> {
        match validate_records(data.clone()) {
            Ok(records) => Ok(self.render(&records)),
            Err(e) => {
                tracing::error!("Table data rejected: {}", e);
                self.cleanup();
                self.hide();
                Err(TableError::InvalidData(e))
            }
        }
    }

    /// Rows drawn by the last render
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn container(&self) -> S::Node {
        self.container.clone()
    }

    pub fn to_html(&self) -> String {
        self.doc.inner_html(&self.container)
    }

    /// Drop listeners, empty the container and hide the section
    pub fn destroy(&mut self) {
        self.cleanup();
        self.hide();
    }

    fn build_head(&self, columns: &[String]) -> S::Node {
        let head = self.doc.create_element("thead");
        let row = self.doc.create_element("tr");

        for key in columns {
            let th = self.doc.create_element("th");
            self.doc.set_attribute(&th, "data-key", key);
            self.doc.set_text(&th, &format_header_name(key));
            self.doc.append_child(&row, &th);
        }

        let actions = self.doc.create_element("th");
        self.doc.add_class(&actions, "action-column");
        self.doc.set_text(&actions, "Actions");
        self.doc.append_child(&row, &actions);

        self.doc.append_child(&head, &row);
        head
    }

    fn build_row(&mut self, index: usize, record: &Record, columns: &[String]) -> S::Node {
        let row = self.doc.create_element("tr");
        self.doc.set_attribute(&row, "data-index", &index.to_string());

        for key in columns {
            let td = self.doc.create_element("td");
            self.doc.set_attribute(&td, "data-key", key);
            let text = format_cell(record.get(key), self.options.max_cell_len, &self.options.placeholder);
            self.doc.set_text(&td, &text);
            self.doc.append_child(&row, &td);
        }

        let cell = self.doc.create_element("td");
        self.doc.add_class(&cell, "action-cell");

        let edit = self.action_button("Edit", "up_btn", "Edit record");
        let doc = self.doc.downgrade();
        let callbacks = Rc::clone(&self.callbacks);
        let snapshot = record.clone();
        self.listeners.push(self.doc.add_listener(&edit, EventKind::Click, move |event: &S::Event| {
            event.prevent_default();
            event.stop_propagation();
            on_edit::<S>(&doc, &callbacks, &snapshot);
        }));

        let delete = self.action_button("Delete", "del_btn", "Delete record");
        let callbacks = Rc::clone(&self.callbacks);
        let user_id = record.user_id();
        self.listeners.push(self.doc.add_listener(&delete, EventKind::Click, move |event: &S::Event| {
            event.prevent_default();
            event.stop_propagation();
            on_delete(&callbacks, user_id.clone(), index);
        }));

        self.doc.append_child(&cell, &edit);
        self.doc.append_child(&cell, &delete);
        self.doc.append_child(&row, &cell);
        row
    }

    fn action_button(&self, text: &str, class: &str, label: &str) -> S::Node {
        let button = self.doc.create_element("button");
        self.doc.set_attribute(&button, "type", "button");
        self.doc.add_class(&button, class);
        self.doc.set_attribute(&button, "aria-label", label);
        self.doc.set_text(&button, text);
        button
    }

    fn cleanup(&mut self) {
        for id in self.listeners.drain(..) {
            self.doc.remove_listener(id);
        }
        self.doc.clear_children(&self.container);
        self.row_count = 0;
    }

    fn hide(&self) {
        self.set_section_display("none");
        self.doc.clear_children(&self.container);
    }

    fn set_section_display(&self, display: &str) {
        if let Some(section) = self.doc.first_by_class(&self.options.section_class) {
            self.doc.set_style(&section, "display", display);
        }
    }
}

impl<S: Surface> std::fmt::Debug for TableRenderer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRenderer")
            .field("rows", &self.row_count)
            .field("listeners", &self.listeners.len())
            .field("options", &self.options)
            .finish()
    }
}

fn on_edit<S: Surface>(doc: &S::Weak, callbacks: &TableCallbacks, record: &Record) {
    if let Some(doc) = S::upgrade(doc) {
        doc.scroll_to_top();
    }
    if let Some(callback) = &callbacks.on_update {
        callback(record.clone());
    }
}

fn on_delete(callbacks: &TableCallbacks, user_id: Option<UserId>, index: usize) {
    let Some(id) = user_id else {
        tracing::error!("Cannot delete row {}: userId not found", index);
        return;
    };
    if let Some(callback) = &callbacks.on_delete {
        callback(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use serde_json::json;
    use std::cell::RefCell;

    fn setup() -> Document {
        let doc = Document::new();
        let section = doc.create_element("section");
        doc.add_class(section, "tableSection");
        let root = doc.create_element("div");
        doc.set_attribute(root, "id", "table-root");
        doc.append_child(section, root);
        doc.append_child(doc.body(), section);
        doc
    }

    fn section(doc: &Document) -> NodeId {
        doc.first_by_class("tableSection").unwrap()
    }

    #[test]
    fn test_construction_errors() {
        let doc = setup();
        assert!(matches!(
            TableRenderer::new(&doc, " ", TableCallbacks::new()),
            Err(TableError::EmptyContainerId)
        ));
        assert!(matches!(
            TableRenderer::new(&doc, "missing", TableCallbacks::new()),
            Err(TableError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn test_headers_follow_first_record() {
        let doc = setup();
        let mut table = TableRenderer::new(&doc, "table-root", TableCallbacks::new()).unwrap();

        let rows = vec![Record::new()
            .with("id", 1)
            .with("userId", 9)
            .with("name", "x")
            .with("age", 5)];
        assert_eq!(table.render(&rows), 1);

        let headers: Vec<String> = doc
            .elements_by_tag(table.container(), "th")
            .into_iter()
            .map(|th| doc.text_content(th))
            .collect();
        assert_eq!(headers, vec!["Name", "Age", "Actions"]);
        assert_eq!(doc.style(section(&doc), "display").as_deref(), Some("block"));

        let count = doc.elements_by_tag(table.container(), "h3")[0];
        assert_eq!(doc.text_content(count), "Total Items: 1");
    }

    #[test]
    fn test_rows_use_first_record_columns() {
        let doc = setup();
        let mut table = TableRenderer::new(&doc, "table-root", TableCallbacks::new()).unwrap();

        table.render(&[
            Record::new().with("userId", 1).with("name", "Ada").with("skills", json!(["A", "C"])),
            Record::new().with("userId", 2).with("extra", "ignored"),
        ]);

        let cells: Vec<String> = doc
            .elements_by_tag(table.container(), "td")
            .into_iter()
            .filter(|&td| doc.has_attribute(td, "data-key"))
            .map(|td| doc.text_content(td))
            .collect();
        assert_eq!(cells, vec!["Ada", "A, C", "-", "-"]);
    }

    #[test]
    fn test_empty_render_hides_section() {
        let doc = setup();
        let mut table = TableRenderer::new(&doc, "table-root", TableCallbacks::new()).unwrap();

        table.render(&[Record::new().with("userId", 1).with("name", "Ada")]);
        assert!(doc.listener_count() > 0);

        assert_eq!(table.render(&[]), 0);
        assert!(doc.children(table.container()).is_empty());
        assert_eq!(doc.listener_count(), 0);
        assert_eq!(doc.style(section(&doc), "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_render_value_rejects_non_array() {
        let doc = setup();
        let mut table = TableRenderer::new(&doc, "table-root", TableCallbacks::new()).unwrap();

        let err = table.render_value(&json!({"userId": 1})).unwrap_err();
        assert!(matches!(err, TableError::InvalidData(_)));
        assert!(doc.children(table.container()).is_empty());

        assert_eq!(table.render_value(&json!([{"userId": 1, "name": "Ada"}])).unwrap(), 1);
    }

    #[test]
    fn test_rerender_replaces_listeners() {
        let doc = setup();
        let mut table = TableRenderer::new(&doc, "table-root", TableCallbacks::new()).unwrap();
        let rows = vec![
            Record::new().with("userId", 1).with("name", "Ada"),
            Record::new().with("userId", 2).with("name", "Grace"),
        ];

        table.render(&rows);
        table.render(&rows);
        assert_eq!(doc.listener_count(), 4);
        assert_eq!(doc.elements_by_tag(table.container(), "tbody").len(), 1);
    }

    #[test]
    fn test_repeated_renders_reuse_slots() {
        let doc = setup();
        let mut table = TableRenderer::new(&doc, "table-root", TableCallbacks::new()).unwrap();
        let rows: Vec<Record> = (0..10)
            .map(|i| Record::new().with("userId", i).with("name", format!("Employee {}", i)))
            .collect();

        table.render(&rows);
        let nodes = doc.node_count();
        let slots = doc.allocated_slots();

        for _ in 0..1000 {
            table.render(&rows);
        }
        assert_eq!(doc.node_count(), nodes);
        assert_eq!(doc.listener_count(), 20);
        assert_eq!(doc.allocated_slots(), slots);
    }

    #[test]
    fn test_row_actions() {
        let doc = setup();
        let edited: Rc<RefCell<Vec<Record>>> = Rc::default();
        let deleted: Rc<RefCell<Vec<UserId>>> = Rc::default();
        let (e, d) = (edited.clone(), deleted.clone());
        let callbacks = TableCallbacks::new()
            .on_update(move |r| e.borrow_mut().push(r))
            .on_delete(move |id| d.borrow_mut().push(id));
        let mut table = TableRenderer::new(&doc, "table-root", callbacks).unwrap();

        table.render(&[
            Record::new().with("userId", "u1").with("name", "Ada"),
            Record::new().with("name", "Orphan"),
        ]);

        let edits = doc.elements_by_class(table.container(), "up_btn");
        let deletes = doc.elements_by_class(table.container(), "del_btn");

        doc.click(edits[0]);
        assert_eq!(doc.scroll_requests(), 1);
        assert_eq!(edited.borrow()[0].get("name"), Some(&json!("Ada")));

        doc.click(deletes[0]);
        doc.click(deletes[1]);
        assert_eq!(*deleted.borrow(), vec![UserId::from("u1")]);
    }

    #[test]
    fn test_destroy() {
        let doc = setup();
        let mut table = TableRenderer::new(&doc, "table-root", TableCallbacks::new()).unwrap();
        table.render(&[Record::new().with("userId", 1)]);

        table.destroy();
        assert_eq!(doc.listener_count(), 0);
        assert!(table.to_html().is_empty());
        table.destroy();
    }
}
