//! End-to-end wiring: form submit → store → table, and table actions back
//! into the form and store.

use formdeck::dom::{Document, NodeId};
use formdeck::form::{FieldDescriptor, FieldRenderer, FieldType, FormCallbacks};
use formdeck::record::{Record, UserId};
use formdeck::storage::{FileStorage, MemoryStorage, RecordStore, StorageBackend};
use formdeck::table::{TableCallbacks, TableRenderer};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

type SharedStore<B> = Rc<RefCell<RecordStore<B>>>;

struct App<B: StorageBackend> {
    doc: Document,
    store: SharedStore<B>,
    form: Rc<RefCell<Option<FieldRenderer>>>,
    table: Rc<RefCell<TableRenderer>>,
    next_id: Rc<RefCell<i64>>,
}

fn page() -> Document {
    let doc = Document::new();
    let form_root = doc.create_element("div");
    doc.set_attribute(form_root, "id", "form-root");
    doc.append_child(doc.body(), form_root);

    let section = doc.create_element("section");
    doc.add_class(section, "tableSection");
    let table_root = doc.create_element("div");
    doc.set_attribute(table_root, "id", "table-root");
    doc.append_child(section, table_root);
    doc.append_child(doc.body(), section);
    doc
}

fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new(FieldType::Text, "name").label("Name"),
        FieldDescriptor::new(FieldType::Email, "email").label("Email"),
        FieldDescriptor::new(FieldType::Checkbox, "skills")
            .option("rust", "Rust")
            .option("go", "Go")
            .option("sql", "SQL"),
        FieldDescriptor::new(FieldType::Submit, "save"),
    ]
}

fn wire<B: StorageBackend + 'static>(backend: B) -> App<B> {
    let doc = page();
    let store: SharedStore<B> = Rc::new(RefCell::new(RecordStore::new("people", backend).unwrap()));
    let form: Rc<RefCell<Option<FieldRenderer>>> = Rc::default();
    let next_id = Rc::new(RefCell::new(1i64));

    let edit_target = form.clone();
    let delete_store = store.clone();
    let callbacks = TableCallbacks::new()
        .on_update(move |record| {
            if let Some(form) = edit_target.borrow_mut().as_mut() {
                form.update_form_data(&record).unwrap();
            }
        })
        .on_delete(move |id| {
            delete_store.borrow_mut().delete(&id).unwrap();
        });
    let table = Rc::new(RefCell::new(TableRenderer::new(&doc, "table-root", callbacks).unwrap()));

    let redraw = table.clone();
    store
        .borrow_mut()
        .set_on_data_change(move |records| {
            redraw.borrow_mut().render(&records);
        });
    let initial = store.borrow().all();
    table.borrow_mut().render(&initial);

    let save_store = store.clone();
    let ids = next_id.clone();
    let on_submit = FormCallbacks::new().on_submit(move |mut record| {
        let mut store = save_store.borrow_mut();
        if record.user_id().is_some() {
            store.update(&record).unwrap();
        } else {
            let id = *ids.borrow();
            *ids.borrow_mut() += 1;
            record.set_user_id(UserId::from(id));
            store.add(&record).unwrap();
        }
    });
    *form.borrow_mut() = Some(FieldRenderer::new(&doc, "form-root", fields(), on_submit).unwrap());

    App {
        doc,
        store,
        form,
        table,
        next_id,
    }
}

impl<B: StorageBackend> App<B> {
    fn control(&self, key: &str, idx: usize) -> NodeId {
        self.form.borrow().as_ref().unwrap().controls(key)[idx]
    }

    fn fill_and_save(&self, name: &str, email: &str, skills: &[usize]) {
        self.doc.input_text(self.control("name", 0), name);
        self.doc.input_text(self.control("email", 0), email);
        for &i in skills {
            self.doc.click(self.control("skills", i));
        }
        self.doc.click(self.control("save", 0));
    }

    fn table_root(&self) -> NodeId {
        self.table.borrow().container()
    }

    fn cell_texts(&self, key: &str) -> Vec<String> {
        self.doc
            .elements_by_tag(self.table_root(), "td")
            .into_iter()
            .filter(|&td| self.doc.get_attribute(td, "data-key").as_deref() == Some(key))
            .map(|td| self.doc.text_content(td))
            .collect()
    }
}

#[test]
fn test_create_edit_delete_cycle() {
    let app = wire(MemoryStorage::new());
    let section = app.doc.first_by_class("tableSection").unwrap();
    assert_eq!(app.doc.style(section, "display").as_deref(), Some("none"));

    app.fill_and_save("Ada", "ada@example.com", &[0, 2]);
    app.fill_and_save("Grace", "grace@example.com", &[]);

    assert_eq!(app.store.borrow().len(), 2);
    assert_eq!(app.cell_texts("name"), vec!["Ada", "Grace"]);
    assert_eq!(app.cell_texts("skills"), vec!["rust, sql", "-"]);
    assert_eq!(app.doc.style(section, "display").as_deref(), Some("block"));
    assert_eq!(*app.next_id.borrow(), 3);

    // Edit Grace through the table
    let edit = app.doc.elements_by_class(app.table_root(), "up_btn")[1];
    app.doc.click(edit);
    assert!(app.form.borrow().as_ref().unwrap().is_editing());
    assert_eq!(app.doc.value(app.control("name", 0)), "Grace");
    assert_eq!(app.doc.scroll_requests(), 1);

    app.doc.input_text(app.control("name", 0), "Grace Hopper");
    app.doc.click(app.control("save", 0));

    assert_eq!(app.store.borrow().len(), 2);
    let grace = app.store.borrow().find(&UserId::from(2i64)).unwrap();
    assert_eq!(grace.get("name"), Some(&json!("Grace Hopper")));
    assert_eq!(app.cell_texts("name"), vec!["Ada", "Grace Hopper"]);
    assert!(!app.form.borrow().as_ref().unwrap().is_editing());

    // Delete Ada
    let delete = app.doc.elements_by_class(app.table_root(), "del_btn")[0];
    app.doc.click(delete);
    assert_eq!(app.cell_texts("name"), vec!["Grace Hopper"]);

    // Delete the last one hides the section
    let delete = app.doc.elements_by_class(app.table_root(), "del_btn")[0];
    app.doc.click(delete);
    assert!(app.store.borrow().is_empty());
    assert!(app.doc.children(app.table_root()).is_empty());
    assert_eq!(app.doc.style(section, "display").as_deref(), Some("none"));
}

#[test]
fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let app = wire(FileStorage::open(dir.path()).unwrap());
        app.fill_and_save("Ada", "ada@example.com", &[1]);
    }

    let app = wire(FileStorage::open(dir.path()).unwrap());
    assert_eq!(app.store.borrow().len(), 1);
    assert_eq!(app.cell_texts("skills"), vec!["go"]);

    let exported = app.store.borrow().export_data().unwrap();
    let restored: Vec<Record> = serde_json::from_str(&exported).unwrap();
    assert_eq!(restored, app.store.borrow().all());
}
