//! Form builder
//!
//! Renders declarative field descriptors into a live `<form>`, tracks the
//! values users type, and hands a `Record` to the caller on submit.
//!
//! # Example
//!
//! ```
//! use formdeck::dom::Document;
//! use formdeck::form::{FieldDescriptor, FieldRenderer, FieldType, FormCallbacks};
//!
//! let doc = Document::new();
//! let root = doc.create_element("div");
//! doc.set_attribute(root, "id", "form-root");
//! doc.append_child(doc.body(), root);
//!
//! let fields = vec![
//!     FieldDescriptor::new(FieldType::Text, "name").label("Name"),
//!     FieldDescriptor::new(FieldType::Submit, "save"),
//! ];
//! let form = FieldRenderer::new(&doc, "form-root", fields, FormCallbacks::new()).unwrap();
//! assert_eq!(form.control_count(), 2);
//! ```

pub mod descriptor;
pub mod error;
pub mod notice;
pub mod renderer;

pub use descriptor::{parse_descriptors, sanitize_descriptors, FieldDescriptor, FieldOption, FieldType, OptionAttr};
pub use error::{DescriptorError, FormError, FormResult};
pub use notice::{Notice, NoticeKind};
pub use renderer::{FieldRenderer, FormCallbacks, FormOptions};
