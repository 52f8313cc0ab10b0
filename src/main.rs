//! formdeck CLI
//!
//! Command-line host for a file-backed record store:
//! - Add, update, delete and look up records
//! - Import/Export the record list
//! - Render the table or a form as HTML

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use formdeck::config::{generate_default_config, Config, LoggingConfig};
use formdeck::dom::Document;
use formdeck::form::{FieldRenderer, FormCallbacks};
use formdeck::record::{Record, UserId};
use formdeck::storage::{FileStorage, RecordStore};
use formdeck::table::{TableCallbacks, TableRenderer};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "formdeck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Declarative forms and tables over a local record store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage key override
    #[arg(short, long, global = true)]
    pub key: Option<String>,

    /// Data directory override
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stored records
    List {
        /// Print the raw JSON list
        #[arg(long)]
        json: bool,
    },

    /// Add a record from key=value pairs (values parse as JSON when they can)
    Add { fields: Vec<String> },

    /// Replace the record whose userId matches
    Update { fields: Vec<String> },

    /// Delete every record with this userId
    Delete { user_id: String },

    /// Show the record with this userId
    Find { user_id: String },

    /// Export records as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all records with a JSON list read from a file
    Import { path: PathBuf },

    /// Remove all records
    Clear,

    /// Show record count and persisted size
    Size,

    /// Print the records as an HTML table
    Table,

    /// Print a form rendered from a JSON descriptor file
    Form {
        descriptors: PathBuf,
        /// Pre-fill the form with this record
        #[arg(long)]
        edit: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(key) = cli.key {
        config.storage.key = key;
    }
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    init_logging(&config.logging)?;

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::List { json } => {
            let store = open_store(&config)?;
            if json {
                println!("{}", store.export_data()?);
            } else if store.is_empty() {
                println!("No records");
            } else {
                for record in store.records() {
                    println!("{}", serde_json::to_string(record)?);
                }
            }
        }

        Commands::Add { fields } => {
            let record = parse_fields(&fields)?;
            let mut store = open_store(&config)?;
            store.add(&record)?;
            match record.user_id() {
                Some(id) => println!("Added record {}", id),
                None => println!("Added record without userId"),
            }
        }

        Commands::Update { fields } => {
            let record = parse_fields(&fields)?;
            let mut store = open_store(&config)?;
            store.update(&record)?;
            println!("Updated {} fields", record.len());
        }

        Commands::Delete { user_id } => {
            let mut store = open_store(&config)?;
            let removed = store.delete(&UserId::parse(&user_id))?;
            println!("Deleted {} record(s)", removed);
        }

        Commands::Find { user_id } => {
            let store = open_store(&config)?;
            let record = store
                .find(&UserId::parse(&user_id))
                .ok_or_else(|| anyhow!("No record with userId {}", user_id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Export { output } => {
            let store = open_store(&config)?;
            let data = store.export_data()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    println!("Exported {} records to {:?}", store.len(), path);
                }
                None => println!("{}", data),
            }
        }

        Commands::Import { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {:?}", path))?;
            let mut store = open_store(&config)?;
            let count = store.import_data(&text)?;
            println!("Imported {} records", count);
        }

        Commands::Clear => {
            let mut store = open_store(&config)?;
            store.clear();
            println!("Cleared {:?}", store.key());
        }

        Commands::Size => {
            let store = open_store(&config)?;
            println!("{}", store.stats());
        }

        Commands::Table => {
            let store = open_store(&config)?;
            let options = config.table_options();

            let doc = Document::new();
            let section = doc.create_element("section");
            doc.add_class(section, &options.section_class);
            let root = doc.create_element("div");
            doc.set_attribute(root, "id", "table");
            doc.append_child(section, root);
            doc.append_child(doc.body(), section);

            let mut table = TableRenderer::with_options(&doc, "table", TableCallbacks::new(), options)?;
            table.render(store.records());
            println!("{}", doc.to_html(section));
        }

        Commands::Form { descriptors, edit } => {
            let json = std::fs::read_to_string(&descriptors)
                .with_context(|| format!("reading {:?}", descriptors))?;

            let doc = Document::new();
            let root = doc.create_element("div");
            doc.set_attribute(root, "id", "form");
            doc.append_child(doc.body(), root);

            let mut form = FieldRenderer::from_json(&doc, "form", &json, FormCallbacks::new(), config.form_options())?;

            if let Some(user_id) = edit {
                let store = open_store(&config)?;
                let record = store
                    .find(&UserId::parse(&user_id))
                    .ok_or_else(|| anyhow!("No record with userId {}", user_id))?;
                form.update_form_data(&record)?;
            }
            println!("{}", doc.to_html(root));
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("formdeck={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    let file = match &logging.file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {:?}", path))?,
        ),
        None => None,
    };

    match (logging.format.as_str(), file) {
        ("json", Some(file)) => registry.with(fmt::layer().json().with_writer(Mutex::new(file))).init(),
        ("json", None) => registry.with(fmt::layer().json().with_writer(std::io::stderr)).init(),
        (_, Some(file)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        (_, None) => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
    }
    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<RecordStore<FileStorage>> {
    let dir = config.data_dir();
    let backend = FileStorage::open(dir.clone())
        .with_context(|| format!("opening data directory {:?}", dir))?
        .with_quota(config.storage.quota_bytes);
    let store = RecordStore::new(config.storage.key.clone(), backend)?;
    tracing::debug!("Opened {:?}", store);
    Ok(store)
}

/// Build a record from `key=value` arguments
fn parse_fields(fields: &[String]) -> anyhow::Result<Record> {
    let mut record = Record::new();
    for field in fields {
        let (key, raw) = field
            .split_once('=')
            .with_context(|| format!("expected key=value, got {:?}", field))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        record.insert(key.trim(), value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fields() {
        let fields = vec![
            "userId=9".to_string(),
            "name=Ada Lovelace".to_string(),
            r#"skills=["A","C"]"#.to_string(),
        ];
        let record = parse_fields(&fields).unwrap();
        assert_eq!(record.user_id(), Some(UserId::from(9i64)));
        assert_eq!(record.get("name"), Some(&json!("Ada Lovelace")));
        assert_eq!(record.get("skills"), Some(&json!(["A", "C"])));

        assert!(parse_fields(&["oops".to_string()]).is_err());
    }
}
