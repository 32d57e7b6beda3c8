//! Output formatting helpers for human-readable and JSON output.

use dtree::{Document, Entry};

use crate::cli::Format;

/// Print a lookup result.
pub fn print_entry(entry: &Entry<'_>, format: Format) -> dtree::Result<()> {
    match (entry, format) {
        (Entry::Value(value), Format::Human) => println!("{value}"),
        (Entry::Value(value), Format::Json) => println!("{}", value.to_json()),
        (Entry::Object(doc), _) => println!("{}", doc.encode(false)?),
        (Entry::List(list), _) => println!("{}", list.encode(false)?),
    }
    Ok(())
}

/// Print a whole document.
pub fn print_document(doc: &Document<'_>, canonical: bool, format: Format) -> dtree::Result<()> {
    match format {
        Format::Human => println!("{}", doc.encode(canonical)?),
        Format::Json => println!("{}", serde_json::to_string_pretty(&doc.to_json()?)?),
    }
    Ok(())
}

/// Print a yes/no answer.
pub fn print_flag(flag: bool, format: Format) {
    match format {
        Format::Human => println!("{}", if flag { "yes" } else { "no" }),
        Format::Json => println!("{}", serde_json::json!({ "equal": flag })),
    }
}
