//! CLI argument definitions for the dtree binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Plain text: scalars bare, documents encoded
    Human,
    /// Every result as JSON
    Json,
}

/// Inspect and edit documents through path expressions
#[derive(Parser, Debug)]
#[command(name = "dtree")]
#[command(about = "dtree: path-addressed document trees")]
#[command(version)]
pub struct Cli {
    /// Document to read. Reads stdin when omitted or "-"
    #[arg(short, long, global = true, env = "DTREE_INPUT")]
    pub input: Option<PathBuf>,

    /// JSON file holding a pool configuration
    #[arg(long, global = true, env = "DTREE_POOL_CONFIG")]
    pub pool_config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "human")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the entry at a path
    Get(PathArgs),
    /// Write a value at a path and print the document
    Set(SetArgs),
    /// Remove every match of a path and print the document
    Delete(PathArgs),
    /// Rename fields with "path=>name;..." rules and print the document
    Transform(TransformArgs),
    /// Re-encode the document
    Encode(EncodeArgs),
    /// Print the document's schema
    Schema(EncodeArgs),
    /// Compare the document with another one
    Equals(EqualsArgs),
}

/// Arguments for commands addressing one path
#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Path expression, e.g. "order.lines.0.sku"
    pub path: String,
}

/// Arguments for the set command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Path expression to write
    pub path: String,

    /// Value as encoded text. Text that does not decode is stored as a string
    pub value: String,
}

/// Arguments for the transform command
#[derive(clap::Args, Debug)]
pub struct TransformArgs {
    /// Rename rules, e.g. "id=>number;lines.qty=>quantity"
    pub rules: String,
}

/// Arguments for the encode and schema commands
#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    /// Order object fields canonically
    #[arg(short, long)]
    pub canonical: bool,
}

/// Arguments for the equals command
#[derive(clap::Args, Debug)]
pub struct EqualsArgs {
    /// The document to compare against
    pub other: PathBuf,
}
