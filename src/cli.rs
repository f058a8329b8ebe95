use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "onnxfixtures", version, about = "Generate ONNX test fixtures")]
pub struct Cli {
    /// Directory the .onnx files are written to
    #[arg(long, global = true, default_value = ".")]
    pub out_dir: String,

    /// Log filter (RUST_LOG syntax)
    #[arg(long, global = true, default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every registered fixture name
    List,
    /// Generate the named fixtures
    Gen {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Generate every registered fixture
    All {
        /// Only fixtures whose name contains this string
        #[arg(long)]
        filter: Option<String>,

        /// Worker threads
        #[arg(long, default_value_t = 1)]
        jobs: usize,
    },
    /// Summarize an existing ONNX file
    Inspect { file: String },
}
