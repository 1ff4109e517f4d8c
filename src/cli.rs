use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "course-content-sql",
    version,
    about = "Generate course_content SQL migrations from lesson content exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Generate(GenerateArgs),
    Extract(ExtractArgs),
    Mapping(MappingArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    Auto,
    Csv,
    Json,
}

impl InputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExtractFormat {
    Json,
    Csv,
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub format: InputFormat,

    #[arg(long, default_value_t = 20)]
    pub min_records: usize,
}

#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    #[arg(long, conflicts_with_all = ["start", "end", "ids"])]
    pub batch: Option<usize>,

    #[arg(long, default_value_t = 20)]
    pub batch_size: usize,

    #[arg(long, requires = "end", conflicts_with = "ids")]
    pub start: Option<usize>,

    #[arg(long, requires = "start", conflicts_with = "ids")]
    pub end: Option<usize>,

    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long)]
    pub mapping_path: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long = "to", value_enum, default_value_t = ExtractFormat::Json)]
    pub to: ExtractFormat,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct MappingArgs {
    #[arg(long)]
    pub mapping_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dump: bool,
}
