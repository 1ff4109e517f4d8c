use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::GenerateArgs;
use crate::curriculum::{Curriculum, Resolution};
use crate::loader::{LoadedSource, SelectedBatch, Selection, load_source, select_batch};
use crate::model::{GenerateReport, LessonRecord, Position, ReportEntry, ReportSelection};
use crate::sql::dollar_quote;
use crate::util::{now_utc_string, write_json_pretty, write_output};

const REPORT_VERSION: u32 = 1;
const COLUMN_LINE_WIDTH: usize = 80;
const RULE: &str = "-- =====================================================";

mod encode;
mod render;
mod report;
mod run;

pub use run::run;

use encode::*;
use render::*;
use report::*;
