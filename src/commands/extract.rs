use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{ExtractArgs, ExtractFormat};
use crate::loader::{Selection, load_source, select_batch};
use crate::model::LessonRecord;
use crate::util::write_output;

pub fn run(args: ExtractArgs) -> Result<()> {
    let selection = Selection::from_args(&args.selection)?;
    let source = load_source(&args.source)?;
    let batch = select_batch(source.records, &selection, args.source.min_records)?;

    if batch.records.is_empty() {
        warn!(selection = selection.kind(), "extract selected no records");
    }

    let rendered = match args.to {
        ExtractFormat::Json => render_json(&batch.records)?,
        ExtractFormat::Csv => render_csv(&batch.records)?,
    };
    write_output(args.output.as_deref(), &rendered)?;

    info!(
        records = batch.records.len(),
        slice = batch.kind.as_str(),
        "extract completed"
    );

    Ok(())
}

fn render_json(records: &[LessonRecord]) -> Result<String> {
    let mut rendered =
        serde_json::to_string_pretty(records).context("failed to serialize records as json")?;
    rendered.push('\n');
    Ok(rendered)
}

fn render_csv(records: &[LessonRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to serialize record {} as csv", record.id))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| err.into_error())
        .context("failed to flush csv writer")?;
    String::from_utf8(bytes).context("csv output is not valid UTF-8")
}
