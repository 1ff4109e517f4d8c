use super::*;

pub fn run(args: GenerateArgs) -> Result<()> {
    let curriculum = Curriculum::load(args.mapping_path.as_deref())?;
    let selection = Selection::from_args(&args.selection)?;

    let mut source = load_source(&args.source)?;
    let records = std::mem::take(&mut source.records);
    let batch = select_batch(records, &selection, args.source.min_records)?;

    let header = ScriptHeader::for_selection(&curriculum, &selection, batch.records.len());
    let script = generate_script(&batch.records, &curriculum, &header);

    write_output(args.output.as_deref(), &script.sql)?;
    if let Some(path) = &args.output {
        info!(path = %path.display(), "wrote migration script");
    }

    let defaulted = script.count_matching(|r| matches!(r, Resolution::CourseDefault(_)));
    let skipped = script.count_matching(|r| matches!(r, Resolution::Unresolved));
    info!(
        selected = batch.records.len(),
        generated = script.generated_count(),
        mapped = script.count_matching(|r| matches!(r, Resolution::Mapped(_))),
        defaulted,
        skipped,
        "generate completed"
    );
    if defaulted > 0 {
        warn!(
            defaulted,
            "some records were placed at chapter 1, lesson 1 because their title is not mapped"
        );
    }

    if let Some(report_path) = &args.report_path {
        let report = build_report(&source, &selection, &batch, &curriculum, &script);
        write_json_pretty(report_path, &report)
            .with_context(|| format!("failed to write report {}", report_path.display()))?;
        info!(path = %report_path.display(), "wrote generate report");
    }

    Ok(())
}
