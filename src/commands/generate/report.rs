use super::*;

fn report_entry(record: &EncodedRecord) -> ReportEntry {
    let position = record.resolution.position();
    ReportEntry {
        id: record.id,
        lesson_title: record.lesson_title.clone(),
        attached_to_course: record.attached_to_course.clone(),
        course_id: position.map(|p| p.course_id),
        chapter_number: position.map(|p| p.chapter_number),
        lesson_number: position.map(|p| p.lesson_number),
    }
}

fn entries_where(
    script: &GeneratedScript,
    predicate: impl Fn(&Resolution) -> bool,
) -> Vec<ReportEntry> {
    script
        .records
        .iter()
        .filter(|record| predicate(&record.resolution))
        .map(report_entry)
        .collect()
}

pub(super) fn build_report(
    source: &LoadedSource,
    selection: &Selection,
    batch: &SelectedBatch,
    curriculum: &Curriculum,
    script: &GeneratedScript,
) -> GenerateReport {
    let (start, end, ids) = match selection {
        Selection::Range { start, end, .. } => (Some(*start), Some(*end), Vec::new()),
        Selection::Ids(ids) => (None, None, ids.clone()),
        Selection::All => (None, None, Vec::new()),
    };

    GenerateReport {
        report_version: REPORT_VERSION,
        generated_at: now_utc_string(),
        input: source.label.clone(),
        input_format: source.format.as_str().to_string(),
        input_sha256: source.sha256.clone(),
        mapping_version: curriculum.document().mapping_version,
        records_available: batch.available,
        selection: ReportSelection {
            kind: selection.kind().to_string(),
            start,
            end,
            ids,
        },
        slice: batch.kind.as_str().to_string(),
        selected_count: batch.records.len(),
        generated_count: script.generated_count(),
        mapped: entries_where(script, |r| matches!(r, Resolution::Mapped(_))),
        defaulted: entries_where(script, |r| matches!(r, Resolution::CourseDefault(_))),
        skipped: entries_where(script, |r| matches!(r, Resolution::Unresolved)),
    }
}
