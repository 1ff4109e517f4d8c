use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{InputFormat, SelectionArgs, SourceArgs};
use crate::model::{CsvLessonRow, LessonRecord};
use crate::util::{read_input, sha256_hex};

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub label: String,
    pub format: InputFormat,
    pub sha256: String,
    pub records: Vec<LessonRecord>,
}

pub fn load_source(args: &SourceArgs) -> Result<LoadedSource> {
    let label = args
        .input
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    let raw = read_input(args.input.as_deref())?;
    let (format, records) =
        parse_records(&raw, args.format).with_context(|| format!("failed to load {label}"))?;

    info!(
        input = %label,
        format = format.as_str(),
        records = records.len(),
        "parsed lesson records"
    );

    Ok(LoadedSource {
        label,
        format,
        sha256: sha256_hex(raw.as_bytes()),
        records,
    })
}

pub fn parse_records(raw: &str, format: InputFormat) -> Result<(InputFormat, Vec<LessonRecord>)> {
    if raw.trim().is_empty() {
        bail!("no input provided");
    }

    let format = match format {
        InputFormat::Auto => detect_format(raw),
        explicit => explicit,
    };

    let records = match format {
        InputFormat::Json => parse_json(raw)?,
        _ => parse_csv(raw)?,
    };

    Ok((format, records))
}

fn detect_format(raw: &str) -> InputFormat {
    match raw.trim_start_matches('\u{feff}').trim_start().chars().next() {
        Some('[') => InputFormat::Json,
        _ => InputFormat::Csv,
    }
}

fn parse_csv(raw: &str) -> Result<Vec<LessonRecord>> {
    let mut reader = csv::ReaderBuilder::new().from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CsvLessonRow>().enumerate() {
        let row = row.with_context(|| format!("failed to parse CSV record {}", index + 1))?;
        records.push(LessonRecord::from(row));
    }

    Ok(records)
}

fn parse_json(raw: &str) -> Result<Vec<LessonRecord>> {
    let values: Vec<Value> = serde_json::from_str(raw.trim_start_matches('\u{feff}'))
        .context("failed to parse JSON input as an array of lesson objects")?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<LessonRecord>(value)
                .with_context(|| format!("failed to parse JSON record at index {index}"))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Range {
        start: usize,
        end: usize,
        batch: Option<usize>,
    },
    Ids(Vec<i64>),
}

impl Selection {
    pub fn from_args(args: &SelectionArgs) -> Result<Self> {
        if let Some(batch) = args.batch {
            if batch == 0 {
                bail!("--batch is 1-based; got 0");
            }
            if args.batch_size == 0 {
                bail!("--batch-size must be positive");
            }
            let (Some(start), Some(end)) = (
                (batch - 1).checked_mul(args.batch_size),
                batch.checked_mul(args.batch_size),
            ) else {
                bail!(
                    "--batch {batch} with --batch-size {} overflows the record range",
                    args.batch_size
                );
            };
            return Ok(Self::Range {
                start,
                end,
                batch: Some(batch),
            });
        }

        match (args.start, args.end) {
            (Some(start), Some(end)) => {
                if start >= end {
                    bail!("--start ({start}) must be lower than --end ({end})");
                }
                Ok(Self::Range {
                    start,
                    end,
                    batch: None,
                })
            }
            (None, None) if !args.ids.is_empty() => Ok(Self::Ids(args.ids.clone())),
            (None, None) => Ok(Self::All),
            _ => bail!("--start and --end must be given together"),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Range { batch: Some(_), .. } => "batch",
            Self::Range { batch: None, .. } => "range",
            Self::Ids(_) => "ids",
        }
    }

    pub fn batch_number(&self) -> Option<usize> {
        match self {
            Self::Range { batch, .. } => *batch,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
    All,
    Full,
    AlreadyExtracted,
    Partial,
    IdList,
}

impl SliceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Full => "full",
            Self::AlreadyExtracted => "already-extracted",
            Self::Partial => "partial",
            Self::IdList => "id-list",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectedBatch {
    pub available: usize,
    pub kind: SliceKind,
    pub records: Vec<LessonRecord>,
}

pub fn select_batch(
    records: Vec<LessonRecord>,
    selection: &Selection,
    min_records: usize,
) -> Result<SelectedBatch> {
    let available = records.len();
    if available < min_records {
        bail!("need at least {min_records} lesson records, found {available}");
    }

    let (kind, selected) = match selection {
        Selection::All => (SliceKind::All, records),
        Selection::Range { start, end, .. } => slice_range(records, *start, *end),
        Selection::Ids(ids) => {
            for missing in ids
                .iter()
                .filter(|id| !records.iter().any(|record| record.id == **id))
            {
                warn!(id = missing, "requested record id not found in input");
            }
            let selected: Vec<LessonRecord> = records
                .into_iter()
                .filter(|record| ids.contains(&record.id))
                .collect();
            (SliceKind::IdList, selected)
        }
    };

    info!(
        available,
        selected = selected.len(),
        slice = kind.as_str(),
        first_id = selected.first().map(|record| record.id),
        last_id = selected.last().map(|record| record.id),
        "selected lesson batch"
    );

    Ok(SelectedBatch {
        available,
        kind,
        records: selected,
    })
}

fn slice_range(
    mut records: Vec<LessonRecord>,
    start: usize,
    end: usize,
) -> (SliceKind, Vec<LessonRecord>) {
    let available = records.len();

    if available >= end {
        records.truncate(end);
        return (SliceKind::Full, records.split_off(start));
    }

    if available == end - start {
        info!(
            available,
            start,
            end,
            "input size matches the batch length; treating it as the extracted batch"
        );
        return (SliceKind::AlreadyExtracted, records);
    }

    let clamped_start = start.min(available);
    warn!(
        available,
        start,
        end,
        selected = available - clamped_start,
        "input shorter than requested range; batch is partial"
    );
    (SliceKind::Partial, records.split_off(clamped_start))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_HEADER: &str = "id,lesson_id,lesson_title,the_hook,key_terms_1,key_terms_1_def,key_terms_2,key_terms_2_def,core_concepts_1,core_concepts_1_def,core_concepts_2,core_concepts_2_def,synthesis,connect_to_your_life,key_takeaways_1,key_takeaways_2,attached_to_chapter,attached_to_course,created_at,updated_at,chapter_id";

    fn records(count: usize) -> Vec<LessonRecord> {
        (0..count)
            .map(|index| LessonRecord::sample(100 + index as i64, "Title", "Course"))
            .collect()
    }

    fn ids(batch: &SelectedBatch) -> Vec<i64> {
        batch.records.iter().map(|record| record.id).collect()
    }

    fn range(start: usize, end: usize) -> Selection {
        Selection::Range {
            start,
            end,
            batch: None,
        }
    }

    #[test]
    fn parse_csv_handles_quoted_commas_and_newlines() {
        let raw = format!(
            "{CSV_HEADER}\n189,cc39db7c,\"Defining Ecstasy: The Meaning, Process, and Political Context\",\"What if, \"\"really\"\"\nmultiline?\",Ecstasy,,k2,d2,c1,cd1,c2,cd2,syn,conn,t1,t2,Chapter,\"The Politics of Ecstasy: Psychedelics, Consciousness, and Society\",2025-09-06 06:46:12.889595+00,2025-09-08 00:38:49.106076+00,061c1782\n"
        );

        let (format, records) = parse_records(&raw, InputFormat::Auto).expect("csv parses");
        assert_eq!(format, InputFormat::Csv);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id, 189);
        assert_eq!(
            record.title(),
            "Defining Ecstasy: The Meaning, Process, and Political Context"
        );
        assert_eq!(
            record.the_hook.as_deref(),
            Some("What if, \"really\"\nmultiline?")
        );
        assert_eq!(record.key_terms_1_def.as_deref(), Some(""));
        assert_eq!(record.chapter_id.as_deref(), Some("061c1782"));
    }

    #[test]
    fn parse_csv_rejects_missing_columns() {
        let raw = "id,lesson_id,lesson_title\n1,abc,Title\n";
        let err = parse_records(raw, InputFormat::Csv).expect_err("missing columns");
        assert!(format!("{err:#}").contains("CSV record 1"));
    }

    #[test]
    fn auto_detection_only_treats_arrays_as_json() {
        assert_eq!(detect_format("\u{feff}  [{\"id\": 1}]"), InputFormat::Json);
        assert_eq!(detect_format("  {\"id\": 1}"), InputFormat::Csv);
        assert_eq!(detect_format("id,lesson_id\n"), InputFormat::Csv);

        let err = parse_records("{\"id\": 1}\n{\"id\": 2}\n", InputFormat::Auto).expect_err("not an array");
        assert!(format!("{err:#}").contains("CSV record"), "error: {err:#}");
    }

    #[test]
    fn parse_json_accepts_nulls_missing_keys_and_string_ids() {
        let raw = r#"[
            {"id": 7, "lesson_title": "A", "the_hook": null},
            {"id": "8", "lesson_title": "B", "attached_to_course": "Course"}
        ]"#;

        let (format, records) = parse_records(raw, InputFormat::Auto).expect("json parses");
        assert_eq!(format, InputFormat::Json);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 7);
        assert_eq!(records[0].the_hook, None);
        assert_eq!(records[0].synthesis, None);
        assert_eq!(records[1].id, 8);
        assert_eq!(records[1].course_title(), "Course");
    }

    #[test]
    fn parse_json_names_the_bad_element() {
        let raw = r#"[{"id": 1}, {"id": "not-a-number"}]"#;
        let err = parse_records(raw, InputFormat::Json).expect_err("bad id");
        assert!(format!("{err:#}").contains("index 1"));
    }

    #[test]
    fn blank_input_is_fatal() {
        let err = parse_records(" \n\t", InputFormat::Auto).expect_err("blank input");
        assert!(err.to_string().contains("no input provided"));
    }

    #[test]
    fn too_few_records_is_fatal_and_names_counts() {
        let err = select_batch(records(19), &Selection::All, 20).expect_err("too few");
        assert_eq!(err.to_string(), "need at least 20 lesson records, found 19");
    }

    #[test]
    fn full_range_is_sliced_in_input_order() {
        let batch = select_batch(records(71), &range(40, 60), 20).expect("selects");
        assert_eq!(batch.kind, SliceKind::Full);
        assert_eq!(batch.available, 71);
        assert_eq!(ids(&batch), (140..160).collect::<Vec<_>>());
    }

    #[test]
    fn exact_batch_length_is_treated_as_already_extracted() {
        let batch = select_batch(records(20), &range(40, 60), 20).expect("selects");
        assert_eq!(batch.kind, SliceKind::AlreadyExtracted);
        assert_eq!(ids(&batch), (100..120).collect::<Vec<_>>());
    }

    #[test]
    fn short_input_is_clamped_to_a_partial_batch() {
        let batch = select_batch(records(50), &range(40, 60), 20).expect("selects");
        assert_eq!(batch.kind, SliceKind::Partial);
        assert_eq!(ids(&batch), (140..150).collect::<Vec<_>>());

        let batch = select_batch(records(25), &range(40, 60), 20).expect("selects");
        assert_eq!(batch.kind, SliceKind::Partial);
        assert!(batch.records.is_empty());
    }

    #[test]
    fn selected_length_is_requested_or_remaining() {
        for available in [20, 21, 39, 40, 45, 59, 60, 61, 100] {
            let batch = select_batch(records(available), &range(40, 60), 20).expect("selects");
            let expected = if available == 20 {
                20
            } else {
                20.min(available.saturating_sub(40))
            };
            assert_eq!(batch.records.len(), expected, "available {available}");
        }
    }

    #[test]
    fn id_selection_keeps_input_order() {
        let selection = Selection::Ids(vec![105, 101, 999]);
        let batch = select_batch(records(20), &selection, 20).expect("selects");
        assert_eq!(batch.kind, SliceKind::IdList);
        assert_eq!(ids(&batch), vec![101, 105]);
    }

    #[test]
    fn selection_from_batch_arguments() {
        let args = SelectionArgs {
            batch: Some(3),
            batch_size: 20,
            start: None,
            end: None,
            ids: Vec::new(),
        };
        let selection = Selection::from_args(&args).expect("valid");
        assert_eq!(
            selection,
            Selection::Range {
                start: 40,
                end: 60,
                batch: Some(3)
            }
        );
        assert_eq!(selection.kind(), "batch");
        assert_eq!(selection.batch_number(), Some(3));
    }

    #[test]
    fn selection_rejects_invalid_ranges() {
        let mut args = SelectionArgs {
            batch: Some(0),
            batch_size: 20,
            start: None,
            end: None,
            ids: Vec::new(),
        };
        assert!(Selection::from_args(&args).is_err());

        args.batch = None;
        args.start = Some(10);
        args.end = Some(10);
        assert!(Selection::from_args(&args).is_err());

        args.start = None;
        args.end = None;
        assert_eq!(Selection::from_args(&args).expect("valid"), Selection::All);
    }

    #[test]
    fn selection_rejects_batches_past_the_addressable_range() {
        let mut args = SelectionArgs {
            batch: Some(usize::MAX),
            batch_size: 20,
            start: None,
            end: None,
            ids: Vec::new(),
        };
        let err = Selection::from_args(&args).expect_err("end overflows");
        assert!(err.to_string().contains("overflows the record range"));

        args.batch = Some(2);
        args.batch_size = usize::MAX;
        assert!(Selection::from_args(&args).is_err());

        args.batch = Some(1);
        assert_eq!(
            Selection::from_args(&args).expect("first batch fits"),
            Selection::Range {
                start: 0,
                end: usize::MAX,
                batch: Some(1),
            }
        );
    }
}
