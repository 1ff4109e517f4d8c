use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ScriptHeader {
    pub table: String,
    pub title: String,
    pub prerequisites: Vec<String>,
    pub description: String,
}

impl ScriptHeader {
    pub(super) fn for_selection(
        curriculum: &Curriculum,
        selection: &Selection,
        selected_count: usize,
    ) -> Self {
        let subject = curriculum.table().replace('_', " ").to_uppercase();
        let (title, description) = match selection {
            Selection::Range {
                start,
                end,
                batch: Some(batch),
            } => (
                format!("MIGRATE {subject} DATA - BATCH {batch} (Entries {start}-{})", end - 1),
                format!("This imports batch {batch} of lesson content entries ({selected_count} selected)"),
            ),
            Selection::Range {
                start,
                end,
                batch: None,
            } => (
                format!("MIGRATE {subject} DATA - ENTRIES {start}-{}", end - 1),
                format!(
                    "This imports entries {start}-{} of the lesson content export ({selected_count} selected)",
                    end - 1
                ),
            ),
            Selection::Ids(_) => (
                format!("MIGRATE {subject} DATA - SELECTED ENTRIES"),
                format!("This imports {selected_count} selected lesson content entries"),
            ),
            Selection::All => (
                format!("MIGRATE {subject} DATA - ALL ENTRIES"),
                format!("This imports all {selected_count} lesson content entries"),
            ),
        };

        Self {
            table: curriculum.table().to_string(),
            title,
            prerequisites: curriculum.prerequisites_for_batch(selection.batch_number()),
            description,
        }
    }
}

pub(super) fn column_list_lines() -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::from("   ");

    for (index, column) in COLUMNS.iter().enumerate() {
        let separator = if index + 1 < COLUMNS.len() { "," } else { "" };
        let piece = format!(" {}{separator}", column.name());

        if current.len() > 3 && current.len() + piece.len() > COLUMN_LINE_WIDTH {
            lines.push(current);
            current = String::from("   ");
        }
        current.push_str(&piece);
    }
    lines.push(current);

    lines
}

// Zero tuples still yield a terminated, empty `VALUES` list.
pub(super) fn render_script(header: &ScriptHeader, tuples: &[String]) -> String {
    let mut lines = vec![
        RULE.to_string(),
        format!("-- {}", header.title),
        RULE.to_string(),
    ];

    if !header.prerequisites.is_empty() {
        lines.push("-- Execute AFTER running:".to_string());
        lines.extend(
            header
                .prerequisites
                .iter()
                .enumerate()
                .map(|(index, script)| format!("-- {}. {script}", index + 1)),
        );
        lines.push("--".to_string());
    }

    lines.push(format!("-- {}", header.description));
    lines.push(
        "-- Dollar-quoted strings ($$...$$) are used to avoid apostrophe escaping issues."
            .to_string(),
    );
    lines.push(RULE.to_string());
    lines.push(String::new());

    lines.push(format!("INSERT INTO {} (", header.table));
    lines.extend(column_list_lines());
    lines.push(") VALUES".to_string());
    lines.push(format!("{};", tuples.join(",\n")));
    lines.push(String::new());
    lines.push(format!("-- Generated {} entries", tuples.len()));

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

#[derive(Debug, Clone)]
pub(super) struct GeneratedScript {
    pub sql: String,
    pub records: Vec<EncodedRecord>,
}

impl GeneratedScript {
    pub(super) fn generated_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.tuple.is_some())
            .count()
    }

    pub(super) fn count_matching(&self, predicate: impl Fn(&Resolution) -> bool) -> usize {
        self.records
            .iter()
            .filter(|record| predicate(&record.resolution))
            .count()
    }
}

pub(super) fn generate_script(
    records: &[LessonRecord],
    curriculum: &Curriculum,
    header: &ScriptHeader,
) -> GeneratedScript {
    let encoded: Vec<EncodedRecord> = records
        .iter()
        .map(|record| encode_record(record, curriculum))
        .collect();

    let tuples: Vec<String> = encoded
        .iter()
        .filter_map(|record| record.tuple.clone())
        .collect();

    GeneratedScript {
        sql: render_script(header, &tuples),
        records: encoded,
    }
}
