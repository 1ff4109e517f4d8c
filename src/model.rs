use serde::{Deserialize, Deserializer, Serialize};

// JSON exports carry `null` for blank cells; CSV cells are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonRecord {
    #[serde(deserialize_with = "deserialize_record_id")]
    pub id: i64,
    #[serde(default)]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub lesson_title: Option<String>,
    #[serde(default)]
    pub the_hook: Option<String>,
    #[serde(default)]
    pub key_terms_1: Option<String>,
    #[serde(default)]
    pub key_terms_1_def: Option<String>,
    #[serde(default)]
    pub key_terms_2: Option<String>,
    #[serde(default)]
    pub key_terms_2_def: Option<String>,
    #[serde(default)]
    pub core_concepts_1: Option<String>,
    #[serde(default)]
    pub core_concepts_1_def: Option<String>,
    #[serde(default)]
    pub core_concepts_2: Option<String>,
    #[serde(default)]
    pub core_concepts_2_def: Option<String>,
    #[serde(default)]
    pub synthesis: Option<String>,
    #[serde(default)]
    pub connect_to_your_life: Option<String>,
    #[serde(default)]
    pub key_takeaways_1: Option<String>,
    #[serde(default)]
    pub key_takeaways_2: Option<String>,
    #[serde(default)]
    pub attached_to_chapter: Option<String>,
    #[serde(default)]
    pub attached_to_course: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub chapter_id: Option<String>,
}

impl LessonRecord {
    pub fn title(&self) -> &str {
        self.lesson_title.as_deref().unwrap_or_default()
    }

    pub fn course_title(&self) -> &str {
        self.attached_to_course.as_deref().unwrap_or_default()
    }

    #[cfg(test)]
    pub fn sample(id: i64, lesson_title: &str, attached_to_course: &str) -> Self {
        let text = |field: &str| Some(format!("{field} for {id}"));
        Self {
            id,
            lesson_id: Some(format!("lesson-{id}")),
            lesson_title: Some(lesson_title.to_string()),
            the_hook: text("hook"),
            key_terms_1: text("term one"),
            key_terms_1_def: text("term one definition"),
            key_terms_2: text("term two"),
            key_terms_2_def: text("term two definition"),
            core_concepts_1: text("concept one"),
            core_concepts_1_def: text("concept one definition"),
            core_concepts_2: text("concept two"),
            core_concepts_2_def: text("concept two definition"),
            synthesis: text("synthesis"),
            connect_to_your_life: text("connection"),
            key_takeaways_1: text("takeaway one"),
            key_takeaways_2: text("takeaway two"),
            attached_to_chapter: text("chapter"),
            attached_to_course: Some(attached_to_course.to_string()),
            created_at: Some("2025-09-06 06:46:12.889595+00".to_string()),
            updated_at: Some("2025-09-08 00:38:49.106076+00".to_string()),
            chapter_id: Some("061c1782".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvLessonRow {
    pub id: i64,
    pub lesson_id: String,
    pub lesson_title: String,
    pub the_hook: String,
    pub key_terms_1: String,
    pub key_terms_1_def: String,
    pub key_terms_2: String,
    pub key_terms_2_def: String,
    pub core_concepts_1: String,
    pub core_concepts_1_def: String,
    pub core_concepts_2: String,
    pub core_concepts_2_def: String,
    pub synthesis: String,
    pub connect_to_your_life: String,
    pub key_takeaways_1: String,
    pub key_takeaways_2: String,
    pub attached_to_chapter: String,
    pub attached_to_course: String,
    pub created_at: String,
    pub updated_at: String,
    pub chapter_id: String,
}

impl From<CsvLessonRow> for LessonRecord {
    fn from(row: CsvLessonRow) -> Self {
        Self {
            id: row.id,
            lesson_id: Some(row.lesson_id),
            lesson_title: Some(row.lesson_title),
            the_hook: Some(row.the_hook),
            key_terms_1: Some(row.key_terms_1),
            key_terms_1_def: Some(row.key_terms_1_def),
            key_terms_2: Some(row.key_terms_2),
            key_terms_2_def: Some(row.key_terms_2_def),
            core_concepts_1: Some(row.core_concepts_1),
            core_concepts_1_def: Some(row.core_concepts_1_def),
            core_concepts_2: Some(row.core_concepts_2),
            core_concepts_2_def: Some(row.core_concepts_2_def),
            synthesis: Some(row.synthesis),
            connect_to_your_life: Some(row.connect_to_your_life),
            key_takeaways_1: Some(row.key_takeaways_1),
            key_takeaways_2: Some(row.key_takeaways_2),
            attached_to_chapter: Some(row.attached_to_chapter),
            attached_to_course: Some(row.attached_to_course),
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
            chapter_id: Some(row.chapter_id),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Number(i64),
    Text(String),
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawRecordId::deserialize(deserializer)? {
        RawRecordId::Number(value) => Ok(value),
        RawRecordId::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid record id {text:?}: {err}"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub course_id: i64,
    pub chapter_number: u32,
    pub lesson_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEntry {
    pub title: String,
    pub course_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonEntry {
    pub title: String,
    pub course_id: i64,
    pub chapter_number: u32,
    pub lesson_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumDocument {
    pub mapping_version: u32,
    pub table: String,
    pub prerequisite_scripts: Vec<String>,
    pub batch_script_pattern: String,
    pub courses: Vec<CourseEntry>,
    pub lessons: Vec<LessonEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSelection {
    pub kind: String,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub id: i64,
    pub lesson_title: Option<String>,
    pub attached_to_course: Option<String>,
    pub course_id: Option<i64>,
    pub chapter_number: Option<u32>,
    pub lesson_number: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub report_version: u32,
    pub generated_at: String,
    pub input: String,
    pub input_format: String,
    pub input_sha256: String,
    pub mapping_version: u32,
    pub records_available: usize,
    pub selection: ReportSelection,
    pub slice: String,
    pub selected_count: usize,
    pub generated_count: usize,
    pub mapped: Vec<ReportEntry>,
    pub defaulted: Vec<ReportEntry>,
    pub skipped: Vec<ReportEntry>,
}
