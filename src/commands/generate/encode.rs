use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Column {
    Id,
    LessonId,
    CourseId,
    ChapterNumber,
    LessonNumber,
    LessonTitle,
    TheHook,
    KeyTerms1,
    KeyTerms1Def,
    KeyTerms2,
    KeyTerms2Def,
    CoreConcepts1,
    CoreConcepts1Def,
    CoreConcepts2,
    CoreConcepts2Def,
    Synthesis,
    ConnectToYourLife,
    KeyTakeaways1,
    KeyTakeaways2,
    AttachedToChapter,
    AttachedToCourse,
    ChapterId,
    CreatedAt,
    UpdatedAt,
}

// Both the INSERT column list and every value tuple are rendered from this
// table, in this order.
pub(super) const COLUMNS: [Column; 24] = [
    Column::Id,
    Column::LessonId,
    Column::CourseId,
    Column::ChapterNumber,
    Column::LessonNumber,
    Column::LessonTitle,
    Column::TheHook,
    Column::KeyTerms1,
    Column::KeyTerms1Def,
    Column::KeyTerms2,
    Column::KeyTerms2Def,
    Column::CoreConcepts1,
    Column::CoreConcepts1Def,
    Column::CoreConcepts2,
    Column::CoreConcepts2Def,
    Column::Synthesis,
    Column::ConnectToYourLife,
    Column::KeyTakeaways1,
    Column::KeyTakeaways2,
    Column::AttachedToChapter,
    Column::AttachedToCourse,
    Column::ChapterId,
    Column::CreatedAt,
    Column::UpdatedAt,
];

impl Column {
    pub(super) fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::LessonId => "lesson_id",
            Self::CourseId => "course_id",
            Self::ChapterNumber => "chapter_number",
            Self::LessonNumber => "lesson_number",
            Self::LessonTitle => "lesson_title",
            Self::TheHook => "the_hook",
            Self::KeyTerms1 => "key_terms_1",
            Self::KeyTerms1Def => "key_terms_1_def",
            Self::KeyTerms2 => "key_terms_2",
            Self::KeyTerms2Def => "key_terms_2_def",
            Self::CoreConcepts1 => "core_concepts_1",
            Self::CoreConcepts1Def => "core_concepts_1_def",
            Self::CoreConcepts2 => "core_concepts_2",
            Self::CoreConcepts2Def => "core_concepts_2_def",
            Self::Synthesis => "synthesis",
            Self::ConnectToYourLife => "connect_to_your_life",
            Self::KeyTakeaways1 => "key_takeaways_1",
            Self::KeyTakeaways2 => "key_takeaways_2",
            Self::AttachedToChapter => "attached_to_chapter",
            Self::AttachedToCourse => "attached_to_course",
            Self::ChapterId => "chapter_id",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn render(self, record: &LessonRecord, position: Position) -> String {
        let text = |value: &Option<String>| dollar_quote(value.as_deref());

        match self {
            Self::Id => record.id.to_string(),
            Self::CourseId => position.course_id.to_string(),
            Self::ChapterNumber => position.chapter_number.to_string(),
            Self::LessonNumber => position.lesson_number.to_string(),
            Self::LessonId => text(&record.lesson_id),
            Self::LessonTitle => text(&record.lesson_title),
            Self::TheHook => text(&record.the_hook),
            Self::KeyTerms1 => text(&record.key_terms_1),
            Self::KeyTerms1Def => text(&record.key_terms_1_def),
            Self::KeyTerms2 => text(&record.key_terms_2),
            Self::KeyTerms2Def => text(&record.key_terms_2_def),
            Self::CoreConcepts1 => text(&record.core_concepts_1),
            Self::CoreConcepts1Def => text(&record.core_concepts_1_def),
            Self::CoreConcepts2 => text(&record.core_concepts_2),
            Self::CoreConcepts2Def => text(&record.core_concepts_2_def),
            Self::Synthesis => text(&record.synthesis),
            Self::ConnectToYourLife => text(&record.connect_to_your_life),
            Self::KeyTakeaways1 => text(&record.key_takeaways_1),
            Self::KeyTakeaways2 => text(&record.key_takeaways_2),
            Self::AttachedToChapter => text(&record.attached_to_chapter),
            Self::AttachedToCourse => text(&record.attached_to_course),
            Self::ChapterId => text(&record.chapter_id),
            Self::CreatedAt => text(&record.created_at),
            Self::UpdatedAt => text(&record.updated_at),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct EncodedRecord {
    pub id: i64,
    pub lesson_title: Option<String>,
    pub attached_to_course: Option<String>,
    pub resolution: Resolution,
    pub tuple: Option<String>,
}

pub(super) fn render_tuple(record: &LessonRecord, position: Position) -> String {
    let values: Vec<String> = COLUMNS
        .iter()
        .map(|column| column.render(record, position))
        .collect();
    format!("({})", values.join(", "))
}

pub(super) fn encode_record(record: &LessonRecord, curriculum: &Curriculum) -> EncodedRecord {
    let resolution = curriculum.resolve(record);

    EncodedRecord {
        id: record.id,
        lesson_title: record.lesson_title.clone(),
        attached_to_course: record.attached_to_course.clone(),
        resolution,
        tuple: resolution
            .position()
            .map(|position| render_tuple(record, position)),
    }
}
