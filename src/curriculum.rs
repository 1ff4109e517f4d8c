use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::model::{CurriculumDocument, LessonRecord, Position};

const CURRICULUM_MAPPING_VERSION: u32 = 1;
const BATCH_PLACEHOLDER: &str = "{batch}";
const DEFAULT_CURRICULUM: &str = include_str!("../data/curriculum.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Mapped(Position),
    CourseDefault(Position),
    Unresolved,
}

impl Resolution {
    pub fn position(self) -> Option<Position> {
        match self {
            Self::Mapped(position) | Self::CourseDefault(position) => Some(position),
            Self::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Curriculum {
    document: CurriculumDocument,
    lessons: HashMap<String, Position>,
    courses: HashMap<String, i64>,
}

impl Curriculum {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Self::from_json(&raw)
                    .with_context(|| format!("invalid curriculum mapping: {}", path.display()))
            }
            None => Self::embedded(),
        }
    }

    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_CURRICULUM).context("invalid embedded curriculum mapping")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let document: CurriculumDocument =
            serde_json::from_str(raw).context("failed to parse curriculum json")?;
        Self::from_document(document)
    }

    pub fn from_document(document: CurriculumDocument) -> Result<Self> {
        if document.mapping_version != CURRICULUM_MAPPING_VERSION {
            bail!(
                "unsupported mapping_version {} (expected {})",
                document.mapping_version,
                CURRICULUM_MAPPING_VERSION
            );
        }
        if !document.batch_script_pattern.contains(BATCH_PLACEHOLDER) {
            bail!(
                "batch_script_pattern must contain {BATCH_PLACEHOLDER}: {}",
                document.batch_script_pattern
            );
        }

        let mut courses = HashMap::with_capacity(document.courses.len());
        let mut course_ids = HashSet::with_capacity(document.courses.len());
        for course in &document.courses {
            let title = course.title.trim();
            if courses.insert(title.to_string(), course.course_id).is_some() {
                bail!("duplicate course title: {title}");
            }
            if !course_ids.insert(course.course_id) {
                bail!("duplicate course_id {} (course {title})", course.course_id);
            }
        }

        let mut lessons = HashMap::with_capacity(document.lessons.len());
        for lesson in &document.lessons {
            if !course_ids.contains(&lesson.course_id) {
                bail!(
                    "lesson {:?} references unknown course_id {}",
                    lesson.title,
                    lesson.course_id
                );
            }
            if lesson.chapter_number == 0 || lesson.lesson_number == 0 {
                bail!(
                    "lesson {:?} has a zero chapter or lesson number",
                    lesson.title
                );
            }

            let position = Position {
                course_id: lesson.course_id,
                chapter_number: lesson.chapter_number,
                lesson_number: lesson.lesson_number,
            };
            if lessons.insert(lesson.title.clone(), position).is_some() {
                bail!("duplicate lesson title: {:?}", lesson.title);
            }
        }

        debug!(
            mapping_version = document.mapping_version,
            courses = courses.len(),
            lessons = lessons.len(),
            "curriculum mapping loaded"
        );

        Ok(Self {
            document,
            lessons,
            courses,
        })
    }

    pub fn document(&self) -> &CurriculumDocument {
        &self.document
    }

    pub fn table(&self) -> &str {
        &self.document.table
    }

    pub fn lesson_position(&self, lesson_title: &str) -> Option<Position> {
        self.lessons.get(lesson_title).copied()
    }

    pub fn course_id(&self, course_title: &str) -> Option<i64> {
        self.courses.get(course_title.trim()).copied()
    }

    // Unknown titles of a known course land on chapter 1, lesson 1.
    pub fn resolve(&self, record: &LessonRecord) -> Resolution {
        if let Some(position) = self.lesson_position(record.title()) {
            return Resolution::Mapped(position);
        }

        match self.course_id(record.course_title()) {
            Some(course_id) => {
                warn!(
                    id = record.id,
                    lesson_title = %record.title(),
                    course_id,
                    "using default chapter/lesson for unmapped lesson title"
                );
                Resolution::CourseDefault(Position {
                    course_id,
                    chapter_number: 1,
                    lesson_number: 1,
                })
            }
            None => {
                warn!(
                    id = record.id,
                    lesson_title = %record.title(),
                    course = %record.course_title().trim(),
                    "could not map lesson"
                );
                Resolution::Unresolved
            }
        }
    }

    pub fn prerequisites_for_batch(&self, batch: Option<usize>) -> Vec<String> {
        let mut scripts = self.document.prerequisite_scripts.clone();
        if let Some(batch) = batch {
            scripts.extend((1..batch).map(|earlier| {
                self.document
                    .batch_script_pattern
                    .replace(BATCH_PLACEHOLDER, &earlier.to_string())
            }));
        }
        scripts
    }

    pub fn lesson_counts_by_course(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = self
            .document
            .courses
            .iter()
            .map(|course| (course.title.trim().to_string(), 0))
            .collect();
        for lesson in &self.document.lessons {
            if let Some(course) = self
                .document
                .courses
                .iter()
                .find(|course| course.course_id == lesson.course_id)
            {
                *counts.entry(course.title.trim().to_string()).or_default() += 1;
            }
        }
        counts
    }

    pub fn duplicate_positions(&self) -> Vec<(Position, Vec<String>)> {
        let mut by_position: HashMap<Position, Vec<String>> = HashMap::new();
        for (title, position) in &self.lessons {
            by_position.entry(*position).or_default().push(title.clone());
        }

        let mut duplicates: Vec<(Position, Vec<String>)> = by_position
            .into_iter()
            .filter(|(_, titles)| titles.len() > 1)
            .map(|(position, mut titles)| {
                titles.sort();
                (position, titles)
            })
            .collect();
        duplicates.sort_by_key(|(position, _)| {
            (
                position.course_id,
                position.chapter_number,
                position.lesson_number,
            )
        });
        duplicates
    }
}
