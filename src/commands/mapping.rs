use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::MappingArgs;
use crate::curriculum::Curriculum;
use crate::util::write_output;

pub fn run(args: MappingArgs) -> Result<()> {
    let curriculum = Curriculum::load(args.mapping_path.as_deref())?;
    let document = curriculum.document();
    let source = args
        .mapping_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "embedded".to_string());

    info!(
        source = %source,
        mapping_version = document.mapping_version,
        table = %document.table,
        courses = document.courses.len(),
        lessons = document.lessons.len(),
        prerequisites = document.prerequisite_scripts.len(),
        "curriculum mapping is valid"
    );

    for (course, lessons) in curriculum.lesson_counts_by_course() {
        let course_id = curriculum.course_id(&course);
        if lessons == 0 {
            warn!(
                course = %course,
                course_id,
                "course has no mapped lessons; its records fall back to chapter 1, lesson 1"
            );
        } else {
            info!(course = %course, course_id, lessons, "course lessons");
        }
    }

    for (position, titles) in curriculum.duplicate_positions() {
        warn!(
            course_id = position.course_id,
            chapter_number = position.chapter_number,
            lesson_number = position.lesson_number,
            titles = %titles.join(" | "),
            "position claimed by more than one lesson title"
        );
    }

    if args.dump {
        let mut rendered = serde_json::to_string_pretty(document)
            .context("failed to serialize curriculum mapping")?;
        rendered.push('\n');
        write_output(None, &rendered)?;
    }

    Ok(())
}
