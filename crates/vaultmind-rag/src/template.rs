//! Saving a response as a note.

use chrono::{DateTime, Local};

const DATE_PLACEHOLDER: &str = "{{DATE}}";
const CONTENT_PLACEHOLDER: &str = "{{CONTENT}}";

/// Fill the first `{{DATE}}` and the first `{{CONTENT}}` in `template`.
///
/// The date is substituted first, so a response that itself contains
/// `{{DATE}}` is left untouched.
pub fn render_note_template(template: &str, content: &str, date: &str) -> String {
    template
        .replacen(DATE_PLACEHOLDER, date, 1)
        .replacen(CONTENT_PLACEHOLDER, content, 1)
}

/// Date string used for `{{DATE}}`.
pub fn template_date(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// File name for a saved response, unique per millisecond.
pub fn note_file_name(now: DateTime<Local>) -> String {
    format!("Assistant Note {}.md", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vaultmind_core::defaults::NOTE_TEMPLATE;

    #[test]
    fn test_render_default_template() {
        let rendered = render_note_template(NOTE_TEMPLATE, "Popcorn pops.", "2024-03-01");
        assert!(rendered.contains("- Date : 2024-03-01"));
        assert!(rendered.contains("## Definition :\nPopcorn pops."));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        let rendered = render_note_template("{{DATE}} {{DATE}} {{CONTENT}} {{CONTENT}}", "c", "d");
        assert_eq!(rendered, "d {{DATE}} c {{CONTENT}}");
    }

    #[test]
    fn test_content_placeholders_survive() {
        let rendered = render_note_template("{{DATE}}\n{{CONTENT}}", "see {{DATE}}", "today");
        assert_eq!(rendered, "today\nsee {{DATE}}");
    }

    #[test]
    fn test_file_name_and_date() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap();
        assert_eq!(
            note_file_name(now),
            format!("Assistant Note {}.md", now.timestamp_millis())
        );
        assert_eq!(template_date(now), "2024-03-01 09:30:05");
    }
}
