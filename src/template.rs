//! Template selection and application for note writes.
//!
//! A note's template kind is chosen from the first folder of its path
//! (`daily-notes/`, `projects/`, `areas/`, each also matching a numbered
//! variant like `06_daily-notes/`). Creation synthesizes a header block
//! with the kind's required fields; updates with `preserve_format` merge
//! the caller's header into the existing one and re-serialize.
//!
//! Header and body templates carry date tokens (`{ date:YYYY-MM-DD }`,
//! `{ date:YYYY }`, `{ time:HH:mm }`). Substitution is a single pass over
//! that vocabulary; a token that does not resolve is removed rather than
//! written out literally.

use chrono::{DateTime, Datelike, Local, NaiveDate};

use crate::config::TemplatesConfig;
use crate::frontmatter::{self, HeaderBlock, HeaderValue};

/// The template kinds the gateway knows how to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Daily,
    Project,
    Area,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily-note",
            Self::Project => "project",
            Self::Area => "area",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip a numbered-folder prefix (`06_daily-notes` -> `daily-notes`).
fn strip_folder_number(folder: &str) -> &str {
    match folder.split_once('_') {
        Some((digits, rest)) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            rest
        }
        _ => folder,
    }
}

/// Pick a template kind from the note path. First match wins; notes at the
/// vault root never match.
pub fn detect(path: &str, config: &TemplatesConfig) -> Option<TemplateKind> {
    let first_folder = path.split('/').next().filter(|f| *f != path)?;
    let canonical = strip_folder_number(first_folder);

    let matches = |folders: &[String]| folders.iter().any(|f| f == canonical);
    if matches(&config.daily_folders) {
        Some(TemplateKind::Daily)
    } else if matches(&config.project_folders) {
        Some(TemplateKind::Project)
    } else if matches(&config.area_folders) {
        Some(TemplateKind::Area)
    } else {
        None
    }
}

// ── Token substitution ────────────────────────────────────────────────────────

fn resolve_token(inner: &str, now: &DateTime<Local>) -> Option<String> {
    let inner = inner.trim();
    if let Some(format) = inner.strip_prefix("date:") {
        return match format.trim() {
            "YYYY-MM-DD" => Some(now.format("%Y-%m-%d").to_string()),
            "YYYY" => Some(now.format("%Y").to_string()),
            _ => Some(String::new()), // unknown date format: token removed
        };
    }
    if let Some(format) = inner.strip_prefix("time:") {
        return match format.trim() {
            "HH:mm" => Some(now.format("%H:%M").to_string()),
            _ => Some(String::new()),
        };
    }
    None // not a template token; braces belong to the note text
}

/// Substitute every `{ date:... }` / `{ time:... }` token in `input`.
/// Unknown formats inside the token vocabulary resolve to nothing, so a
/// broken placeholder is never persisted.
pub fn substitute_tokens(input: &str, now: &DateTime<Local>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('{') {
        let (before, from_open) = rest.split_at(open);
        out.push_str(before);
        match from_open.find('}') {
            Some(close) => {
                let inner = &from_open[1..close];
                match resolve_token(inner, now) {
                    Some(resolved) => out.push_str(&resolved),
                    None => out.push_str(&from_open[..=close]),
                }
                rest = &from_open[close + 1..];
            }
            None => {
                out.push_str(from_open);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `true` when a header value still carries an unresolved placeholder
/// (either our token vocabulary or a legacy `{{...}}` one).
fn is_broken_token(value: &HeaderValue) -> bool {
    let broken = |s: &str| {
        s.contains("{{")
            || s.contains("{ date:")
            || s.contains("{date:")
            || s.contains("{ time:")
            || s.contains("{time:")
    };
    match value {
        HeaderValue::String(s) => broken(s),
        HeaderValue::List(items) => items.iter().any(|item| broken(item)),
        _ => false,
    }
}

// ── Header + body synthesis ───────────────────────────────────────────────────

fn header_template(kind: TemplateKind) -> HeaderBlock {
    let mut header = HeaderBlock::new();
    match kind {
        TemplateKind::Daily => {
            header.set("creation-date", "{ date:YYYY-MM-DD }".into());
            header.set("type", "daily-note".into());
            header.set(
                "tags",
                HeaderValue::List(vec!["journal/daily".to_string()]),
            );
        }
        TemplateKind::Project => {
            header.set("type", "project".into());
            header.set("created", "{ date:YYYY-MM-DD }".into());
            header.set("status", "active".into());
            header.set("priority", "medium".into());
            header.set("tags", HeaderValue::List(vec!["project".to_string()]));
        }
        TemplateKind::Area => {
            header.set("type", "area".into());
            header.set("created", "{ date:YYYY-MM-DD }".into());
            header.set("status", "active".into());
            header.set("review-frequency", "monthly".into());
            header.set("tags", HeaderValue::List(vec!["area".to_string()]));
        }
    }
    header
}

fn body_template(kind: TemplateKind, note_name: &str) -> String {
    match kind {
        TemplateKind::Daily => "# Daily Note for { date:YYYY-MM-DD }\n\n\
             ## Morning Intentions\n- [ ] \n\n\
             ## Key Events\n- \n\n\
             ## Evening Reflection\n- \n"
            .to_string(),
        TemplateKind::Project => format!(
            "# {note_name}\n\n\
             ## Goal\n- \n\n\
             ## Next Actions\n- [ ] \n\n\
             ## Progress Log\n### {{ date:YYYY-MM-DD }} - Project started\n- \n"
        ),
        TemplateKind::Area => format!(
            "# {note_name}\n\n\
             ## Standards\n- \n\n\
             ## Key Metrics\n- \n\n\
             ## Review Notes\n### {{ date:YYYY-MM-DD }} - Area setup\n- \n"
        ),
    }
}

/// Derive a human title from the final path segment:
/// `projects/data-pipeline.md` -> `Data Pipeline`.
fn note_title(path: &str) -> String {
    let stem = path
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .trim_end_matches(".md");
    stem.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outcome of the create-side template pass.
pub struct CreateOutcome {
    pub content: String,
    pub applied: Option<TemplateKind>,
}

/// Apply the create template: when the path selects a kind and the caller's
/// content does not already begin with a header block, synthesize the
/// kind's header (tokens resolved against `now`) and prepend it. An empty
/// caller body gets the kind's scaffold.
pub fn apply_create_template(
    path: &str,
    content: &str,
    now: &DateTime<Local>,
    config: &TemplatesConfig,
) -> CreateOutcome {
    let Some(kind) = detect(path, config) else {
        return CreateOutcome {
            content: content.to_string(),
            applied: None,
        };
    };

    let (existing_header, body) = frontmatter::parse(content);
    if existing_header.is_some() {
        return CreateOutcome {
            content: content.to_string(),
            applied: None,
        };
    }

    let mut header = HeaderBlock::new();
    let template = header_template(kind);
    for (key, value) in template.iter() {
        let resolved = match value {
            HeaderValue::String(s) => HeaderValue::String(substitute_tokens(s, now)),
            other => other.clone(),
        };
        header.set(key, resolved);
    }

    let body = if body.trim().is_empty() {
        substitute_tokens(&body_template(kind, &note_title(path)), now)
    } else {
        body.to_string()
    };

    CreateOutcome {
        content: frontmatter::compose(&header, &body),
        applied: Some(kind),
    }
}

/// Merge an update into an existing note, preserving its header block.
///
/// The caller's header values win where provided; remaining existing keys
/// are kept, except those whose value is a broken placeholder. The body is
/// replaced with the caller's body.
pub fn merge_preserving_format(existing: &str, new_content: &str) -> String {
    let (existing_header, _) = frontmatter::parse(existing);
    let (new_header, new_body) = frontmatter::parse(new_content);

    let mut merged = existing_header.unwrap_or_default();
    if let Some(new_header) = new_header {
        for (key, value) in new_header.iter() {
            merged.set(key, value.clone());
        }
    }
    let broken: Vec<String> = merged
        .iter()
        .filter(|(_, value)| is_broken_token(value))
        .map(|(key, _)| key.to_string())
        .collect();
    for key in &broken {
        merged.remove(key);
    }

    frontmatter::compose(&merged, new_body)
}

// ── Daily-note date consistency ───────────────────────────────────────────────

/// Parse `YYYY-MM-DD` from the start of a string.
fn leading_date(text: &str) -> Option<NaiveDate> {
    let candidate = text.get(..10)?;
    NaiveDate::parse_from_str(candidate, "%Y-%m-%d").ok()
}

fn first_heading_year(body: &str) -> Option<i32> {
    let heading = body.lines().find(|line| line.starts_with("# "))?;
    let bytes = heading.as_bytes();
    let mut idx = 0;
    while idx + 4 <= bytes.len() {
        if bytes[idx..idx + 4].iter().all(|b| b.is_ascii_digit())
            && (idx == 0 || !bytes[idx - 1].is_ascii_digit())
            && (idx + 4 == bytes.len() || !bytes[idx + 4].is_ascii_digit())
        {
            return std::str::from_utf8(&bytes[idx..idx + 4]).ok()?.parse().ok();
        }
        idx += 1;
    }
    None
}

/// Advisory check for daily notes: the filename date, the `creation-date`
/// header in the new content, and the year in the first top-level heading
/// should agree. Disagreements produce warnings; the write still proceeds.
pub fn daily_date_warnings(path: &str, new_content: &str, config: &TemplatesConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if detect(path, config) != Some(TemplateKind::Daily) {
        return warnings;
    }
    let filename = path.rsplit('/').next().unwrap_or(path);
    let Some(path_date) = leading_date(filename.trim_end_matches(".md")) else {
        return warnings;
    };

    let (header, body) = frontmatter::parse(new_content);
    if let Some(header_date) = header
        .as_ref()
        .and_then(|h| h.get("creation-date"))
        .and_then(|v| v.as_str())
        .and_then(leading_date)
    {
        if header_date != path_date {
            warnings.push(format!(
                "creation-date {header_date} does not match the note's filename date {path_date}"
            ));
        }
    }

    if let Some(heading_year) = first_heading_year(body) {
        if heading_year != path_date.year() {
            warnings.push(format!(
                "heading year {heading_year} does not match the note's filename date {path_date}"
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> TemplatesConfig {
        TemplatesConfig::default()
    }

    fn at(date: &str) -> DateTime<Local> {
        let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        Local.from_local_datetime(&naive).unwrap()
    }

    #[test]
    fn detect_matches_bare_and_numbered_folders() {
        let cfg = config();
        assert_eq!(detect("daily-notes/2025-02-04.md", &cfg), Some(TemplateKind::Daily));
        assert_eq!(detect("06_daily-notes/2025-02-04.md", &cfg), Some(TemplateKind::Daily));
        assert_eq!(detect("projects/alpha.md", &cfg), Some(TemplateKind::Project));
        assert_eq!(detect("02_projects/alpha.md", &cfg), Some(TemplateKind::Project));
        assert_eq!(detect("areas/health.md", &cfg), Some(TemplateKind::Area));
        assert_eq!(detect("random/note.md", &cfg), None);
        assert_eq!(detect("note.md", &cfg), None);
    }

    #[test]
    fn substitute_resolves_known_tokens() {
        let now = at("2025-02-04");
        assert_eq!(
            substitute_tokens("date: { date:YYYY-MM-DD }", &now),
            "date: 2025-02-04"
        );
        assert_eq!(substitute_tokens("year { date:YYYY }!", &now), "year 2025!");
        assert_eq!(substitute_tokens("at { time:HH:mm }", &now), "at 09:30");
        assert_eq!(substitute_tokens("{date:YYYY-MM-DD}", &now), "2025-02-04");
    }

    #[test]
    fn substitute_removes_unknown_formats() {
        let now = at("2025-02-04");
        assert_eq!(substitute_tokens("x{ date:MM/DD/YY }y", &now), "xy");
        assert_eq!(substitute_tokens("x{ time:HH:mm:ss }y", &now), "xy");
    }

    #[test]
    fn substitute_leaves_plain_braces_alone() {
        let now = at("2025-02-04");
        assert_eq!(substitute_tokens("code { x + 1 }", &now), "code { x + 1 }");
        assert_eq!(substitute_tokens("open { brace", &now), "open { brace");
    }

    #[test]
    fn create_applies_daily_header() {
        let now = at("2025-02-04");
        let outcome = apply_create_template("daily-notes/2025-02-04.md", "# day", &now, &config());
        assert_eq!(outcome.applied, Some(TemplateKind::Daily));
        let (header, body) = frontmatter::parse(&outcome.content);
        let header = header.unwrap();
        assert_eq!(header.get("creation-date"), Some(&"2025-02-04".into()));
        assert_eq!(header.get("type"), Some(&"daily-note".into()));
        assert_eq!(body, "# day");
    }

    #[test]
    fn create_skips_content_with_existing_header() {
        let now = at("2025-02-04");
        let content = "---\ntype: custom\n---\nbody";
        let outcome = apply_create_template("daily-notes/x.md", content, &now, &config());
        assert!(outcome.applied.is_none());
        assert_eq!(outcome.content, content);
    }

    #[test]
    fn create_outside_template_folders_is_untouched() {
        let now = at("2025-02-04");
        let outcome = apply_create_template("misc/idea.md", "hello", &now, &config());
        assert!(outcome.applied.is_none());
        assert_eq!(outcome.content, "hello");
    }

    #[test]
    fn create_with_empty_body_uses_scaffold() {
        let now = at("2025-02-04");
        let outcome =
            apply_create_template("projects/data-pipeline.md", "", &now, &config());
        assert_eq!(outcome.applied, Some(TemplateKind::Project));
        let (_, body) = frontmatter::parse(&outcome.content);
        assert!(body.starts_with("# Data Pipeline"));
        assert!(body.contains("2025-02-04 - Project started"));
        assert!(!body.contains("{ date:"));
    }

    #[test]
    fn merge_keeps_existing_and_takes_new_values() {
        let existing = "---\ntype: project\nstatus: active\npriority: medium\n---\nold body";
        let update = "---\nstatus: done\n---\nnew body";
        let merged = merge_preserving_format(existing, update);
        let (header, body) = frontmatter::parse(&merged);
        let header = header.unwrap();
        assert_eq!(header.get("type"), Some(&"project".into()));
        assert_eq!(header.get("status"), Some(&"done".into()));
        assert_eq!(header.get("priority"), Some(&"medium".into()));
        assert_eq!(body, "new body");
    }

    #[test]
    fn merge_drops_broken_placeholder_keys() {
        let existing = "---\ncreated: {{date}}\ntype: project\n---\nbody";
        let merged = merge_preserving_format(existing, "fresh body");
        let (header, body) = frontmatter::parse(&merged);
        let header = header.unwrap();
        assert!(header.get("created").is_none());
        assert_eq!(header.get("type"), Some(&"project".into()));
        assert_eq!(body, "fresh body");
    }

    #[test]
    fn merge_without_existing_header_keeps_new_content_shape() {
        let merged = merge_preserving_format("plain old note", "---\ntype: note\n---\nnew");
        let (header, body) = frontmatter::parse(&merged);
        assert_eq!(header.unwrap().get("type"), Some(&"note".into()));
        assert_eq!(body, "new");
    }

    #[test]
    fn daily_warning_on_header_mismatch() {
        let warnings = daily_date_warnings(
            "daily-notes/2025-02-04.md",
            "---\ncreation-date: 2026-02-04\n---\n# 2026",
            &config(),
        );
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("2026-02-04"));
        assert!(warnings[0].contains("2025-02-04"));
        assert!(warnings[1].contains("2026"));
    }

    #[test]
    fn daily_no_warning_when_dates_agree() {
        let warnings = daily_date_warnings(
            "daily-notes/2025-02-04.md",
            "---\ncreation-date: 2025-02-04\n---\n# Daily Note for 2025-02-04",
            &config(),
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn non_daily_paths_are_never_checked() {
        let warnings = daily_date_warnings(
            "projects/2025-02-04.md",
            "---\ncreation-date: 2026-01-01\n---\n# 2026",
            &config(),
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn note_title_formats_stem() {
        assert_eq!(note_title("projects/data-pipeline.md"), "Data Pipeline");
        assert_eq!(note_title("areas/health.md"), "Health");
    }
}
