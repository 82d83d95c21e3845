//! Retire the object-storage variables from `.env` files.
//!
//! Live assignments to a deprecated key are commented out with an annotation and
//! counted. Commented-out assignments to a deprecated key (including the ones a
//! previous run annotated) are deleted. Everything else is kept byte for byte.
//! The first run that changes a file also adds a dated banner after the file's
//! leading comment block.

use chrono::{DateTime, SecondsFormat, Utc};
use std::io;
use std::path::Path;

/// Files looked at, relative to the working directory
pub const ENV_FILE_CANDIDATES: [&str; 6] = [
    ".env",
    ".env.local",
    ".env.development",
    ".env.production",
    ".env.test",
    ".env.example",
];

/// Keys of the retired object-storage configuration. Matched exactly.
pub const DEPRECATED_KEYS: [&str; 9] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_REGION",
    "AWS_S3_BUCKET",
    "AWS_S3_BUCKET_NAME",
    "S3_BUCKET",
    "S3_BUCKET_NAME",
    "S3_REGION",
    "S3_ENDPOINT",
];

const DEPRECATION_ANNOTATION: &str = "DEPRECATED (migration S3→Local):";

/// First line of the provenance banner; its presence marks a file as already processed.
pub const BANNER_HEADING: &str = "# Storage migrated from S3 to local disk (/uploads).";

/// Result of cleaning one file's contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub contents: String,
    /// Live lines commented out
    pub annotated: usize,
    /// Commented-out lines deleted
    pub removed: usize,
    pub banner_added: bool,
}

impl CleanupOutcome {
    pub fn changed(&self) -> bool {
        self.annotated > 0 || self.removed > 0
    }
}

/// What happened to one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCleanup {
    Missing,
    Unchanged,
    Cleaned { annotated: usize, removed: usize },
}

pub fn is_deprecated_key(key: &str) -> bool {
    DEPRECATED_KEYS.iter().any(|k| *k == key)
}

/// Key of a `KEY=value` or `export KEY=value` line.
fn assignment_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let line = line
        .strip_prefix("export")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim_start)
        .unwrap_or(line);
    let (key, _) = line.split_once('=')?;
    let key = key.trim_end();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some(key)
}

/// Body of a comment line with the `#` markers and a previous annotation removed.
fn comment_body(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?;
    let rest = rest.trim_start_matches(|c: char| c == '#' || c.is_whitespace());
    Some(
        rest.strip_prefix(DEPRECATION_ANNOTATION)
            .map(str::trim_start)
            .unwrap_or(rest),
    )
}

fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn banner(now: DateTime<Utc>) -> [String; 3] {
    [
        BANNER_HEADING.to_string(),
        format!(
            "# Deprecated storage variables cleaned on {}.",
            now.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        "#".to_string(),
    ]
}

/// Clean the contents of one env file.
pub fn clean_env_contents(input: &str, now: DateTime<Utc>) -> CleanupOutcome {
    let newline = if input.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing_newline = input.ends_with('\n');

    let mut output: Vec<String> = Vec::new();
    // Index in `output` of the first line that was a real setting in the input.
    let mut first_setting: Option<usize> = None;
    let mut annotated = 0;
    let mut removed = 0;
    let mut has_banner = false;

    for line in input.lines() {
        if line.trim_start().starts_with(BANNER_HEADING) {
            has_banner = true;
        }

        if let Some(body) = comment_body(line) {
            if assignment_key(body).is_some_and(is_deprecated_key) {
                removed += 1;
                continue;
            }
            output.push(line.to_string());
            continue;
        }

        if !is_comment_or_blank(line) && first_setting.is_none() {
            first_setting = Some(output.len());
        }

        if assignment_key(line).is_some_and(is_deprecated_key) {
            output.push(format!("# {} {}", DEPRECATION_ANNOTATION, line));
            annotated += 1;
        } else {
            output.push(line.to_string());
        }
    }

    let changed = annotated > 0 || removed > 0;
    let banner_added = changed && !has_banner;
    if banner_added {
        let at = first_setting.unwrap_or(output.len());
        let rest = output.split_off(at);
        output.extend(banner(now));
        output.extend(rest);
    }

    if !changed {
        return CleanupOutcome {
            contents: input.to_string(),
            annotated,
            removed,
            banner_added,
        };
    }

    let mut contents = output.join(newline);
    if trailing_newline && !contents.is_empty() {
        contents.push_str(newline);
    }

    CleanupOutcome {
        contents,
        annotated,
        removed,
        banner_added,
    }
}

/// Clean one file in place. A missing file is not an error.
pub fn clean_env_file(path: &Path, now: DateTime<Utc>) -> io::Result<FileCleanup> {
    let input = match std::fs::read_to_string(path) {
        Ok(input) => input,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "File not found, skipping");
            return Ok(FileCleanup::Missing);
        }
        Err(e) => return Err(e),
    };

    let outcome = clean_env_contents(&input, now);
    if !outcome.changed() {
        tracing::info!(path = %path.display(), "No deprecated variables");
        return Ok(FileCleanup::Unchanged);
    }

    std::fs::write(path, &outcome.contents)?;
    tracing::info!(
        path = %path.display(),
        annotated = outcome.annotated,
        removed = outcome.removed,
        banner_added = outcome.banner_added,
        "Env file cleaned"
    );

    Ok(FileCleanup::Cleaned {
        annotated: outcome.annotated,
        removed: outcome.removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap()
    }

    fn banner_count(contents: &str) -> usize {
        contents
            .lines()
            .filter(|l| l.starts_with(BANNER_HEADING))
            .count()
    }

    #[test]
    fn test_live_deprecated_line_is_annotated() {
        let out = clean_env_contents("AWS_REGION=eu-west-3\n", now());
        assert_eq!(out.annotated, 1);
        assert!(out.banner_added);
        assert!(out
            .contents
            .lines()
            .any(|l| l == "# DEPRECATED (migration S3→Local): AWS_REGION=eu-west-3"));
        assert_eq!(banner_count(&out.contents), 1);
        assert!(out.contents.contains("2025-03-01T10:30:00Z"));
    }

    #[test]
    fn test_second_run_removes_annotations_without_new_banner() {
        let first = clean_env_contents("AWS_REGION=eu-west-3\nPORT=3001\n", now());
        let second = clean_env_contents(&first.contents, now());
        assert_eq!(second.annotated, 0);
        assert_eq!(second.removed, 1);
        assert!(!second.banner_added);
        assert_eq!(banner_count(&second.contents), 1);
        assert!(!second.contents.contains("AWS_REGION"));
        assert!(second.contents.contains("PORT=3001"));

        let third = clean_env_contents(&second.contents, now());
        assert!(!third.changed());
        assert_eq!(third.contents, second.contents);
    }

    #[test]
    fn test_prefix_collision_is_not_deprecated() {
        let input = "AWS_REGIONAL_SETTING=foo\nS3_BUCKETS=a,b\n";
        let out = clean_env_contents(input, now());
        assert!(!out.changed());
        assert_eq!(out.contents, input);
    }

    #[test]
    fn test_commented_deprecated_line_is_deleted() {
        let input = "# AWS_ACCESS_KEY_ID=AKIA...\n#S3_BUCKET=old\n# keep me\nPORT=1\n";
        let out = clean_env_contents(input, now());
        assert_eq!(out.removed, 2);
        assert_eq!(out.annotated, 0);
        assert!(out.contents.contains("# keep me"));
        assert!(!out.contents.contains("AKIA"));
    }

    #[test]
    fn test_export_prefix_is_recognized() {
        let out = clean_env_contents("export S3_ENDPOINT=http://minio:9000\n", now());
        assert_eq!(out.annotated, 1);
        assert!(out.contents.contains(
            "# DEPRECATED (migration S3→Local): export S3_ENDPOINT=http://minio:9000"
        ));
    }

    #[test]
    fn test_banner_goes_after_leading_comment_block() {
        let input = "# App settings\n\nDATABASE_URL=postgres://db\nAWS_REGION=eu-west-3\n";
        let out = clean_env_contents(input, now());
        let lines: Vec<&str> = out.contents.lines().collect();
        assert_eq!(lines[0], "# App settings");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], BANNER_HEADING);
        assert_eq!(lines[5], "DATABASE_URL=postgres://db");
    }

    #[test]
    fn test_banner_precedes_annotated_first_setting() {
        let input = "# header\nAWS_REGION=eu-west-3\n";
        let out = clean_env_contents(input, now());
        let lines: Vec<&str> = out.contents.lines().collect();
        assert_eq!(lines[0], "# header");
        assert_eq!(lines[1], BANNER_HEADING);
        assert_eq!(
            lines[4],
            "# DEPRECATED (migration S3→Local): AWS_REGION=eu-west-3"
        );
    }

    #[test]
    fn test_trailing_newline_state_is_preserved() {
        let out = clean_env_contents("AWS_REGION=x", now());
        assert!(!out.contents.ends_with('\n'));

        let out = clean_env_contents("AWS_REGION=x\n", now());
        assert!(out.contents.ends_with('\n'));
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let out = clean_env_contents("PORT=1\r\nAWS_REGION=x\r\n", now());
        assert!(out.contents.ends_with("\r\n"));
        assert!(!out.contents.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_clean_env_file_missing_and_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".env.test");
        assert_eq!(
            clean_env_file(&missing, now()).unwrap(),
            FileCleanup::Missing
        );

        let path = dir.path().join(".env");
        std::fs::write(&path, "AWS_S3_BUCKET=b\nPORT=1\n").unwrap();
        assert_eq!(
            clean_env_file(&path, now()).unwrap(),
            FileCleanup::Cleaned {
                annotated: 1,
                removed: 0
            }
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# DEPRECATED (migration S3→Local): AWS_S3_BUCKET=b"));

        clean_env_file(&path, now()).unwrap();
        let settled = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            clean_env_file(&path, now()).unwrap(),
            FileCleanup::Unchanged
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), settled);
    }
}
