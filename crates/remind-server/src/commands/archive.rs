//! Archive command for listing completed events.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use remind_archive::Archive;

pub fn run<W: Write>(writer: &mut W, archive: &Archive, json: bool) -> Result<()> {
    let records = archive
        .read_all()
        .with_context(|| format!("failed to load {}", archive.path().display()))?;

    if json {
        let json = serde_json::to_string_pretty(&records).context("failed to serialize archive")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    writeln!(writer, "Archive: {}", archive.path().display())?;
    if records.is_empty() {
        writeln!(writer, "No completed events archived.")?;
        return Ok(());
    }

    for record in records {
        writeln!(
            writer,
            "- {} {}: {}",
            record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            record.title,
            record.description
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;
    use remind_archive::ArchiveRecord;

    fn render(archive: &Archive, json: bool) -> String {
        let mut output = Vec::new();
        run(&mut output, archive, json).unwrap();
        let output = String::from_utf8(output).unwrap();
        output.replace(&archive.path().display().to_string(), "[TEMP]/events.json")
    }

    #[test]
    fn archive_command_lists_records_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let archive = Archive::open(temp.path().join("events.json"));
        archive
            .append(ArchiveRecord {
                timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
                title: "Standup".to_string(),
                description: "Daily sync".to_string(),
            })
            .unwrap();
        archive
            .append(ArchiveRecord {
                timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 14, 30, 0).unwrap(),
                title: "Review".to_string(),
                description: "Code review".to_string(),
            })
            .unwrap();

        assert_snapshot!(render(&archive, false), @r"
        Archive: [TEMP]/events.json
        - 2026-01-15T09:00:00Z Standup: Daily sync
        - 2026-01-15T14:30:00Z Review: Code review
        ");
    }

    #[test]
    fn archive_command_reports_empty_archive() {
        let temp = tempfile::tempdir().unwrap();
        let archive = Archive::open(temp.path().join("events.json"));

        assert_snapshot!(render(&archive, false), @r"
        Archive: [TEMP]/events.json
        No completed events archived.
        ");
    }

    #[test]
    fn archive_command_json_is_parseable() {
        let temp = tempfile::tempdir().unwrap();
        let archive = Archive::open(temp.path().join("events.json"));
        archive
            .append(ArchiveRecord {
                timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
                title: "Standup".to_string(),
                description: "Daily sync".to_string(),
            })
            .unwrap();

        let parsed: Vec<ArchiveRecord> = serde_json::from_str(&render(&archive, true)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Standup");
    }
}
