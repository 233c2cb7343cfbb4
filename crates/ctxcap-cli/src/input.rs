use std::path::Path;

use anyhow::Context;

use ctxcap_bridge::HostEvent;
use ctxcap_types::Document;

/// Non-blank lines of `text` with their 1-based line numbers.
fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// One document per line. A `null` line stands for an event without data.
pub fn parse_documents(text: &str) -> anyhow::Result<Vec<Option<Document>>> {
    lines(text)
        .map(|(n, line)| {
            if line == "null" {
                return Ok(None);
            }
            Document::from_json_str(line)
                .map(Some)
                .with_context(|| format!("line {n}"))
        })
        .collect()
}

pub fn read_documents(path: &Path) -> anyhow::Result<Vec<Option<Document>>> {
    parse_documents(&read(path)?).with_context(|| format!("in {}", path.display()))
}

/// One host event per line.
pub fn parse_events(text: &str) -> anyhow::Result<Vec<HostEvent>> {
    lines(text)
        .map(|(n, line)| HostEvent::from_json_str(line).with_context(|| format!("line {n}")))
        .collect()
}

pub fn read_events(path: &Path) -> anyhow::Result<Vec<HostEvent>> {
    parse_events(&read(path)?).with_context(|| format!("in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxcap_bridge::HostEventKind;
    use std::io::Write;

    #[test]
    fn documents_skip_blank_lines() {
        let docs = parse_documents("{\"a\": 1}\n\n  null  \n{\"b\": {}}\n").unwrap();
        assert_eq!(docs.len(), 3);
        assert!(docs[0].as_ref().unwrap().contains_key("a"));
        assert!(docs[1].is_none());
        assert!(docs[2].as_ref().unwrap().contains_key("b"));
    }

    #[test]
    fn bad_document_names_the_line() {
        let err = parse_documents("{}\n[1, 2]\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn events_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"kind": "start_capture"}}"#).unwrap();
        writeln!(file, r#"{{"kind": "generic_track", "data": {{"action": "tap"}}}}"#).unwrap();
        writeln!(file, r#"{{"kind": "stop_capture", "data": {{"merge": false}}}}"#).unwrap();

        let events = read_events(file.path()).unwrap();
        let kinds: Vec<HostEventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                HostEventKind::StartCapture,
                HostEventKind::GenericTrack,
                HostEventKind::StopCapture
            ]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_documents(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(format!("{err:#}").contains("cannot read"));
    }
}
