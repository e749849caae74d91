//! JSONL snapshot persistence for chat sessions.
use super::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionMetaRecord {
    schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
enum SessionRecord {
    Meta(SessionMetaRecord),
    Session(ChatSession),
}

pub(super) fn read_session_records(path: &Path) -> Result<Vec<ChatSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(path)
        .with_context(|| format!("failed to open chat session file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut sessions = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!("failed to read line {} from {}", index + 1, path.display())
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str::<SessionRecord>(&line).with_context(|| {
            format!(
                "failed to parse chat session line {} in {}",
                index + 1,
                path.display()
            )
        })?;
        match record {
            SessionRecord::Meta(meta) => {
                if meta.schema_version > SESSION_SCHEMA_VERSION {
                    bail!(
                        "unsupported chat session schema version {} in {} (supported up to {})",
                        meta.schema_version,
                        path.display(),
                        SESSION_SCHEMA_VERSION
                    );
                }
            }
            SessionRecord::Session(session) => sessions.push(session),
        }
    }

    Ok(sessions)
}

pub(super) fn write_session_records_atomic<'a>(
    path: &Path,
    sessions: impl IntoIterator<Item = &'a ChatSession>,
) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "chat-sessions".to_string());

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = path.with_file_name(format!(".{file_name}.{timestamp}.tmp"));

    let result = write_snapshot(&temp_path, sessions).and_then(|()| {
        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "failed to atomically replace chat session file {} with {}",
                path.display(),
                temp_path.display()
            )
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_snapshot<'a>(
    temp_path: &Path,
    sessions: impl IntoIterator<Item = &'a ChatSession>,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(temp_path)
        .with_context(|| format!("failed to open temp file {}", temp_path.display()))?;

    let meta = SessionRecord::Meta(SessionMetaRecord {
        schema_version: SESSION_SCHEMA_VERSION,
    });
    writeln!(file, "{}", serde_json::to_string(&meta)?)
        .with_context(|| format!("failed to write meta to {}", temp_path.display()))?;

    for session in sessions {
        let line = serde_json::to_string(&SessionRecord::Session(session.clone()))?;
        writeln!(file, "{line}").with_context(|| {
            format!("failed to write chat session to {}", temp_path.display())
        })?;
    }

    file.sync_all()
        .with_context(|| format!("failed to sync temp file {}", temp_path.display()))
}
