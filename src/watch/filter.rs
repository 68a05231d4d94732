use std::path::Path;

use notify::EventKind;
use notify::event::ModifyKind;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Classify a notify event, returning `None` for noise.
///
/// Access events and metadata-only changes (mtime/atime/chmod) are dropped,
/// they would otherwise retrigger builds forever. Events that only touch
/// editor temp files are dropped as well.
pub(super) fn classify(event: &notify::Event) -> Option<ChangeKind> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Removed,
        EventKind::Modify(ModifyKind::Metadata(_)) => return None,
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => return None,
    };

    // Directory-level events may carry no path at all
    if !event.paths.is_empty() && event.paths.iter().all(|p| is_temp_file(p)) {
        return None;
    }

    Some(kind)
}

/// Check if path is a temp/backup file (editor artifacts).
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
