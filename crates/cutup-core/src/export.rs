#![forbid(unsafe_code)]

//! Clipboard and file export of the current batch.

use time::Date;
use time::macros::format_description;

use crate::store::PhraseStore;

/// MIME type of downloaded phrase files.
pub const DOWNLOAD_MIME: &str = "text/plain;charset=utf-8";

/// Clipboard errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard API in this context (e.g. insecure origin).
    Unavailable,
    /// The write was rejected, typically by permissions.
    Denied(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "clipboard not available"),
            Self::Denied(msg) => write!(f, "clipboard write failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Download errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    Unavailable,
    Failed(String),
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "file download not available"),
            Self::Failed(msg) => write!(f, "download failed: {msg}"),
        }
    }
}

impl std::error::Error for DownloadError {}

/// Nothing to export: the store is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyBatch;

/// System clipboard boundary.
#[allow(async_fn_in_trait)]
pub trait ClipboardSink {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// File download boundary. Initiating the download is the whole contract;
/// completion is never awaited.
pub trait DownloadSink {
    fn download(&self, artifact: &DownloadArtifact) -> Result<(), DownloadError>;
}

/// A plain-text file ready to hand to the download sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ClipboardExporter {
    download_prefix: String,
}

impl ClipboardExporter {
    pub fn new(download_prefix: impl Into<String>) -> Self {
        Self {
            download_prefix: download_prefix.into(),
        }
    }

    /// Text for "copy all": phrases joined by `\n`.
    pub fn copy_all_text(&self, store: &PhraseStore) -> Result<String, EmptyBatch> {
        if store.is_empty() {
            return Err(EmptyBatch);
        }
        Ok(store.joined_text())
    }

    /// The download file for `store` dated `today`.
    pub fn artifact(&self, store: &PhraseStore, today: Date) -> Result<DownloadArtifact, EmptyBatch> {
        if store.is_empty() {
            return Err(EmptyBatch);
        }
        Ok(DownloadArtifact {
            file_name: self.file_name(today),
            mime: DOWNLOAD_MIME,
            content: store.joined_text(),
        })
    }

    /// `<prefix>-YYYY-MM-DD.txt`.
    pub fn file_name(&self, today: Date) -> String {
        let format = format_description!("[year]-[month]-[day]");
        let date = today
            .format(format)
            .unwrap_or_else(|_| today.to_string());
        format!("{}-{date}.txt", self.download_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhraseRecord;
    use pretty_assertions::assert_eq;
    use time::Month;

    fn exporter() -> ClipboardExporter {
        ClipboardExporter::new("cutup-phrases")
    }

    fn date(y: i32, m: Month, d: u8) -> Date {
        Date::from_calendar_date(y, m, d).unwrap()
    }

    fn store(texts: &[&str]) -> PhraseStore {
        let mut store = PhraseStore::new();
        store.replace(texts.iter().map(|t| PhraseRecord::new(*t, Vec::new())).collect());
        store
    }

    #[test]
    fn file_name_is_zero_padded_iso_date() {
        assert_eq!(
            exporter().file_name(date(2024, Month::May, 1)),
            "cutup-phrases-2024-05-01.txt"
        );
    }

    #[test]
    fn empty_store_has_nothing_to_export() {
        let empty = PhraseStore::new();
        assert_eq!(exporter().copy_all_text(&empty), Err(EmptyBatch));
        assert_eq!(
            exporter().artifact(&empty, date(2024, Month::May, 1)),
            Err(EmptyBatch)
        );
    }

    #[test]
    fn copy_all_joins_with_newline() {
        assert_eq!(exporter().copy_all_text(&store(&["aa", "bb"])), Ok("aa\nbb".into()));
    }

    #[test]
    fn artifact_is_plain_text_one_phrase_per_line() {
        let artifact = exporter()
            .artifact(&store(&["aa", "bb", "cc"]), date(2025, Month::December, 31))
            .unwrap();
        assert_eq!(artifact.file_name, "cutup-phrases-2025-12-31.txt");
        assert_eq!(artifact.mime, "text/plain;charset=utf-8");
        assert_eq!(artifact.content, "aa\nbb\ncc");
    }
}
