//! Text-format codec collaborator boundary.
//!
//! The engine never inspects raw task file bytes itself: everything between
//! bytes and [`TaskRecord`] fields belongs to a [`Codec`] implementation
//! supplied by the embedding application. The engine stamps provenance
//! (source, branch, path, modification time) after decoding.

use crate::models::TaskRecord;
use crate::Result;

/// Round-trips task records through their on-disk text format.
///
/// Implementations own the id, status, priority, ordinal, and any extra
/// fields of the format; this engine owns provenance and caching.
pub trait Codec: Send + Sync {
    /// Decode one task file into a record.
    ///
    /// `path` is the repository-relative path of the file, provided for
    /// diagnostics and for formats that derive fields from the file name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Decode`](crate::AppError::Decode) when the bytes
    /// do not form a valid task file.
    fn decode(&self, bytes: &[u8], path: &str) -> Result<TaskRecord>;

    /// Encode a record back into file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Decode`](crate::AppError::Decode) when the record
    /// cannot be represented in the text format.
    fn encode(&self, task: &TaskRecord) -> Result<Vec<u8>>;

    /// Extract the task id from a bare file name, without reading content.
    ///
    /// Returns `None` for files that are not task files; the indexing and
    /// hydration phases skip those entirely. The returned id need not be
    /// normalized; callers normalize before comparing.
    fn task_id(&self, file_name: &str) -> Option<String>;
}
