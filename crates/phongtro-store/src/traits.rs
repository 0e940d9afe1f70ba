use async_trait::async_trait;
use bytes::Bytes;
use phongtro_types::Listing;

use crate::error::StoreResult;

/// Image extensions accepted for upload. Files with any other extension are
/// silently skipped during create: not an error, not included in `images`.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Extract the extension from an uploaded filename if it is on the
/// allow-list (case-insensitive). Returns the extension as it appeared.
pub fn image_extension(file_name: &str) -> Option<&str> {
    let ext = file_name.rsplit_once('.')?.1;
    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        .then_some(ext)
}

/// MIME type for an allow-listed image extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Storage for image blobs, keyed by `{prefix}/{filename}` paths.
///
/// All implementations must satisfy these invariants:
/// - `put` returns a locator clients can dereference directly (a URL path
///   for the local backend, a public object URL for the remote one).
/// - `delete` and `delete_prefix` are idempotent: removing something that
///   is already gone is not an error.
/// - The store never interprets blob contents.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `path`, creating intermediate structure as
    /// needed, and return the public locator for the stored blob.
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> StoreResult<String>;

    /// Remove the blob at `path`.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Remove every blob under `prefix`.
    async fn delete_prefix(&self, prefix: &str) -> StoreResult<()>;

    /// List the paths of all blobs under `prefix`.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Map a locator previously returned by [`put`](Self::put) back to its
    /// store path. Returns `None` for locators this backend did not issue.
    fn key_for(&self, locator: &str) -> Option<String>;
}

/// Storage for the persisted room collection: one JSON array, read and
/// written as a unit.
///
/// `save` fully overwrites the previous content: no merge, no partial
/// write. The local backend goes through a temp-file-plus-rename replace;
/// the remote backend issues a single put.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Load the full collection from the backing store.
    async fn load(&self) -> StoreResult<Vec<Listing>>;

    /// Persist the full collection, replacing the previous content.
    async fn save(&self, rooms: &[Listing]) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_extensions_pass() {
        assert_eq!(image_extension("photo.jpg"), Some("jpg"));
        assert_eq!(image_extension("photo.JPEG"), Some("JPEG"));
        assert_eq!(image_extension("scan.webp"), Some("webp"));
    }

    #[test]
    fn disallowed_extensions_are_skipped() {
        assert_eq!(image_extension("notes.txt"), None);
        assert_eq!(image_extension("archive.tar.gz"), None);
        assert_eq!(image_extension("video.mp4"), None);
    }

    #[test]
    fn extensionless_names_are_skipped() {
        assert_eq!(image_extension("README"), None);
        assert_eq!(image_extension(""), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("JPEG"), "image/jpeg");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("gif"), "image/gif");
        assert_eq!(content_type_for("webp"), "image/webp");
    }
}
