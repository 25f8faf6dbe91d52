use crate::error::StorageError;
use chrono::{DateTime, Datelike, Utc};
use futures::future::try_join_all;
use hmac::{Hmac, Mac};
use log::{info, warn};
use serde::Serialize;
use sha2::Sha256;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Common document, image, archive and code types
const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/zip",
    "application/x-rar-compressed",
    "text/javascript",
    "text/typescript",
    "text/html",
    "text/css",
    "application/json",
];

const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_FILES: usize = 5;
const DEFAULT_URL_TTL_MINUTES: i64 = 60;

/// A file received from a multipart request, fully buffered.
pub struct IncomingFile {
    pub original_filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// Attachment metadata recorded against assignments and submissions.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadResult {
    /// The store-relative blob name, recoverable from the upload URL
    pub fn blob_name(&self, base_url: &str) -> Option<String> {
        self.upload_url
            .strip_prefix(base_url)
            .map(|rest| rest.trim_start_matches('/').to_owned())
    }
}

#[derive(Clone, Copy)]
pub enum AttachmentKind {
    Assignment,
    Submission,
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment => write!(f, "assignment"),
            Self::Submission => write!(f, "submission"),
        }
    }
}

/// Filesystem-backed attachment store. Download links are minted with an
/// HMAC signature over the blob name and expiry so the serving route can
/// verify them without any per-link state.
pub struct BlobStore {
    root: PathBuf,
    base_url: String,
    signing_key: Vec<u8>,
}

impl BlobStore {
    pub fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
        signing_key: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            signing_key: signing_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, StorageError> {
        let root = std::env::var("BLOB_STORAGE_ROOT")
            .map_err(|_| StorageError::MissingConfig("BLOB_STORAGE_ROOT"))?;
        let base_url = std::env::var("BLOB_BASE_URL")
            .map_err(|_| StorageError::MissingConfig("BLOB_BASE_URL"))?;
        let signing_key = std::env::var("BLOB_SIGNING_KEY")
            .map_err(|_| StorageError::MissingConfig("BLOB_SIGNING_KEY"))?;
        Ok(Self::new(root, base_url, signing_key.into_bytes()))
    }

    /// Creates the storage root if it does not exist yet
    pub async fn initialize(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        info!("attachment store ready at {}", self.root.display());
        Ok(())
    }

    pub fn validate(&self, file: &IncomingFile, limits: &UploadLimits) -> Result<(), StorageError> {
        if file.bytes.len() > limits.max_file_size {
            return Err(StorageError::UploadRejected(format!(
                "File size ({:.2}MB) exceeds maximum allowed size ({:.2}MB)",
                file.bytes.len() as f64 / 1024.0 / 1024.0,
                limits.max_file_size as f64 / 1024.0 / 1024.0,
            )));
        }
        if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
            return Err(StorageError::UploadRejected(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                file.mime_type,
                ALLOWED_MIME_TYPES.join(", "),
            )));
        }
        Ok(())
    }

    /// Stores one file under `folder_path` with a fresh UUID filename that
    /// keeps the original extension.
    pub async fn upload(
        &self,
        file: IncomingFile,
        folder_path: &str,
        limits: &UploadLimits,
    ) -> Result<UploadResult, StorageError> {
        self.validate(&file, limits)?;

        let id = Uuid::new_v4();
        let filename = match Path::new(&file.original_filename)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };
        let blob_name = format!("{folder_path}/{filename}");
        let path = self.blob_path(&blob_name)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &file.bytes).await?;
        info!("stored {} as {blob_name}", file.original_filename);

        Ok(UploadResult {
            id,
            filename,
            original_filename: file.original_filename,
            file_size: file.bytes.len() as i64,
            mime_type: file.mime_type,
            upload_url: format!("{}/{blob_name}", self.base_url),
            uploaded_at: Utc::now(),
        })
    }

    /// Stores a batch of files. Validation failures abort the batch; files
    /// already written by the time one fails are left for the caller's
    /// cleanup pass.
    pub async fn upload_many(
        &self,
        files: Vec<IncomingFile>,
        folder_path: &str,
        limits: &UploadLimits,
    ) -> Result<Vec<UploadResult>, StorageError> {
        if files.len() > limits.max_files {
            return Err(StorageError::TooManyFiles {
                max: limits.max_files,
                received: files.len(),
            });
        }
        try_join_all(
            files
                .into_iter()
                .map(|file| self.upload(file, folder_path, limits)),
        )
        .await
    }

    /// Mints a time-limited download URL for an existing blob.
    pub fn generate_download_url(
        &self,
        blob_name: &str,
        expires_in_minutes: Option<i64>,
    ) -> Result<String, StorageError> {
        self.blob_path(blob_name)?;
        let minutes = expires_in_minutes.unwrap_or(DEFAULT_URL_TTL_MINUTES);
        let expires = (Utc::now() + chrono::Duration::minutes(minutes)).timestamp();
        let sig = self.signature_for(blob_name, expires)?;
        Ok(format!(
            "{}/{blob_name}?expires={expires}&sig={sig}",
            self.base_url
        ))
    }

    /// Checks the expiry and signature a download URL was minted with.
    pub fn verify_download_token(
        &self,
        blob_name: &str,
        expires: i64,
        sig: &str,
    ) -> Result<(), StorageError> {
        if Utc::now().timestamp() > expires {
            return Err(StorageError::LinkExpired);
        }
        let raw = hex::decode(sig).map_err(|_| StorageError::InvalidSignature)?;
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|_| StorageError::SigningKey)?;
        mac.update(signing_payload(blob_name, expires).as_bytes());
        mac.verify_slice(&raw)
            .map_err(|_| StorageError::InvalidSignature)
    }

    pub async fn read(&self, blob_name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.blob_path(blob_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, blob_name: &str) -> bool {
        match self.blob_path(blob_name) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    pub async fn delete(&self, blob_name: &str) -> Result<(), StorageError> {
        let path = self.blob_path(blob_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes each blob, logging and skipping the ones that fail
    pub async fn delete_many(&self, blob_names: &[String]) {
        for blob_name in blob_names {
            if let Err(e) = self.delete(blob_name).await {
                warn!("failed to delete blob {blob_name}: {e}");
            }
        }
    }

    /// `{kind}s/{year}/{month}/{course_id}/{entity_id}`, dated now
    pub fn folder_path(kind: AttachmentKind, course_id: &str, entity_id: &str) -> String {
        let now = Utc::now();
        format!(
            "{kind}s/{}/{:02}/{course_id}/{entity_id}",
            now.year(),
            now.month()
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn signature_for(&self, blob_name: &str, expires: i64) -> Result<String, StorageError> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|_| StorageError::SigningKey)?;
        mac.update(signing_payload(blob_name, expires).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Resolves a blob name under the root, rejecting anything that could
    /// escape it.
    fn blob_path(&self, blob_name: &str) -> Result<PathBuf, StorageError> {
        if blob_name.is_empty() || blob_name.contains('\\') {
            return Err(StorageError::InvalidBlobName);
        }
        let relative = Path::new(blob_name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidBlobName);
        }
        Ok(self.root.join(relative))
    }
}

fn signing_payload(blob_name: &str, expires: i64) -> String {
    format!("{blob_name}:{expires}")
}

/// Content type for the serving route, keyed off the stored extension
pub fn content_type(blob_name: &str) -> &'static str {
    match Path::new(blob_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("zip") => "application/zip",
        Some("rar") => "application/x-rar-compressed",
        Some("js") => "text/javascript",
        Some("ts") => "text/typescript",
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(root: &Path) -> BlobStore {
        BlobStore::new(root, "http://localhost:3000/files", b"test-key".to_vec())
    }

    fn pdf(bytes: Vec<u8>) -> IncomingFile {
        IncomingFile {
            original_filename: "report.pdf".into(),
            mime_type: "application/pdf".into(),
            bytes,
        }
    }

    #[tokio::test]
    async fn upload_writes_the_file_and_keeps_the_extension() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let result = store
            .upload(pdf(vec![1, 2, 3]), "assignments/2026/08/c1/a1", &UploadLimits::default())
            .await
            .unwrap();

        assert!(result.filename.ends_with(".pdf"));
        assert_eq!(result.original_filename, "report.pdf");
        assert_eq!(result.file_size, 3);
        let blob_name = result.blob_name(store.base_url()).unwrap();
        assert_eq!(store.read(&blob_name).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn oversized_uploads_are_rejected() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let limits = UploadLimits {
            max_file_size: 4,
            max_files: 5,
        };
        let err = store
            .upload(pdf(vec![0; 5]), "general", &limits)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadRejected(_)));
    }

    #[tokio::test]
    async fn disallowed_mime_types_are_rejected() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let file = IncomingFile {
            original_filename: "app.exe".into(),
            mime_type: "application/x-msdownload".into(),
            bytes: vec![0],
        };
        let err = store
            .upload(file, "general", &UploadLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadRejected(_)));
    }

    #[tokio::test]
    async fn batches_above_the_file_limit_are_rejected() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let files = (0..6).map(|_| pdf(vec![0])).collect();
        let err = store
            .upload_many(files, "general", &UploadLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::TooManyFiles {
                max: 5,
                received: 6
            }
        ));
    }

    #[test]
    fn signed_urls_verify_until_tampered_with() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let url = store
            .generate_download_url("a/b.pdf", Some(5))
            .unwrap();

        let query = url.split_once('?').unwrap().1;
        let mut expires = 0;
        let mut sig = String::new();
        for pair in query.split('&') {
            match pair.split_once('=').unwrap() {
                ("expires", v) => expires = v.parse().unwrap(),
                ("sig", v) => sig = v.to_owned(),
                _ => {}
            }
        }

        assert!(store.verify_download_token("a/b.pdf", expires, &sig).is_ok());
        assert!(matches!(
            store.verify_download_token("a/other.pdf", expires, &sig),
            Err(StorageError::InvalidSignature)
        ));
        assert!(matches!(
            store.verify_download_token("a/b.pdf", expires + 1, &sig),
            Err(StorageError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_links_are_refused_before_signature_checks() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let past = Utc::now().timestamp() - 10;
        assert!(matches!(
            store.verify_download_token("a/b.pdf", past, "00"),
            Err(StorageError::LinkExpired)
        ));
    }

    #[test]
    fn blob_names_cannot_escape_the_root() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        for name in ["../secret", "/etc/passwd", "a/../../b", ""] {
            assert!(matches!(
                store.generate_download_url(name, None),
                Err(StorageError::InvalidBlobName)
            ));
        }
    }

    #[tokio::test]
    async fn delete_removes_the_blob() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let result = store
            .upload(pdf(vec![9]), "general", &UploadLimits::default())
            .await
            .unwrap();
        let blob_name = result.blob_name(store.base_url()).unwrap();

        store.delete(&blob_name).await.unwrap();
        assert!(!store.exists(&blob_name).await);
        assert!(matches!(
            store.delete(&blob_name).await,
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn folder_paths_carry_kind_date_course_and_entity() {
        let path = BlobStore::folder_path(AttachmentKind::Submission, "c1", "s1");
        let segments: Vec<&str> = path.split('/').collect();
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], "submissions");
        assert_eq!(segments[3], "c1");
        assert_eq!(segments[4], "s1");
    }

    #[test]
    fn content_types_follow_the_extension() {
        assert_eq!(content_type("a/b.PDF"), "application/pdf");
        assert_eq!(content_type("a/b.png"), "image/png");
        assert_eq!(content_type("a/b"), "application/octet-stream");
    }
}
