//! Global constants for the artifact uploader.
//!
//! Defaults for the command line live here alongside the fixed object
//! attributes every upload carries.

// Default configuration
/// Default destination bucket
pub const DEFAULT_BUCKET: &str = "zk-p2p";

/// Default prefixes selecting files for gzip + tar.gz treatment
pub const DEFAULT_TAR_PREFIXES: &[&str] = &[
    "venmo_send.zkey",
    "venmo_registration.zkey",
    "hdfc_send.zkey",
    "hdfc_registration.zkey",
];

/// Default prefixes selecting files for upload as-is
pub const DEFAULT_PLAIN_PREFIXES: &[&str] = &[
    "venmo_send.wasm",
    "venmo_registration.wasm",
    "venmo_send_vkey.json",
    "venmo_registration_vkey.json",
    "hdfc_send.wasm",
    "hdfc_registration.wasm",
    "hdfc_send_vkey.json",
    "hdfc_registration_vkey.json",
];

/// Default path written by `init-config`
pub const DEFAULT_CONFIG_FILE: &str = "uploader.yaml";

// Object attributes
/// Canned ACL applied to every uploaded object
pub const OBJECT_ACL: &str = "public-read";

/// Content type applied to every uploaded object
pub const OBJECT_CONTENT_TYPE: &str = "binary/octet-stream";

// Derived artifact naming
/// Suffix of the plain gzip copy
pub const GZIP_EXTENSION: &str = ".gz";

/// Suffix of the single-member tar.gz archive
pub const TAR_GZ_EXTENSION: &str = ".tar.gz";

/// Name prefix of per-file scratch directories
pub const SCRATCH_DIR_PREFIX: &str = ".artifact-uploader-";

// Cloud storage constants
/// S3 upload part size (8MB, S3 minimum is 5MB)
pub const S3_UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Files above this size go through multipart upload (50MB)
pub const LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Read buffer for streaming request bodies (64KB)
pub const STREAMING_BUFFER_SIZE: usize = 64 * 1024;
