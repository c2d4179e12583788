use aws_lambda_events::s3::S3Event;
use std::string::FromUtf8Error;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Upload event contains no records")]
    NoRecords,
    #[error("Upload record has no bucket name")]
    MissingBucket,
    #[error("Upload record has no object key")]
    MissingKey,
    #[error("Object key {key} is not valid UTF-8 once decoded: {source}")]
    KeyDecoding {
        key: String,
        #[source]
        source: FromUtf8Error,
    },
    #[error("Object key {0} does not name a file")]
    NotAFile(String),
}

/// The uploaded object one invocation works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReference {
    pub bucket: String,
    pub key: String,
    /// Endpoint, bucket and decoded key joined as-is.
    pub fetch_url: String,
    /// Same location with every path segment percent-encoded, safe to send.
    pub request_url: String,
    pub file_name: String,
}

impl UploadReference {
    /// Reads the first record of the notification. Further records are ignored.
    pub fn from_event(event: &S3Event, storage_endpoint: &str) -> Result<Self, IntakeError> {
        let record = event.records.first().ok_or(IntakeError::NoRecords)?;
        if event.records.len() > 1 {
            log::warn!(
                "Upload event carries {} records, only the first is processed",
                event.records.len()
            );
        }

        let bucket = record
            .s3
            .bucket
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(IntakeError::MissingBucket)?;
        let raw_key = record
            .s3
            .object
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(IntakeError::MissingKey)?;

        Self::new(storage_endpoint, bucket, &decode_object_key(raw_key)?)
    }

    pub fn new(storage_endpoint: &str, bucket: &str, key: &str) -> Result<Self, IntakeError> {
        let endpoint = storage_endpoint.trim_end_matches('/');
        let fetch_url = format!("{}/{}/{}", endpoint, bucket, key);
        let request_url = format!(
            "{}/{}/{}",
            endpoint,
            urlencoding::encode(bucket),
            encode_path(key)
        );
        let file_name = fetch_url.rsplit('/').next().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(IntakeError::NotAFile(key.to_string()));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            fetch_url,
            request_url,
            file_name,
        })
    }
}

/// Percent-encodes each `/`-separated segment so `#`, `?` and spaces stay in the path.
fn encode_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// S3 notification keys are form-encoded: `+` stands for a space, the rest is
/// percent-encoded UTF-8.
pub fn decode_object_key(raw: &str) -> Result<String, IntakeError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|source| IntakeError::KeyDecoding {
            key: raw.to_string(),
            source,
        })
}
