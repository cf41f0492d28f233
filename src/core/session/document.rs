//! Partially decoded JSON CVR export document
//!
//! Only the root mapping and the `Sessions` array are decoded. Every other root
//! value, and every session until it is touched, stays an unparsed
//! [`RawValue`] span that is written back verbatim. Keys are serialized in sorted
//! order.

use crate::core::reorder;
use crate::domain::{IdentifierTriple, Pseudonym, Result, SessionError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::value::RawValue;
use std::collections::BTreeMap;

/// Root key holding the session array
pub const SESSIONS_KEY: &str = "Sessions";
/// Root key holding the export software version
pub const VERSION_KEY: &str = "Version";
/// Session key holding the tabulator ID
pub const TABULATOR_ID_KEY: &str = "TabulatorId";
/// Session key holding the batch ID
pub const BATCH_ID_KEY: &str = "BatchId";
/// Session key holding the record ID
pub const RECORD_ID_KEY: &str = "RecordId";
/// Session key holding the image file glob
pub const IMAGE_MASK_KEY: &str = "ImageMask";

/// Returned by [`SessionDocument::version_string`] when no version can be read
pub const VERSION_NOT_AVAILABLE: &str = "NOT-AVAILABLE";

type RawObject = BTreeMap<String, Box<RawValue>>;

/// A JSON export document with individually addressable sessions
///
/// # Example
///
/// ```
/// use cvr_sanitizer::core::session::SessionDocument;
///
/// let doc = SessionDocument::parse(br#"{"Version":"5.2","Sessions":[]}"#).unwrap();
/// assert_eq!(doc.session_count(), 0);
/// assert_eq!(doc.version_string(), "5.2");
/// ```
#[derive(Debug)]
pub struct SessionDocument {
    root: RawObject,
    sessions: Vec<Box<RawValue>>,
    // Index-aligned with `sessions`
    pseudonyms: Vec<Option<Pseudonym>>,
}

impl SessionDocument {
    /// Parses the root object and splits `Sessions` into per-session spans
    ///
    /// A `null` session list is treated as empty.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, SessionError> {
        let root: RawObject =
            serde_json::from_slice(bytes).map_err(|e| SessionError::RootDecode(e.to_string()))?;

        let raw_sessions = root.get(SESSIONS_KEY).ok_or(SessionError::MissingSessions)?;
        let sessions: Option<Vec<Box<RawValue>>> = serde_json::from_str(raw_sessions.get())
            .map_err(|e| SessionError::SessionsDecode(e.to_string()))?;
        let sessions = sessions.unwrap_or_default();
        let pseudonyms = vec![None; sessions.len()];

        Ok(Self {
            root,
            sessions,
            pseudonyms,
        })
    }

    /// Number of sessions in the document
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Reads the identifier triple of session `index`
    ///
    /// # Errors
    ///
    /// - [`SessionError::MissingKey`] / [`SessionError::WrongType`] when a key is
    ///   absent or does not hold an integer
    /// - [`SessionError::IdentifierOutOfRange`] when an integer does not fit 32 bits
    pub fn identifiers(&self, index: usize) -> std::result::Result<IdentifierTriple, SessionError> {
        let session = self.decode_session(index)?;
        Ok(IdentifierTriple::new(
            self.u32_field(index, &session, TABULATOR_ID_KEY)?,
            self.u32_field(index, &session, BATCH_ID_KEY)?,
            self.u32_field(index, &session, RECORD_ID_KEY)?,
        ))
    }

    /// Replaces `RecordId` of session `index` with the pseudonym string
    pub fn set_record_id(
        &mut self,
        index: usize,
        pseudonym: &Pseudonym,
    ) -> std::result::Result<(), SessionError> {
        self.replace_field(index, RECORD_ID_KEY, pseudonym.as_str())?;
        self.pseudonyms[index] = Some(pseudonym.clone());
        Ok(())
    }

    /// Reads the `ImageMask` string of session `index`
    pub fn image_mask(&self, index: usize) -> std::result::Result<String, SessionError> {
        let session = self.decode_session(index)?;
        let raw = session
            .get(IMAGE_MASK_KEY)
            .ok_or_else(|| SessionError::MissingKey {
                index,
                key: IMAGE_MASK_KEY,
                span_base64: self.span_base64(index),
            })?;
        serde_json::from_str(raw.get()).map_err(|e| SessionError::WrongType {
            index,
            key: IMAGE_MASK_KEY,
            message: e.to_string(),
            span_base64: self.span_base64(index),
        })
    }

    /// Replaces `ImageMask` of session `index`
    pub fn set_image_mask(
        &mut self,
        index: usize,
        mask: &str,
    ) -> std::result::Result<(), SessionError> {
        self.replace_field(index, IMAGE_MASK_KEY, mask)
    }

    /// Best-effort read of the root `Version` string
    pub fn version_string(&self) -> String {
        let version = self
            .root
            .get(VERSION_KEY)
            .and_then(|raw| serde_json::from_str::<String>(raw.get()).ok());
        match version {
            Some(version) => version,
            None => {
                tracing::debug!("Unable to read version string from JSON");
                VERSION_NOT_AVAILABLE.to_string()
            }
        }
    }

    /// Pseudonyms recorded so far, index-aligned with the sessions
    pub fn pseudonyms(&self) -> &[Option<Pseudonym>] {
        &self.pseudonyms
    }

    /// Serializes the document with sessions emitted in `order`
    ///
    /// Each pseudonym in `order` selects the first not yet emitted session that
    /// recorded it. A pseudonym with no such session is a consistency error.
    pub fn serialize(&self, order: &[Pseudonym]) -> Result<Vec<u8>> {
        let labels: Vec<&str> = self
            .pseudonyms
            .iter()
            .map(|p| p.as_ref().map_or("", Pseudonym::as_str))
            .collect();
        let arranged = reorder::arrange(&self.sessions, &labels, order)?;

        let sessions = serde_json::value::to_raw_value(&arranged)
            .map_err(|e| SessionError::Encode(e.to_string()))?;

        let mut root: BTreeMap<&str, &RawValue> = self
            .root
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
            .collect();
        root.insert(SESSIONS_KEY, &sessions);

        let bytes = serde_json::to_vec(&root).map_err(|e| SessionError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    fn decode_session(&self, index: usize) -> std::result::Result<RawObject, SessionError> {
        let raw = self
            .sessions
            .get(index)
            .ok_or(SessionError::IndexOutOfRange {
                index,
                count: self.sessions.len(),
            })?;
        serde_json::from_str(raw.get()).map_err(|e| SessionError::SessionDecode {
            index,
            message: e.to_string(),
            span_base64: self.span_base64(index),
        })
    }

    fn u32_field(
        &self,
        index: usize,
        session: &RawObject,
        key: &'static str,
    ) -> std::result::Result<u32, SessionError> {
        let raw = session.get(key).ok_or_else(|| SessionError::MissingKey {
            index,
            key,
            span_base64: self.span_base64(index),
        })?;

        let wrong_type = |message: String| SessionError::WrongType {
            index,
            key,
            message,
            span_base64: self.span_base64(index),
        };
        let number: serde_json::Number =
            serde_json::from_str(raw.get()).map_err(|e| wrong_type(e.to_string()))?;

        let out_of_range = || SessionError::IdentifierOutOfRange {
            index,
            key,
            value: raw.get().trim().to_string(),
        };
        if let Some(value) = number.as_u64() {
            u32::try_from(value).map_err(|_| out_of_range())
        } else if number.as_i64().is_some() || is_integer_literal(raw.get()) {
            // Integers beyond i64/u64 decode as floats
            Err(out_of_range())
        } else {
            Err(wrong_type(format!("{number} is not an integer")))
        }
    }

    fn replace_field(
        &mut self,
        index: usize,
        key: &'static str,
        value: &str,
    ) -> std::result::Result<(), SessionError> {
        let mut session = self.decode_session(index)?;
        let encoded =
            serde_json::value::to_raw_value(value).map_err(|e| SessionError::Encode(e.to_string()))?;
        session.insert(key.to_string(), encoded);

        self.sessions[index] = serde_json::value::to_raw_value(&session)
            .map_err(|e| SessionError::Encode(e.to_string()))?;
        Ok(())
    }

    fn span_base64(&self, index: usize) -> String {
        self.sessions
            .get(index)
            .map(|raw| BASE64.encode(raw.get()))
            .unwrap_or_default()
    }
}

/// Whether `text` is JSON integer syntax: optional `-` then digits only
fn is_integer_literal(text: &str) -> bool {
    let digits = text.trim();
    let digits = digits.strip_prefix('-').unwrap_or(digits);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
