//! Reversible id obfuscation.
//!
//! Encrypted id fields never expose raw database ids on the wire. They are
//! encoded through an [`IdCodec`] injected into the field type when the
//! schema is declared.

use std::fmt;
use std::sync::Arc;

use harsh::Harsh;
use tracing::debug;

use crate::errors::CodecError;
use crate::settings::CodecSettings;

/// Reversible mapping between integer ids and opaque strings.
pub trait IdCodec: fmt::Debug + Send + Sync {
    /// Encode a single id.
    fn encode(&self, id: u64) -> String;

    /// Decode a string into the ids it carries.
    ///
    /// Returns an empty vector when the string is not a valid encoding.
    fn decode(&self, encoded: &str) -> Vec<u64>;
}

/// Shared codec handle.
pub type BoxedIdCodec = Arc<dyn IdCodec>;

/// Hashids codec.
#[derive(Clone)]
pub struct HashidsCodec {
    harsh: Harsh,
    min_length: usize,
}

impl HashidsCodec {
    /// Build a codec from settings.
    pub fn new(settings: &CodecSettings) -> Result<Self, CodecError> {
        settings.validate()?;
        let harsh = Harsh::builder()
            .salt(settings.salt.as_bytes().to_vec())
            .length(settings.min_length)
            .build()
            .map_err(|e| CodecError::configuration(e.to_string()))?;
        debug!(min_length = settings.min_length, "Built hashids id codec");
        Ok(Self {
            harsh,
            min_length: settings.min_length,
        })
    }

    /// Build a codec from `APIMODEL_ID_*` environment variables.
    pub fn from_env() -> Result<Self, CodecError> {
        Self::new(&CodecSettings::from_env()?)
    }

    /// Wrap into a shared handle for field types.
    pub fn shared(self) -> BoxedIdCodec {
        Arc::new(self)
    }
}

impl IdCodec for HashidsCodec {
    fn encode(&self, id: u64) -> String {
        self.harsh.encode(&[id])
    }

    fn decode(&self, encoded: &str) -> Vec<u64> {
        self.harsh.decode(encoded).unwrap_or_default()
    }
}

impl fmt::Debug for HashidsCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashidsCodec")
            .field("min_length", &self.min_length)
            .finish_non_exhaustive()
    }
}
