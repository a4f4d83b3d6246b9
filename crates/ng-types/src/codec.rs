//! JSON and URL forms of the viewer state.

use url::Url;

use crate::{CodecError, ViewerState};

/// Public viewer used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://neuroglancer-demo.appspot.com/";

/// Marker that opens a state fragment.
const FRAGMENT_MARKER: char = '!';

impl ViewerState {
    pub fn from_json_str(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact JSON.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON, for printing and saving.
    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Shareable URL: `base#!<percent-encoded JSON>`.
    ///
    /// Any fragment already on `base` is replaced.
    pub fn to_url(&self, base: &str) -> Result<String, CodecError> {
        let base = base.split('#').next().unwrap_or(base);
        let json = self.to_json()?;
        Ok(format!(
            "{base}#{FRAGMENT_MARKER}{}",
            urlencoding::encode(&json)
        ))
    }

    /// Parse a URL produced by [`ViewerState::to_url`].
    pub fn from_url(url: &str) -> Result<Self, CodecError> {
        let parsed = Url::parse(url)?;
        let fragment = parsed.fragment().ok_or(CodecError::MissingFragment)?;
        let encoded = fragment
            .strip_prefix(FRAGMENT_MARKER)
            .ok_or(CodecError::UnrecognizedFragment)?;
        let json = urlencoding::decode(encoded)?;
        Self::from_json_str(&json)
    }
}
