//! Affine matrices stored as text.

use std::path::Path;

use ng_space::{AffineError, AffineLoader, MatrixInput};
use tracing::debug;

/// Reads a JSON array, or plain numbers separated by whitespace or commas.
///
/// Lines starting with `#` are comments. Moving and fixed references are
/// not needed for these formats and are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAffineLoader;

impl TextAffineLoader {
    pub fn parse(text: &str) -> Result<MatrixInput, AffineError> {
        let body: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        if body.first().is_some_and(|line| line.starts_with('[')) {
            let value: serde_json::Value =
                serde_json::from_str(&body.join("\n")).map_err(|_| AffineError::NotNumeric)?;
            return MatrixInput::from_json(&value);
        }

        let rows = body
            .iter()
            .map(|line| {
                line.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .map(|part| part.parse::<f64>().map_err(|_| AffineError::NotNumeric))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        match rows.as_slice() {
            [single] => Ok(MatrixInput::Flat(single.clone())),
            _ => Ok(MatrixInput::Rows(rows)),
        }
    }
}

impl AffineLoader for TextAffineLoader {
    fn load(
        &self,
        path: &Path,
        moving: Option<&Path>,
        fixed: Option<&Path>,
    ) -> Result<MatrixInput, AffineError> {
        if moving.is_some() || fixed.is_some() {
            debug!(path = %path.display(), "text affines ignore moving/fixed references");
        }
        let text = std::fs::read_to_string(path).map_err(|err| AffineError::Load {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::parse(&text)
    }
}
