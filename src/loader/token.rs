use crate::model::RenderError;
use std::fs;
use std::path::Path;

/// Reads the map access token. The last line of the file wins, with trailing whitespace stripped.
pub fn read_token(path: &Path) -> Result<String, RenderError> {
    if !path.is_file() {
        return Err(RenderError::MissingToken(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let token = content.lines().last().map(str::trim_end).unwrap_or_default();
    if token.is_empty() {
        return Err(RenderError::EmptyToken(path.to_path_buf()));
    }
    Ok(token.to_string())
}
