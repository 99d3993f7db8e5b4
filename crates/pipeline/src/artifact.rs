//! Fenced code block extraction and artifact output.

use regex_lite::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::ArtifactError;

static CODE_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"```(?:[\w-]+)?\n([\s\S]*?)```").ok());

/// Bodies of every fenced code block in `markdown`, trimmed, in order.
/// The language tag is ignored.
pub fn extract_code_blocks(markdown: &str) -> Vec<String> {
    let Some(re) = CODE_BLOCK.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(markdown)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Write the first code block in `markdown` to `path`, replacing any
/// existing file. Returns the number of bytes written.
pub async fn write_first_block(markdown: &str, path: &Path) -> Result<usize, ArtifactError> {
    let block = extract_code_blocks(markdown)
        .into_iter()
        .next()
        .ok_or(ArtifactError::NoCodeBlock)?;

    tokio::fs::write(path, block.as_bytes())
        .await
        .map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(block.len())
}
