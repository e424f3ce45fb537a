//! Request loading utilities.

use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

/// Error type for request loading.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request: {0}")]
    ReadFile(#[from] io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse request (tried JSON and YAML)")]
    ParseFailed,
}

/// Loads a request from a YAML or JSON file. `-` reads standard input.
pub fn load_request<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, RequestError> {
    let path = path.as_ref();
    if path == Path::new("-") {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        return parse_request(&data, path);
    }
    let data = fs::read(path)?;
    parse_request(&data, path)
}

/// Parses request data based on file extension, or by content otherwise.
pub fn parse_request<T: DeserializeOwned>(data: &[u8], path: impl AsRef<Path>) -> Result<T, RequestError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => {
            // JSON is valid YAML, but its errors are clearer when parsed as JSON.
            if let Ok(v) = serde_json::from_slice(data) {
                return Ok(v);
            }
            if let Ok(v) = serde_yaml::from_slice(data) {
                return Ok(v);
            }
            Err(RequestError::ParseFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixdown_compose::MixRequestBody;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "narration_url: https://cdn.example.com/voice.mp3\nmusic_url: https://cdn.example.com/bed.mp3"
        )
        .unwrap();

        let req: MixRequestBody = load_request(file.path()).unwrap();
        assert_eq!(req.narration_url.as_deref(), Some("https://cdn.example.com/voice.mp3"));
        assert!(req.music_url.is_some());
    }

    #[test]
    fn test_load_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(
            file,
            r#"{{"narration_url": "a.mp3", "sfx_list": [{{"url": "b.mp3", "time": 1.5}}]}}"#
        )
        .unwrap();

        let req: MixRequestBody = load_request(file.path()).unwrap();
        assert_eq!(req.sfx_list.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_unknown_extension() {
        let req: MixRequestBody = parse_request(b"narration_url: a.wav", "request.txt").unwrap();
        assert_eq!(req.narration_url.as_deref(), Some("a.wav"));
    }

    #[test]
    fn test_parse_invalid() {
        let result: Result<MixRequestBody, _> = parse_request(b"{{{{ nope", "request.txt");
        assert!(matches!(result, Err(RequestError::ParseFailed)));
    }
}
