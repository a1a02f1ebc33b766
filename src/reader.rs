//! Input acquisition and document parsing.
//!
//! The source can be a filesystem path or an HTTP(S) URL. Parsing
//! tries JSON first and falls back to YAML, since both document
//! flavors are common in the wild.

use std::fs;

use tracing::debug;

use crate::error::Error;
use crate::spec::{Document, Specification};

/// Read raw document text from a path or URL.
pub fn read_input(source: &str) -> Result<String, Error> {
    if source.starts_with("http://") || source.starts_with("https://") {
        debug!(url = source, "fetching document");
        let read_err = |message: String| Error::Read {
            path: source.to_string(),
            message,
        };
        let response = reqwest::blocking::get(source)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| read_err(e.to_string()))?;
        response.text().map_err(|e| read_err(e.to_string()))
    } else {
        fs::read_to_string(source).map_err(|e| Error::Read {
            path: source.to_string(),
            message: e.to_string(),
        })
    }
}

/// Parse raw text into a [`Document`], JSON first, then YAML.
pub fn parse_document(raw: &str) -> Result<Document, Error> {
    match serde_json::from_str(raw) {
        Ok(doc) => Ok(doc),
        Err(json_err) => match serde_yaml::from_str(raw) {
            Ok(doc) => {
                debug!("document parsed as YAML");
                Ok(doc)
            }
            Err(yaml_err) => Err(Error::Parse {
                json: json_err.to_string(),
                yaml: yaml_err.to_string(),
            }),
        },
    }
}

/// Read, parse, and validate a document in one step.
pub fn load_specification(source: &str) -> Result<Specification, Error> {
    let raw = read_input(source)?;
    let doc = parse_document(&raw)?;
    Specification::from_document(doc)
}
