//! Parsing of administrative policy submissions.
//!
//! Two shapes arrive at the admin API: an HTML-style form where
//! `sendHeader` is a checkbox (absent when unticked), and a JSON body.
//! Both are turned into a candidate [`HeaderPolicy`] here; the store
//! validates it before anything is persisted.

use serde::Deserialize;

use crate::policy::{HeaderPolicy, PolicyError};

/// `application/x-www-form-urlencoded` submission.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyForm {
    pub send_header: Option<String>,
    pub options: Option<String>,
}

impl PolicyForm {
    pub fn into_candidate(self) -> Result<HeaderPolicy, PolicyError> {
        let enabled = match self.send_header.as_deref() {
            None => false,
            Some(raw) => parse_checkbox(raw)?,
        };
        let options = self.options.ok_or(PolicyError::MissingValue)?;
        Ok(HeaderPolicy::with_default_value(enabled, Some(&options)))
    }
}

/// JSON submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySubmission {
    pub send_header: bool,
    pub options: Option<String>,
}

impl PolicySubmission {
    pub fn into_candidate(self) -> Result<HeaderPolicy, PolicyError> {
        let options = self.options.ok_or(PolicyError::MissingValue)?;
        Ok(HeaderPolicy::with_default_value(self.send_header, Some(&options)))
    }
}

fn parse_checkbox(raw: &str) -> Result<bool, PolicyError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "" | "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(PolicyError::InvalidFlag(raw.to_string())),
    }
}
