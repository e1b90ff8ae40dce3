use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Body format requested through the `format` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResponseFormat {
    #[default]
    Xml,
    Json,
}

impl ResponseFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Xml => "xml",
            ResponseFormat::Json => "json",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml" => Ok(ResponseFormat::Xml),
            "json" => Ok(ResponseFormat::Json),
            other => Err(AppError::InvalidResponseFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for ResponseFormat {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResponseFormat> for String {
    fn from(format: ResponseFormat) -> Self {
        format.as_str().to_string()
    }
}

/// A response body in the format it was requested in.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Xml(String),
    Json(serde_json::Value),
}

impl ApiResponse {
    /// The XML text, if this is an XML response.
    pub fn as_xml(&self) -> Option<&str> {
        match self {
            ApiResponse::Xml(text) => Some(text),
            ApiResponse::Json(_) => None,
        }
    }

    pub fn into_xml(self) -> Option<String> {
        match self {
            ApiResponse::Xml(text) => Some(text),
            ApiResponse::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Xml(_) => None,
        }
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiResponse::Xml(text) => f.write_str(text),
            ApiResponse::Json(value) => write!(f, "{value:#}"),
        }
    }
}
