use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::resume::classify::{InternshipPolicy, DEFAULT_INTERNSHIP_KEYWORDS};
use crate::resume::extractor::PdfMode;
use crate::resume::intervals::DurationFormat;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub pdf_mode: PdfMode,
    pub experience_format: DurationFormat,
    pub internship_policy: InternshipPolicy,
    pub internship_keywords: Vec<String>,
    /// Return the raw completion text instead of failing when it is not JSON.
    pub allow_raw_completion: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            pdf_mode: parse_env("PDF_MODE", PdfMode::default())?,
            experience_format: parse_env("EXPERIENCE_FORMAT", DurationFormat::default())?,
            internship_policy: parse_env("INTERNSHIP_POLICY", InternshipPolicy::default())?,
            internship_keywords: std::env::var("INTERNSHIP_KEYWORDS")
                .map(|raw| split_keywords(&raw))
                .unwrap_or_else(|_| {
                    DEFAULT_INTERNSHIP_KEYWORDS
                        .iter()
                        .map(|k| k.to_string())
                        .collect()
                }),
            allow_raw_completion: parse_env("ALLOW_RAW_COMPLETION", false)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
