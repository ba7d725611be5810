//! Worker-pool sizing
//!
//! A thread count is either left to the host (`Auto`), given verbatim
//! (`Fixed`), or expressed as a multiple of the host's processing units with
//! the `x<N>` string form (`PerCpu`). Parsing and resolution live here so they
//! can be checked without starting any workers.

use crate::error::{PipelineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

static MULTIPLIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^x([0-9]+)$").expect("multiplier pattern is a valid regex"));

const INVALID_STRING: &str = "Invalid thread count string";

/// Requested size of the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadCount {
    /// One worker per available processing unit
    #[default]
    Auto,
    /// Exactly this many workers
    Fixed(usize),
    /// This many workers per available processing unit (`x<N>`)
    PerCpu(usize),
}

impl ThreadCount {
    /// Parse the string form. Only `x<N>` with a positive `N` is accepted,
    /// with no surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self> {
        let captures = MULTIPLIER_PATTERN
            .captures(s)
            .ok_or_else(|| PipelineError::InvalidThreadCount(INVALID_STRING.to_string()))?;

        let factor: usize = captures[1]
            .parse()
            .map_err(|_| PipelineError::InvalidThreadCount(INVALID_STRING.to_string()))?;

        if factor == 0 {
            return Err(PipelineError::InvalidThreadCount(INVALID_STRING.to_string()));
        }

        Ok(ThreadCount::PerCpu(factor))
    }

    /// Parse a setting from the command line or environment, where a plain
    /// integer and `auto` are accepted alongside `x<N>`
    pub fn parse_setting(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ThreadCount::Auto);
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s.parse().map(ThreadCount::Fixed).map_err(|_| {
                PipelineError::InvalidThreadCount(format!("Thread count {} is out of range", s))
            });
        }
        ThreadCount::parse(s)
    }

    /// Resolve against the current host
    pub fn resolve(self) -> Result<usize> {
        self.resolve_with(host_parallelism())
    }

    /// Resolve against an explicit number of processing units
    pub fn resolve_with(self, host_units: usize) -> Result<usize> {
        match self {
            ThreadCount::Auto => Ok(host_units.max(1)),
            ThreadCount::Fixed(0) => Err(PipelineError::InvalidThreadCount(
                "Thread count must be at least 1".to_string(),
            )),
            ThreadCount::Fixed(n) => Ok(n),
            ThreadCount::PerCpu(0) => {
                Err(PipelineError::InvalidThreadCount(INVALID_STRING.to_string()))
            }
            ThreadCount::PerCpu(factor) => factor.checked_mul(host_units.max(1)).ok_or_else(|| {
                PipelineError::InvalidThreadCount(format!(
                    "Thread count x{} overflows for {} processing units",
                    factor, host_units
                ))
            }),
        }
    }
}

impl FromStr for ThreadCount {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        ThreadCount::parse(s)
    }
}

impl From<usize> for ThreadCount {
    fn from(n: usize) -> Self {
        ThreadCount::Fixed(n)
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "auto"),
            ThreadCount::Fixed(n) => write!(f, "{}", n),
            ThreadCount::PerCpu(factor) => write!(f, "x{}", factor),
        }
    }
}

impl<'de> Deserialize<'de> for ThreadCount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(usize),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(ThreadCount::Fixed(n)),
            Raw::Text(s) => ThreadCount::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Number of processing units available to this process
pub fn host_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
