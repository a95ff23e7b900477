// Derived from asciinema (https://github.com/asciinema/asciinema)
// Copyright (c) asciinema authors
// Licensed under GPL-3.0-or-later

//! asciicast v2/v3 format parser
//!
//! Reference: https://docs.asciinema.org/manual/asciicast/v3/
//!
//! The two versions share the event line shape `[time, code, data]`; they
//! differ in the header (`term.cols` vs `width`) and in the meaning of the
//! time column (interval since the previous event in v3, absolute in v2).

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// asciicast format version
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    Two,
    Three,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::Two => write!(f, "2"),
            Version::Three => write!(f, "3"),
        }
    }
}

/// asciicast header (fields of both v2 and v3)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub version: u8,
    /// v2 terminal width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// v2 terminal height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// v3 terminal info
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<TermInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_time_limit: Option<f64>,
}

impl Header {
    /// Terminal width from whichever field the version uses.
    pub fn cols(&self) -> Option<u32> {
        self.term.as_ref().and_then(|t| t.cols).or(self.width)
    }

    /// Terminal height from whichever field the version uses.
    pub fn rows(&self) -> Option<u32> {
        self.term.as_ref().and_then(|t| t.rows).or(self.height)
    }
}

/// Terminal information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cols: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub term_type: Option<String>,
}

/// Event type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Output (data written to terminal)
    Output, // "o"
    /// Input (data read from terminal)
    Input, // "i"
    /// Marker (annotation)
    Marker, // "m"
    /// Resize (terminal resize)
    Resize, // "r"
    /// Exit (process exit code)
    Exit, // "x"
}

impl EventType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "o" => Some(EventType::Output),
            "i" => Some(EventType::Input),
            "m" => Some(EventType::Marker),
            "r" => Some(EventType::Resize),
            "x" => Some(EventType::Exit),
            _ => None,
        }
    }
}

/// An event in the asciicast file
#[derive(Debug, Clone)]
pub struct Event {
    /// Time column as written in the file (interval in v3, absolute in v2)
    pub time: f64,
    /// Event type
    pub event_type: EventType,
    /// Event data (output text, marker label, etc.)
    pub data: String,
}

impl Event {
    pub fn new(time: f64, event_type: EventType, data: impl Into<String>) -> Self {
        Self {
            time,
            event_type,
            data: data.into(),
        }
    }

    pub fn output(time: f64, data: impl Into<String>) -> Self {
        Self::new(time, EventType::Output, data)
    }

    pub fn marker(time: f64, label: impl Into<String>) -> Self {
        Self::new(time, EventType::Marker, label)
    }

    pub fn is_marker(&self) -> bool {
        self.event_type == EventType::Marker
    }

    /// Parse the `COLSxROWS` payload of a resize event.
    pub fn parse_resize(&self) -> Option<(u16, u16)> {
        if self.event_type != EventType::Resize {
            return None;
        }
        let (cols, rows) = self.data.split_once('x')?;
        let cols: u16 = cols.trim().parse().ok()?;
        let rows: u16 = rows.trim().parse().ok()?;
        (cols > 0 && rows > 0).then_some((cols, rows))
    }

    /// Parse an event from a JSON line
    pub fn from_json(line: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(line).context("Failed to parse event JSON")?;

        let arr = value.as_array().context("Event must be a JSON array")?;

        if arr.len() < 3 {
            bail!("Event array must have at least 3 elements");
        }

        let time = arr[0].as_f64().context("Event time must be a number")?;
        if time < 0.0 {
            bail!("Event time must not be negative");
        }

        let code = arr[1].as_str().context("Event type must be a string")?;

        let event_type =
            EventType::from_code(code).with_context(|| format!("Unknown event type: {}", code))?;

        let data = arr[2]
            .as_str()
            .context("Event data must be a string")?
            .to_string();

        Ok(Event {
            time,
            event_type,
            data,
        })
    }
}

/// Complete asciicast file representation
#[derive(Debug, Clone)]
pub struct AsciicastFile {
    pub header: Header,
    pub events: Vec<Event>,
}

impl AsciicastFile {
    /// Parse an asciicast file from a path
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            fs::File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
        let reader = BufReader::new(file);

        Self::parse_reader(reader)
    }

    /// Parse an asciicast file from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        // First line is the header
        let header_line = lines
            .next()
            .context("File is empty")?
            .context("Failed to read header line")?;

        let header: Header =
            serde_json::from_str(&header_line).context("Failed to parse header")?;

        if header.version != 2 && header.version != 3 {
            bail!(
                "Only asciicast v2 and v3 formats are supported (got version {})",
                header.version
            );
        }

        let mut events = Vec::new();
        for (line_num, line_result) in lines.enumerate() {
            let line =
                line_result.with_context(|| format!("Failed to read line {}", line_num + 2))?;

            // Blank lines and v3 comment lines carry no events
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let event = Event::from_json(trimmed)
                .with_context(|| format!("Failed to parse event on line {}", line_num + 2))?;
            events.push(event);
        }

        Ok(AsciicastFile { header, events })
    }

    /// Parse from a string
    pub fn parse_str(content: &str) -> Result<Self> {
        let reader = BufReader::new(content.as_bytes());
        Self::parse_reader(reader)
    }

    /// Format version of this file.
    pub fn version(&self) -> Version {
        if self.header.version == 2 {
            Version::Two
        } else {
            Version::Three
        }
    }

    /// Absolute time of each event, with every gap capped at `idle_limit`.
    ///
    /// v2 times are absolute already and are converted to gaps first so the
    /// cap applies the same way to both versions.
    pub fn absolute_times(&self, idle_limit: Option<f64>) -> Vec<f64> {
        let mut times = Vec::with_capacity(self.events.len());
        let mut previous_raw = 0.0f64;
        let mut cumulative = 0.0f64;
        for event in &self.events {
            let gap = match self.version() {
                Version::Three => event.time,
                Version::Two => (event.time - previous_raw).max(0.0),
            };
            previous_raw = event.time;
            cumulative += match idle_limit {
                Some(limit) if limit > 0.0 => gap.min(limit),
                _ => gap,
            };
            times.push(cumulative);
        }
        times
    }
}
