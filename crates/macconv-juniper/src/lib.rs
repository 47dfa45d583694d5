//! Juniper subscriber extraction
//!
//! Pulls the interesting fields out of `show subscribers detail` output
//! saved from a Juniper BNG. Every `IP Address:` line opens a new
//! subscriber; the `MAC Address:` and `IPv4 Input Filter Name:` lines that
//! follow fill it in.
//!
//! # Examples
//!
//! ```
//! use macconv_juniper::parse_subscribers;
//!
//! let dump = "\
//! IP Address: 10.0.0.5
//! MAC Address: 00:11:22:33:44:55
//! IPv4 Input Filter Name: FILTER-IN
//! ";
//! let subscribers = parse_subscribers(dump.as_bytes()).unwrap();
//! assert_eq!(subscribers[0].ip, "10.0.0.5");
//! assert_eq!(subscribers[0].to_string(), "10.0.0.5\t00:11:22:33:44:55\tFILTER-IN");
//! ```

use macconv_core::MacconvError;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

const IP_LABEL: &str = "IP Address:";
const MAC_LABEL: &str = "MAC Address:";
const FILTER_LABEL: &str = "IPv4 Input Filter Name:";

/// Juniper parsing errors
#[derive(Error, Debug)]
pub enum JuniperError {
    /// Dump file could not be opened
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read failed part way through
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),
}

impl From<JuniperError> for MacconvError {
    fn from(err: JuniperError) -> Self {
        MacconvError::FileSystem(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JuniperError>;

/// One subscriber session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    pub ip: String,
    pub mac: Option<String>,
    pub input_filter: Option<String>,
}

impl fmt::Display for Subscriber {
    /// Tab separated, missing fields left empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}",
            self.ip,
            self.mac.as_deref().unwrap_or(""),
            self.input_filter.as_deref().unwrap_or("")
        )
    }
}

fn value_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.find(label)
        .map(|idx| line[idx + label.len()..].trim())
}

/// Parse subscriber records from any buffered reader
///
/// Lines that are not valid UTF-8 are decoded lossily rather than failing
/// the whole dump.
pub fn parse_subscribers<R: BufRead>(mut reader: R) -> Result<Vec<Subscriber>> {
    let mut subscribers: Vec<Subscriber> = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);

        if let Some(ip) = value_after(&line, IP_LABEL) {
            subscribers.push(Subscriber {
                ip: ip.to_string(),
                ..Subscriber::default()
            });
            continue;
        }

        // Fields before the first IP line have no subscriber to attach to
        let Some(current) = subscribers.last_mut() else {
            continue;
        };

        if let Some(mac) = value_after(&line, MAC_LABEL) {
            current.mac = Some(mac.to_string());
        } else if let Some(filter) = value_after(&line, FILTER_LABEL) {
            current.input_filter = Some(filter.to_string());
        }
    }

    tracing::debug!(count = subscribers.len(), "parsed subscribers");
    Ok(subscribers)
}

/// Open a dump file and parse it
pub fn parse_file(path: &Path) -> Result<Vec<Subscriber>> {
    let file = File::open(path).map_err(|source| JuniperError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_subscribers(BufReader::new(file))
}
