//! Input validators
//!
//! Small checks shared by the command handlers. Each returns a
//! [`MacconvError::Validation`] carrying a human-readable message.

use crate::{MacconvError, Result};

/// Longest file path accepted on the command line
pub const MAX_PATH_LEN: usize = 4096;

/// Parse a TCP port number
///
/// Accepts 1 through 65535.
///
/// ```
/// use macconv_core::validate::parse_port;
///
/// assert_eq!(parse_port("22").unwrap(), 22);
/// assert!(parse_port("0").is_err());
/// ```
pub fn parse_port(port: &str) -> Result<u16> {
    let value: u32 = port
        .trim()
        .parse()
        .map_err(|_| MacconvError::Validation(format!("port must be a number: {}", port)))?;

    if !(1..=65535).contains(&value) {
        return Err(MacconvError::Validation(format!(
            "port must be between 1 and 65535: {}",
            value
        )));
    }

    Ok(value as u16)
}

/// Check a file path argument before opening it
pub fn check_file_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MacconvError::Validation(
            "file path cannot be empty".to_string(),
        ));
    }

    if path.len() > MAX_PATH_LEN {
        return Err(MacconvError::Validation("file path too long".to_string()));
    }

    Ok(())
}
