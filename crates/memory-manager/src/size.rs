// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Human-readable pool sizes for configuration files.

use crate::MemoryError;
use std::fmt;

/// The size of a backing pool in bytes.
///
/// # Parsing
/// - `"60M"` / `"60MB"` → 60 × 1024² bytes
/// - `"512K"` / `"512KB"` → 512 × 1024 bytes
/// - `"1G"` / `"1GB"` → 1024³ bytes
/// - `"4096"` → raw byte count
///
/// ```
/// use memory_manager::PoolSize;
///
/// assert_eq!(PoolSize::parse("2M").unwrap().as_bytes(), 2 * 1024 * 1024);
/// assert_eq!(PoolSize::parse("512kb").unwrap().as_bytes(), 512 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct PoolSize(usize);

impl PoolSize {
    /// Wraps a raw byte count.
    pub const fn from_bytes(bytes: usize) -> Self {
        Self(bytes)
    }

    /// Creates a size from kibibytes.
    pub const fn from_kb(kb: usize) -> Self {
        Self(kb * 1024)
    }

    /// Creates a size from mebibytes.
    pub const fn from_mb(mb: usize) -> Self {
        Self(mb * 1024 * 1024)
    }

    /// Returns the size in bytes.
    pub const fn as_bytes(self) -> usize {
        self.0
    }

    /// Parses a size string (case-insensitive, optional `B` suffix).
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let body = upper.strip_suffix('B').unwrap_or(&upper);

        let (digits, multiplier) = match body.chars().last() {
            Some('K') => (&body[..body.len() - 1], 1024usize),
            Some('M') => (&body[..body.len() - 1], 1024 * 1024),
            Some('G') => (&body[..body.len() - 1], 1024 * 1024 * 1024),
            _ => (body, 1),
        };

        digits
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .map(Self)
            .ok_or_else(|| MemoryError::InvalidSize(trimmed.to_string()))
    }
}

impl fmt::Display for PoolSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MB: usize = 1024 * 1024;
        const KB: usize = 1024;
        if self.0 >= MB && self.0 % MB == 0 {
            write!(f, "{}M", self.0 / MB)
        } else if self.0 >= KB && self.0 % KB == 0 {
            write!(f, "{}K", self.0 / KB)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(PoolSize::parse("60M").unwrap(), PoolSize::from_mb(60));
        assert_eq!(PoolSize::parse("60mb").unwrap(), PoolSize::from_mb(60));
        assert_eq!(PoolSize::parse("256K").unwrap(), PoolSize::from_kb(256));
        assert_eq!(PoolSize::parse("1G").unwrap().as_bytes(), 1 << 30);
        assert_eq!(PoolSize::parse(" 4096 ").unwrap().as_bytes(), 4096);
        assert_eq!(PoolSize::parse("128B").unwrap().as_bytes(), 128);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(PoolSize::parse("").is_err());
        assert!(PoolSize::parse("M").is_err());
        assert!(PoolSize::parse("12X").is_err());
        assert!(PoolSize::parse("-1M").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(PoolSize::from_mb(60).to_string(), "60M");
        assert_eq!(PoolSize::from_kb(3).to_string(), "3K");
        assert_eq!(PoolSize::from_bytes(1000).to_string(), "1000");
    }
}
