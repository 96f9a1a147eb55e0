// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Video positions as "[[H:]M:]S" strings.

use std::cmp::Ordering;

use relprep_adapters::natural_cmp;
use thiserror::Error;

/// Screenshots made when neither timestamps nor a number are requested
pub const DEFAULT_NUMBER: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Invalid timestamp: {0:?}")]
    Invalid(String),

    #[error("Timestamp must not be negative: {0}")]
    Negative(String),
}

/// Seconds from "[[H:]M:]S"; every segment may have a fractional part.
pub fn parse(text: &str) -> Result<f64, TimestampError> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::Invalid(text.to_string()));
    }
    let mut seconds = 0.0;
    for (part, factor) in parts.iter().rev().zip([1.0, 60.0, 3600.0]) {
        let value: f64 = part.trim().parse().map_err(|_| TimestampError::Invalid(text.to_string()))?;
        if !value.is_finite() {
            return Err(TimestampError::Invalid(text.to_string()));
        }
        seconds += value * factor;
    }
    if seconds < 0.0 {
        return Err(TimestampError::Negative(text.to_string()));
    }
    Ok(seconds)
}

/// "H:MM:SS" with fractions of seconds dropped.
pub fn pretty(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
}

/// Final list of screenshot positions for a video of `duration` seconds.
///
/// Requested `timestamps` are clamped to the video. If fewer than `number`
/// are given, more are added by halving the largest gap between existing
/// positions, the start and the end of the video. With no timestamps and
/// `number == 0`, [`DEFAULT_NUMBER`] positions are picked. The result is in
/// natural order.
pub fn normalize(duration: f64, timestamps: &[String], number: usize) -> Result<Vec<String>, TimestampError> {
    let mut seconds = Vec::with_capacity(timestamps.len());
    for ts in timestamps {
        seconds.push(parse(ts)?.clamp(0.0, duration.max(0.0)));
    }
    let mut result: Vec<String> = seconds.iter().map(|s| pretty(*s)).collect();

    let number = if timestamps.is_empty() && number == 0 { DEFAULT_NUMBER } else { number };
    if duration > 0.0 && result.len() < number {
        let mut positions: Vec<f64> = result.iter().filter_map(|ts| parse(ts).ok()).map(|s| s / duration).collect();
        if !positions.contains(&0.0) {
            positions.push(0.0);
        }
        if !positions.contains(&1.0) {
            positions.push(1.0);
        }
        positions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        while result.len() < number {
            let Some((_, start, end)) = positions
                .windows(2)
                .map(|pair| (pair[1] - pair[0], pair[0], pair[1]))
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            else {
                break;
            };
            let position = start + (end - start) / 2.0;
            result.push(pretty(duration * position));
            positions.push(position);
            positions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        }
    }

    result.sort_by(|a, b| natural_cmp(a, b));
    Ok(result)
}

#[cfg(test)]
#[path = "timestamp_tests.rs"]
mod tests;
