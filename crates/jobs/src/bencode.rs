// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bencode values as used in torrent metainfo.

use std::collections::BTreeMap;

use thiserror::Error;

/// Nesting limit for decoding untrusted input
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bencode {
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<Bencode>),
    /// Keys are kept in raw byte order, which is what the format requires.
    Dict(BTreeMap<Vec<u8>, Bencode>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bencode at byte {offset}: {message}")]
pub struct BencodeError {
    pub offset: usize,
    pub message: String,
}

impl From<&str> for Bencode {
    fn from(s: &str) -> Self {
        Bencode::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Bencode {
    fn from(s: String) -> Self {
        Bencode::Bytes(s.into_bytes())
    }
}

impl From<i64> for Bencode {
    fn from(n: i64) -> Self {
        Bencode::Int(n)
    }
}

impl Bencode {
    /// Empty dictionary, to be filled with [`Bencode::insert`].
    pub fn dict() -> Self {
        Bencode::Dict(BTreeMap::new())
    }

    /// Insert `key` if `self` is a dictionary; ignored otherwise.
    pub fn insert(&mut self, key: &str, value: impl Into<Bencode>) {
        if let Bencode::Dict(map) = self {
            map.insert(key.as_bytes().to_vec(), value.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Bencode> {
        match self {
            Bencode::Dict(map) => map.get(key.as_bytes()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Bencode::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Bencode::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Bencode]> {
        match self {
            Bencode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Bencode::Int(n) => out.extend_from_slice(format!("i{n}e").as_bytes()),
            Bencode::Bytes(bytes) => encode_bytes(bytes, out),
            Bencode::List(items) => {
                out.push(b'l');
                for item in items {
                    item.encode_into(out);
                }
                out.push(b'e');
            }
            Bencode::Dict(map) => {
                out.push(b'd');
                for (key, value) in map {
                    encode_bytes(key, out);
                    value.encode_into(out);
                }
                out.push(b'e');
            }
        }
    }

    /// Decode exactly one value; trailing bytes are an error.
    pub fn decode(input: &[u8]) -> Result<Bencode, BencodeError> {
        let mut decoder = Decoder { input, pos: 0 };
        let value = decoder.value(0)?;
        if decoder.pos != input.len() {
            return Err(decoder.error("trailing data"));
        }
        Ok(value)
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}

struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn error(&self, message: &str) -> BencodeError {
        BencodeError { offset: self.pos, message: message.to_string() }
    }

    fn peek(&self) -> Result<u8, BencodeError> {
        self.input.get(self.pos).copied().ok_or_else(|| self.error("unexpected end of input"))
    }

    fn value(&mut self, depth: usize) -> Result<Bencode, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        match self.peek()? {
            b'i' => {
                self.pos += 1;
                let digits = self.until(b'e')?;
                Ok(Bencode::Int(self.integer(digits)?))
            }
            b'l' => {
                self.pos += 1;
                let mut items = Vec::new();
                while self.peek()? != b'e' {
                    items.push(self.value(depth + 1)?);
                }
                self.pos += 1;
                Ok(Bencode::List(items))
            }
            b'd' => {
                self.pos += 1;
                let mut map = BTreeMap::new();
                while self.peek()? != b'e' {
                    let key = self.bytes()?;
                    let value = self.value(depth + 1)?;
                    map.insert(key, value);
                }
                self.pos += 1;
                Ok(Bencode::Dict(map))
            }
            b'0'..=b'9' => Ok(Bencode::Bytes(self.bytes()?)),
            _ => Err(self.error("unexpected byte")),
        }
    }

    /// Bytes up to `end`, consuming `end` too.
    fn until(&mut self, end: u8) -> Result<&'a [u8], BencodeError> {
        let start = self.pos;
        let offset = self.input[start..]
            .iter()
            .position(|b| *b == end)
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.pos = start + offset + 1;
        Ok(&self.input[start..start + offset])
    }

    fn integer(&self, digits: &[u8]) -> Result<i64, BencodeError> {
        let text = std::str::from_utf8(digits).map_err(|_| self.error("invalid integer"))?;
        let unsigned = text.strip_prefix('-').unwrap_or(text);
        let canonical = !unsigned.is_empty()
            && unsigned.bytes().all(|b| b.is_ascii_digit())
            && (unsigned == "0" || !unsigned.starts_with('0'))
            && text != "-0";
        if !canonical {
            return Err(self.error("invalid integer"));
        }
        text.parse().map_err(|_| self.error("integer out of range"))
    }

    fn bytes(&mut self) -> Result<Vec<u8>, BencodeError> {
        if !self.peek()?.is_ascii_digit() {
            return Err(self.error("expected string"));
        }
        let digits = self.until(b':')?;
        let len = std::str::from_utf8(digits)
            .ok()
            .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|d| d.parse::<usize>().ok())
            .ok_or_else(|| self.error("invalid string length"))?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| self.error("string exceeds input"))?;
        let bytes = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "bencode_tests.rs"]
mod tests;
