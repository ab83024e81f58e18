//! Line reader over a received bMessage.

use std::sync::LazyLock;

use regex::Regex;

use super::error::{BMessageError, Result};

/// `NAME[;PARAMS]:VALUE`, as used by both bMessage and vCard properties.
static RE_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]*)(;[^:]*)?:(.*)$").unwrap());

/// A `NAME:VALUE` line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Property<'a> {
    pub name: String,
    pub params: &'a str,
    pub value: &'a str,
}

impl<'a> Property<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = RE_PROPERTY.captures(line)?;
        Some(Self {
            name: caps.get(1)?.as_str().to_ascii_uppercase(),
            params: caps.get(2).map_or("", |m| m.as_str()),
            value: caps.get(3).map_or("", |m| m.as_str()).trim(),
        })
    }
}

pub(crate) struct BMsgReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BMsgReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Next CRLF terminated line, empty lines included. A lone LF does not
    /// end a line.
    pub fn raw_line(&mut self) -> Result<Option<&'a str>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let rest = &self.data[self.pos..];
        let (line, consumed) = match rest.windows(2).position(|w| w == b"\r\n") {
            Some(end) => (&rest[..end], end + 2),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Ok(Some(std::str::from_utf8(line)?))
    }

    /// Next non-empty line, trimmed.
    pub fn line(&mut self) -> Result<Option<&'a str>> {
        while let Some(raw) = self.raw_line()? {
            let line = raw.trim();
            if !line.is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Like [`line`](Self::line), for places where the bMessage cannot end
    /// yet.
    pub fn line_enforce(&mut self) -> Result<&'a str> {
        self.line()?
            .ok_or_else(|| BMessageError::format("bMessage too short"))
    }

    /// Reads a line and checks that it contains `expected`, ignoring case.
    pub fn expect(&mut self, expected: &str) -> Result<()> {
        let line = self.line_enforce()?;
        if line.to_ascii_uppercase().contains(&expected.to_ascii_uppercase()) {
            Ok(())
        } else {
            Err(BMessageError::format(format!(
                "expected \"{}\" in \"{}\"",
                expected, line
            )))
        }
    }

    /// Collects raw lines up to a line equal to `terminator`, joined with
    /// CRLF. The terminator line is consumed.
    pub fn until(&mut self, terminator: &str) -> Result<String> {
        let mut lines = Vec::new();
        loop {
            match self.raw_line()? {
                Some(line) if line == terminator => return Ok(lines.join("\r\n")),
                Some(line) => lines.push(line),
                None => {
                    return Err(BMessageError::format(format!(
                        "missing \"{}\"",
                        terminator
                    )))
                }
            }
        }
    }
}
