//! The originator and recipient vCards of a bMessage.
//!
//! Only the properties MAP uses are handled: `N`, `FN`, `TEL` and `EMAIL`.

use super::error::{BMessageError, Result};
use super::reader::{BMsgReader, Property};

const CRLF: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VCardVersion {
    V21,
    V30,
}

impl VCardVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            VCardVersion::V21 => "2.1",
            VCardVersion::V30 => "3.0",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCard {
    version: VCardVersion,
    name: String,
    formatted_name: String,
    phone_numbers: Vec<String>,
    email_addresses: Vec<String>,
    env_level: usize,
}

impl VCard {
    /// A version 2.1 vCard, which has no formatted name.
    pub fn v21(name: &str, phone_numbers: &[&str], email_addresses: &[&str]) -> Self {
        Self::build(VCardVersion::V21, name, "", phone_numbers, email_addresses)
    }

    /// A version 3.0 vCard.
    pub fn v30(
        name: &str,
        formatted_name: &str,
        phone_numbers: &[&str],
        email_addresses: &[&str],
    ) -> Self {
        Self::build(
            VCardVersion::V30,
            name,
            formatted_name,
            phone_numbers,
            email_addresses,
        )
    }

    fn build(
        version: VCardVersion,
        name: &str,
        formatted_name: &str,
        phone_numbers: &[&str],
        email_addresses: &[&str],
    ) -> Self {
        Self {
            version,
            name: name.to_string(),
            formatted_name: formatted_name.to_string(),
            phone_numbers: phone_numbers.iter().map(|n| network_portion(n)).collect(),
            email_addresses: email_addresses.iter().map(|e| e.to_string()).collect(),
            env_level: 0,
        }
    }

    /// Nesting depth of the envelope this vCard was found in, 0 for the
    /// outermost.
    pub fn with_env_level(mut self, env_level: usize) -> Self {
        self.env_level = env_level;
        self
    }

    pub fn version(&self) -> VCardVersion {
        self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formatted_name(&self) -> &str {
        &self.formatted_name
    }

    pub fn phone_numbers(&self) -> &[String] {
        &self.phone_numbers
    }

    pub fn first_phone_number(&self) -> Option<&str> {
        self.phone_numbers.first().map(String::as_str)
    }

    pub fn email_addresses(&self) -> &[String] {
        &self.email_addresses
    }

    pub fn env_level(&self) -> usize {
        self.env_level
    }

    pub fn encode(&self, out: &mut String) {
        out.push_str("BEGIN:VCARD");
        out.push_str(CRLF);
        out.push_str("VERSION:");
        out.push_str(self.version.as_str());
        out.push_str(CRLF);
        if self.version == VCardVersion::V30 {
            push_property(out, "FN", &self.formatted_name);
        }
        push_property(out, "N", &self.name);
        for number in &self.phone_numbers {
            push_property(out, "TEL", number);
        }
        for address in &self.email_addresses {
            push_property(out, "EMAIL", address);
        }
        out.push_str("END:VCARD");
        out.push_str(CRLF);
    }

    /// Parses a vCard whose `BEGIN:VCARD` line has just been read.
    pub(crate) fn parse(reader: &mut BMsgReader<'_>, env_level: usize) -> Result<Self> {
        let mut card = VCard {
            version: VCardVersion::V30,
            name: String::new(),
            formatted_name: String::new(),
            phone_numbers: Vec::new(),
            email_addresses: Vec::new(),
            env_level,
        };

        loop {
            let line = reader.line_enforce()?;
            if line.contains("END:VCARD") {
                return Ok(card);
            }
            let Some(prop) = Property::parse(line) else {
                continue;
            };
            match prop.name.as_str() {
                "VERSION" => {
                    card.version = match prop.value {
                        "2.1" => VCardVersion::V21,
                        "3.0" => VCardVersion::V30,
                        other => {
                            return Err(BMessageError::format(format!(
                                "unsupported vCard version '{}'",
                                other
                            )))
                        }
                    }
                }
                "N" => card.name = prop.value.to_string(),
                "FN" => card.formatted_name = prop.value.to_string(),
                "TEL" if !prop.value.is_empty() => {
                    card.phone_numbers.push(last_component(prop.value).to_string())
                }
                "EMAIL" if !prop.value.is_empty() => {
                    let value = prop.value.replace("&lt;", "<").replace("&gt;", ">");
                    card.email_addresses.push(last_component(&value).to_string())
                }
                _ => {}
            }
        }
    }
}

fn push_property(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push(':');
    out.push_str(value);
    out.push_str(CRLF);
}

/// Structured values keep only their last `;` separated component.
fn last_component(value: &str) -> &str {
    value.rsplit(';').next().unwrap_or(value).trim()
}

/// The dialable part of a phone number: digits, `*`, `#` and a leading `+`,
/// up to the first pause or wait character.
pub fn network_portion(number: &str) -> String {
    let mut out = String::with_capacity(number.len());
    for c in number.chars() {
        match c {
            ',' | ';' => break,
            '0'..='9' | '*' | '#' => out.push(c),
            '+' if out.is_empty() => out.push(c),
            _ => {}
        }
    }
    out
}
