//! Message handles.
//!
//! A MAP handle is a 64 bit value rendered as 16 uppercase hex digits. The low
//! 60 bits hold the id the message has in its content store, the top nibble
//! holds exactly one message type bit. Any holder of the string can recover
//! both without a lookup.
//!
//! Why the type lives in the top nibble is recorded under "Handle bit layout"
//! in DESIGN.md.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of low bits available for the content store id.
pub const CONTENT_ID_BITS: u32 = 60;

/// Largest content store id that fits into a handle.
pub const MAX_CONTENT_ID: u64 = (1 << CONTENT_ID_BITS) - 1;

const TYPE_MASK: u64 = 0xf << CONTENT_ID_BITS;

/// Length of the string form of a handle.
pub const HANDLE_LEN: usize = 16;

/// Errors raised while decoding a handle string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The handle is not 16 hex digits, or carries no (or more than one)
    /// known type bit.
    #[error("Invalid handle '{handle}': {reason}")]
    Parse { handle: String, reason: String },
}

impl HandleError {
    fn parse(handle: &str, reason: impl Into<String>) -> Self {
        HandleError::Parse {
            handle: handle.to_string(),
            reason: reason.into(),
        }
    }
}

/// Message types known to the MAP server.
///
/// The serialized names are the ones used in listings and in the `TYPE:`
/// property of a bMessage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Email,
    SmsGsm,
    SmsCdma,
    Mms,
}

impl MessageType {
    pub const ALL: [MessageType; 4] = [
        MessageType::Email,
        MessageType::SmsGsm,
        MessageType::SmsCdma,
        MessageType::Mms,
    ];

    /// The type bit in the top nibble of a handle.
    pub const fn mask(self) -> u64 {
        let nibble: u64 = match self {
            MessageType::Mms => 0x1,
            MessageType::Email => 0x2,
            MessageType::SmsGsm => 0x4,
            MessageType::SmsCdma => 0x8,
        };
        nibble << CONTENT_ID_BITS
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            MessageType::Email => "EMAIL",
            MessageType::SmsGsm => "SMS_GSM",
            MessageType::SmsCdma => "SMS_CDMA",
            MessageType::Mms => "MMS",
        }
    }

    pub fn is_sms(self) -> bool {
        matches!(self, MessageType::SmsGsm | MessageType::SmsCdma)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(MessageType::Email),
            "SMS_GSM" => Ok(MessageType::SmsGsm),
            "SMS_CDMA" => Ok(MessageType::SmsCdma),
            "MMS" => Ok(MessageType::Mms),
            other => Err(format!("unknown message type '{}'", other)),
        }
    }
}

/// A decoded handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    content_id: u64,
    message_type: MessageType,
}

impl Handle {
    pub fn new(content_id: u64, message_type: MessageType) -> Self {
        debug_assert!(
            content_id <= MAX_CONTENT_ID,
            "content id {:#x} does not fit into 60 bits",
            content_id
        );
        Self {
            content_id: content_id & MAX_CONTENT_ID,
            message_type,
        }
    }

    pub fn content_id(&self) -> u64 {
        self.content_id
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn as_u64(&self) -> u64 {
        self.content_id | self.message_type.mask()
    }

    /// Decodes both halves of a handle string.
    pub fn parse(handle: &str) -> Result<Self, HandleError> {
        let raw = parse_raw(handle)?;
        Ok(Self {
            content_id: raw & MAX_CONTENT_ID,
            message_type: type_from_raw(handle, raw)?,
        })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.as_u64())
    }
}

impl FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::parse(s)
    }
}

/// Builds the handle string for a content store id.
pub fn encode(content_id: u64, message_type: MessageType) -> String {
    Handle::new(content_id, message_type).to_string()
}

/// Returns the content store id of a handle string.
pub fn content_id(handle: &str) -> Result<u64, HandleError> {
    Ok(parse_raw(handle)? & MAX_CONTENT_ID)
}

/// Returns the message type encoded in a handle string.
pub fn message_type(handle: &str) -> Result<MessageType, HandleError> {
    let raw = parse_raw(handle)?;
    type_from_raw(handle, raw)
}

fn parse_raw(handle: &str) -> Result<u64, HandleError> {
    if handle.len() != HANDLE_LEN {
        return Err(HandleError::parse(
            handle,
            format!("expected {} hex digits, got {}", HANDLE_LEN, handle.len()),
        ));
    }
    // from_str_radix would accept a leading '+'
    if !handle.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HandleError::parse(handle, "not a hex string"));
    }
    u64::from_str_radix(handle, 16).map_err(|e| HandleError::parse(handle, e.to_string()))
}

fn type_from_raw(handle: &str, raw: u64) -> Result<MessageType, HandleError> {
    let tag = raw & TYPE_MASK;
    MessageType::ALL
        .into_iter()
        .find(|t| t.mask() == tag)
        .ok_or_else(|| {
            let reason = if tag == 0 {
                "no message type bit set".to_string()
            } else {
                format!("ambiguous message type bits {:#x}", tag >> CONTENT_ID_BITS)
            };
            HandleError::parse(handle, reason)
        })
}
