//! SMS bodies: decoded text or native PDUs.

use log::debug;

use super::codec::{decode_binary, encode_binary, escape_text};
use super::error::{BMessageError, Result};

/// Low bits of the PDU type octet (TP-MTI).
const MTI_MASK: u8 = 0x03;
const MTI_SUBMIT: u8 = 0x01;

/// One transport PDU together with its encoded service centre address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsPdu {
    data: Vec<u8>,
    sc_address: Vec<u8>,
    encoding: String,
}

impl SmsPdu {
    /// `encoding` is the bMessage `ENCODING` value of the PDU, e.g. `G-7BIT`.
    pub fn new(data: Vec<u8>, sc_address: Vec<u8>, encoding: impl Into<String>) -> Self {
        Self {
            data,
            sc_address,
            encoding: encoding.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn sc_address(&self) -> &[u8] {
        &self.sc_address
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Decodes a pushed native body part: the hex form of a service centre
    /// address (length octet first) followed by an SMS-SUBMIT PDU.
    pub fn from_native(part: &str, encoding: impl Into<String>) -> Result<Self> {
        let blob = decode_binary(part)?;
        if blob.is_empty() {
            return Err(BMessageError::format("empty native PDU"));
        }

        let pdu_start = blob[0] as usize + 1;
        if pdu_start < blob.len() {
            let mti = blob[pdu_start] & MTI_MASK;
            if mti != MTI_SUBMIT {
                debug!("Rejecting native PDU with message type indicator {:#04x}", mti);
                return Err(BMessageError::format(format!(
                    "only submit PDUs supported, got message type indicator {:#04x} in '{}'",
                    mti, part
                )));
            }
        }

        let split = pdu_start.min(blob.len());
        let (sc_address, data) = blob.split_at(split);
        Ok(Self::new(data.to_vec(), sc_address.to_vec(), encoding))
    }

    /// The body fragment for this PDU.
    pub fn to_fragment(&self) -> Vec<u8> {
        encode_binary(&self.data, &self.sc_address).into_bytes()
    }
}

/// The content of an SMS bMessage. Text and PDUs never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SmsBody {
    #[default]
    Empty,
    Text(String),
    Pdus(Vec<SmsPdu>),
}

impl SmsBody {
    /// Body fragments for the `BEGIN:MSG` blocks. An empty body still yields
    /// one, empty, fragment.
    pub fn fragments(&self) -> Vec<Vec<u8>> {
        match self {
            SmsBody::Text(text) => vec![escape_text(text).into_bytes()],
            SmsBody::Pdus(pdus) if !pdus.is_empty() => {
                pdus.iter().map(SmsPdu::to_fragment).collect()
            }
            SmsBody::Pdus(_) | SmsBody::Empty => vec![Vec::new()],
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SmsBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn pdus(&self) -> &[SmsPdu] {
        match self {
            SmsBody::Pdus(pdus) => pdus,
            _ => &[],
        }
    }
}
