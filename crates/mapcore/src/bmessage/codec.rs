//! Body content transforms: `END:MSG` escaping and the hex form of native
//! PDUs.

use hex::FromHexError;

use super::error::{BMessageError, Result};

const MSG_TERMINATOR: &str = "END:MSG";
const ESCAPED_MSG_TERMINATOR: &str = "/END:MSG";

/// Escapes every `END:MSG` in a text body so it cannot end the enclosing
/// `BEGIN:MSG` block.
pub fn escape_text(text: &str) -> String {
    text.replace(MSG_TERMINATOR, ESCAPED_MSG_TERMINATOR)
}

/// Inverse of [`escape_text`].
pub fn unescape_text(text: &str) -> String {
    text.replace(ESCAPED_MSG_TERMINATOR, MSG_TERMINATOR)
}

/// Hex-encodes a PDU prefixed by its service centre address, most
/// significant nibble first. The output only uses `[0-9a-f]` and needs no
/// escaping.
pub fn encode_binary(pdu: &[u8], sc_address: &[u8]) -> String {
    let mut blob = Vec::with_capacity(sc_address.len() + pdu.len());
    blob.extend_from_slice(sc_address);
    blob.extend_from_slice(pdu);
    hex::encode(blob)
}

/// Decodes the hex form produced by [`encode_binary`]. Either case is
/// accepted.
pub fn decode_binary(data: &str) -> Result<Vec<u8>> {
    hex::decode(data).map_err(|e| match e {
        FromHexError::OddLength => BMessageError::format(format!(
            "binary body '{}' has an odd number of hex digits",
            data
        )),
        FromHexError::InvalidHexCharacter { c, index } => BMessageError::format(format!(
            "binary body '{}' contains non-hex character {:?} at {}",
            data, c, index
        )),
        other => BMessageError::format(format!("binary body '{}': {}", data, other)),
    })
}
