//! bMessage objects, the envelope MAP uses to carry a complete message.
//!
//! Encoding produces the bytes returned for a GetMessage request; parsing
//! reads the body of a PushMessage request.

pub mod codec;
pub mod error;
mod reader;
pub mod sms;
pub mod vcard;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::MasConfig;
use crate::handle::MessageType;

pub use error::BMessageError;
pub use sms::{SmsBody, SmsPdu};
pub use vcard::{VCard, VCardVersion};

use codec::{escape_text, unescape_text};
use error::Result;
use reader::{BMsgReader, Property};

const CRLF: &str = "\r\n";
const VERSION: &str = "VERSION:1.0";
const MSG_BEGIN: &str = "BEGIN:MSG";
const MSG_END: &str = "END:MSG";

/// Framing bytes around each fragment: `BEGIN:MSG`, `END:MSG` and three
/// CRLFs.
const FRAGMENT_OVERHEAD: usize = 22;

/// Longest `FOLDER` value; longer paths keep their tail.
const MAX_FOLDER_LEN: usize = 512;

/// MAP nests at most three envelopes.
const MAX_ENV_LEVEL: usize = 3;

/// Prefix of the message folders of a MAS instance.
pub const FOLDER_PREFIX: &str = "telecom/msg/";

/// Encoding used for MMS and email bodies.
const MIME_ENCODING: &str = "8BIT";
const UTF8_CHARSET: &str = "UTF-8";

/// The `Charset` application parameter of a PushMessage or GetMessage
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    /// SMS bodies are transport PDUs in hex form.
    Native,
    #[default]
    Utf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadStatus {
    Read,
    #[default]
    Unread,
}

impl ReadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadStatus::Read => "READ",
            ReadStatus::Unread => "UNREAD",
        }
    }
}

/// The `CHARSET` or `ENCODING` line of a `BBODY`. Only one is ever written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodyMarker {
    #[default]
    None,
    Charset(String),
    Encoding(String),
}

/// Message content, by message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Sms(SmsBody),
    /// MMS and email content already rendered as RFC 2822 style text.
    Mime(Option<String>),
}

impl Body {
    fn for_type(message_type: MessageType) -> Self {
        if message_type.is_sms() {
            Body::Sms(SmsBody::Empty)
        } else {
            Body::Mime(None)
        }
    }

    fn fragments(&self) -> Vec<Vec<u8>> {
        match self {
            Body::Sms(sms) => sms.fragments(),
            Body::Mime(Some(text)) => vec![escape_text(text).into_bytes()],
            Body::Mime(None) => vec![Vec::new()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BMessage {
    status: ReadStatus,
    message_type: MessageType,
    folder: String,
    originators: Vec<VCard>,
    recipients: Vec<VCard>,
    part_id: Option<u64>,
    language: Option<String>,
    marker: BodyMarker,
    body: Body,
}

impl BMessage {
    pub fn new(message_type: MessageType) -> Self {
        Self {
            status: ReadStatus::default(),
            message_type,
            folder: String::new(),
            originators: Vec::new(),
            recipients: Vec::new(),
            part_id: None,
            language: None,
            marker: BodyMarker::None,
            body: Body::for_type(message_type),
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn status(&self) -> ReadStatus {
        self.status
    }

    pub fn set_read(&mut self, read: bool) {
        self.status = if read {
            ReadStatus::Read
        } else {
            ReadStatus::Unread
        };
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Sets a folder below `telecom/msg/`, e.g. `inbox`.
    pub fn set_folder(&mut self, folder: &str) {
        self.folder = format!("{}{}", FOLDER_PREFIX, folder);
    }

    pub fn set_complete_folder(&mut self, folder: impl Into<String>) {
        self.folder = folder.into();
    }

    pub fn originators(&self) -> &[VCard] {
        &self.originators
    }

    pub fn add_originator(&mut self, card: VCard) {
        self.originators.push(card);
    }

    pub fn recipients(&self) -> &[VCard] {
        &self.recipients
    }

    pub fn add_recipient(&mut self, card: VCard) {
        self.recipients.push(card);
    }

    pub fn part_id(&self) -> Option<u64> {
        self.part_id
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn marker(&self) -> &BodyMarker {
        &self.marker
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The decoded text of an SMS or the rendered content of an MMS/email.
    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            Body::Sms(sms) => sms.text(),
            Body::Mime(text) => text.as_deref(),
        }
    }

    /// Replaces the body with decoded SMS text, switching the marker to
    /// `CHARSET:UTF-8`.
    pub fn set_sms_text(&mut self, text: impl Into<String>) {
        self.body = Body::Sms(SmsBody::Text(text.into()));
        self.marker = BodyMarker::Charset(UTF8_CHARSET.to_string());
    }

    /// Replaces the body with native PDUs, switching the marker to the
    /// encoding of the first PDU.
    pub fn set_sms_pdus(&mut self, pdus: Vec<SmsPdu>) {
        self.marker = match pdus.first() {
            Some(pdu) => BodyMarker::Encoding(pdu.encoding().to_string()),
            None => BodyMarker::None,
        };
        self.body = Body::Sms(SmsBody::Pdus(pdus));
    }

    /// Replaces the body with rendered MMS/email content.
    pub fn set_mime_text(&mut self, text: impl Into<String>) {
        self.body = Body::Mime(Some(text.into()));
        self.marker = BodyMarker::Encoding(MIME_ENCODING.to_string());
    }

    /// Encodes the message for a GetMessage response.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let _span = tracing::info_span!("bmessage.encode", message_type = %self.message_type)
            .entered();
        match (&self.body, self.message_type.is_sms()) {
            (Body::Sms(_), true) | (Body::Mime(_), false) => {}
            _ => {
                return Err(BMessageError::format(format!(
                    "{} message cannot carry a {} body",
                    self.message_type,
                    if self.message_type.is_sms() { "MIME" } else { "SMS" }
                )))
            }
        }
        Ok(self.encode_generic(&self.body.fragments()))
    }

    /// Wraps body fragments in the bMessage envelope.
    pub fn encode_generic(&self, fragments: &[Vec<u8>]) -> Vec<u8> {
        let mut head = String::with_capacity(256);
        push_line(&mut head, "BEGIN:BMSG");
        push_line(&mut head, VERSION);
        push_line(&mut head, &format!("STATUS:{}", self.status.as_str()));
        push_line(&mut head, &format!("TYPE:{}", self.message_type));
        push_line(&mut head, &format!("FOLDER:{}", folder_tail(&self.folder)));
        for card in &self.originators {
            card.encode(&mut head);
        }
        push_line(&mut head, "BEGIN:BENV");
        for card in &self.recipients {
            card.encode(&mut head);
        }
        push_line(&mut head, "BEGIN:BBODY");
        match &self.marker {
            BodyMarker::Encoding(encoding) if !encoding.is_empty() => {
                push_line(&mut head, &format!("ENCODING:{}", encoding))
            }
            BodyMarker::Charset(charset) if !charset.is_empty() => {
                push_line(&mut head, &format!("CHARSET:{}", charset))
            }
            _ => {}
        }
        let length: usize = fragments.iter().map(|f| f.len() + FRAGMENT_OVERHEAD).sum();
        push_line(&mut head, &format!("LENGTH:{}", length));

        let tail = "END:BBODY\r\nEND:BENV\r\nEND:BMSG\r\n";

        let mut out = Vec::with_capacity(head.len() + length + tail.len());
        out.extend_from_slice(head.as_bytes());
        for fragment in fragments {
            out.extend_from_slice(MSG_BEGIN.as_bytes());
            out.extend_from_slice(CRLF.as_bytes());
            out.extend_from_slice(fragment);
            out.extend_from_slice(CRLF.as_bytes());
            out.extend_from_slice(MSG_END.as_bytes());
            out.extend_from_slice(CRLF.as_bytes());
        }
        out.extend_from_slice(tail.as_bytes());
        out
    }

    /// Parses the bMessage of a PushMessage request. `charset` is the
    /// request's `Charset` application parameter; `Native` is only valid for
    /// SMS.
    pub fn parse(data: &[u8], charset: Charset) -> Result<Self> {
        let _span = tracing::info_span!("bmessage.parse", len = data.len()).entered();
        let mut reader = BMsgReader::new(data);
        reader.expect("BEGIN:BMSG")?;
        reader.expect(VERSION)?;

        let mut status = None;
        let mut message_type = None;
        let mut folder = None;

        let mut line = reader.line_enforce()?;
        while !line.contains("BEGIN:VCARD") && !line.contains("BEGIN:BENV") {
            if let Some(prop) = Property::parse(line) {
                match prop.name.as_str() {
                    "STATUS" => {
                        status = Some(match prop.value {
                            "READ" => ReadStatus::Read,
                            "UNREAD" => ReadStatus::Unread,
                            other => {
                                return Err(BMessageError::format(format!(
                                    "wrong value in 'STATUS': {}",
                                    other
                                )))
                            }
                        })
                    }
                    "TYPE" => {
                        let parsed: MessageType = prop.value.parse().map_err(|e: String| {
                            BMessageError::format(format!("wrong value in 'TYPE': {}", e))
                        })?;
                        if charset == Charset::Native && !parsed.is_sms() {
                            return Err(BMessageError::format(format!(
                                "native charset only supported for SMS, got {}",
                                parsed
                            )));
                        }
                        message_type = Some(parsed);
                    }
                    // Empty for pushed messages
                    "FOLDER" if !prop.value.is_empty() => folder = Some(prop.value.to_string()),
                    _ => {}
                }
            }
            line = reader.line_enforce()?;
        }

        let message_type = message_type.ok_or_else(|| {
            BMessageError::format("missing bMessage TYPE, unable to parse body content")
        })?;
        let mut msg = BMessage::new(message_type);
        if let Some(status) = status {
            msg.status = status;
        }
        if let Some(folder) = folder {
            msg.folder = folder;
        }

        while line.contains("BEGIN:VCARD") {
            debug!("Decoding originator vCard");
            msg.originators.push(VCard::parse(&mut reader, 0)?);
            line = reader.line_enforce()?;
        }
        if !line.contains("BEGIN:BENV") {
            return Err(BMessageError::format(format!(
                "bMessage has no BEGIN:BENV, found \"{}\"",
                line
            )));
        }
        msg.parse_envelope(&mut reader, charset, 0)?;
        Ok(msg)
    }

    /// Parses a PushMessage body. A request without a `Charset` parameter
    /// uses the charset configured for the MAS instance.
    pub fn parse_with_config(
        data: &[u8],
        requested: Option<Charset>,
        config: &MasConfig,
    ) -> Result<Self> {
        let charset = requested.unwrap_or(config.charset);
        debug!("Parsing pushed bMessage with charset {:?}", charset);
        Self::parse(data, charset)
    }

    fn parse_envelope(
        &mut self,
        reader: &mut BMsgReader<'_>,
        charset: Charset,
        level: usize,
    ) -> Result<()> {
        if level >= MAX_ENV_LEVEL {
            return Err(BMessageError::format(format!(
                "envelopes nested deeper than {} levels",
                MAX_ENV_LEVEL
            )));
        }
        debug!("Decoding envelope level {}", level);

        let mut line = reader.line_enforce()?;
        while line.contains("BEGIN:VCARD") {
            self.recipients.push(VCard::parse(reader, level)?);
            line = reader.line_enforce()?;
        }
        if line.contains("BEGIN:BENV") {
            return self.parse_envelope(reader, charset, level + 1);
        }
        if line.contains("BEGIN:BBODY") {
            return self.parse_body(reader, charset);
        }
        Err(BMessageError::format(format!(
            "expected BEGIN:BBODY, found \"{}\"",
            line
        )))
    }

    fn parse_body(&mut self, reader: &mut BMsgReader<'_>, charset: Charset) -> Result<()> {
        let mut length: Option<u64> = None;
        let mut text = String::new();
        let mut pdus = Vec::new();
        let mut found_msg = false;

        let mut line = reader.line_enforce()?;
        while !line.contains("END:") {
            if line.contains(MSG_BEGIN) {
                if length.is_none() {
                    return Err(BMessageError::format(
                        "missing 'LENGTH', unable to read the message content",
                    ));
                }
                found_msg = true;
                let part = unescape_text(&reader.until(MSG_END)?);
                if charset == Charset::Native {
                    debug!("Decoding native PDU part of {} characters", part.len());
                    let encoding = match &self.marker {
                        BodyMarker::Encoding(encoding) => encoding.clone(),
                        _ => String::new(),
                    };
                    pdus.push(SmsPdu::from_native(part.trim(), encoding)?);
                } else {
                    text.push_str(&part);
                }
            } else if let Some(prop) = Property::parse(line) {
                match prop.name.as_str() {
                    "PARTID" => self.part_id = Some(parse_number(&prop, line)?),
                    "ENCODING" => {
                        self.marker = BodyMarker::Encoding(require_value(&prop, line)?)
                    }
                    "CHARSET" => self.marker = BodyMarker::Charset(require_value(&prop, line)?),
                    "LANGUAGE" => self.language = Some(require_value(&prop, line)?),
                    "LENGTH" => length = Some(parse_number(&prop, line)?),
                    _ => {}
                }
            }
            line = reader.line_enforce()?;
        }

        if found_msg {
            self.body = match (self.message_type.is_sms(), charset) {
                (true, Charset::Native) => Body::Sms(SmsBody::Pdus(pdus)),
                (true, Charset::Utf8) => Body::Sms(SmsBody::Text(text)),
                (false, _) => Body::Mime(Some(text)),
            };
        }
        Ok(())
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(CRLF);
}

fn folder_tail(folder: &str) -> &str {
    let chars = folder.chars().count();
    if chars <= MAX_FOLDER_LEN {
        return folder;
    }
    let start = folder
        .char_indices()
        .nth(chars - MAX_FOLDER_LEN)
        .map_or(0, |(i, _)| i);
    &folder[start..]
}

fn require_value(prop: &Property<'_>, line: &str) -> Result<String> {
    if prop.value.is_empty() {
        return Err(BMessageError::format(format!(
            "missing value for '{}': {}",
            prop.name, line
        )));
    }
    Ok(prop.value.to_string())
}

fn parse_number<T: std::str::FromStr>(prop: &Property<'_>, line: &str) -> Result<T> {
    require_value(prop, line)?.parse().map_err(|_| {
        BMessageError::format(format!("wrong value in '{}': {}", prop.name, prop.value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sms_with_text(text: &str) -> BMessage {
        let mut msg = BMessage::new(MessageType::SmsGsm);
        msg.set_folder("inbox");
        msg.set_read(true);
        msg.add_originator(VCard::v21("Doe;Jane", &["+15550100"], &[]));
        msg.add_recipient(VCard::v30("", "", &["5550199"], &[]));
        msg.set_sms_text(text);
        msg
    }

    #[test]
    fn test_encode_sms_text() {
        let out = String::from_utf8(sms_with_text("Hi").encode().unwrap()).unwrap();
        assert_eq!(
            out,
            "BEGIN:BMSG\r\nVERSION:1.0\r\nSTATUS:READ\r\nTYPE:SMS_GSM\r\n\
             FOLDER:telecom/msg/inbox\r\n\
             BEGIN:VCARD\r\nVERSION:2.1\r\nN:Doe;Jane\r\nTEL:+15550100\r\nEND:VCARD\r\n\
             BEGIN:BENV\r\n\
             BEGIN:VCARD\r\nVERSION:3.0\r\nFN:\r\nN:\r\nTEL:5550199\r\nEND:VCARD\r\n\
             BEGIN:BBODY\r\nCHARSET:UTF-8\r\nLENGTH:24\r\n\
             BEGIN:MSG\r\nHi\r\nEND:MSG\r\n\
             END:BBODY\r\nEND:BENV\r\nEND:BMSG\r\n"
        );
    }

    #[test]
    fn test_empty_body_encodes_one_empty_fragment() {
        let mut msg = BMessage::new(MessageType::SmsCdma);
        msg.set_folder("draft");
        let out = String::from_utf8(msg.encode().unwrap()).unwrap();
        assert!(out.contains("LENGTH:22\r\nBEGIN:MSG\r\n\r\nEND:MSG\r\n"));
        assert!(!out.contains("CHARSET"));
        assert!(!out.contains("ENCODING"));
    }

    #[test]
    fn test_markers_are_exclusive() {
        let mut msg = BMessage::new(MessageType::SmsGsm);
        msg.set_sms_pdus(vec![SmsPdu::new(vec![1], vec![0], "G-7BIT")]);
        assert_eq!(msg.marker(), &BodyMarker::Encoding("G-7BIT".to_string()));
        msg.set_sms_text("x");
        assert_eq!(msg.marker(), &BodyMarker::Charset("UTF-8".to_string()));
        assert!(matches!(msg.body(), Body::Sms(SmsBody::Text(_))));

        let out = String::from_utf8(msg.encode().unwrap()).unwrap();
        assert!(out.contains("CHARSET:UTF-8"));
        assert!(!out.contains("ENCODING:"));
    }

    #[test]
    fn test_folder_is_truncated_from_the_front() {
        let mut msg = BMessage::new(MessageType::Email);
        let long = format!("{}{}", "x".repeat(100), "y".repeat(MAX_FOLDER_LEN));
        msg.set_complete_folder(long);
        let out = String::from_utf8(msg.encode().unwrap()).unwrap();
        assert!(out.contains(&format!("FOLDER:{}\r\n", "y".repeat(MAX_FOLDER_LEN))));
    }

    #[test]
    fn test_body_must_match_type() {
        let mut msg = BMessage::new(MessageType::Mms);
        msg.set_sms_text("wrong");
        assert!(msg.encode().is_err());
    }

    #[test]
    fn test_text_round_trip_through_parse() {
        let text = "first line\r\nEND:MSG\r\nstill the message /END:MSG";
        let encoded = sms_with_text(text).encode().unwrap();
        let parsed = BMessage::parse(&encoded, Charset::Utf8).unwrap();
        assert_eq!(parsed.body_text(), Some(text));
        assert_eq!(parsed.status(), ReadStatus::Read);
        assert_eq!(parsed.message_type(), MessageType::SmsGsm);
        assert_eq!(parsed.folder(), "telecom/msg/inbox");
        assert_eq!(parsed.originators().len(), 1);
        assert_eq!(parsed.recipients()[0].first_phone_number(), Some("5550199"));
    }

    #[test]
    fn test_pdu_round_trip_through_parse() {
        let mut msg = BMessage::new(MessageType::SmsGsm);
        msg.set_folder("outbox");
        let pdu = SmsPdu::new(vec![0x01, 0x00, 0x03], vec![0x00], "G-7BIT");
        msg.set_sms_pdus(vec![pdu.clone()]);
        let encoded = msg.encode().unwrap();

        let parsed = BMessage::parse(&encoded, Charset::Native).unwrap();
        match parsed.body() {
            Body::Sms(body) => assert_eq!(body.pdus(), &[pdu]),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_deliver_pdu() {
        let data = "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:SMS_GSM\r\nFOLDER:\r\nBEGIN:BENV\r\n\
                    BEGIN:BBODY\r\nLENGTH:30\r\nBEGIN:MSG\r\n0004\r\nEND:MSG\r\n\
                    END:BBODY\r\nEND:BENV\r\nEND:BMSG\r\n";
        let err = BMessage::parse(data.as_bytes(), Charset::Native).unwrap_err();
        assert!(err.to_string().contains("only submit PDUs supported"));
    }

    #[test]
    fn test_parse_native_requires_sms() {
        let data = "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:MMS\r\nBEGIN:BENV\r\n";
        assert!(BMessage::parse(data.as_bytes(), Charset::Native).is_err());
    }

    #[test]
    fn test_parse_requires_type_and_length() {
        let no_type = "BEGIN:BMSG\r\nVERSION:1.0\r\nSTATUS:READ\r\nBEGIN:BENV\r\n";
        assert!(BMessage::parse(no_type.as_bytes(), Charset::Utf8).is_err());

        let no_length = "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:SMS_GSM\r\nBEGIN:BENV\r\n\
                         BEGIN:BBODY\r\nBEGIN:MSG\r\nhi\r\nEND:MSG\r\nEND:BBODY\r\n";
        assert!(BMessage::parse(no_length.as_bytes(), Charset::Utf8).is_err());
    }

    #[test]
    fn test_parse_bad_status() {
        let data = "BEGIN:BMSG\r\nVERSION:1.0\r\nSTATUS:MAYBE\r\nTYPE:SMS_GSM\r\n";
        let err = BMessage::parse(data.as_bytes(), Charset::Utf8).unwrap_err();
        assert!(err.to_string().contains("MAYBE"));
    }

    #[test]
    fn test_parse_nested_envelope() {
        let data = "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:EMAIL\r\nBEGIN:BENV\r\n\
                    BEGIN:VCARD\r\nVERSION:3.0\r\nEMAIL:a@example.com\r\nEND:VCARD\r\n\
                    BEGIN:BENV\r\n\
                    BEGIN:VCARD\r\nVERSION:3.0\r\nEMAIL:b@example.com\r\nEND:VCARD\r\n\
                    BEGIN:BBODY\r\nENCODING:8BIT\r\nLENGTH:40\r\n\
                    BEGIN:MSG\r\nSubject: hi\r\n\r\nbody\r\nEND:MSG\r\n\
                    END:BBODY\r\nEND:BENV\r\nEND:BENV\r\nEND:BMSG\r\n";
        let msg = BMessage::parse(data.as_bytes(), Charset::Utf8).unwrap();
        assert_eq!(msg.recipients().len(), 2);
        assert_eq!(msg.recipients()[1].env_level(), 1);
        assert_eq!(msg.marker(), &BodyMarker::Encoding("8BIT".to_string()));
        assert_eq!(msg.body_text(), Some("Subject: hi\r\n\r\nbody"));
    }

    #[test]
    fn test_mime_body_is_escaped() {
        let mut msg = BMessage::new(MessageType::Email);
        msg.set_mime_text("Subject: x\r\n\r\nEND:MSG");
        let out = String::from_utf8(msg.encode().unwrap()).unwrap();
        assert!(out.contains("ENCODING:8BIT"));
        assert!(out.contains("\r\n/END:MSG\r\nEND:MSG\r\n"));
    }
}
