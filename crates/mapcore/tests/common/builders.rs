//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use mapcore::bmessage::{BMessage, Charset, SmsPdu, VCard};
use mapcore::config::MasConfig;
use mapcore::handle::MessageType;
use mapcore::listing::{MessageRecord, ParameterMask};

/// Builder for `MessageRecord` rows as a content store would hand them over.
pub struct RecordBuilder {
    record: MessageRecord,
}

impl RecordBuilder {
    pub fn sms(id: u64) -> Self {
        Self::new(id, MessageType::SmsGsm)
    }

    pub fn email(id: u64) -> Self {
        Self::new(id, MessageType::Email)
    }

    pub fn new(id: u64, message_type: MessageType) -> Self {
        Self {
            record: MessageRecord::new(id, message_type),
        }
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.record.subject = Some(subject.to_string());
        self
    }

    /// Milliseconds since the Unix epoch.
    pub fn date(mut self, millis: i64) -> Self {
        self.record.date = millis;
        self
    }

    pub fn sender(mut self, name: &str, address: &str) -> Self {
        self.record.sender_name = Some(name.to_string());
        self.record.sender_address = Some(address.to_string());
        self
    }

    pub fn recipient(mut self, name: &str, address: &str) -> Self {
        self.record.recipient_name = Some(name.to_string());
        self.record.recipient_address = Some(address.to_string());
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.record.size = size;
        self
    }

    pub fn attachment_size(mut self, size: i64) -> Self {
        self.record.attachment_size = size;
        self
    }

    pub fn read(mut self, read: bool) -> Self {
        self.record.read = read;
        self
    }

    pub fn thread_id(mut self, thread_id: i64) -> Self {
        self.record.thread_id = thread_id;
        self
    }

    pub fn build(self) -> MessageRecord {
        self.record
    }
}

/// Builder for `MasConfig`, starting from the defaults.
pub struct MasConfigBuilder {
    config: MasConfig,
}

impl MasConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MasConfig::default(),
        }
    }

    pub fn report_read(mut self, report_read: bool) -> Self {
        self.config.report_read = report_read;
        self
    }

    pub fn include_thread_id(mut self, include: bool) -> Self {
        self.config.include_thread_id = include;
        self
    }

    pub fn max_list_count(mut self, count: usize) -> Self {
        self.config.max_list_count = count;
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.config.charset = charset;
        self
    }

    pub fn parameter_mask(mut self, bits: u32) -> Self {
        self.config.parameter_mask = ParameterMask::new(bits);
        self
    }

    pub fn build(self) -> MasConfig {
        self.config
    }
}

impl Default for MasConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An SMS bMessage in `telecom/msg/<folder>` with one originator and one
/// recipient.
pub fn sms_message(folder: &str, from: &str, to: &str) -> BMessage {
    let mut msg = BMessage::new(MessageType::SmsGsm);
    msg.set_folder(folder);
    msg.add_originator(VCard::v30("", "", &[from], &[]));
    msg.add_recipient(VCard::v30("", "", &[to], &[]));
    msg
}

/// A submit PDU without service centre address.
pub fn submit_pdu(user_data: &[u8]) -> SmsPdu {
    let mut data = vec![0x01, 0x00];
    data.extend_from_slice(user_data);
    SmsPdu::new(data, vec![0x00], "G-7BIT")
}
