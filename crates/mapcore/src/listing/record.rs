//! Raw message rows handed over by the message stores.

use serde::{Deserialize, Serialize};

use crate::handle::MessageType;
use crate::listing::element::{ListingElement, ReceptionStatus};
use crate::listing::mask::ParameterMask;

/// One message as read from a content store. Numeric fields keep the
/// store's `-1` convention for "unknown".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: u64,
    pub message_type: MessageType,
    #[serde(default)]
    pub subject: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_address: Option<String>,
    #[serde(default)]
    pub reply_to_address: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub recipient_address: Option<String>,
    #[serde(default = "unknown")]
    pub size: i64,
    #[serde(default)]
    pub has_text: bool,
    #[serde(default)]
    pub partial: bool,
    #[serde(default = "unknown")]
    pub attachment_size: i64,
    #[serde(default)]
    pub high_priority: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub sent: bool,
    #[serde(default)]
    pub protected: bool,
    #[serde(default = "unknown")]
    pub thread_id: i64,
}

fn unknown() -> i64 {
    -1
}

impl MessageRecord {
    pub fn new(id: u64, message_type: MessageType) -> Self {
        Self {
            id,
            message_type,
            subject: None,
            date: 0,
            sender_name: None,
            sender_address: None,
            reply_to_address: None,
            recipient_name: None,
            recipient_address: None,
            size: -1,
            has_text: false,
            partial: false,
            attachment_size: -1,
            high_priority: false,
            read: false,
            sent: false,
            protected: false,
            thread_id: -1,
        }
    }
}

impl ListingElement {
    /// Builds a listing element from a store record, populating only the
    /// attributes requested in `mask`. The read state is listed only when the
    /// mask asks for it and `report_read` allows it.
    pub fn from_record(record: &MessageRecord, mask: ParameterMask, report_read: bool) -> Self {
        let mut element = ListingElement::new(record.id, record.message_type);

        if mask.contains(ParameterMask::SUBJECT) {
            element.set_subject(record.subject.clone().unwrap_or_default());
        }
        element.set_datetime(record.date);
        element.set_show_datetime(mask.contains(ParameterMask::DATETIME));
        if mask.contains(ParameterMask::SENDER_NAME) {
            if let Some(name) = &record.sender_name {
                element.set_sender_name(name.clone());
            }
        }
        if mask.contains(ParameterMask::SENDER_ADDRESSING) {
            if let Some(address) = &record.sender_address {
                element.set_sender_addressing(address);
            }
        }
        if mask.contains(ParameterMask::REPLYTO_ADDRESSING) {
            if let Some(address) = &record.reply_to_address {
                element.set_replyto_addressing(address);
            }
        }
        if mask.contains(ParameterMask::RECIPIENT_NAME) {
            if let Some(name) = &record.recipient_name {
                element.set_recipient_name(name.clone());
            }
        }
        if mask.contains(ParameterMask::RECIPIENT_ADDRESSING) {
            if let Some(address) = &record.recipient_address {
                element.set_recipient_addressing(address);
            }
        }
        element.set_show_type(mask.contains(ParameterMask::TYPE));
        if mask.contains(ParameterMask::SIZE) {
            element.set_size(record.size);
        }
        if mask.contains(ParameterMask::TEXT) {
            element.set_text(record.has_text);
        }
        if mask.contains(ParameterMask::RECEPTION_STATUS) {
            element.set_reception_status(if record.partial {
                ReceptionStatus::Fractioned
            } else {
                ReceptionStatus::Complete
            });
        }
        if mask.contains(ParameterMask::ATTACHMENT_SIZE) {
            element.set_attachment_size(record.attachment_size);
        }
        if mask.contains(ParameterMask::PRIORITY) {
            element.set_priority(record.high_priority);
        }
        element.set_read(
            record.read,
            report_read && mask.contains(ParameterMask::READ),
        );
        if mask.contains(ParameterMask::SENT) {
            element.set_sent(record.sent);
        }
        if mask.contains(ParameterMask::PROTECTED) {
            element.set_protected(record.protected);
        }
        element.set_thread_id(record.thread_id);

        element
    }
}
