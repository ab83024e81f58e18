use std::cmp::Ordering;
use std::io::Write;

use chrono::{Local, TimeZone};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Writer;

use crate::handle::{Handle, MessageType};
use crate::listing::error::ListingError;

pub(crate) const MESSAGE_ELEM: &str = "msg";

const HANDLE_ATTR: &str = "handle";
const SUBJECT_ATTR: &str = "subject";
const DATETIME_ATTR: &str = "datetime";
const SENDER_NAME_ATTR: &str = "sender_name";
const SENDER_ADDRESSING_ATTR: &str = "sender_addressing";
const REPLYTO_ADDRESSING_ATTR: &str = "replyto_addressing";
const RECIPIENT_NAME_ATTR: &str = "recipient_name";
const RECIPIENT_ADDRESSING_ATTR: &str = "recipient_addressing";
const TYPE_ATTR: &str = "type";
const SIZE_ATTR: &str = "size";
const TEXT_ATTR: &str = "text";
const RECEPTION_STATUS_ATTR: &str = "reception_status";
const ATTACHMENT_SIZE_ATTR: &str = "attachment_size";
const PRIORITY_ATTR: &str = "priority";
const READ_ATTR: &str = "read";
const SENT_ATTR: &str = "sent";
const PROTECTED_ATTR: &str = "protected";
const THREAD_ID_ATTR: &str = "thread_id";

/// Listing timestamps are local time, `YYYYMMDDTHHMMSS`.
const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Shortest addressing value a non-email listing entry may carry.
const MIN_ADDRESS_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceptionStatus {
    Complete,
    Fractioned,
    Notification,
}

impl ReceptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceptionStatus::Complete => "complete",
            ReceptionStatus::Fractioned => "fractioned",
            ReceptionStatus::Notification => "notification",
        }
    }
}

/// Metadata of one message in a `MAP-msg-listing`.
///
/// Optional fields left unset never show up in the encoded element. Sizes
/// taken from a content store use `-1` for "unknown", a datetime of `0` means
/// "no timestamp".
#[derive(Debug, Clone)]
pub struct ListingElement {
    handle: Handle,
    subject: Option<String>,
    datetime: i64,
    show_datetime: bool,
    sender_name: Option<String>,
    sender_addressing: Option<String>,
    replyto_addressing: Option<String>,
    recipient_name: Option<String>,
    recipient_addressing: Option<String>,
    show_type: bool,
    size: Option<u64>,
    text: Option<bool>,
    reception_status: Option<ReceptionStatus>,
    attachment_size: Option<u64>,
    priority: Option<bool>,
    read: bool,
    report_read: bool,
    sent: Option<bool>,
    protect: Option<bool>,
    thread_id: Option<u64>,
}

impl ListingElement {
    pub fn new(content_id: u64, message_type: MessageType) -> Self {
        Self {
            handle: Handle::new(content_id, message_type),
            subject: None,
            datetime: 0,
            show_datetime: true,
            sender_name: None,
            sender_addressing: None,
            replyto_addressing: None,
            recipient_name: None,
            recipient_addressing: None,
            show_type: true,
            size: None,
            text: None,
            reception_status: None,
            attachment_size: None,
            priority: None,
            read: false,
            report_read: false,
            sent: None,
            protect: None,
            thread_id: None,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn message_type(&self) -> MessageType {
        self.handle.message_type()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = Some(subject.into());
    }

    /// Milliseconds since the Unix epoch, `0` when unset.
    pub fn datetime(&self) -> i64 {
        self.datetime
    }

    /// The datetime is kept for sorting even when it is not listed.
    pub fn set_datetime(&mut self, millis: i64) {
        self.datetime = millis;
    }

    pub fn set_show_datetime(&mut self, show: bool) {
        self.show_datetime = show;
    }

    /// The datetime rendered in local time, truncated to whole seconds.
    pub fn datetime_string(&self) -> Option<String> {
        Local
            .timestamp_millis_opt(self.datetime)
            .single()
            .map(|dt| dt.format(DATETIME_FORMAT).to_string())
    }

    pub fn sender_name(&self) -> Option<&str> {
        self.sender_name.as_deref()
    }

    pub fn set_sender_name(&mut self, name: impl Into<String>) {
        self.sender_name = Some(name.into());
    }

    pub fn sender_addressing(&self) -> Option<&str> {
        self.sender_addressing.as_deref()
    }

    pub fn set_sender_addressing(&mut self, address: &str) {
        self.sender_addressing = Some(self.normalize_address(address));
    }

    pub fn replyto_addressing(&self) -> Option<&str> {
        self.replyto_addressing.as_deref()
    }

    pub fn set_replyto_addressing(&mut self, address: &str) {
        self.replyto_addressing = Some(self.normalize_address(address));
    }

    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_name.as_deref()
    }

    pub fn set_recipient_name(&mut self, name: impl Into<String>) {
        self.recipient_name = Some(name.into());
    }

    pub fn recipient_addressing(&self) -> Option<&str> {
        self.recipient_addressing.as_deref()
    }

    pub fn set_recipient_addressing(&mut self, address: &str) {
        self.recipient_addressing = Some(self.normalize_address(address));
    }

    /// Controls whether the `type` attribute is listed. The handle always
    /// carries the type.
    pub fn set_show_type(&mut self, show: bool) {
        self.show_type = show;
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Negative sizes mean unknown.
    pub fn set_size(&mut self, size: i64) {
        self.size = u64::try_from(size).ok();
    }

    pub fn set_text(&mut self, has_text: bool) {
        self.text = Some(has_text);
    }

    pub fn set_reception_status(&mut self, status: ReceptionStatus) {
        self.reception_status = Some(status);
    }

    pub fn attachment_size(&self) -> Option<u64> {
        self.attachment_size
    }

    /// Negative sizes mean unknown.
    pub fn set_attachment_size(&mut self, size: i64) {
        self.attachment_size = u64::try_from(size).ok();
    }

    pub fn set_priority(&mut self, high: bool) {
        self.priority = Some(high);
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    /// The read state as listed, `"yes"` or `"no"`.
    pub fn read_str(&self) -> &'static str {
        yes_no(self.read)
    }

    /// Sets the read state. `report_read` decides whether the state may be
    /// listed at all.
    pub fn set_read(&mut self, read: bool, report_read: bool) {
        self.read = read;
        self.report_read = report_read;
    }

    pub fn set_sent(&mut self, sent: bool) {
        self.sent = Some(sent);
    }

    pub fn set_protected(&mut self, protect: bool) {
        self.protect = Some(protect);
    }

    pub fn thread_id(&self) -> Option<u64> {
        self.thread_id
    }

    /// Negative ids mean the message is not part of a thread.
    pub fn set_thread_id(&mut self, thread_id: i64) {
        self.thread_id = u64::try_from(thread_id).ok();
    }

    /// Listing order: newest first.
    pub fn compare_recency(&self, other: &Self) -> Ordering {
        other.datetime.cmp(&self.datetime)
    }

    fn normalize_address(&self, address: &str) -> String {
        if self.message_type() == MessageType::Email {
            address.to_string()
        } else {
            normalize_phone_address(address)
        }
    }

    /// Writes this element as one `<msg/>` to `writer`.
    ///
    /// The element is always closed. If a field cannot be encoded the
    /// attributes pushed before it are kept and the error is returned.
    pub fn encode<W: Write>(
        &self,
        writer: &mut Writer<W>,
        include_thread_id: bool,
    ) -> Result<(), ListingError> {
        let mut msg = BytesStart::new(MESSAGE_ELEM);
        let result = self.push_attributes(&mut msg, include_thread_id);
        writer
            .write_event(Event::Empty(msg))
            .map_err(|e| ListingError::Xml(e.to_string()))?;
        result
    }

    fn push_attributes(
        &self,
        msg: &mut BytesStart<'_>,
        include_thread_id: bool,
    ) -> Result<(), ListingError> {
        let handle = self.handle.to_string();
        msg.push_attribute((HANDLE_ATTR, handle.as_str()));

        if let Some(subject) = &self.subject {
            msg.push_attribute((SUBJECT_ATTR, strip_invalid_chars(subject).as_str()));
        }
        if self.show_datetime && self.datetime != 0 {
            let datetime = self.datetime_string().ok_or_else(|| ListingError::Format {
                handle: handle.clone(),
                reason: format!("datetime {} out of range", self.datetime),
            })?;
            msg.push_attribute((DATETIME_ATTR, datetime.as_str()));
        }
        if let Some(name) = &self.sender_name {
            msg.push_attribute((SENDER_NAME_ATTR, strip_invalid_chars(name).as_str()));
        }
        if let Some(address) = &self.sender_addressing {
            push_checked(msg, &handle, SENDER_ADDRESSING_ATTR, address)?;
        }
        if let Some(address) = &self.replyto_addressing {
            push_checked(msg, &handle, REPLYTO_ADDRESSING_ATTR, address)?;
        }
        if let Some(name) = &self.recipient_name {
            msg.push_attribute((RECIPIENT_NAME_ATTR, strip_invalid_chars(name).as_str()));
        }
        if let Some(address) = &self.recipient_addressing {
            push_checked(msg, &handle, RECIPIENT_ADDRESSING_ATTR, address)?;
        }
        if self.show_type {
            msg.push_attribute((TYPE_ATTR, self.message_type().as_str()));
        }
        if let Some(size) = self.size {
            msg.push_attribute((SIZE_ATTR, size.to_string().as_str()));
        }
        if let Some(text) = self.text {
            msg.push_attribute((TEXT_ATTR, yes_no(text)));
        }
        if let Some(status) = self.reception_status {
            msg.push_attribute((RECEPTION_STATUS_ATTR, status.as_str()));
        }
        if let Some(size) = self.attachment_size {
            msg.push_attribute((ATTACHMENT_SIZE_ATTR, size.to_string().as_str()));
        }
        if let Some(priority) = self.priority {
            msg.push_attribute((PRIORITY_ATTR, yes_no(priority)));
        }
        if self.report_read {
            msg.push_attribute((READ_ATTR, self.read_str()));
        }
        if let Some(sent) = self.sent {
            msg.push_attribute((SENT_ATTR, yes_no(sent)));
        }
        if let Some(protect) = self.protect {
            msg.push_attribute((PROTECTED_ATTR, yes_no(protect)));
        }
        if include_thread_id {
            if let Some(thread_id) = self.thread_id {
                msg.push_attribute((THREAD_ID_ATTR, thread_id.to_string().as_str()));
            }
        }
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn push_checked(
    msg: &mut BytesStart<'_>,
    handle: &str,
    name: &str,
    value: &str,
) -> Result<(), ListingError> {
    if let Some(bad) = value.chars().find(|c| !is_xml_char(*c)) {
        return Err(ListingError::Format {
            handle: handle.to_string(),
            reason: format!("{} '{}' contains illegal character {:?}", name, value, bad),
        });
    }
    msg.push_attribute((name, value));
    Ok(())
}

/// Characters allowed by XML 1.0.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Drops characters that cannot appear in an XML attribute.
fn strip_invalid_chars(text: &str) -> String {
    text.chars().filter(|c| is_xml_char(*c)).collect()
}

/// Reduces a phone address to its digits. Values with fewer than two digits
/// are left-padded with `0`.
pub fn normalize_phone_address(address: &str) -> String {
    let digits: String = address.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{:0>width$}", digits, width = MIN_ADDRESS_LEN)
}
