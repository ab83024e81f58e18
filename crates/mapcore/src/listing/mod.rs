//! `MAP-msg-listing` documents, plus the folder tree in [`folder`].
//!
//! A listing is built once per GetMessagesListing request: elements are added
//! in store order, optionally sorted and windowed, then encoded to XML.

pub mod element;
pub mod error;
pub mod folder;
pub mod mask;
pub mod record;

use log::{debug, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::config::MasConfig;

pub use element::{normalize_phone_address, ListingElement, ReceptionStatus};
pub use error::ListingError;
pub use folder::FolderElement;
pub use mask::ParameterMask;
pub use record::MessageRecord;

const MESSAGES_LISTING_ELEM: &str = "MAP-msg-listing";
const VERSION_ATTR: &str = "version";
const LISTING_VERSION: &str = "1.0";

#[derive(Debug, Clone, Default)]
pub struct MessageListing {
    elements: Vec<ListingElement>,
    has_unread: bool,
}

impl MessageListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element. Once an unread element has been added the listing
    /// reports unread messages for the rest of its life.
    pub fn add(&mut self, element: ListingElement) {
        if element.read_str().eq_ignore_ascii_case("no") {
            self.has_unread = true;
        }
        self.elements.push(element);
        debug!("Listing size is {}", self.elements.len());
    }

    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn has_unread(&self) -> bool {
        self.has_unread
    }

    pub fn elements(&self) -> &[ListingElement] {
        &self.elements
    }

    /// Sorts newest first. Elements with equal timestamps keep their order.
    pub fn sort(&mut self) {
        self.elements.sort_by(|a, b| a.compare_recency(b));
    }

    /// Returns the `MaxListCount` / `ListStartOffset` window of this listing.
    ///
    /// With `count` clamped to the listing size: a window that fits is taken
    /// as is; an `offset` past the clamped count gives an empty listing;
    /// otherwise the window ends at index `count`, not `offset + count`.
    /// Existing clients depend on that last rule. The unread flag is carried
    /// over unchanged.
    pub fn segment(&self, count: usize, offset: usize) -> MessageListing {
        let len = self.elements.len();
        let count = count.min(len);

        let window: &[ListingElement] = if offset.saturating_add(count) <= len {
            &self.elements[offset..offset + count]
        } else if offset > count {
            debug!(
                "Offset {} greater than count {} for {} elements, returning empty listing",
                offset, count, len
            );
            &[]
        } else {
            &self.elements[offset..count]
        };

        MessageListing {
            elements: window.to_vec(),
            has_unread: self.has_unread,
        }
    }

    /// Encodes the listing as a UTF-8 XML document.
    pub fn encode(&self) -> error::Result<Vec<u8>> {
        self.encode_with(false)
    }

    /// Encodes the listing, adding `thread_id` attributes when asked to.
    ///
    /// An element that cannot be encoded is closed where it failed and
    /// skipped; the rest of the listing is still written.
    pub fn encode_with(&self, include_thread_id: bool) -> error::Result<Vec<u8>> {
        let _span = tracing::info_span!("listing.encode", count = self.elements.len()).entered();

        let mut writer = Writer::new(Vec::new());
        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let root = BytesStart::new(MESSAGES_LISTING_ELEM)
            .with_attributes([(VERSION_ATTR, LISTING_VERSION)]);
        write(&mut writer, Event::Start(root))?;

        for element in &self.elements {
            match element.encode(&mut writer, include_thread_id) {
                Ok(()) => {}
                Err(e @ ListingError::Format { .. }) => warn!("{}", e),
                Err(e) => return Err(e),
            }
        }

        write(&mut writer, Event::End(BytesEnd::new(MESSAGES_LISTING_ELEM)))?;
        Ok(writer.into_inner())
    }

    /// Builds a listing from store records, in store order.
    pub fn from_records(records: &[MessageRecord], mask: ParameterMask, report_read: bool) -> Self {
        let mut listing = MessageListing::new();
        for record in records {
            listing.add(ListingElement::from_record(record, mask, report_read));
        }
        listing
    }
}

/// Renders the body of a GetMessagesListing response: records are mapped
/// through the configured parameter mask, sorted newest first and windowed.
/// A requested `max_list_count` above the configured limit is clamped.
pub fn messages_listing(
    records: &[MessageRecord],
    config: &MasConfig,
    max_list_count: Option<usize>,
    offset: usize,
) -> error::Result<Vec<u8>> {
    let count = max_list_count
        .unwrap_or(config.max_list_count)
        .min(config.max_list_count);
    let mut listing =
        MessageListing::from_records(records, config.parameter_mask, config.report_read);
    listing.sort();
    listing
        .segment(count, offset)
        .encode_with(config.include_thread_id)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> error::Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ListingError::Xml(e.to_string()))
}
