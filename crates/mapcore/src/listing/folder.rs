//! `folder-listing` documents for SetFolder / GetFolderListing.

use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::error::{ListingError, Result};
use super::write;

const FOLDER_LISTING_ELEM: &str = "folder-listing";
const FOLDER_ELEM: &str = "folder";
const FOLDER_LISTING_VERSION: &str = "1.0";

/// The standard message folders below `telecom/msg`.
pub const MESSAGE_FOLDERS: [&str; 5] = ["inbox", "outbox", "sent", "deleted", "draft"];

/// A node of the virtual folder tree. Sub-folders keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderElement {
    name: String,
    sub_folders: Vec<FolderElement>,
}

impl FolderElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_folders: Vec::new(),
        }
    }

    /// The tree a MAS exposes: an unnamed root holding
    /// `telecom/msg/{inbox,outbox,sent,deleted,draft}`.
    pub fn message_tree() -> Self {
        let mut root = FolderElement::new("");
        let msg = root.add_folder("telecom").add_folder("msg");
        for name in MESSAGE_FOLDERS {
            msg.add_folder(name);
        }
        root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a sub-folder and returns it for further nesting.
    pub fn add_folder(&mut self, name: impl Into<String>) -> &mut FolderElement {
        self.sub_folders.push(FolderElement::new(name));
        let last = self.sub_folders.len() - 1;
        &mut self.sub_folders[last]
    }

    pub fn sub_folder_count(&self) -> usize {
        self.sub_folders.len()
    }

    pub fn sub_folders(&self) -> &[FolderElement] {
        &self.sub_folders
    }

    /// Finds a direct sub-folder, ignoring ASCII case.
    pub fn get_sub_folder(&self, name: &str) -> Option<&FolderElement> {
        self.sub_folders
            .iter()
            .find(|folder| folder.name.eq_ignore_ascii_case(name))
    }

    /// Walks a `/` separated path from this folder. Empty segments are
    /// skipped, so `""` and `"/"` name this folder itself.
    pub fn get_folder(&self, path: &str) -> Option<&FolderElement> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |folder, segment| folder.get_sub_folder(segment))
    }

    /// Encodes the sub-folders in `offset..offset + count` as a
    /// `folder-listing` document. The window is cut at the last sub-folder;
    /// an `offset` past it is an error.
    pub fn encode(&self, offset: usize, count: usize) -> Result<Vec<u8>> {
        let len = self.sub_folders.len();
        if offset > len {
            return Err(ListingError::Offset { offset, len });
        }
        let stop = offset.saturating_add(count).min(len);
        debug!("Folder listing of '{}': {}..{} of {}", self.name, offset, stop, len);

        let mut writer = Writer::new(Vec::new());
        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let root = BytesStart::new(FOLDER_LISTING_ELEM)
            .with_attributes([("version", FOLDER_LISTING_VERSION)]);
        write(&mut writer, Event::Start(root))?;

        for folder in &self.sub_folders[offset..stop] {
            let elem = BytesStart::new(FOLDER_ELEM).with_attributes([("name", folder.name())]);
            write(&mut writer, Event::Empty(elem))?;
        }

        write(&mut writer, Event::End(BytesEnd::new(FOLDER_LISTING_ELEM)))?;
        Ok(writer.into_inner())
    }
}
