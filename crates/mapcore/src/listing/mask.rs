use serde::{Deserialize, Serialize};

/// The `ParameterMask` application parameter of a GetMessagesListing
/// request. Each bit asks for one optional listing attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMask(u32);

impl ParameterMask {
    pub const SUBJECT: u32 = 0x1;
    pub const DATETIME: u32 = 0x2;
    pub const SENDER_NAME: u32 = 0x4;
    pub const SENDER_ADDRESSING: u32 = 0x8;
    pub const RECIPIENT_NAME: u32 = 0x10;
    pub const RECIPIENT_ADDRESSING: u32 = 0x20;
    pub const TYPE: u32 = 0x40;
    pub const SIZE: u32 = 0x80;
    pub const RECEPTION_STATUS: u32 = 0x100;
    pub const TEXT: u32 = 0x200;
    pub const ATTACHMENT_SIZE: u32 = 0x400;
    pub const PRIORITY: u32 = 0x800;
    pub const READ: u32 = 0x1000;
    pub const SENT: u32 = 0x2000;
    pub const PROTECTED: u32 = 0x4000;
    pub const REPLYTO_ADDRESSING: u32 = 0x8000;

    /// Every attribute defined by MAP 1.0.
    pub const ALL: ParameterMask = ParameterMask(0xffff);

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    /// Bits outside the 16 defined attributes.
    pub const fn unknown_bits(self) -> u32 {
        self.0 & !Self::ALL.0
    }
}

impl Default for ParameterMask {
    fn default() -> Self {
        Self::ALL
    }
}
