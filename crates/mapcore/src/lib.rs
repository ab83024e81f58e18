pub mod auth;
pub mod bmessage;
pub mod config;
pub mod error;
pub mod handle;
pub mod listing;
pub mod logging;

pub use auth::{Authenticator, ConfirmationRequest, Credential};
pub use bmessage::{BMessage, Body, BodyMarker, Charset, ReadStatus, SmsBody, SmsPdu, VCard};
pub use config::{load_config, load_config_from_str, MasConfig};
pub use error::{BMessageError, ConfigError, HandleError, ListingError, MapError, Result};
pub use handle::{Handle, MessageType};
pub use listing::{
    messages_listing, FolderElement, ListingElement, MessageListing, MessageRecord, ParameterMask,
};
