use serde::{Deserialize, Serialize};

use crate::bmessage::Charset;
use crate::listing::ParameterMask;

/// Upper bound of the 16 bit `MaxListCount` application parameter.
pub const MAX_LIST_COUNT_LIMIT: usize = u16::MAX as usize;

/// Settings of one MAS (Message Access Server) instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasConfig {
    /// List the `read` attribute. Some car kits mark everything read once
    /// they see it, so this can be turned off.
    #[serde(default = "default_true")]
    pub report_read: bool,
    #[serde(default)]
    pub include_thread_id: bool,
    #[serde(default = "default_max_list_count")]
    pub max_list_count: usize,
    /// Charset used when a request does not carry one.
    #[serde(default)]
    pub charset: Charset,
    #[serde(default)]
    pub parameter_mask: ParameterMask,
}

fn default_true() -> bool {
    true
}

fn default_max_list_count() -> usize {
    1024
}

impl Default for MasConfig {
    fn default() -> Self {
        Self {
            report_read: true,
            include_thread_id: false,
            max_list_count: default_max_list_count(),
            charset: Charset::default(),
            parameter_mask: ParameterMask::default(),
        }
    }
}
