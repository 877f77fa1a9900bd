use serde::{Deserialize, Serialize};

/// A non-fatal warning attached to a response.
///
/// Adapters report settings and tools they silently dropped or rewrote
/// instead of failing the whole call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CallWarning {
    /// A requested setting is not supported by this model.
    #[serde(rename_all = "camelCase")]
    UnsupportedSetting {
        /// The setting that was dropped or rewritten.
        setting: String,
        /// What the adapter did about it.
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },

    /// A requested tool is not supported by this model.
    #[serde(rename_all = "camelCase")]
    UnsupportedTool {
        /// The tool that was dropped.
        tool_name: String,
        /// What the adapter did about it.
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },

    /// Any other warning.
    Other {
        /// The warning message.
        message: String,
    },
}

impl CallWarning {
    /// Warning for a setting the model does not support.
    pub fn unsupported_setting(setting: impl Into<String>) -> Self {
        Self::UnsupportedSetting {
            setting: setting.into(),
            details: None,
        }
    }

    /// Warning for a setting, with an explanation of what happened to it.
    pub fn unsupported_setting_with_details(
        setting: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::UnsupportedSetting {
            setting: setting.into(),
            details: Some(details.into()),
        }
    }

    /// Warning for a tool the model does not support.
    pub fn unsupported_tool(tool_name: impl Into<String>) -> Self {
        Self::UnsupportedTool {
            tool_name: tool_name.into(),
            details: None,
        }
    }

    /// A free-form warning.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
