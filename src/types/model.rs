use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a completion model identifier.
///
/// This can be a predefined model version or a custom string value for
/// models served by OpenAI-compatible hosts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or compatible hosts)
    Custom(String),
}

/// Known OpenAI model versions.
///
/// Model identifiers contain dots, so each variant carries an explicit
/// rename rather than relying on a container-wide case convention.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// GPT-3.5 Turbo
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,

    /// GPT-3.5 Turbo with a 16k context window
    #[serde(rename = "gpt-3.5-turbo-16k")]
    Gpt35Turbo16k,

    /// GPT-4
    #[serde(rename = "gpt-4")]
    Gpt4,

    /// GPT-4 Turbo
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,

    /// GPT-4o
    #[serde(rename = "gpt-4o")]
    Gpt4o,

    /// GPT-4o mini
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownModel::Gpt35Turbo => write!(f, "gpt-3.5-turbo"),
            KnownModel::Gpt35Turbo16k => write!(f, "gpt-3.5-turbo-16k"),
            KnownModel::Gpt4 => write!(f, "gpt-4"),
            KnownModel::Gpt4Turbo => write!(f, "gpt-4-turbo"),
            KnownModel::Gpt4o => write!(f, "gpt-4o"),
            KnownModel::Gpt4oMini => write!(f, "gpt-4o-mini"),
        }
    }
}

impl KnownModel {
    fn from_id(id: &str) -> Option<KnownModel> {
        match id {
            "gpt-3.5-turbo" => Some(KnownModel::Gpt35Turbo),
            "gpt-3.5-turbo-16k" => Some(KnownModel::Gpt35Turbo16k),
            "gpt-4" => Some(KnownModel::Gpt4),
            "gpt-4-turbo" => Some(KnownModel::Gpt4Turbo),
            "gpt-4o" => Some(KnownModel::Gpt4o),
            "gpt-4o-mini" => Some(KnownModel::Gpt4oMini),
            _ => None,
        }
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::from(model.as_str())
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match KnownModel::from_id(model) {
            Some(known) => Model::Known(known),
            None => Model::Custom(model.to_string()),
        }
    }
}
