use std::str::FromStr;

use thiserror::Error;

pub const ATTRIBUTE_MIN: i32 = 0;
pub const ATTRIBUTE_MAX: i32 = 3;

/// Numeric properties the engine computes and mutates.
///
/// `Stability`, `Support` and `Security` live on nodes; `Opinion` lives on
/// actors and is gated by the opinion resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Stability,
    Support,
    Security,
    Opinion,
}

pub const NODE_ATTRIBUTES: [Attribute; 3] =
    [Attribute::Stability, Attribute::Support, Attribute::Security];

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Stability => "Stability",
            Attribute::Support => "Support",
            Attribute::Security => "Security",
            Attribute::Opinion => "Opinion",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Attribute::from_str(value).ok()
    }

    pub fn is_node_attribute(self) -> bool {
        !matches!(self, Attribute::Opinion)
    }
}

impl FromStr for Attribute {
    type Err = ParseTagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stability" => Ok(Attribute::Stability),
            "support" => Ok(Attribute::Support),
            "security" => Ok(Attribute::Security),
            "opinion" | "motivation" => Ok(Attribute::Opinion),
            _ => Err(ParseTagError::Attribute(value.to_string())),
        }
    }
}

/// Raised when string tags from content or save data do not map onto one of
/// the closed enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTagError {
    #[error("unknown attribute tag '{0}'")]
    Attribute(String),
    #[error("unknown condition tag '{0}'")]
    Condition(String),
    #[error("unknown trait effect '{0}'")]
    TraitEffect(String),
}

pub fn clamp_attribute(value: i32) -> i32 {
    value.clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX)
}
