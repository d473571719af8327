use thiserror::Error;

pub mod analytics;
pub mod category;
pub mod clock;
pub mod digest;
pub mod task;
pub mod user;

#[cfg(test)]
pub mod test_util;

/// A raw value read from storage or a request did not match any variant of a fixed
/// enumeration such as task priority or status
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("unrecognized {kind} \"{value}\"")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
