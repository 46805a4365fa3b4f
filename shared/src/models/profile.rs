//! Customer profile model

use serde::{Deserialize, Serialize};

/// The single customer profile on this device. Required before checkout;
/// field validation lives in the core crate's validation helpers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}
