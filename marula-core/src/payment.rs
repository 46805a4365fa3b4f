//! Payment proof validation
//!
//! Mobile-money payment is never verified programmatically; at most the
//! customer attaches a screenshot of the transfer confirmation. This
//! module only vets that attachment. A rejected file blocks the upload
//! step, not the checkout: the customer can still proceed after an
//! explicit confirmation.

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};

/// Maximum proof file size (5MB)
const MAX_PROOF_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// An accepted payment screenshot reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentProof {
    pub file_name: String,
    pub size: usize,
}

/// How the customer vouched for the mobile-money transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentConfirmation {
    /// A screenshot passed [`validate_payment_proof`]
    ProofUploaded(PaymentProof),
    /// The customer explicitly confirmed paying out-of-band (USSD dialer)
    ConfirmedOutOfBand,
}

impl PaymentConfirmation {
    pub fn has_proof(&self) -> bool {
        matches!(self, Self::ProofUploaded(_))
    }
}

/// Validate a payment screenshot by extension and size.
pub fn validate_payment_proof(file_name: &str, size: usize) -> AppResult<PaymentProof> {
    if size > MAX_PROOF_SIZE {
        return Err(AppError::with_message(
            ErrorCode::PaymentProofInvalid,
            format!(
                "File too large. Maximum size is {}MB",
                MAX_PROOF_SIZE / 1024 / 1024
            ),
        )
        .with_detail("size", size as u64));
    }

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::PaymentProofInvalid,
            format!(
                "Unsupported file format '{}'. Supported: {}",
                ext,
                SUPPORTED_FORMATS.join(", ")
            ),
        )
        .with_detail("file_name", file_name));
    }

    Ok(PaymentProof {
        file_name: file_name.to_string(),
        size,
    })
}
