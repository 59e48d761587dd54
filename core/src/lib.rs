//! Pixcode Core - Pix "copy-and-paste" BR Code generation
//!
//! This library builds the EMV merchant-presented payload used by Brazilian
//! instant payments, protects it with a CRC-16 checksum, and renders it as a
//! scannable QR image.

pub mod clipboard;
pub mod protocol;
pub mod qr;
pub mod service;
pub mod text;

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::{Error, Result};

use protocol::constants::{MAX_MERCHANT_CITY_LEN, MAX_MERCHANT_NAME_LEN};

/// Receiving merchant, shared read-only by every payment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Pix key (phone, CPF/CNPJ, e-mail or random key), written verbatim
    pub pix_key: String,
    /// Legal name, normalized and cut to 25 characters on the wire
    pub name: String,
    /// City, normalized and cut to 15 characters on the wire
    pub city: String,
    /// Free-text description shown by the payer's bank app
    #[serde(default)]
    pub description: String,
}

impl MerchantProfile {
    pub fn new(pix_key: impl Into<String>, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            pix_key: pix_key.into(),
            name: name.into(),
            city: city.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Load a profile from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let profile: Self = serde_json::from_slice(&bytes)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject profiles that can never produce a usable payload.
    ///
    /// Every value must be ASCII once normalized: the wire is ASCII, so
    /// TLV lengths and the checksum count one byte per character.
    pub fn validate(&self) -> Result<()> {
        if self.pix_key.trim().is_empty() {
            return Err(Error::InvalidProfile("pix key is empty".to_string()));
        }
        if self.merchant_name().trim().is_empty() {
            return Err(Error::InvalidProfile("merchant name is empty".to_string()));
        }
        if self.merchant_city().trim().is_empty() {
            return Err(Error::InvalidProfile("merchant city is empty".to_string()));
        }

        require_ascii("pix key", &self.pix_key)?;
        require_ascii("merchant name", &self.merchant_name())?;
        require_ascii("merchant city", &self.merchant_city())?;
        require_ascii("description", &self.merchant_description())?;
        Ok(())
    }

    /// Name as written to tag 59
    pub fn merchant_name(&self) -> String {
        text::normalize_truncated(&self.name, MAX_MERCHANT_NAME_LEN)
    }

    /// City as written to tag 60
    pub fn merchant_city(&self) -> String {
        text::normalize_truncated(&self.city, MAX_MERCHANT_CITY_LEN)
    }

    /// Description as written to tag 26/02
    pub fn merchant_description(&self) -> String {
        text::normalize(&self.description)
    }
}

impl Default for MerchantProfile {
    fn default() -> Self {
        Self::new("49999825638", "Banlek Sports", "SAO PAULO").with_description("Compra Esportiva")
    }
}

/// Configuration for the payment request service
#[derive(Debug, Clone)]
pub struct Config {
    /// Where a merchant profile JSON is looked up when none is given
    pub profile_path: PathBuf,
    /// Rendering options handed to the QR encoder
    pub qr: qr::QrOptions,
    /// Upper bound on QR rendering in the async path; `None` waits forever
    pub render_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_path: dirs_home().join(".pixcode").join("profile.json"),
            qr: qr::QrOptions::default(),
            render_timeout: Some(Duration::from_secs(2)),
        }
    }
}

fn require_ascii(what: &str, value: &str) -> Result<()> {
    match value.chars().find(|c| !c.is_ascii()) {
        Some(c) => Err(Error::InvalidProfile(format!(
            "{} {:?} contains non-ASCII character {:?}",
            what, value, c
        ))),
        None => Ok(()),
    }
}

fn dirs_home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// Re-export key types for convenience
pub use protocol::{PaymentPayload, PixPayload, TransactionId};
pub use qr::{PngQrEncoder, QrImage, QrImageEncoder, QrOptions};
pub use service::{PaymentRequest, PaymentRequestService, PaymentResponse};
