//! Payment request service that ties payload building and QR rendering together

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::protocol::{validate_amount, PayloadBuilder, PaymentPayload, TransactionId};
use crate::qr::{PngQrEncoder, QrImage, QrImageEncoder};
use crate::{Config, MerchantProfile, Result};

/// One checkout's request for a Pix code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub order_id: String,
}

impl PaymentRequest {
    pub fn new(amount: Decimal, order_id: impl Into<String>) -> Self {
        Self {
            amount,
            order_id: order_id.into(),
        }
    }
}

/// Result of a payment request.
///
/// The payload is always present; the image is best effort.
#[derive(Debug, Clone)]
pub struct PaymentResponse {
    pub payload: PaymentPayload,
    pub txid: TransactionId,
    pub image: Option<QrImage>,
}

impl PaymentResponse {
    /// QR image as a data URI, if one was rendered
    pub fn image_data_uri(&self) -> Option<String> {
        self.image.as_ref().map(QrImage::to_data_uri)
    }
}

/// Builds Pix codes for a fixed merchant
#[derive(Clone)]
pub struct PaymentRequestService {
    profile: Arc<MerchantProfile>,
    encoder: Arc<dyn QrImageEncoder>,
    config: Config,
}

impl PaymentRequestService {
    /// Create a service with the default PNG encoder and config.
    ///
    /// The profile is checked on every request; an invalid one fails each
    /// request with `Error::InvalidProfile`.
    pub fn new(profile: MerchantProfile) -> Self {
        Self::with_config(profile, Config::default())
    }

    /// Create with custom config
    pub fn with_config(profile: MerchantProfile, config: Config) -> Self {
        Self {
            profile: Arc::new(profile),
            encoder: Arc::new(PngQrEncoder::new()),
            config,
        }
    }

    /// Swap the QR rendering collaborator
    pub fn with_encoder(mut self, encoder: impl QrImageEncoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn profile(&self) -> &MerchantProfile {
        &self.profile
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a payload and try to render it.
    ///
    /// Fails only when no payload can be produced (`InvalidAmount`, or
    /// `FieldLengthExceeded` for a misconfigured profile). A rendering failure
    /// leaves `image` empty.
    pub fn request_payment(&self, amount: Decimal, order_id: &str) -> Result<PaymentResponse> {
        self.handle(PaymentRequest::new(amount, order_id))
    }

    pub fn handle(&self, request: PaymentRequest) -> Result<PaymentResponse> {
        let (payload, txid) = self.prepare(&request)?;

        let image = match self.encoder.encode(payload.as_str(), &self.config.qr) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!("QR rendering failed for txid {}: {}", txid, e);
                None
            }
        };

        Ok(PaymentResponse { payload, txid, image })
    }

    /// Like [`request_payment`](Self::request_payment), but renders on the
    /// blocking pool and gives up on the image after `Config::render_timeout`.
    pub async fn request_payment_async(&self, amount: Decimal, order_id: &str) -> Result<PaymentResponse> {
        let (payload, txid) = self.prepare(&PaymentRequest::new(amount, order_id))?;

        let encoder = self.encoder.clone();
        let options = self.config.qr.clone();
        let text = payload.as_str().to_string();
        let task = tokio::task::spawn_blocking(move || encoder.encode(&text, &options));

        let joined = match self.config.render_timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!("QR rendering for txid {} timed out after {:?}", txid, limit);
                    return Ok(PaymentResponse { payload, txid, image: None });
                }
            },
            None => task.await,
        };

        let image = match joined {
            Ok(Ok(image)) => Some(image),
            Ok(Err(e)) => {
                tracing::warn!("QR rendering failed for txid {}: {}", txid, e);
                None
            }
            Err(e) => {
                tracing::warn!("QR rendering task for txid {} aborted: {}", txid, e);
                None
            }
        };

        Ok(PaymentResponse { payload, txid, image })
    }

    fn prepare(&self, request: &PaymentRequest) -> Result<(PaymentPayload, TransactionId)> {
        validate_amount(request.amount)?;
        self.profile.validate()?;
        let txid = TransactionId::from_order_id(&request.order_id);
        let payload = PayloadBuilder::new(&self.profile).build(request.amount, &txid)?;
        tracing::info!("payment requested: {} BRL, txid {}", request.amount, txid);
        Ok((payload, txid))
    }
}
