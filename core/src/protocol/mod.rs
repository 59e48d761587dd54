//! BR Code wire format: TLV fields, checksum, payload assembly

pub mod constants;
pub mod crc;
mod payload;
pub mod tlv;

pub use payload::{format_amount, min_amount, validate_amount, PayloadBuilder, PaymentPayload, PixPayload, TransactionId};
pub use tlv::Field;
