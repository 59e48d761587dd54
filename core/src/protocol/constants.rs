//! Centralized BR Code constants
//!
//! Tags, fixed values and length limits of the Pix merchant-presented
//! payload. Everything that ends up on the wire verbatim lives here.

/// Payload Format Indicator (tag 00)
pub const TAG_PAYLOAD_FORMAT: &str = "00";
/// Merchant Account Information template for Pix (tag 26)
pub const TAG_MERCHANT_ACCOUNT: &str = "26";
/// Merchant Category Code (tag 52)
pub const TAG_CATEGORY_CODE: &str = "52";
/// Transaction Currency (tag 53)
pub const TAG_CURRENCY: &str = "53";
/// Transaction Amount (tag 54)
pub const TAG_AMOUNT: &str = "54";
/// Country Code (tag 58)
pub const TAG_COUNTRY: &str = "58";
/// Merchant Name (tag 59)
pub const TAG_MERCHANT_NAME: &str = "59";
/// Merchant City (tag 60)
pub const TAG_MERCHANT_CITY: &str = "60";
/// Additional Data Field template (tag 62)
pub const TAG_ADDITIONAL_DATA: &str = "62";
/// CRC (tag 63)
pub const TAG_CRC: &str = "63";

/// Sub-tags of the merchant account template (26)
pub const SUBTAG_GUI: &str = "00";
pub const SUBTAG_KEY: &str = "01";
pub const SUBTAG_DESCRIPTION: &str = "02";

/// Sub-tag of the additional data template (62) carrying the txid
pub const SUBTAG_TXID: &str = "05";

/// Payload format version, always "01"
pub const PAYLOAD_FORMAT_VERSION: &str = "01";

/// Globally unique identifier of the Pix arrangement
pub const PIX_GUI: &str = "br.gov.bcb.pix";

/// Merchant category code used when none applies
pub const CATEGORY_CODE: &str = "0000";

/// ISO 4217 numeric code for the Brazilian real
pub const CURRENCY_BRL: &str = "986";

/// ISO 3166-1 alpha-2 country code
pub const COUNTRY_CODE: &str = "BR";

/// Tag 63 with its fixed length, appended before the checksum is computed
pub const CRC_PREFIX: &str = "6304";

/// Number of hex digits in the checksum
pub const CRC_LEN: usize = 4;

/// Largest value a two-digit TLV length can describe
pub const MAX_FIELD_LEN: usize = 99;

pub const MAX_MERCHANT_NAME_LEN: usize = 25;
pub const MAX_MERCHANT_CITY_LEN: usize = 15;

/// Transaction id used when the order id has no usable characters
pub const TXID_FALLBACK: &str = "***";
