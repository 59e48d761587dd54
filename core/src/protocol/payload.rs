//! BR Code payload assembly and parsing

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::protocol::constants::*;
use crate::protocol::crc::checksum;
use crate::protocol::tlv::{decode_fields, encode_fields, format_field, Field};
use crate::{Error, MerchantProfile, Result};

/// Smallest payable amount, one centavo
pub fn min_amount() -> Decimal {
    Decimal::new(1, 2)
}

/// Reject amounts below one centavo
pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount < min_amount() {
        return Err(Error::InvalidAmount(amount));
    }
    Ok(())
}

/// Format an amount for tag 54: two decimals, `.` separator, no grouping.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Transaction id carried in tag 62/05
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Keep only ASCII letters and digits of the order id, or `***` if none
    /// remain.
    pub fn from_order_id(order_id: &str) -> Self {
        let clean: String = order_id.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if clean.is_empty() {
            Self(TXID_FALLBACK.to_string())
        } else {
            Self(clean)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete, checksummed BR Code ready for copy-paste or QR rendering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PaymentPayload(String);

impl PaymentPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The trailing 4 hex digits
    pub fn checksum(&self) -> &str {
        &self.0[self.0.len() - CRC_LEN..]
    }

    /// Top-level TLV fields, including tag 63
    pub fn fields(&self) -> Result<Vec<Field>> {
        decode_fields(&self.0)
    }
}

impl fmt::Display for PaymentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PaymentPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds payloads for one merchant
pub struct PayloadBuilder<'a> {
    profile: &'a MerchantProfile,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(profile: &'a MerchantProfile) -> Self {
        Self { profile }
    }

    /// Top-level fields in wire order, tag 63 excluded.
    ///
    /// Fails before producing anything if the amount is below 0.01 or the
    /// profile cannot be written as ASCII.
    pub fn fields(&self, amount: Decimal, txid: &TransactionId) -> Result<Vec<Field>> {
        validate_amount(amount)?;
        self.profile.validate()?;

        let mut account = vec![
            Field::new(SUBTAG_GUI, PIX_GUI),
            Field::new(SUBTAG_KEY, self.profile.pix_key.as_str()),
        ];
        let description = self.profile.merchant_description();
        if !description.is_empty() {
            account.push(Field::new(SUBTAG_DESCRIPTION, description));
        }

        Ok(vec![
            Field::new(TAG_PAYLOAD_FORMAT, PAYLOAD_FORMAT_VERSION),
            Field::new(TAG_MERCHANT_ACCOUNT, encode_fields(&account)?),
            Field::new(TAG_CATEGORY_CODE, CATEGORY_CODE),
            Field::new(TAG_CURRENCY, CURRENCY_BRL),
            Field::new(TAG_AMOUNT, format_amount(amount)),
            Field::new(TAG_COUNTRY, COUNTRY_CODE),
            Field::new(TAG_MERCHANT_NAME, self.profile.merchant_name()),
            Field::new(TAG_MERCHANT_CITY, self.profile.merchant_city()),
            Field::new(TAG_ADDITIONAL_DATA, encode_fields(&[Field::new(SUBTAG_TXID, txid.as_str())])?),
        ])
    }

    /// Assemble the payload and append its checksum.
    pub fn build(&self, amount: Decimal, txid: &TransactionId) -> Result<PaymentPayload> {
        let fields = self.fields(amount, txid)?;

        let mut payload = String::new();
        for field in &fields {
            payload.push_str(&format_field(&field.tag, &field.value)?);
        }
        payload.push_str(CRC_PREFIX);
        let crc = checksum(&payload);
        payload.push_str(&crc);

        tracing::debug!("built BR Code for txid {} ({} chars, crc {})", txid, payload.len(), crc);
        Ok(PaymentPayload(payload))
    }
}

/// Fields recovered from an existing BR Code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixPayload {
    pub pix_key: String,
    pub description: Option<String>,
    pub category_code: String,
    pub currency: String,
    pub amount: Option<Decimal>,
    pub country: String,
    pub merchant_name: String,
    pub merchant_city: String,
    pub txid: Option<String>,
    pub checksum: String,
}

impl PixPayload {
    /// Verify the checksum of `text` and extract its Pix fields.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let split = text
            .len()
            .checked_sub(CRC_LEN)
            .filter(|&i| text.is_char_boundary(i))
            .ok_or_else(|| Error::InvalidPayload("payload too short".to_string()))?;
        let (prefix, provided) = text.split_at(split);

        if !prefix.ends_with(CRC_PREFIX) {
            return Err(Error::InvalidPayload("missing CRC field (6304)".to_string()));
        }

        let expected = checksum(prefix);
        if provided.to_ascii_uppercase() != expected {
            return Err(Error::ChecksumMismatch {
                expected,
                actual: provided.to_string(),
            });
        }

        let fields = decode_fields(text)?;
        check_order(&fields)?;

        let format = require(&fields, TAG_PAYLOAD_FORMAT)?;
        if format != PAYLOAD_FORMAT_VERSION {
            return Err(Error::InvalidPayload(format!("unsupported payload format {:?}", format)));
        }

        let account = find(&fields, TAG_MERCHANT_ACCOUNT)
            .ok_or_else(|| Error::InvalidPayload("missing Pix merchant account (26)".to_string()))?
            .children()?;
        let gui = require(&account, SUBTAG_GUI)?;
        if !gui.eq_ignore_ascii_case(PIX_GUI) {
            return Err(Error::InvalidPayload(format!("unexpected arrangement {:?}", gui)));
        }

        let amount = match find(&fields, TAG_AMOUNT) {
            Some(field) => Some(
                Decimal::from_str(&field.value)
                    .map_err(|_| Error::InvalidPayload(format!("invalid amount {:?}", field.value)))?,
            ),
            None => None,
        };

        let txid = match find(&fields, TAG_ADDITIONAL_DATA) {
            Some(field) => find(&field.children()?, SUBTAG_TXID).map(|f| f.value.clone()),
            None => None,
        };

        Ok(Self {
            pix_key: require(&account, SUBTAG_KEY)?.to_string(),
            description: find(&account, SUBTAG_DESCRIPTION).map(|f| f.value.clone()),
            category_code: require(&fields, TAG_CATEGORY_CODE)?.to_string(),
            currency: require(&fields, TAG_CURRENCY)?.to_string(),
            amount,
            country: require(&fields, TAG_COUNTRY)?.to_string(),
            merchant_name: require(&fields, TAG_MERCHANT_NAME)?.to_string(),
            merchant_city: require(&fields, TAG_MERCHANT_CITY)?.to_string(),
            txid,
            checksum: expected,
        })
    }
}

fn find<'f>(fields: &'f [Field], tag: &str) -> Option<&'f Field> {
    fields.iter().find(|f| f.tag == tag)
}

fn require<'f>(fields: &'f [Field], tag: &str) -> Result<&'f str> {
    find(fields, tag)
        .map(|f| f.value.as_str())
        .ok_or_else(|| Error::InvalidPayload(format!("missing field {}", tag)))
}

/// Tags must be strictly ascending, which also rules out duplicates.
fn check_order(fields: &[Field]) -> Result<()> {
    for pair in fields.windows(2) {
        if pair[0].tag >= pair[1].tag {
            return Err(Error::InvalidPayload(format!(
                "field {} follows field {}",
                pair[1].tag, pair[0].tag
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "00020126530014br.gov.bcb.pix0111499998256380216Compra Esportiva\
                            520400005303986540515.905802BR5913Banlek Sports6009SAO PAULO\
                            62210517ORD20240515103000630472BB";

    fn amount(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn build(profile: &MerchantProfile, value: &str, order_id: &str) -> Result<PaymentPayload> {
        PayloadBuilder::new(profile).build(amount(value), &TransactionId::from_order_id(order_id))
    }

    #[test]
    fn test_scenario_payload() {
        let payload = build(&MerchantProfile::default(), "15.90", "ORD20240515103000").unwrap();
        assert_eq!(payload.as_str(), SCENARIO);
        assert!(payload.as_str().contains("540515.90"));
        assert_eq!(payload.checksum(), "72BB");
    }

    #[test]
    fn test_checksum_matches_independent_crc() {
        let payload = build(&MerchantProfile::default(), "15.90", "ORD20240515103000").unwrap();
        let text = payload.as_str();
        let (prefix, crc) = text.split_at(text.len() - 4);
        assert!(prefix.ends_with("6304"));

        // bitwise CRC-16/CCITT-FALSE written independently of crc.rs
        let mut reg: u32 = 0xFFFF;
        for b in prefix.bytes() {
            reg ^= (b as u32) << 8;
            for _ in 0..8 {
                reg <<= 1;
                if reg & 0x10000 != 0 {
                    reg ^= 0x1021;
                }
                reg &= 0xFFFF;
            }
        }
        assert_eq!(crc, format!("{:04X}", reg));
    }

    #[test]
    fn test_minimum_amount_and_fallback_txid() {
        let payload = build(&MerchantProfile::default(), "0.01", "--- ---").unwrap();
        assert_eq!(
            payload.as_str(),
            "00020126530014br.gov.bcb.pix0111499998256380216Compra Esportiva\
             52040000530398654040.015802BR5913Banlek Sports6009SAO PAULO\
             62070503***630423D5"
        );
    }

    #[test]
    fn test_empty_description_is_omitted() {
        let profile = MerchantProfile::new("49999825638", "Banlek Sports", "SAO PAULO");
        let payload = build(&profile, "100", "ABC-123").unwrap();
        assert_eq!(
            payload.as_str(),
            "00020126330014br.gov.bcb.pix0111499998256385204000053039865406100.00\
             5802BR5913Banlek Sports6009SAO PAULO62100506ABC1236304FC0B"
        );
    }

    #[test]
    fn test_rejects_small_amounts() {
        let profile = MerchantProfile::default();
        for value in ["0", "0.00", "0.009", "-1", "-0.01"] {
            match build(&profile, value, "ORD1") {
                Err(Error::InvalidAmount(a)) => assert_eq!(a, amount(value)),
                other => panic!("{} should be rejected, got {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_amount(amount("15.9")), "15.90");
        assert_eq!(format_amount(amount("15.90")), "15.90");
        assert_eq!(format_amount(amount("7")), "7.00");
        assert_eq!(format_amount(amount("1234567.891")), "1234567.89");
        assert_eq!(format_amount(amount("0.015")), "0.02");
        assert_eq!(format_amount(amount("29.9000")), "29.90");
    }

    #[test]
    fn test_amount_length_subfield() {
        let profile = MerchantProfile::default();
        for value in ["0.01", "1", "15.90", "999.99", "1000000", "123456789.12"] {
            let payload = build(&profile, value, "ORD1").unwrap();
            let fields = payload.fields().unwrap();
            let field = fields.iter().find(|f| f.tag == "54").unwrap();
            let formatted = format_amount(amount(value));
            assert_eq!(field.value, formatted);
            let marker = format!("54{:02}{}", formatted.len(), formatted);
            assert!(payload.as_str().contains(&marker));
        }
    }

    #[test]
    fn test_field_order() {
        let payload = build(&MerchantProfile::default(), "42.00", "ORD1").unwrap();
        let tags: Vec<String> = payload.fields().unwrap().into_iter().map(|f| f.tag).collect();
        assert_eq!(tags, ["00", "26", "52", "53", "54", "58", "59", "60", "62", "63"]);
    }

    #[test]
    fn test_fields_roundtrip() {
        let profile = MerchantProfile::default();
        let txid = TransactionId::from_order_id("ORD20240515103000");
        let builder = PayloadBuilder::new(&profile);

        let expected = builder.fields(amount("15.90"), &txid).unwrap();
        let payload = builder.build(amount("15.90"), &txid).unwrap();
        let decoded = payload.fields().unwrap();

        assert_eq!(&decoded[..decoded.len() - 1], &expected[..]);
        assert_eq!(decoded.last().unwrap(), &Field::new("63", payload.checksum()));

        let account = decoded[1].children().unwrap();
        assert_eq!(
            account,
            vec![
                Field::new("00", "br.gov.bcb.pix"),
                Field::new("01", "49999825638"),
                Field::new("02", "Compra Esportiva"),
            ]
        );
    }

    #[test]
    fn test_builder_normalizes_profile_text() {
        let profile = MerchantProfile::new("chave-aleatoria", "Fotografia Ação Radical do Sul Ltda", "Florianópolis")
            .with_description("Fotos da corrida é aqui");
        let decoded = PixPayload::parse(build(&profile, "10", "x").unwrap().as_str()).unwrap();

        assert_eq!(decoded.merchant_name, "Fotografia Acao Radical d");
        assert_eq!(decoded.merchant_city, "Florianopolis");
        assert_eq!(decoded.description.as_deref(), Some("Fotos da corrida e aqui"));
        assert_eq!(decoded.pix_key, "chave-aleatoria");
        assert_eq!(decoded.txid.as_deref(), Some("x"));
    }

    #[test]
    fn test_undecomposable_text_is_rejected() {
        for profile in [
            MerchantProfile::new("fotos@example.com", "Banlek Sports", "Tromsø"),
            MerchantProfile::new("joão@example.com", "Banlek Sports", "Recife"),
            MerchantProfile::new("fotos@example.com", "Straße Fotos", "Recife"),
            MerchantProfile::new("fotos@example.com", "Banlek Sports", "Recife").with_description("Smørrebrød"),
        ] {
            assert!(matches!(build(&profile, "15.90", "ORD1"), Err(Error::InvalidProfile(_))));
        }
    }

    #[test]
    fn test_wire_is_ascii_with_declared_byte_lengths() {
        let profiles = [
            MerchantProfile::new("+5511999998888", "Açaí & Pão de Queijo Ltda", "São José dos Campos")
                .with_description("Promoção de verão"),
            MerchantProfile::new("chave-aleatoria", "Estúdio Fotográfico Ação e Movimento", "Florianópolis"),
            MerchantProfile::default(),
        ];

        for profile in &profiles {
            let payload = build(profile, "1234.5", "pedido-ção-42").unwrap();
            let text = payload.as_str();
            assert!(text.is_ascii(), "non-ASCII payload: {}", text);

            let mut fields = decode_fields(text).unwrap();
            for tag in [TAG_MERCHANT_ACCOUNT, TAG_ADDITIONAL_DATA] {
                let parent = fields.iter().find(|f| f.tag == tag).unwrap().clone();
                fields.extend(parent.children().unwrap());
            }
            for field in &fields {
                let encoded = field.encode().unwrap();
                let declared: usize = encoded[2..4].parse().unwrap();
                assert_eq!(declared, field.value.len(), "tag {} in {}", field.tag, text);
            }
            assert_eq!(checksum(&text[..text.len() - CRC_LEN]), payload.checksum());
        }
    }

    #[test]
    fn test_oversized_key_fails_loudly() {
        let profile = MerchantProfile::new("k".repeat(90), "Loja", "Recife");
        assert!(matches!(
            build(&profile, "1", "ORD1"),
            Err(Error::FieldLengthExceeded { .. })
        ));
    }

    #[test]
    fn test_oversized_txid_fails_loudly() {
        let order_id = "A".repeat(100);
        match build(&MerchantProfile::default(), "1", &order_id) {
            Err(Error::FieldLengthExceeded { tag, .. }) => assert_eq!(tag, "05"),
            other => panic!("expected FieldLengthExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_txid_sanitization() {
        assert_eq!(TransactionId::from_order_id("ORD20240515103000").as_str(), "ORD20240515103000");
        assert_eq!(TransactionId::from_order_id("ord-2024 05/15#1").as_str(), "ord202405151");
        assert_eq!(TransactionId::from_order_id("pedido-joão-çé").as_str(), "pedidojoo");
        assert_eq!(TransactionId::from_order_id("").as_str(), "***");
        assert_eq!(TransactionId::from_order_id(" -_/ ãé ").as_str(), "***");
    }

    #[test]
    fn test_parse_scenario() {
        let parsed = PixPayload::parse(SCENARIO).unwrap();
        assert_eq!(parsed.pix_key, "49999825638");
        assert_eq!(parsed.description.as_deref(), Some("Compra Esportiva"));
        assert_eq!(parsed.category_code, "0000");
        assert_eq!(parsed.currency, "986");
        assert_eq!(parsed.amount, Some(amount("15.90")));
        assert_eq!(parsed.country, "BR");
        assert_eq!(parsed.merchant_name, "Banlek Sports");
        assert_eq!(parsed.merchant_city, "SAO PAULO");
        assert_eq!(parsed.txid.as_deref(), Some("ORD20240515103000"));
        assert_eq!(parsed.checksum, "72BB");
    }

    #[test]
    fn test_parse_reference_code_without_amount() {
        let code = "00020126580014br.gov.bcb.pix0136123e4567-e12b-12d1-a456-426655440000\
                    5204000053039865802BR5913Fulano de Tal6008BRASILIA62070503***63041D3D";
        let parsed = PixPayload::parse(code).unwrap();
        assert_eq!(parsed.pix_key, "123e4567-e12b-12d1-a456-426655440000");
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.description, None);
        assert_eq!(parsed.merchant_city, "BRASILIA");
    }

    #[test]
    fn test_parse_accepts_lowercase_checksum() {
        let lower = format!("{}72bb", &SCENARIO[..SCENARIO.len() - 4]);
        assert!(PixPayload::parse(&lower).is_ok());
    }

    #[test]
    fn test_parse_detects_tampering() {
        let tampered = SCENARIO.replace("15.90", "15.10");
        match PixPayload::parse(&tampered) {
            Err(Error::ChecksumMismatch { expected, actual }) => {
                assert_eq!(actual, "72BB");
                assert_ne!(expected, "72BB");
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_missing_crc() {
        assert!(matches!(PixPayload::parse("000201"), Err(Error::InvalidPayload(_))));
        assert!(matches!(PixPayload::parse("ab"), Err(Error::InvalidPayload(_))));
    }
}
