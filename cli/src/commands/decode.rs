//! Decode command implementation.

use anyhow::{bail, Context};
use pixcode_core::protocol::format_amount;
use pixcode_core::{clipboard, PixPayload};

/// Verify a Pix code and print its fields.
pub fn decode(payload: Option<String>) -> anyhow::Result<()> {
    let text = match payload {
        Some(text) => text,
        None => match clipboard::read_text().context("reading clipboard")? {
            Some(text) => text,
            None => bail!("no payload given and the clipboard holds no text"),
        },
    };

    let parsed = PixPayload::parse(&text)?;

    println!("\n\x1b[1;32m✓\x1b[0m Checksum {} OK\n", parsed.checksum);
    for line in describe(&parsed) {
        println!("{}", line);
    }
    println!();
    Ok(())
}

fn describe(parsed: &PixPayload) -> Vec<String> {
    let amount = parsed
        .amount
        .map(|a| format!("R$ {}", format_amount(a)))
        .unwrap_or_else(|| "(payer chooses)".to_string());

    vec![
        format!("\x1b[1mKey:\x1b[0m         {}", parsed.pix_key),
        format!("\x1b[1mName:\x1b[0m        {}", parsed.merchant_name),
        format!("\x1b[1mCity:\x1b[0m        {}", parsed.merchant_city),
        format!("\x1b[1mAmount:\x1b[0m      {}", amount),
        format!("\x1b[1mTxID:\x1b[0m        {}", parsed.txid.as_deref().unwrap_or("-")),
        format!("\x1b[1mDescription:\x1b[0m {}", parsed.description.as_deref().unwrap_or("-")),
        format!("\x1b[1mCurrency:\x1b[0m    {} / {}", parsed.currency, parsed.country),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_open_amount() {
        let code = "00020126580014br.gov.bcb.pix0136123e4567-e12b-12d1-a456-426655440000\
                    5204000053039865802BR5913Fulano de Tal6008BRASILIA62070503***63041D3D";
        let lines = describe(&PixPayload::parse(code).unwrap());
        assert!(lines.iter().any(|l| l.contains("(payer chooses)")));
        assert!(lines.iter().any(|l| l.contains("Fulano de Tal")));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let code = "00020126580014br.gov.bcb.pix0136123e4567-e12b-12d1-a456-426655440000\
                    5204000053039865802BR5913Fulano de Tal6008BRASILIA62070503***63040000";
        assert!(decode(Some(code.to_string())).is_err());
    }
}
