//! Generate command implementation.

use anyhow::Context;
use pixcode_core::protocol::format_amount;
use pixcode_core::{clipboard, qr, Config, PaymentRequestService, PaymentResponse};

use crate::commands::resolve_profile;
use crate::ui::{print_banner, print_qr_code};
use crate::{GenerateArgs, MerchantArgs};

/// Build a Pix code, show it, and write/copy it where asked.
pub async fn generate(merchant: &MerchantArgs, args: GenerateArgs) -> anyhow::Result<()> {
    let profile = resolve_profile(merchant)?;
    let config = config_from_args(&args);
    let service = PaymentRequestService::with_config(profile, config);

    let order_id = args.order.clone().unwrap_or_else(default_order_id);
    let response = service.request_payment_async(args.amount, &order_id).await?;

    print_banner();
    println!("\x1b[1mMerchant:\x1b[0m {} ({})", service.profile().merchant_name(), service.profile().pix_key);
    println!("\x1b[1mAmount:\x1b[0m   R$ {}", format_amount(args.amount));
    println!("\x1b[1mTxID:\x1b[0m     {}", response.txid);

    if !args.no_qr {
        println!("\n\x1b[1;33mScan this QR code with your bank app:\x1b[0m\n");
        print_qr_code(response.payload.as_str());
    }

    println!("\n\x1b[1;33mPix copia e cola:\x1b[0m");
    println!("{}\n", response.payload);

    write_outputs(&service, &response, &args)?;

    if args.copy {
        match clipboard::copy_text(response.payload.as_str()) {
            Ok(()) => println!("\x1b[1;32m✓\x1b[0m Code copied to clipboard"),
            Err(e) => eprintln!("\x1b[1;31m✗\x1b[0m Could not copy to clipboard: {}", e),
        }
    }

    Ok(())
}

fn config_from_args(args: &GenerateArgs) -> Config {
    let mut config = Config::default();
    if let Some(size) = args.module_size {
        config.qr.module_size = size;
    }
    if let Some(margin) = args.margin {
        config.qr.margin = margin;
    }
    if let Some(fg) = args.fg {
        config.qr.foreground = fg;
    }
    if let Some(bg) = args.bg {
        config.qr.background = bg;
    }
    config
}

fn write_outputs(service: &PaymentRequestService, response: &PaymentResponse, args: &GenerateArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.png {
        match &response.image {
            Some(image) => {
                std::fs::write(path, image.as_bytes())
                    .with_context(|| format!("writing {}", path.display()))?;
                println!(
                    "\x1b[1;32m✓\x1b[0m PNG written to {} ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                );
            }
            None => eprintln!("\x1b[1;31m✗\x1b[0m QR image unavailable, PNG not written"),
        }
    }

    if let Some(path) = &args.svg {
        match qr::render_svg(response.payload.as_str(), &service.config().qr) {
            Ok(svg) => {
                std::fs::write(path, svg).with_context(|| format!("writing {}", path.display()))?;
                println!("\x1b[1;32m✓\x1b[0m SVG written to {}", path.display());
            }
            Err(e) => eprintln!("\x1b[1;31m✗\x1b[0m {}", e),
        }
    }

    Ok(())
}

/// `ORD` + UTC `YYYYMMDDHHMMSS`, the storefront's order id scheme.
fn default_order_id() -> String {
    format!("ORD{}", chrono::Utc::now().format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_id_shape() {
        let id = default_order_id();
        assert_eq!(id.len(), 17);
        assert!(id.starts_with("ORD"));
        assert!(id[3..].chars().all(|c| c.is_ascii_digit()));
    }
}
