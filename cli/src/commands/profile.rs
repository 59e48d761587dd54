//! Merchant profile resolution and the profile command.

use std::path::Path;

use anyhow::Context;
use pixcode_core::{Config, MerchantProfile};

use crate::MerchantArgs;

/// Build the effective profile: file (explicit or default path), then
/// command-line overrides on top.
pub fn resolve_profile(args: &MerchantArgs) -> anyhow::Result<MerchantProfile> {
    resolve_profile_from(args, &Config::default().profile_path)
}

fn resolve_profile_from(args: &MerchantArgs, default_path: &Path) -> anyhow::Result<MerchantProfile> {
    let mut profile = match &args.profile {
        Some(path) => MerchantProfile::from_json_file(path)
            .with_context(|| format!("loading profile {}", path.display()))?,
        None if default_path.exists() => MerchantProfile::from_json_file(default_path)
            .with_context(|| format!("loading profile {}", default_path.display()))?,
        None => MerchantProfile::default(),
    };

    if let Some(key) = &args.key {
        profile.pix_key = key.clone();
    }
    if let Some(name) = &args.name {
        profile.name = name.clone();
    }
    if let Some(city) = &args.city {
        profile.city = city.clone();
    }
    if let Some(description) = &args.description {
        profile.description = description.clone();
    }

    profile.validate()?;
    Ok(profile)
}

/// Display the merchant profile and how it appears on the wire.
pub fn show_profile(args: &MerchantArgs, json: bool) -> anyhow::Result<()> {
    let profile = resolve_profile(args)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("\n\x1b[1mPix Merchant Profile\x1b[0m");
    println!("═══════════════════════════════════════");
    println!("\x1b[1mKey:\x1b[0m         {}", profile.pix_key);
    println!("\x1b[1mName:\x1b[0m        {}", profile.name);
    println!("\x1b[1mCity:\x1b[0m        {}", profile.city);
    println!("\x1b[1mDescription:\x1b[0m {}", profile.description);

    println!("\n\x1b[1mOn the wire:\x1b[0m");
    println!("  • 59 {}", profile.merchant_name());
    println!("  • 60 {}", profile.merchant_city());
    println!("  • 26/02 {}", profile.merchant_description());
    println!();
    Ok(())
}
