//! Posts a Binance C2C sell advertisement
//!
//! Reads `API_KEY`, `SECRET_KEY`, `AUTH_SECRET` and `PAY_ID` from the
//! environment (or a `.env` file). If `ADS_NO` is set, the payment methods
//! of that advertisement are listed first so a `PAY_ID` can be picked.
//!
//! Run with: cargo run -p ad-creator

mod settings;

use anyhow::Result;
use c2c_rest::{C2cRestClient, SellAdRequest};
use settings::Settings;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    info!(?settings, "Loaded settings");

    let client = C2cRestClient::new(settings.credentials.clone())?;

    if let Some(ads_no) = &settings.ads_no {
        match client.get_trade_methods(ads_no).await {
            Ok(methods) if methods.is_empty() => println!("No payment methods found for ad {ads_no}"),
            Ok(methods) => {
                println!("Found {} payment method(s) on ad {ads_no}:", methods.len());
                for method in &methods {
                    println!(
                        "  {} ({}) payId={}",
                        method.trade_method_name.as_deref().unwrap_or(&method.identifier),
                        method.pay_type,
                        method.pay_id
                    );
                }
            }
            Err(e) => warn!(error = %e, "Could not fetch payment methods"),
        }
    }

    let ad = SellAdRequest::new(settings.pay_id.clone());
    match client.create_ad(&ad).await {
        Ok(response) => println!("Ad created! {response}"),
        Err(e) => println!("Creation failed: {e}"),
    }

    Ok(())
}
