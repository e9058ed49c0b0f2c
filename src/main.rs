use housing_rentals::config::GatewayConfig;
use housing_rentals::gateway::HttpRecordGateway;
use housing_rentals::models::SearchCriteria;
use housing_rentals::services::{LogNotifier, Notifier, PropertyService, ReviewService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Housing Rentals - listing browser");

    let config = GatewayConfig::from_env()?;
    info!("Using record gateway at {}", config.base_url);

    let gateway = Arc::new(HttpRecordGateway::new(config)?);
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let properties = PropertyService::new(gateway.clone(), notifier.clone());
    let reviews = ReviewService::new(gateway, notifier);

    let listings = match std::env::args().nth(1) {
        Some(location) => {
            info!("Searching listings matching '{}'...", location);
            properties
                .search(&SearchCriteria {
                    location: Some(location),
                    ..SearchCriteria::default()
                })
                .await
        }
        None => {
            info!("Fetching newest listings...");
            properties.list().await
        }
    };

    info!("✅ Found {} properties", listings.len());

    for (i, property) in listings.iter().enumerate() {
        println!(
            "{}. {} ({} {}/night)",
            i + 1,
            property.title,
            property.pricing.nightly_rate,
            property.pricing.currency
        );
        println!(
            "   {}, {} - {} guests, {} bedrooms",
            property.location.city,
            property.location.country,
            property.capacity.guests,
            property.capacity.bedrooms
        );
        println!("   Rating: {} ({} reviews)", property.rating, property.review_count);
        println!("   ID: {}", property.id);
        println!();
    }

    if let Some(first) = listings.first() {
        let summary = reviews.get_reviews_summary(first.id).await;
        println!(
            "Reviews for '{}': {} total, {} average",
            first.title, summary.total_count, summary.average_rating
        );
        for review in summary.reviews.iter().take(5) {
            println!("  {}★ {} - {}", review.rating, review.user_name, review.comment);
        }
    }

    let json = serde_json::to_string_pretty(&listings)?;
    tokio::fs::write("listings.json", json).await?;
    info!("💾 Saved listings to listings.json");

    Ok(())
}
