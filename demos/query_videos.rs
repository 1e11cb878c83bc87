//! Video query example.
//!
//! This example demonstrates how to exchange client credentials for a token
//! and page through the videos matching a query.
//!
//! Run with: cargo run --example query_videos

use chrono::{Duration, Utc};
use futures_util::StreamExt;
use tiktok_research::models::{Condition, Query, QueryField};
use tiktok_research::{DateRange, ResearchClient, VideoQueryRequest};

#[tokio::main]
async fn main() -> tiktok_research::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Get credentials from environment variables
    let client_key = std::env::var("TIKTOK_CLIENT_KEY")
        .expect("TIKTOK_CLIENT_KEY environment variable required");
    let client_secret = std::env::var("TIKTOK_CLIENT_SECRET")
        .expect("TIKTOK_CLIENT_SECRET environment variable required");

    println!("Requesting a bearer token...");

    let client = ResearchClient::authenticate(client_key, client_secret).await?;

    println!(
        "Successfully authenticated! Token valid for {} minutes",
        client.token().remaining().num_minutes()
    );

    let query = Query::builder()
        .and(Condition::is_in(QueryField::RegionCode, ["JP", "US"]))
        .and(Condition::eq(QueryField::Keyword, "animal"))
        .build()?;

    // The last week, ending yesterday
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let range = DateRange::ending_on(yesterday, 7)?;

    let mut videos = client
        .videos()
        .query(VideoQueryRequest::new(query, range).max_count(250))?;

    println!("\nVideos posted {}:", range);

    while let Some(video) = videos.next().await {
        let video = video?;
        println!(
            "  - {} by @{} ({} views)",
            video.id,
            video.username.as_deref().unwrap_or("unknown"),
            video.view_count.unwrap_or_default()
        );
    }

    let state = videos.state();
    println!(
        "\nFetched {} video(s) in {} page(s)",
        state.emitted(),
        state.pages_fetched()
    );

    println!("\nDone!");
    Ok(())
}
