//! Database seeder for Lexmarket development and testing.
//!
//! Seeds demo postings (one per fee structure) and prints a development
//! bearer token for exercising the authenticated endpoints locally.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;

use rust_decimal::Decimal;

use lexmarket_core::posting::{CreatePosting, FeeStructure, PostingService, SettlementPolicy};
use lexmarket_db::SqlPostingRepository;
use lexmarket_shared::{AppConfig, JwtConfig, JwtService};

/// Poster identity used for all seeded records.
const DEMO_POSTER_EMAIL: &str = "demo.solicitor@lexmarket.example";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = lexmarket_db::connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    let service = PostingService::new(
        SqlPostingRepository::new(db),
        SettlementPolicy::new(config.postings.max_settlement_divergence),
    );

    println!("Seeding demo postings...");
    seed_postings(&service).await;

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: 60,
    });
    let token = jwt_service
        .generate_access_token(DEMO_POSTER_EMAIL)
        .expect("Failed to generate token");
    println!("Dev bearer token for {DEMO_POSTER_EMAIL}:");
    println!("{token}");

    println!("Seeding complete!");
}

async fn seed_postings(service: &PostingService<SqlPostingRepository>) {
    let fixed = CreatePosting {
        title: "Residential conveyancing".to_string(),
        description: "Purchase of a two-bedroom flat, leasehold review included".to_string(),
        client_email: "client.one@example.com".to_string(),
        fee_structure: FeeStructure::FixedFee,
        fee_amount: Some(Decimal::from_str("400.00").unwrap()),
        fee_percentage: None,
        expected_settlement_amount: None,
    };
    service
        .create(fixed, DEMO_POSTER_EMAIL)
        .await
        .expect("Failed to seed Fixed-Fee posting");

    let contingent = CreatePosting {
        title: "Personal injury claim".to_string(),
        description: "Workplace injury, employer liability disputed".to_string(),
        client_email: "client.two@example.com".to_string(),
        fee_structure: FeeStructure::NoWinNoFee,
        fee_amount: None,
        fee_percentage: Some(Decimal::from_str("0.11").unwrap()),
        expected_settlement_amount: Some(Decimal::from_str("50000").unwrap()),
    };
    service
        .create(contingent, DEMO_POSTER_EMAIL)
        .await
        .expect("Failed to seed No-Win-No-Fee posting");
}
