//! Test Claim Producer
//!
//! Generates insurance claims and sends them to the scoring service as NATS
//! requests, logging each decision.
//!
//! Usage: test-producer [nats_url] [subject] [count] [suspicious_rate] [delay_ms]

use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Claim payload in the service's request format
#[derive(Debug, Clone, Serialize)]
struct ClaimRequest {
    policy_age_months: u32,
    age: u32,
    policy_deductable: u32,
    policy_annual_premium: f64,
    incident_hour: u32,
    number_of_vehicles_involved: u32,
    bodily_injuries: u32,
    witnesses: u32,
    police_report: &'static str,
    property_damage: &'static str,
    total_claim_amount: u32,
    injury_claim: u32,
    property_claim: u32,
    vehicle_claim: u32,
    vehicle_age: u32,
    prior_claims: u32,
    incident_type: &'static str,
    incident_severity: &'static str,
    collision_type: &'static str,
    insured_sex: &'static str,
    insured_occupation: &'static str,
    insured_hobbies: &'static str,
    incident_state: &'static str,
    incident_city: &'static str,
    auto_make: &'static str,
}

const CITIES: &[&str] = &["Columbus", "Riverwood", "Arlington", "Springfield", "Hillsdale", "Northbend", "Northbrook"];
const STATES: &[&str] = &["OH", "NY", "SC", "VA", "WV", "NC", "PA"];
const MAKES: &[&str] = &["Toyota", "Honda", "Ford", "Chevrolet", "BMW", "Audi", "Nissan", "Saab"];
const OCCUPATIONS: &[&str] = &["tech-support", "sales", "exec-managerial", "craft-repair", "prof-specialty"];
const HOBBIES: &[&str] = &["reading", "chess", "golf", "hiking", "movies", "cross-fit"];

/// Claim generator for testing
struct ClaimGenerator {
    rng: rand::rngs::ThreadRng,
}

impl ClaimGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate an ordinary claim
    fn generate_legitimate(&mut self) -> ClaimRequest {
        let injury = self.rng.gen_range(0..8_000);
        let property = self.rng.gen_range(0..8_000);
        let vehicle = self.rng.gen_range(2_000..30_000);

        ClaimRequest {
            policy_age_months: self.rng.gen_range(12..300),
            age: self.rng.gen_range(25..65),
            policy_deductable: *self.choose(&[500, 1000, 2000]),
            policy_annual_premium: self.rng.gen_range(800.0..1600.0),
            incident_hour: self.rng.gen_range(7..21),
            number_of_vehicles_involved: self.rng.gen_range(1..3),
            bodily_injuries: 0,
            witnesses: self.rng.gen_range(1..4),
            police_report: "YES",
            property_damage: *self.choose(&["YES", "NO"]),
            total_claim_amount: injury + property + vehicle,
            injury_claim: injury,
            property_claim: property,
            vehicle_claim: vehicle,
            vehicle_age: self.rng.gen_range(1..12),
            prior_claims: self.rng.gen_range(0..2),
            incident_type: *self.choose(&["Single Vehicle Collision", "Multi-vehicle Collision", "Parked Car"]),
            incident_severity: *self.choose(&["Minor Damage", "Trivial Damage"]),
            collision_type: *self.choose(&["Front Collision", "Rear Collision", "Side Collision"]),
            insured_sex: *self.choose(&["MALE", "FEMALE"]),
            insured_occupation: *self.choose(OCCUPATIONS),
            insured_hobbies: *self.choose(HOBBIES),
            incident_state: *self.choose(STATES),
            incident_city: *self.choose(CITIES),
            auto_make: *self.choose(MAKES),
        }
    }

    /// Generate a claim carrying typical fraud markers
    fn generate_suspicious(&mut self) -> ClaimRequest {
        let injury = self.rng.gen_range(10_000..40_000);
        let property = self.rng.gen_range(10_000..40_000);
        let vehicle = self.rng.gen_range(40_000..120_000);

        ClaimRequest {
            policy_age_months: self.rng.gen_range(0..6), // New policy
            age: self.rng.gen_range(19..40),
            policy_deductable: 500,
            policy_annual_premium: self.rng.gen_range(1200.0..2000.0),
            incident_hour: *self.choose(&[0, 1, 2, 3, 4, 22, 23]), // Late night
            number_of_vehicles_involved: self.rng.gen_range(2..4),
            bodily_injuries: self.rng.gen_range(1..3),
            witnesses: 0,
            police_report: *self.choose(&["NO", "?"]),
            property_damage: "YES",
            total_claim_amount: injury + property + vehicle,
            injury_claim: injury,
            property_claim: property,
            vehicle_claim: vehicle,
            vehicle_age: self.rng.gen_range(5..20),
            prior_claims: self.rng.gen_range(2..6),
            incident_type: *self.choose(&["Vehicle Theft", "Single Vehicle Collision"]),
            incident_severity: *self.choose(&["Major Damage", "Trivial Damage"]),
            collision_type: *self.choose(&["Rear Collision", "Side Collision"]),
            insured_sex: *self.choose(&["MALE", "FEMALE"]),
            insured_occupation: *self.choose(OCCUPATIONS),
            insured_hobbies: *self.choose(&["chess", "cross-fit"]),
            incident_state: *self.choose(STATES),
            incident_city: *self.choose(CITIES),
            auto_make: *self.choose(MAKES),
        }
    }

    fn choose<'a, T>(&mut self, choices: &'a [T]) -> &'a T {
        &choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Claim Producer");

    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("claims.predict");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let suspicious_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.2);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);
    let suspicious_rate = suspicious_rate.clamp(0.0, 1.0);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count,
        suspicious_rate,
        delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, suspicious_rate, delay_ms).await;
        }
    };

    let mut generator = ClaimGenerator::new();
    let mut rng = rand::thread_rng();
    let mut flagged = 0u64;
    let mut failed = 0u64;

    for i in 0..count {
        let claim = if rng.gen_bool(suspicious_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };
        let payload = serde_json::to_vec(&claim)?;

        match client.request(subject.to_string(), payload.into()).await {
            Ok(reply) => {
                let body: Value = serde_json::from_slice(&reply.payload)?;
                if let Some(error) = body.get("error") {
                    warn!(error = %error, "Service rejected claim");
                    failed += 1;
                } else {
                    if body["decision"] == "FLAGGED" {
                        flagged += 1;
                    }
                    info!(
                        claim_id = %body["claim_id"],
                        score = %body["fraud_score"],
                        decision = %body["decision"],
                        factors = body["risk_factors"].as_array().map_or(0, Vec::len),
                        "Claim scored"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "Request failed");
                failed += 1;
            }
        }

        if (i + 1) % 10 == 0 {
            info!("Sent {}/{} claims ({} flagged, {} failed)", i + 1, count, flagged, failed);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!("Completed! Sent {} claims ({} flagged, {} failed)", count, flagged, failed);
    Ok(())
}

async fn run_dry_mode(count: u64, suspicious_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = ClaimGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let claim = if rng.gen_bool(suspicious_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        let json = serde_json::to_string_pretty(&claim)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample claim {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
