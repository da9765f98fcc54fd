use chrono::{Duration, Utc};
use clarity::auth::TokenIssuer;
use clarity::config::{parse_duration, AuthConfig};
use clarity::expenses::{Expense, Insights, Mood, NewExpense};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn issuer() -> TokenIssuer {
    let config = AuthConfig {
        access_token_secret: "bench-access".to_string(),
        refresh_token_secret: "bench-refresh".to_string(),
        ..AuthConfig::default()
    };
    TokenIssuer::new(&config).unwrap()
}

fn bench_tokens(c: &mut Criterion) {
    let issuer = issuer();

    c.bench_function("issue_access_token", |b| {
        b.iter(|| issuer.issue_access_token(black_box("user-1")))
    });

    let token = issuer.issue_access_token("user-1").unwrap();
    c.bench_function("verify_access_token", |b| {
        b.iter(|| issuer.verify_access_token(black_box(&token)))
    });

    c.bench_function("verify_wrong_kind", |b| {
        b.iter(|| issuer.verify_refresh_token(black_box(&token)))
    });
}

fn bench_insights(c: &mut Criterion) {
    let moods = [Mood::WorthIt, Mood::Neutral, Mood::Regret];
    let categories = ["Food", "Travel", "Books", "Rent", "Fun"];
    let expenses: Vec<Expense> = (0..1000)
        .map(|i| {
            Expense::new(
                "user-1",
                NewExpense {
                    amount: (i % 90) as f64 + 10.0,
                    category: categories[i % categories.len()].to_string(),
                    description: String::new(),
                    mood: moods[i % moods.len()],
                    date: Some(Utc::now() - Duration::days((i % 30) as i64)),
                },
            )
        })
        .collect();

    c.bench_function("insights_1000_expenses", |b| {
        b.iter(|| Insights::compute(black_box(&expenses), Some(5000.0)))
    });
}

fn bench_config(c: &mut Criterion) {
    c.bench_function("parse_duration", |b| {
        b.iter(|| parse_duration(black_box("15m")))
    });

    let config = AuthConfig {
        access_token_secret: "bench-access".to_string(),
        refresh_token_secret: "bench-refresh".to_string(),
        ..AuthConfig::default()
    };
    c.bench_function("auth_config_validate", |b| {
        b.iter(|| black_box(&config).validate())
    });
}

criterion_group!(benches, bench_tokens, bench_insights, bench_config);
criterion_main!(benches);
