use agency_ops_core::config::Config;
use agency_ops_core::ledger::fraud_screen::{screen_transaction, RecentActivity, RiskLevel};
use agency_ops_core::money::Money;
use chrono::TimeZone;
use chrono::Utc;

#[test]
fn weekday_midday_small_amount_is_low_risk() {
    let config = Config::default();
    let at = Utc.with_ymd_and_hms(2026, 1, 6, 14, 0, 0).unwrap(); // Tuesday
    let assessment = screen_transaction(Money::from_cents(500), at, &RecentActivity::default(), &config);
    assert_eq!(assessment.risk_level, RiskLevel::Low);
}

#[test]
fn over_single_txn_cap_flags_large_amount() {
    let config = Config::default();
    let at = Utc.with_ymd_and_hms(2026, 1, 6, 14, 0, 0).unwrap();
    let amount = Money::from_cents(config.max_single_txn_cents + 1);
    let assessment = screen_transaction(amount, at, &RecentActivity::default(), &config);
    assert!(assessment.factors.contains(&"large-amount".to_string()));
}

#[test]
fn weights_are_configuration_not_literals() {
    let mut config = Config::default();
    config.fraud_large_amount_weight = 1000;
    let at = Utc.with_ymd_and_hms(2026, 1, 6, 14, 0, 0).unwrap();
    let amount = Money::from_cents(config.max_single_txn_cents + 1);
    let assessment = screen_transaction(amount, at, &RecentActivity::default(), &config);
    assert!(assessment.risk_score >= 1000);
    assert_eq!(assessment.risk_level, RiskLevel::High);
}

#[test]
fn daily_total_breach_accounts_for_prior_validated_total() {
    let config = Config::default();
    let at = Utc.with_ymd_and_hms(2026, 1, 6, 14, 0, 0).unwrap();
    let activity = RecentActivity {
        validated_today_total: Money::from_cents(config.max_daily_txn_cents),
        recent_validated_times: vec![],
    };
    let assessment = screen_transaction(Money::from_cents(100), at, &activity, &config);
    assert!(assessment.factors.contains(&"daily-total-breach".to_string()));
}
