//! Fraud/Validation Screen.
//!
//! A pure function of a transaction plus a recent-activity view the
//! Transaction Processor assembles; it never reads or mutates state itself.
//! Rule weights and thresholds come from `Config`, grounded on
//! `financial_infrastructure.py`'s `_perform_fraud_detection` but with every
//! magic number promoted to configuration (§9 open question: "treat as
//! configuration").

use crate::config::Config;
use crate::money::Money;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Overall risk bucket derived from the accumulated rule score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// The activity the fraud screen needs but does not fetch itself: today's
/// already-validated total on the account and its validated-transaction
/// timestamps within the rapid-succession lookback window.
#[derive(Debug, Clone, Default)]
pub struct RecentActivity {
    pub validated_today_total: Money,
    pub recent_validated_times: Vec<DateTime<Utc>>,
}

/// The fraud screen's verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudAssessment {
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub factors: Vec<String>,
}

/// Score a transaction against the five rules in §4.3, weights from `config`.
pub fn screen_transaction(
    amount: Money,
    at: DateTime<Utc>,
    activity: &RecentActivity,
    config: &Config,
) -> FraudAssessment {
    let mut score: u32 = 0;
    let mut factors = Vec::new();

    if amount.to_cents() > config.max_single_txn_cents {
        score += config.fraud_large_amount_weight;
        factors.push("large-amount".to_string());
    }

    let projected_total = activity
        .validated_today_total
        .checked_add(amount)
        .unwrap_or(activity.validated_today_total);
    if projected_total.to_cents() > config.max_daily_txn_cents {
        score += config.fraud_daily_total_weight;
        factors.push("daily-total-breach".to_string());
    }

    let window = chrono::Duration::seconds(config.fraud_rapid_succession_window_secs as i64);
    let recent_count = activity
        .recent_validated_times
        .iter()
        .filter(|t| at.signed_duration_since(**t) <= window && **t <= at)
        .count();
    if recent_count > config.fraud_rapid_succession_count {
        score += config.fraud_rapid_succession_weight;
        factors.push("rapid-succession".to_string());
    }

    if amount.to_cents() % 10_000 == 0 && amount.to_cents() >= 100_000 {
        score += config.fraud_round_amount_weight;
        factors.push("round-amount".to_string());
    }

    let is_weekend = matches!(at.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun);
    let hour = at.hour();
    if is_weekend || !(6..22).contains(&hour) {
        score += config.fraud_unusual_time_weight;
        factors.push("unusual-time".to_string());
    }

    let risk_level = if score >= config.fraud_high_risk_threshold {
        RiskLevel::High
    } else if score >= config.fraud_medium_risk_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    FraudAssessment {
        risk_level,
        risk_score: score,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn large_amount_at_unusual_time_is_high_risk() {
        let config = Config::default();
        let at = Utc.with_ymd_and_hms(2026, 1, 3, 3, 0, 0).unwrap(); // Saturday 03:00
        let assessment = screen_transaction(
            Money::from_major_minor(11_000, 0),
            at,
            &RecentActivity::default(),
            &config,
        );
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(assessment.factors.contains(&"large-amount".to_string()));
        assert!(assessment.factors.contains(&"unusual-time".to_string()));
    }

    #[test]
    fn small_midday_transaction_is_low_risk() {
        let config = Config::default();
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap(); // Monday noon
        let assessment = screen_transaction(
            Money::from_major_minor(50, 0),
            at,
            &RecentActivity::default(),
            &config,
        );
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(assessment.factors.is_empty());
    }

    #[test]
    fn rapid_succession_rule_fires_above_count() {
        let config = Config::default();
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let recent = (0..config.fraud_rapid_succession_count + 1)
            .map(|i| at - chrono::Duration::seconds(i as i64))
            .collect();
        let activity = RecentActivity {
            validated_today_total: Money::ZERO,
            recent_validated_times: recent,
        };
        let assessment = screen_transaction(Money::from_major_minor(10, 0), at, &activity, &config);
        assert!(assessment.factors.contains(&"rapid-succession".to_string()));
    }
}
