//! Aggregation/Reporting.
//!
//! Grounded on `financial_infrastructure.py FinancialReportingSystem`: fetch
//! every `validated` transaction in a window, partition and sum. Storage is
//! write-once — a `Report` is appended to the store, never rewritten.

use crate::models::report::Report;
use crate::models::transaction::{Transaction, TransactionCategory, TransactionDirection, ValidationStatus};
use crate::money::Money;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

fn is_expense(category: TransactionCategory) -> bool {
    matches!(
        category,
        TransactionCategory::OperationalExpense
            | TransactionCategory::AgentCost
            | TransactionCategory::Infrastructure
            | TransactionCategory::Marketing
            | TransactionCategory::Development
    )
}

fn is_revenue(category: TransactionCategory) -> bool {
    matches!(category, TransactionCategory::Revenue)
}

fn category_label(category: TransactionCategory) -> &'static str {
    match category {
        TransactionCategory::Revenue => "revenue",
        TransactionCategory::OperationalExpense => "operational-expense",
        TransactionCategory::AgentCost => "agent-cost",
        TransactionCategory::Infrastructure => "infrastructure",
        TransactionCategory::Marketing => "marketing",
        TransactionCategory::Development => "development",
        TransactionCategory::Transfer => "transfer",
        TransactionCategory::Investment => "investment",
        TransactionCategory::Distribution => "distribution",
    }
}

fn add(map: &mut HashMap<String, Money>, key: String, amount: Money) {
    let entry = map.entry(key).or_insert(Money::ZERO);
    *entry = entry.checked_add(amount).unwrap_or(*entry);
}

/// Build the §4.9 aggregate over every `validated` transaction whose
/// `transaction_time` falls in `[period_start, period_end]`.
pub fn generate_period_report(
    id: impl Into<String>,
    transactions: &[Transaction],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    generated_at: DateTime<Utc>,
) -> Report {
    let mut total_revenue = Money::ZERO;
    let mut total_expense = Money::ZERO;
    let mut cash_inflow = Money::ZERO;
    let mut cash_outflow = Money::ZERO;
    let mut daily_cash_flow: HashMap<chrono::NaiveDate, Money> = HashMap::new();
    let mut expense_by_category = HashMap::new();
    let mut expense_by_worker = HashMap::new();
    let mut expense_by_project = HashMap::new();
    let mut revenue_by_subcategory = HashMap::new();
    let mut revenue_by_correlation = HashMap::new();

    let in_window = transactions.iter().filter(|t| {
        t.status == ValidationStatus::Validated
            && t.transaction_time >= period_start
            && t.transaction_time <= period_end
    });

    for txn in in_window {
        let signed_cash = match txn.direction {
            TransactionDirection::Credit => {
                cash_inflow = cash_inflow.checked_add(txn.amount).unwrap_or(cash_inflow);
                txn.amount
            }
            TransactionDirection::Debit => {
                cash_outflow = cash_outflow.checked_add(txn.amount).unwrap_or(cash_outflow);
                Money::from_cents(-txn.amount.to_cents())
            }
        };
        let date = txn.transaction_time.date_naive();
        let entry = daily_cash_flow.entry(date).or_insert(Money::ZERO);
        *entry = entry.checked_add(signed_cash).unwrap_or(*entry);

        // Direction is load-bearing: a revenue-category debit is a refund and
        // subtracts from revenue; an expense-category credit is a rebate and
        // subtracts from expense. Unconditional addition would overstate both.
        if is_revenue(txn.category) {
            let signed = match txn.direction {
                TransactionDirection::Credit => txn.amount,
                TransactionDirection::Debit => Money::from_cents(-txn.amount.to_cents()),
            };
            total_revenue = total_revenue.checked_add(signed).unwrap_or(total_revenue);
            let subcategory = txn.subcategory.clone().unwrap_or_else(|| category_label(txn.category).to_string());
            add(&mut revenue_by_subcategory, subcategory, signed);
            if let Some(correlation) = txn.project_id.clone().or_else(|| txn.external_id.clone()) {
                add(&mut revenue_by_correlation, correlation, signed);
            }
        } else if is_expense(txn.category) {
            let signed = match txn.direction {
                TransactionDirection::Debit => txn.amount,
                TransactionDirection::Credit => Money::from_cents(-txn.amount.to_cents()),
            };
            total_expense = total_expense.checked_add(signed).unwrap_or(total_expense);
            add(
                &mut expense_by_category,
                category_label(txn.category).to_string(),
                signed,
            );
            if let Some(worker_id) = &txn.worker_id {
                add(&mut expense_by_worker, worker_id.clone(), signed);
            }
            if let Some(project_id) = &txn.project_id {
                add(&mut expense_by_project, project_id.clone(), signed);
            }
        }
    }

    let profit = total_revenue.checked_sub(total_expense).unwrap_or(Money::ZERO);
    let margin = Report::compute_margin(total_revenue, profit);

    Report {
        id: id.into(),
        period_start,
        period_end,
        generated_at,
        total_revenue,
        total_expense,
        profit,
        margin,
        cash_inflow,
        cash_outflow,
        daily_cash_flow,
        expense_by_category,
        expense_by_worker,
        expense_by_project,
        revenue_by_subcategory,
        revenue_by_correlation,
    }
}
