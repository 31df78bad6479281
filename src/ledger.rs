//! Transactions, budgets and goals, and the monthly figures shown on the
//! dashboard and budget pages.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Whether the transaction falls in the given calendar month (UTC).
    pub fn in_month(&self, year: i32, month: u32) -> bool {
        self.date.year() == year && self.date.month() == month
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
}

impl Goal {
    /// Percentage saved so far. Not capped, so overfunded goals exceed 100.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        self.current_amount / self.target_amount * 100.0
    }

    pub fn is_completed(&self) -> bool {
        self.target_amount > 0.0 && self.current_amount >= self.target_amount
    }
}

/// Totals for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub expenses_by_category: BTreeMap<String, f64>,
}

impl MonthlySummary {
    pub fn balance(&self) -> f64 {
        self.total_income - self.total_expenses
    }

    pub fn spent(&self, category: &str) -> f64 {
        self.expenses_by_category.get(category).copied().unwrap_or(0.0)
    }
}

pub fn monthly_summary(transactions: &[Transaction], year: i32, month: u32) -> MonthlySummary {
    let mut summary = MonthlySummary::default();
    for t in transactions.iter().filter(|t| t.in_month(year, month)) {
        match t.kind {
            TransactionKind::Income => summary.total_income += t.amount,
            TransactionKind::Expense => {
                summary.total_expenses += t.amount;
                *summary
                    .expenses_by_category
                    .entry(t.category.clone())
                    .or_insert(0.0) += t.amount;
            }
        }
    }
    summary
}

/// Percentage of a category budget already spent, capped at 100.
pub fn category_progress(budget: &CategoryBudget, spent: f64) -> f64 {
    if budget.amount <= 0.0 {
        return 0.0;
    }
    (spent / budget.amount * 100.0).min(100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetWarning {
    pub category: String,
    pub percent: f64,
}

/// Categories whose spending reached `threshold_percent` of their budget.
pub fn budget_warnings(
    budgets: &[CategoryBudget],
    summary: &MonthlySummary,
    threshold_percent: f64,
) -> Vec<BudgetWarning> {
    budgets
        .iter()
        .filter_map(|budget| {
            let percent = category_progress(budget, summary.spent(&budget.category));
            (budget.amount > 0.0 && percent >= threshold_percent).then(|| BudgetWarning {
                category: budget.category.clone(),
                percent,
            })
        })
        .collect()
}

/// Only categories with money allocated are stored.
pub fn persistable_budgets(budgets: &[CategoryBudget]) -> Vec<CategoryBudget> {
    budgets.iter().filter(|b| b.amount > 0.0).cloned().collect()
}

pub fn total_budget(budgets: &[CategoryBudget]) -> f64 {
    budgets.iter().map(|b| b.amount).sum()
}

/// Income and expense over one report period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

impl PeriodTotals {
    fn from_transactions<'a>(
        label: String,
        transactions: impl Iterator<Item = &'a Transaction>,
    ) -> Self {
        let mut totals = PeriodTotals {
            label,
            income: 0.0,
            expense: 0.0,
        };
        for t in transactions {
            match t.kind {
                TransactionKind::Income => totals.income += t.amount,
                TransactionKind::Expense => totals.expense += t.amount,
            }
        }
        totals
    }
}

/// The `count` months ending with the month of `today`, oldest first.
pub fn last_months(today: NaiveDate, count: u32) -> Vec<(i32, u32)> {
    (0..count)
        .rev()
        .filter_map(|back| today.checked_sub_months(Months::new(back)))
        .map(|d| (d.year(), d.month()))
        .collect()
}

/// January to December of `year`.
pub fn year_months(year: i32) -> Vec<(i32, u32)> {
    (1..=12).map(|month| (year, month)).collect()
}

/// One row per month, labelled with its [`period_id`].
pub fn monthly_trends(transactions: &[Transaction], months: &[(i32, u32)]) -> Vec<PeriodTotals> {
    months
        .iter()
        .map(|&(year, month)| {
            PeriodTotals::from_transactions(
                period_id(year, month),
                transactions.iter().filter(|t| t.in_month(year, month)),
            )
        })
        .collect()
}

/// Totals for the days `from` to `to`, both included (UTC dates).
pub fn range_totals(transactions: &[Transaction], from: NaiveDate, to: NaiveDate) -> PeriodTotals {
    let label = format!("{} - {}", from.format("%d/%m/%y"), to.format("%d/%m/%y"));
    PeriodTotals::from_transactions(
        label,
        transactions.iter().filter(|t| {
            let day = t.date.date_naive();
            from <= day && day <= to
        }),
    )
}

/// Years with at least one transaction, most recent first.
pub fn transaction_years(transactions: &[Transaction]) -> Vec<i32> {
    let mut years: Vec<i32> = transactions.iter().map(|t| t.date.year()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyExpense {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub expense: f64,
}

/// Expenses for each day of the Monday-to-Sunday week containing `week_of`.
pub fn weekly_expenses(transactions: &[Transaction], week_of: NaiveDate) -> Vec<DailyExpense> {
    let offset = i64::from(week_of.weekday().num_days_from_monday());
    let monday = week_of - TimeDelta::days(offset);
    monday
        .iter_days()
        .take(7)
        .map(|date| DailyExpense {
            date,
            weekday: date.weekday(),
            expense: transactions
                .iter()
                .filter(|t| t.is_expense() && t.date.date_naive() == date)
                .map(|t| t.amount)
                .sum(),
        })
        .collect()
}

/// Spanish day name, as shown on the weekly chart.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// Key of a monthly budget, e.g. `2024-08`.
pub fn period_id(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Parse a `YYYY-MM` period key.
pub fn parse_period(period: &str) -> Option<(i32, u32)> {
    let (year, month) = period.split_once('-')?;
    let year = year.parse().ok()?;
    let month = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn transaction(
        id: &str,
        kind: TransactionKind,
        category: &str,
        amount: f64,
        date: &str,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: "1".to_string(),
            kind,
            category: category.to_string(),
            amount,
            description: format!("mov {}", id),
            date: date.parse().unwrap(),
        }
    }

    fn category_budget(category: &str, amount: f64) -> CategoryBudget {
        CategoryBudget {
            category: category.to_string(),
            amount,
        }
    }

    fn july() -> Vec<Transaction> {
        use TransactionKind::*;
        vec![
            transaction("1", Expense, "Comida", 15.5, "2024-07-21T13:00:00Z"),
            transaction("2", Expense, "Transporte", 2.0, "2024-07-21T08:00:00Z"),
            transaction("3", Income, "Beca", 200.0, "2024-07-20T10:00:00Z"),
            transaction("4", Expense, "Comida", 45.0, "2024-07-22T20:00:00Z"),
            transaction("5", Expense, "Ocio", 30.0, "2024-06-30T21:00:00Z"),
        ]
    }

    #[test]
    fn summary_ignores_other_months() {
        let summary = monthly_summary(&july(), 2024, 7);
        assert_eq!(summary.total_income, 200.0);
        assert_eq!(summary.total_expenses, 62.5);
        assert_eq!(summary.balance(), 137.5);
        assert_eq!(summary.spent("Comida"), 60.5);
        assert_eq!(summary.spent("Ocio"), 0.0);
        assert_eq!(summary.expenses_by_category.len(), 2);
    }

    #[test]
    fn progress_is_capped() {
        let budget = CategoryBudget {
            category: "Comida".into(),
            amount: 50.0,
        };
        assert_eq!(category_progress(&budget, 25.0), 50.0);
        assert_eq!(category_progress(&budget, 80.0), 100.0);

        let empty = CategoryBudget {
            category: "Ropa".into(),
            amount: 0.0,
        };
        assert_eq!(category_progress(&empty, 10.0), 0.0);
    }

    #[test]
    fn warnings_at_threshold() {
        let summary = monthly_summary(&july(), 2024, 7);
        let budgets = vec![
            category_budget("Comida", 70.0),
            category_budget("Transporte", 20.0),
            category_budget("Ropa", 0.0),
        ];
        let warnings = budget_warnings(&budgets, &summary, 80.0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, "Comida");
        assert!(warnings[0].percent > 86.0 && warnings[0].percent < 87.0);
    }

    #[test]
    fn goal_progress() {
        let goal = Goal {
            id: "1".into(),
            user_id: "1".into(),
            title: "Laptop".into(),
            target_amount: 2500.0,
            current_amount: 750.0,
            deadline: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
        };
        assert_eq!(goal.progress(), 30.0);
        assert!(!goal.is_completed());
    }

    #[test]
    fn zero_allocations_are_not_persisted() {
        let budgets = vec![
            category_budget("Comida", 300.0),
            category_budget("Salud", 0.0),
        ];
        let rows = persistable_budgets(&budgets);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Comida");
        assert_eq!(total_budget(&budgets), 300.0);
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn last_months_cross_year_boundary() {
        let months = last_months(date(2024, 2, 29), 6);
        assert_eq!(months.len(), 6);
        assert_eq!(months[0], (2023, 9));
        assert_eq!(months[3..5], [(2023, 12), (2024, 1)]);
        assert_eq!(months[5], (2024, 2));
        assert_eq!(last_months(date(2024, 7, 31), 1), vec![(2024, 7)]);
        assert!(last_months(date(2024, 7, 31), 0).is_empty());
        assert_eq!(year_months(2024).len(), 12);
        assert_eq!(year_months(2024)[11], (2024, 12));
    }

    #[test]
    fn monthly_trends_per_month() {
        let trends = monthly_trends(&july(), &last_months(date(2024, 8, 5), 3));
        let labels: Vec<&str> = trends.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, ["2024-06", "2024-07", "2024-08"]);
        assert_eq!(trends[0].expense, 30.0);
        assert_eq!(trends[0].income, 0.0);
        assert_eq!(trends[1].income, 200.0);
        assert_eq!(trends[1].expense, 62.5);
        assert_eq!(trends[2].income + trends[2].expense, 0.0);
    }

    #[test]
    fn range_includes_both_ends() {
        let totals = range_totals(&july(), date(2024, 6, 30), date(2024, 7, 21));
        assert_eq!(totals.label, "30/06/24 - 21/07/24");
        assert_eq!(totals.income, 200.0);
        assert_eq!(totals.expense, 30.0 + 15.5 + 2.0);

        let reversed = range_totals(&july(), date(2024, 7, 31), date(2024, 7, 1));
        assert_eq!(reversed.income + reversed.expense, 0.0);
    }

    #[test]
    fn years_most_recent_first() {
        let mut transactions = july();
        transactions.push(transaction(
            "6",
            TransactionKind::Income,
            "Sueldo",
            10.0,
            "2023-12-31T23:00:00Z",
        ));
        assert_eq!(transaction_years(&transactions), vec![2024, 2023]);
        assert!(transaction_years(&[]).is_empty());
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        // 2024-07-21 is a Sunday
        let week = weekly_expenses(&july(), date(2024, 7, 21));
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2024, 7, 15));
        assert_eq!(week[0].weekday, Weekday::Mon);
        assert_eq!(week[6].date, date(2024, 7, 21));
        assert_eq!(week[6].expense, 17.5);
        assert_eq!(week[5].expense, 0.0);

        // Income on Saturday the 20th does not count
        let total: f64 = week.iter().map(|day| day.expense).sum();
        assert_eq!(total, 17.5);

        let next = weekly_expenses(&july(), date(2024, 7, 22));
        assert_eq!(next[0].date, date(2024, 7, 22));
        assert_eq!(next[0].expense, 45.0);
        assert_eq!(weekday_name(next[0].weekday), "lunes");
    }

    #[test]
    fn periods() {
        assert_eq!(period_id(2024, 8), "2024-08");
        assert_eq!(parse_period("2024-08"), Some((2024, 8)));
        assert_eq!(parse_period("2024-13"), None);
        assert_eq!(parse_period("agosto"), None);
    }

    #[test]
    fn transaction_json_uses_type_field() {
        let json = r#"{
            "id": "7",
            "user_id": "1",
            "type": "expense",
            "category": "Comida",
            "amount": 8.0,
            "description": "Café y postre",
            "date": "2024-07-18T16:30:00Z"
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert!(t.is_expense());
        assert!(t.in_month(2024, 7));
    }
}
