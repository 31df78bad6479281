//! AI budget suggestion: request shaping, the text-generation seam, and
//! validation of the structured response.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::config::{BudgetConfig, Config};
use crate::error::{Error, Result};
use crate::ledger::{CategoryBudget, Transaction, total_budget};
use crate::sanitize::markdown_to_sanitized_html;
use crate::to_display_html;

/// Input to the suggestion prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestBudgetInput {
    /// Monthly income, or a budget amount the user set by hand
    pub total_income: f64,
    pub transaction_history: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub category: String,
    pub amount: f64,
}

/// Structured response of the suggestion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSuggestion {
    pub budget_plan: Vec<Allocation>,
    /// Markdown
    pub recommendation: String,
    /// Sanitized HTML of `recommendation`, filled in locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_html: Option<String>,
}

impl BudgetSuggestion {
    /// One budget per category, taking the planned amount or 0.
    pub fn apply_to(&self, categories: &[String]) -> Vec<CategoryBudget> {
        categories
            .iter()
            .map(|category| CategoryBudget {
                category: category.clone(),
                amount: self
                    .budget_plan
                    .iter()
                    .find(|a| &a.category == category)
                    .map_or(0.0, |a| a.amount),
            })
            .collect()
    }

    pub fn planned_total(&self) -> f64 {
        self.budget_plan.iter().map(|a| a.amount).sum()
    }

    /// HTML to show for the recommendation. Prefers the sanitized version.
    pub fn display_html(&self) -> String {
        let text = self
            .recommendation_html
            .as_deref()
            .unwrap_or(&self.recommendation);
        to_display_html(text)
    }
}

/// A hosted text-generation service.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Runs an external program with the prompt on stdin and takes its stdout
/// as the response.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from `[program, args...]`. `None` when empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        log::debug!("running generator {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Generation(format!("failed to start {}: {}", self.program, e)))?;

        // Feed stdin from its own thread so a child that answers while still
        // reading cannot fill the stdout pipe and stall both sides.
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer =
                stdin.map(|mut stdin| scope.spawn(move || stdin.write_all(prompt.as_bytes())));
            let output = child.wait_with_output();
            let written = match writer {
                Some(writer) => writer
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("prompt writer panicked"))),
                None => Ok(()),
            };
            (output, written)
        });

        let output = output
            .map_err(|e| Error::Generation(format!("{} did not finish: {}", self.program, e)))?;
        match written {
            Ok(()) => {}
            // The child may answer without reading the whole prompt
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::debug!("{} closed stdin before the full prompt was sent", self.program);
            }
            Err(e) => {
                return Err(Error::Generation(format!("failed to send prompt: {}", e)));
            }
        }
        if !output.status.success() {
            return Err(Error::Generation(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|_| Error::Generation(format!("{} printed invalid UTF-8", self.program)))
    }
}

/// Returns a response captured earlier, ignoring the prompt.
#[derive(Debug, Clone)]
pub struct ReplayGenerator {
    path: PathBuf,
}

impl ReplayGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextGenerator for ReplayGenerator {
    fn generate(&self, _prompt: &str) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))
    }
}

/// Expense lines for the prompt, one per transaction.
pub fn transaction_history(transactions: &[Transaction], currency: &str) -> String {
    transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| {
            format!(
                "- Categoria: {}, Monto: {}{:.2}, Desc: {}",
                t.category, currency, t.amount, t.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(input: &SuggestBudgetInput, budget: &BudgetConfig) -> String {
    let categories = budget.expense_categories.join(", ");
    format!(
        "You are a friendly and encouraging personal finance advisor for university students. \
Your goal is to create a realistic and helpful monthly budget.

You will receive the user's total monthly budget (which could be their income or a manually set amount) \
and their recent expense history.

Based on this data, your task is to:
1. Create a suggested budget allocation for each of the following standard categories: {categories}.
2. Ensure the total of your suggested budget does not exceed the user's total monthly budget. \
Prioritize savings in the '{savings}' category if possible.
3. If a category has no spending, you can allocate a small amount or zero.
4. Write a 'recommendation' text using Markdown. Use friendly emojis where appropriate and make the text \
visually pleasant. This should include:
   - A section explaining your allocations (e.g., '#### ¿Cómo distribuí tu presupuesto?').
   - A section with concrete suggestions for improvement using bullet points (e.g., '#### Sugerencias para mejorar').
   - A concluding, motivational sentence.

Use headings (###, ####), paragraphs and bullet lists. Keep sentences short and avoid raw HTML. \
The output must be valid Markdown.
The output MUST be a valid JSON object of the form \
{{\"budgetPlan\": [{{\"category\": string, \"amount\": number}}], \"recommendation\": string}}.

Total Monthly Budget: {currency}{total}
Transaction History:
{history}",
        categories = categories,
        savings = budget.savings_category,
        currency = budget.currency,
        total = input.total_income,
        history = input.transaction_history,
    )
}

/// Parse and validate the generator's response. A surrounding markdown code
/// fence is tolerated.
pub fn parse_response(text: &str) -> Result<BudgetSuggestion> {
    let suggestion: BudgetSuggestion = serde_json::from_str(strip_code_fence(text))?;

    for allocation in &suggestion.budget_plan {
        if allocation.category.trim().is_empty() {
            return Err(Error::InvalidSuggestion(
                "allocation with an empty category".to_string(),
            ));
        }
        if !allocation.amount.is_finite() || allocation.amount < 0.0 {
            return Err(Error::InvalidSuggestion(format!(
                "amount {} for {} is not a non-negative number",
                allocation.amount, allocation.category
            )));
        }
    }
    Ok(suggestion)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    match body.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => body.trim(),
    }
}

/// Ask `generator` for a budget plan covering `transactions`.
pub fn suggest_budget(
    generator: &dyn TextGenerator,
    transactions: &[Transaction],
    total_income: f64,
    config: &Config,
) -> Result<BudgetSuggestion> {
    if !total_income.is_finite() || total_income <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "monthly budget must be a positive amount, got {}",
            total_income
        )));
    }

    let input = SuggestBudgetInput {
        total_income,
        transaction_history: transaction_history(transactions, &config.budget.currency),
    };
    let prompt = build_prompt(&input, &config.budget);
    log::debug!(
        "requesting suggestion for {} transactions ({} prompt bytes)",
        transactions.len(),
        prompt.len()
    );

    let response = generator.generate(&prompt)?;
    let mut suggestion = parse_response(&response)?;

    if let Some(planned) = over_budget(&suggestion, total_income, &config.budget) {
        log::warn!(
            "suggested plan totals {:.2}, above the monthly budget of {:.2}",
            planned,
            total_income
        );
    }
    let unknown: Vec<&str> = suggestion
        .budget_plan
        .iter()
        .map(|a| a.category.as_str())
        .filter(|c| !config.budget.expense_categories.iter().any(|k| k == c))
        .collect();
    if !unknown.is_empty() {
        log::warn!("ignoring allocations for unknown categories: {}", unknown.join(", "));
    }

    if config.recommendation.server_html && !suggestion.recommendation.is_empty() {
        suggestion.recommendation_html =
            Some(markdown_to_sanitized_html(&suggestion.recommendation));
    }
    Ok(suggestion)
}

/// Sum of `apply_to` for the configured categories.
pub fn applied_total(suggestion: &BudgetSuggestion, budget: &BudgetConfig) -> f64 {
    total_budget(&suggestion.apply_to(&budget.expense_categories))
}

/// The applied total, when it is above `total_income`. Allocations for
/// unknown categories are never persisted and do not count.
pub fn over_budget(
    suggestion: &BudgetSuggestion,
    total_income: f64,
    budget: &BudgetConfig,
) -> Option<f64> {
    let planned = applied_total(suggestion, budget);
    (planned > total_income).then_some(planned)
}
