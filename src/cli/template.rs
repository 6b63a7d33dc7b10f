//! Recurring transaction CLI commands

use chrono::{Datelike, NaiveDate, Weekday};
use clap::{Args, Subcommand, ValueEnum};

use super::{date_or_today, parse_amount, parse_date, today};
use crate::config::Settings;
use crate::display::format_template_list;
use crate::error::{SaveError, SaveResult};
use crate::models::{EndCondition, Frequency, RecurrenceRule, RecurrenceTemplate, TemplateUpdate};
use crate::services::Ledger;
use crate::storage::LedgerStorage;

/// How often a template repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Recurrence options shared by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct RuleArgs {
    /// Repeat frequency
    #[arg(short = 'f', long)]
    pub every: Option<FrequencyArg>,
    /// Repeat every N periods
    #[arg(short, long)]
    pub interval: Option<u32>,
    /// Weekday for weekly rules (default: start date's weekday)
    #[arg(long)]
    pub weekday: Option<String>,
    /// Day of month for monthly rules (default: start date's day)
    #[arg(long)]
    pub day: Option<u32>,
    /// Stop after this many occurrences
    #[arg(long, conflicts_with = "until")]
    pub count: Option<u32>,
    /// Last possible occurrence date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
}

impl RuleArgs {
    fn is_empty(&self) -> bool {
        self.every.is_none()
            && self.interval.is_none()
            && self.weekday.is_none()
            && self.day.is_none()
            && self.count.is_none()
            && self.until.is_none()
    }

    /// Build a rule anchored at `start`; unset options keep `base`'s values
    fn to_rule(&self, start: NaiveDate, base: Option<RecurrenceRule>) -> SaveResult<RecurrenceRule> {
        let weekday = self.weekday.as_deref().map(parse_weekday).transpose()?;
        let frequency = match (self.every, base.map(|b| b.frequency)) {
            (Some(FrequencyArg::Daily), _) => Frequency::Daily,
            (Some(FrequencyArg::Yearly), _) => Frequency::Yearly,
            (Some(FrequencyArg::Weekly), _) => Frequency::Weekly {
                weekday: weekday.unwrap_or_else(|| start.weekday()),
            },
            (Some(FrequencyArg::Monthly), _) => Frequency::Monthly {
                day: self.day.unwrap_or_else(|| start.day()),
            },
            (None, Some(Frequency::Weekly { weekday: current })) => Frequency::Weekly {
                weekday: weekday.unwrap_or(current),
            },
            (None, Some(Frequency::Monthly { day: current })) => Frequency::Monthly {
                day: self.day.unwrap_or(current),
            },
            (None, Some(other)) => other,
            (None, None) => {
                return Err(SaveError::Validation(
                    "A frequency is required (--every daily|weekly|monthly|yearly)".into(),
                ))
            }
        };

        let interval = self
            .interval
            .or_else(|| base.map(|b| b.interval))
            .unwrap_or(1);
        let end = match (self.count, &self.until) {
            (Some(count), _) => EndCondition::AfterCount(count),
            (None, Some(until)) => EndCondition::UntilDate(parse_date(until)?),
            (None, None) => base.map(|b| b.end).unwrap_or_default(),
        };

        Ok(RecurrenceRule::new(frequency, interval).ending(end))
    }
}

fn parse_weekday(value: &str) -> SaveResult<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| SaveError::Validation(format!("Invalid weekday '{}'", value)))
}

/// Recurring transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Create a recurring transaction
    Add {
        /// Amount of each occurrence (negative for spending)
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// First possible occurrence (YYYY-MM-DD, default today)
        #[arg(short, long)]
        start: Option<String>,
        #[command(flatten)]
        rule: RuleArgs,
        /// Note copied onto each occurrence
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// List recurring transactions
    List,

    /// Change a recurring transaction
    Update {
        /// Template ID
        id: String,
        /// New amount
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<String>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,
        #[command(flatten)]
        rule: RuleArgs,
        /// New note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Stop projecting a template
    Pause {
        /// Template ID
        id: String,
    },

    /// Resume a paused template
    Resume {
        /// Template ID
        id: String,
    },

    /// Record due occurrences as actual transactions
    Materialize {
        /// Template ID (default: every active template)
        id: Option<String>,
        /// Materialize occurrences up to this date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        through: Option<String>,
    },
}

/// Handle a recurring transaction command
pub fn handle_template_command<S: LedgerStorage>(
    ledger: &Ledger<S>,
    settings: &Settings,
    cmd: TemplateCommands,
) -> SaveResult<()> {
    match cmd {
        TemplateCommands::Add {
            amount,
            category,
            start,
            rule,
            note,
        } => {
            let amount = parse_amount(&amount, settings.base_currency)?;
            let category = ledger.find_category(&category)?;
            let start = date_or_today(start.as_deref())?;
            let rule = rule.to_rule(start, None)?;

            let template = ledger.create_recurrence_template(
                RecurrenceTemplate::new(amount, category.id, start, rule).with_note(note),
            )?;
            println!("Created recurring transaction: {}", template.id.short());
            println!("  Amount:   {}", template.amount);
            println!("  Category: {}", category.name);
            println!("  Schedule: {} from {}", template.rule, template.start_date);
            if let Some(next) = ledger.next_occurrence(template.id, today())? {
                println!("  Next:     {}", next.format(&settings.date_format));
            }
        }

        TemplateCommands::List => {
            let templates = ledger.templates()?;
            print!(
                "{}",
                format_template_list(&templates, &ledger.category_tree()?, today())
            );
        }

        TemplateCommands::Update {
            id,
            amount,
            category,
            start,
            rule,
            note,
        } => {
            let template = ledger.find_template(&id)?;
            let start_date = start.map(|s| parse_date(&s)).transpose()?;
            let anchor = start_date.unwrap_or(template.start_date);

            let update = TemplateUpdate {
                amount: amount
                    .map(|a| parse_amount(&a, template.amount.currency()))
                    .transpose()?,
                category_id: category
                    .map(|c| ledger.find_category(&c).map(|c| c.id))
                    .transpose()?,
                start_date,
                rule: if rule.is_empty() {
                    None
                } else {
                    Some(rule.to_rule(anchor, Some(template.rule))?)
                },
                note,
                active: None,
            };

            let updated = ledger.update_recurrence_template(template.id, update)?;
            println!("Updated recurring transaction: {}", updated.id.short());
            println!("  Amount:   {}", updated.amount);
            println!("  Schedule: {} from {}", updated.rule, updated.start_date);
        }

        TemplateCommands::Pause { id } => set_active(ledger, &id, false)?,

        TemplateCommands::Resume { id } => set_active(ledger, &id, true)?,

        TemplateCommands::Materialize { id, through } => {
            let through = date_or_today(through.as_deref())?;
            let targets = match id {
                Some(id) => vec![ledger.find_template(&id)?],
                None => ledger
                    .templates()?
                    .into_iter()
                    .filter(|t| t.active)
                    .collect(),
            };

            let mut total = 0;
            for template in targets {
                let created = ledger.materialize_template(template.id, through)?;
                if !created.is_empty() {
                    println!(
                        "{}: recorded {} transaction(s)",
                        template.id.short(),
                        created.len()
                    );
                }
                total += created.len();
            }
            println!(
                "Materialized {} transaction(s) through {}",
                total,
                through.format(&settings.date_format)
            );
        }
    }

    Ok(())
}

fn set_active<S: LedgerStorage>(ledger: &Ledger<S>, id: &str, active: bool) -> SaveResult<()> {
    let template = ledger.find_template(id)?;
    let update = TemplateUpdate {
        active: Some(active),
        ..Default::default()
    };
    let updated = ledger.update_recurrence_template(template.id, update)?;
    let state = if updated.active { "Resumed" } else { "Paused" };
    println!("{} recurring transaction: {}", state, updated.id.short());
    Ok(())
}
