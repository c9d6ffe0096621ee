pub mod cli;
pub mod core;
pub mod store;

use crate::cli::render::{Layout, TerminalConfirm, TerminalRenderer};
use crate::core::clock::{Clock, FixedClock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::refresh::{
    Confirm, ControllerOptions, DeleteOutcome, RefreshController, Submission,
};
use crate::core::subscription::{BillingCycle, SubscriptionDraft, SubscriptionId};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Summary,
    List,
    Add {
        name: String,
        cost: f64,
        billing: String,
        category: String,
        next_payment: NaiveDate,
    },
    Edit {
        id: String,
        changes: DraftChanges,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        yes: bool,
    },
}

/// Fields to overwrite on an existing subscription; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftChanges {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub billing: Option<String>,
    pub category: Option<String>,
    pub next_payment: Option<NaiveDate>,
}

impl DraftChanges {
    pub fn apply(self, draft: &mut SubscriptionDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(cost) = self.cost {
            draft.cost = cost;
        }
        if let Some(billing) = self.billing {
            draft.billing = BillingCycle::from(billing.as_str());
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(next_payment) = self.next_payment {
            draft.next_payment = next_payment;
        }
    }
}

impl AppCommand {
    fn layout(&self) -> Layout {
        match self {
            AppCommand::List => Layout::List,
            _ => Layout::Summary,
        }
    }
}

/// Runs one command against the configured store.
///
/// `today` pins the date used for due-date math; the local date is used otherwise.
pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    today: Option<NaiveDate>,
) -> Result<()> {
    info!("Subscription tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open(&config)?;
    let clock: Arc<dyn Clock> = match today {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock),
    };
    let renderer = Arc::new(TerminalRenderer::new(command.layout(), &config.currency));
    let controller = RefreshController::new(
        store,
        renderer.clone(),
        clock,
        ControllerOptions {
            upcoming_limit: config.upcoming_limit,
            seed_demo_data: config.seed_demo_data,
        },
    );

    let spinner = cli::ui::new_spinner("Loading subscriptions...");
    let loaded = controller.load().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load subscriptions")?;

    dispatch(&controller, command).await?;

    renderer.flush();
    Ok(())
}

async fn dispatch(controller: &RefreshController, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Summary | AppCommand::List => {}
        AppCommand::Add {
            name,
            cost,
            billing,
            category,
            next_payment,
        } => {
            let mut draft = controller.on_add();
            DraftChanges {
                name: Some(name),
                cost: Some(cost),
                billing: Some(billing),
                category: Some(category),
                next_payment: Some(next_payment),
            }
            .apply(&mut draft);
            let id = controller
                .on_submit(Submission::Create(draft))
                .await
                .context("Failed to add subscription")?;
            debug!(%id, "Add complete");
        }
        AppCommand::Edit { id, changes } => {
            let id = SubscriptionId::new(id);
            let mut draft = controller
                .on_edit(&id)
                .with_context(|| format!("Failed to edit subscription {id}"))?;
            changes.apply(&mut draft);
            controller
                .on_submit(Submission::Update(id.clone(), draft))
                .await
                .with_context(|| format!("Failed to update subscription {id}"))?;
        }
        AppCommand::Delete { id, yes } => {
            let id = SubscriptionId::new(id);
            let always = |_: &str| true;
            let confirm: &dyn Confirm = if yes { &always } else { &TerminalConfirm };
            let outcome = controller
                .on_delete(&id, confirm)
                .await
                .with_context(|| format!("Failed to delete subscription {id}"))?;
            if outcome == DeleteOutcome::Cancelled {
                info!(%id, "Delete cancelled, nothing changed");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_changes_apply_only_given_fields() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let mut draft = SubscriptionDraft {
            name: "Netflix".to_string(),
            cost: 15.99,
            billing: BillingCycle::Monthly,
            category: "entertainment".to_string(),
            next_payment: today,
        };

        DraftChanges {
            cost: Some(17.99),
            billing: Some("Yearly".to_string()),
            ..Default::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.name, "Netflix");
        assert_eq!(draft.cost, 17.99);
        assert_eq!(draft.billing, BillingCycle::Yearly);
        assert_eq!(draft.category, "entertainment");
        assert_eq!(draft.next_payment, today);
    }

    #[test]
    fn test_layout_per_command() {
        assert_eq!(AppCommand::List.layout(), Layout::List);
        assert_eq!(AppCommand::Summary.layout(), Layout::Summary);
        assert_eq!(
            AppCommand::Delete {
                id: "x".to_string(),
                yes: true
            }
            .layout(),
            Layout::Summary
        );
    }
}
