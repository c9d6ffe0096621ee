use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use subtrack::core::log::init_logging;
use subtrack::{AppCommand, DraftChanges};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Date to treat as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct EditArgs {
    /// New display name
    #[arg(long)]
    name: Option<String>,

    /// New cost per billing period
    #[arg(long)]
    cost: Option<f64>,

    /// New billing cycle: weekly, monthly or yearly
    #[arg(long)]
    billing: Option<String>,

    /// New category
    #[arg(long)]
    category: Option<String>,

    /// New next payment date (YYYY-MM-DD)
    #[arg(long)]
    next_payment: Option<NaiveDate>,
}

impl From<EditArgs> for DraftChanges {
    fn from(args: EditArgs) -> DraftChanges {
        DraftChanges {
            name: args.name,
            cost: args.cost,
            billing: args.billing,
            category: args.category,
            next_payment: args.next_payment,
        }
    }
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Summary => AppCommand::Summary,
            Commands::List => AppCommand::List,
            Commands::Add {
                name,
                cost,
                billing,
                category,
                next_payment,
            } => AppCommand::Add {
                name,
                cost,
                billing,
                category,
                next_payment,
            },
            Commands::Edit { id, changes } => AppCommand::Edit {
                id,
                changes: changes.into(),
            },
            Commands::Delete { id, yes } => AppCommand::Delete { id, yes },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display totals, spending by category and upcoming payments
    Summary,
    /// List every subscription
    List,
    /// Add a subscription
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Cost per billing period
        #[arg(long)]
        cost: f64,

        /// Billing cycle: weekly, monthly or yearly
        #[arg(long, default_value = "monthly")]
        billing: String,

        /// Category used for the spending breakdown
        #[arg(long, default_value = "other")]
        category: String,

        /// Next payment date (YYYY-MM-DD)
        #[arg(long)]
        next_payment: NaiveDate,
    },
    /// Change fields of an existing subscription
    Edit {
        /// Subscription id, as shown by `list`
        id: String,

        #[command(flatten)]
        changes: EditArgs,
    },
    /// Delete a subscription
    Delete {
        /// Subscription id, as shown by `list`
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => subtrack::cli::setup::setup_at_path(path),
            None => subtrack::cli::setup::setup(),
        },
        Some(cmd) => {
            subtrack::run_command(cmd.into(), cli.config_path.as_deref(), cli.today).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
