use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use hearth_core::api::Frequency;

#[derive(Parser, Debug)]
#[command(name = "hearth", version, about = "Household finance tracker with cloud sync")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for commands that print data: text or json.
    #[arg(long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the household. Existing data is only replaced with --force.
    Init(InitArgs),
    /// Print the current snapshot.
    Show,
    /// Print derived monthly totals and net worth.
    Summary,
    /// Print sync configuration, cached data and the sync status of this run.
    Status,
    /// Reconcile local data with the cloud copy.
    Sync,
    /// Replace local data with the cloud copy.
    Pull,
    /// Store an access token and enable cloud sync.
    Login(LoginArgs),
    /// Forget the access token and the cloud document id.
    Logout,
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },
    Outgoing {
        #[command(subcommand)]
        command: OutgoingCommand,
    },
    Investment {
        #[command(subcommand)]
        command: InvestmentCommand,
    },
    Mortgage {
        #[command(subcommand)]
        command: MortgageCommand,
    },
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InitArgs {
    #[arg(long)]
    pub name: String,

    /// Household member as NAME:MONTHLY_INCOME. Can be specified multiple times.
    #[arg(long = "member", value_parser = parse_member, action = clap::ArgAction::Append)]
    pub members: Vec<MemberSpec>,

    /// Replace household data that already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberSpec {
    pub name: String,
    pub monthly_income: f64,
}

pub fn parse_member(raw: &str) -> Result<MemberSpec, String> {
    let (name, income) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:INCOME, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("member name is empty in {raw:?}"));
    }
    let monthly_income = income
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid income in {raw:?}: {e}"))?;
    Ok(MemberSpec {
        name: name.to_string(),
        monthly_income,
    })
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub token: String,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    Add(MemberAddArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct MemberAddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value_t = 0.0)]
    pub income: f64,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    Add(AccountAddArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AccountAddArgs {
    #[arg(long)]
    pub name: String,

    /// Account type, e.g. current, savings, isa.
    #[arg(long = "type", default_value = "current")]
    pub account_type: String,

    #[arg(long, default_value_t = 0.0)]
    pub balance: f64,

    /// Name of the owning member.
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    Add(GoalAddArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GoalAddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub target: f64,

    #[arg(long, default_value_t = 0.0)]
    pub current: f64,

    /// Target date as YYYY-MM-DD.
    #[arg(long)]
    pub by: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum OutgoingCommand {
    Add(OutgoingAddArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OutgoingAddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "other")]
    pub category: String,

    #[arg(long)]
    pub amount: f64,

    /// weekly, monthly, quarterly or yearly.
    #[arg(long, default_value = "monthly")]
    pub frequency: Frequency,
}

#[derive(Subcommand, Debug)]
pub enum InvestmentCommand {
    Add(InvestmentAddArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InvestmentAddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "fund")]
    pub kind: String,

    #[arg(long)]
    pub invested: f64,

    /// Current value; defaults to the invested amount.
    #[arg(long)]
    pub value: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum MortgageCommand {
    Set(MortgageSetArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct MortgageSetArgs {
    #[arg(long, default_value = "")]
    pub lender: String,

    #[arg(long)]
    pub property_value: f64,

    #[arg(long)]
    pub balance: f64,

    /// Annual interest rate in percent.
    #[arg(long, default_value_t = 0.0)]
    pub rate: f64,

    #[arg(long, default_value_t = 0.0)]
    pub payment: f64,

    #[arg(long, default_value_t = 0)]
    pub term_months: u32,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add(CategoryAddArgs),
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Outgoing,
    Account,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CategoryAddArgs {
    #[arg(long, value_enum, default_value_t = CategoryKind::Outgoing)]
    pub kind: CategoryKind,

    pub name: String,
}
