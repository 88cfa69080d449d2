//! Household data commands. Each mutation goes through the coordinator so it
//! is stamped, cached locally and pushed to the cloud when configured.

use hearth_core::api::{
    Account, CliError, Goal, HouseholdSummary, Investment, Member, Mortgage, Outgoing, Snapshot,
};

use crate::commands::cli::{
    AccountAddArgs, AccountCommand, CategoryAddArgs, CategoryCommand, CategoryKind, GoalAddArgs,
    GoalCommand, InitArgs, InvestmentAddArgs, InvestmentCommand, MemberAddArgs, MemberCommand,
    MortgageCommand, MortgageSetArgs, OutgoingAddArgs, OutgoingCommand,
};
use crate::commands::{print_json, report_sync_problem, OutputFormat};
use crate::context::AppContext;

pub async fn handle_init(args: InitArgs, ctx: &AppContext) -> Result<(), CliError> {
    let coordinator = ctx.coordinator();
    coordinator.initialize().await;
    if let Some(existing) = coordinator.snapshot() {
        if !args.force {
            return Err(CliError::Command(format!(
                "household {:?} already exists; pass --force to replace it",
                existing.household_name
            )));
        }
        tracing::warn!(household = %existing.household_name, "replacing existing household data");
        eprintln!("Replacing existing household {:?}", existing.household_name);
    }

    let snapshot = coordinator.set_data(build_household(&args)).await;
    report_sync_problem(&coordinator.status());
    println!(
        "Created household {:?} with {} member(s)",
        snapshot.household_name,
        snapshot.members.len()
    );
    Ok(())
}

pub async fn handle_show(format: OutputFormat, ctx: &AppContext) -> Result<(), CliError> {
    let snapshot = load_existing(ctx).await?;
    match format {
        OutputFormat::Json => print_json(&*snapshot),
        OutputFormat::Text => {
            print!("{}", render_snapshot(&snapshot));
            Ok(())
        }
    }
}

pub async fn handle_summary(format: OutputFormat, ctx: &AppContext) -> Result<(), CliError> {
    let snapshot = load_existing(ctx).await?;
    let summary = snapshot.summary();
    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Text => {
            print!("{}", render_summary(&snapshot.household_name, &summary));
            Ok(())
        }
    }
}

pub async fn handle_member(cmd: MemberCommand, ctx: &AppContext) -> Result<(), CliError> {
    match cmd {
        MemberCommand::Add(args) => {
            load_existing(ctx).await?;
            mutate(ctx, |s| add_member(s, &args)).await;
            println!("Added member {}", args.name);
            Ok(())
        }
    }
}

pub async fn handle_account(cmd: AccountCommand, ctx: &AppContext) -> Result<(), CliError> {
    match cmd {
        AccountCommand::Add(args) => {
            let current = load_existing(ctx).await?;
            let owner_id = match args.owner.as_deref() {
                Some(owner) => Some(find_member_id(&current, owner)?),
                None => None,
            };
            mutate(ctx, |s| add_account(s, &args, owner_id)).await;
            println!("Added account {}", args.name);
            Ok(())
        }
    }
}

pub async fn handle_goal(cmd: GoalCommand, ctx: &AppContext) -> Result<(), CliError> {
    match cmd {
        GoalCommand::Add(args) => {
            load_existing(ctx).await?;
            mutate(ctx, |s| add_goal(s, &args)).await;
            println!("Added goal {}", args.name);
            Ok(())
        }
    }
}

pub async fn handle_outgoing(cmd: OutgoingCommand, ctx: &AppContext) -> Result<(), CliError> {
    match cmd {
        OutgoingCommand::Add(args) => {
            load_existing(ctx).await?;
            mutate(ctx, |s| add_outgoing(s, &args)).await;
            println!("Added outgoing {}", args.name);
            Ok(())
        }
    }
}

pub async fn handle_investment(cmd: InvestmentCommand, ctx: &AppContext) -> Result<(), CliError> {
    match cmd {
        InvestmentCommand::Add(args) => {
            load_existing(ctx).await?;
            mutate(ctx, |s| add_investment(s, &args)).await;
            println!("Added investment {}", args.name);
            Ok(())
        }
    }
}

pub async fn handle_mortgage(cmd: MortgageCommand, ctx: &AppContext) -> Result<(), CliError> {
    match cmd {
        MortgageCommand::Set(args) => {
            load_existing(ctx).await?;
            mutate(ctx, |s| set_mortgage(s, &args)).await;
            println!("Mortgage updated");
            Ok(())
        }
    }
}

pub async fn handle_category(cmd: CategoryCommand, ctx: &AppContext) -> Result<(), CliError> {
    match cmd {
        CategoryCommand::Add(args) => {
            let name = args.name.trim();
            if name.is_empty() {
                return Err(CliError::Command("category name is empty".to_string()));
            }
            load_existing(ctx).await?;
            mutate(ctx, |s| add_category(s, &args)).await;
            println!("Added category {}", name);
            Ok(())
        }
    }
}

async fn load_existing(ctx: &AppContext) -> Result<std::sync::Arc<Snapshot>, CliError> {
    ctx.coordinator().initialize().await;
    report_sync_problem(&ctx.coordinator().status());
    ctx.coordinator().snapshot().ok_or_else(|| {
        CliError::Command("no household data yet; run `hearth init --name <NAME>` first".to_string())
    })
}

async fn mutate<F>(ctx: &AppContext, transform: F)
where
    F: FnOnce(Snapshot) -> Snapshot + Send,
{
    let snapshot = ctx.coordinator().update_data(transform).await;
    tracing::debug!(updated_at = snapshot.updated_at, "household data updated");
    report_sync_problem(&ctx.coordinator().status());
}

pub fn build_household(args: &InitArgs) -> Snapshot {
    Snapshot {
        household_name: args.name.trim().to_string(),
        members: args
            .members
            .iter()
            .map(|m| Member::new(m.name.clone(), m.monthly_income))
            .collect(),
        ..Default::default()
    }
}

pub fn add_member(mut snapshot: Snapshot, args: &MemberAddArgs) -> Snapshot {
    snapshot
        .members
        .push(Member::new(args.name.trim(), args.income));
    snapshot
}

fn find_member_id(snapshot: &Snapshot, name: &str) -> Result<String, CliError> {
    snapshot
        .members
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
        .map(|m| m.id.clone())
        .ok_or_else(|| CliError::Command(format!("no member named {:?}", name)))
}

pub fn add_account(
    mut snapshot: Snapshot,
    args: &AccountAddArgs,
    owner_id: Option<String>,
) -> Snapshot {
    let mut account = Account::new(args.name.trim(), args.account_type.trim(), args.balance);
    account.owner_id = owner_id;
    snapshot.accounts.push(account);
    snapshot
}

pub fn add_goal(mut snapshot: Snapshot, args: &GoalAddArgs) -> Snapshot {
    let mut goal = Goal::new(args.name.trim(), args.target, args.current);
    goal.target_date = args.by;
    snapshot.goals.push(goal);
    snapshot
}

pub fn add_outgoing(mut snapshot: Snapshot, args: &OutgoingAddArgs) -> Snapshot {
    snapshot.outgoings.push(Outgoing::new(
        args.name.trim(),
        args.category.trim(),
        args.amount,
        args.frequency,
    ));
    snapshot
}

pub fn add_investment(mut snapshot: Snapshot, args: &InvestmentAddArgs) -> Snapshot {
    snapshot.investments.push(Investment::new(
        args.name.trim(),
        args.kind.trim(),
        args.invested,
        args.value.unwrap_or(args.invested),
    ));
    snapshot
}

pub fn set_mortgage(mut snapshot: Snapshot, args: &MortgageSetArgs) -> Snapshot {
    snapshot.mortgage = Some(Mortgage {
        lender: args.lender.trim().to_string(),
        property_value: args.property_value,
        outstanding_balance: args.balance,
        interest_rate: args.rate,
        monthly_payment: args.payment,
        term_months_remaining: args.term_months,
    });
    snapshot
}

pub fn add_category(mut snapshot: Snapshot, args: &CategoryAddArgs) -> Snapshot {
    let name = args.name.trim().to_string();
    match args.kind {
        CategoryKind::Outgoing => {
            let known = snapshot
                .outgoing_categories()
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&name));
            if !known {
                snapshot.custom_outgoing_categories.push(name);
            }
        }
        CategoryKind::Account => {
            let known = snapshot
                .custom_account_types
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&name));
            if !known {
                snapshot.custom_account_types.push(name);
            }
        }
    }
    snapshot
}

fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = format!("Household: {}\n", snapshot.household_name);
    out.push_str(&format!("Members ({}):\n", snapshot.members.len()));
    for m in &snapshot.members {
        out.push_str(&format!("  - {} ({:.2}/month)\n", m.name, m.monthly_income));
    }
    out.push_str(&format!("Accounts ({}):\n", snapshot.accounts.len()));
    for a in &snapshot.accounts {
        out.push_str(&format!("  - {} [{}] {:.2}\n", a.name, a.account_type, a.balance));
    }
    out.push_str(&format!("Goals ({}):\n", snapshot.goals.len()));
    for g in &snapshot.goals {
        out.push_str(&format!(
            "  - {} {:.2}/{:.2} ({:.0}%)\n",
            g.name,
            g.current_amount,
            g.target_amount,
            g.progress_percent()
        ));
    }
    out.push_str(&format!("Outgoings ({}):\n", snapshot.outgoings.len()));
    for o in &snapshot.outgoings {
        out.push_str(&format!(
            "  - {} [{}] {:.2} {:?}\n",
            o.name, o.category, o.amount, o.frequency
        ));
    }
    out.push_str(&format!("Investments ({}):\n", snapshot.investments.len()));
    for i in &snapshot.investments {
        out.push_str(&format!(
            "  - {} [{}] {:.2} -> {:.2}\n",
            i.name, i.kind, i.amount_invested, i.current_value
        ));
    }
    if let Some(m) = &snapshot.mortgage {
        out.push_str(&format!(
            "Mortgage: {} balance {:.2} on {:.2} (equity {:.2})\n",
            m.lender,
            m.outstanding_balance,
            m.property_value,
            m.equity()
        ));
    }
    out
}

fn render_summary(household: &str, summary: &HouseholdSummary) -> String {
    let mut out = format!("Household: {}\n", household);
    out.push_str(&format!("Monthly income:    {:>12.2}\n", summary.monthly_income));
    out.push_str(&format!("Monthly outgoings: {:>12.2}\n", summary.monthly_outgoings));
    out.push_str(&format!("Monthly surplus:   {:>12.2}\n", summary.monthly_surplus));
    if let Some(rate) = summary.savings_rate_percent {
        out.push_str(&format!("Savings rate:      {:>11.1}%\n", rate));
    }
    out.push_str(&format!("Accounts:          {:>12.2}\n", summary.account_balance));
    out.push_str(&format!("Investments:       {:>12.2}\n", summary.investment_value));
    out.push_str(&format!("Mortgage equity:   {:>12.2}\n", summary.mortgage_equity));
    out.push_str(&format!("Net worth:         {:>12.2}\n", summary.net_worth));
    out.push_str(&format!(
        "Goals achieved:    {:>12}\n",
        format!("{}/{}", summary.goals_achieved, summary.goals_total)
    ));
    for (category, amount) in &summary.outgoings_by_category {
        out.push_str(&format!("  {:<16} {:>12.2}\n", category, amount));
    }
    out
}
