//! Argument-driven command line front end over [`VaultManager`].

pub mod autopilot;
pub mod output;

use std::{env, path::Path, time::Duration};

use rand::random;
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    errors::{Result, VaultError},
    format::{format_currency, format_date},
    forms::{parse_amount, parse_deadline, GoalDraft, TransactionDraft},
    game::GameSession,
    goals::{SavingsGoal, TransactionKind},
    storage::JsonFilePreferences,
    time::{Clock, SystemClock},
    utils::{self, build_info},
    vault::VaultManager,
};

const DEFAULT_PLAY_SECONDS: u64 = 60;
const RECENT_LIMIT: usize = 10;

/// Entry point for `vaultrise_cli`, reading `std::env::args` and the data
/// directory from [`utils::app_data_dir`].
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    run(&args, &utils::app_data_dir())
}

/// Executes one command against the vault stored under `home`.
pub fn run(args: &[String], home: &Path) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Err(usage("missing command"));
    };
    debug!("running `{}` in {}", command, home.display());

    match command.as_str() {
        "version" => {
            print_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "play" => {
            let config = ConfigManager::with_base_dir(home)?.load()?;
            play(rest, &config)
        }
        _ => {
            let mut session = Session::open(home)?;
            if session.dispatch(command, rest)? {
                session.vault.flush()?;
            }
            Ok(())
        }
    }
}

/// Vault plus display settings for the duration of one command.
struct Session {
    vault: VaultManager,
    config: Config,
}

impl Session {
    fn open(home: &Path) -> Result<Self> {
        let config = ConfigManager::with_base_dir(home)?.load()?;
        let store = JsonFilePreferences::open(utils::preferences_file(home))?;
        let vault = VaultManager::open(Box::new(store), Box::new(SystemClock));
        Ok(Self { vault, config })
    }

    /// Runs `command`, returning whether the goal list changed and needs a flush.
    /// Read-only commands never write, so an undecodable stored list survives them.
    fn dispatch(&mut self, command: &str, args: &[String]) -> Result<bool> {
        let read_only = |outcome: Result<()>| outcome.map(|_| false);
        let mutated = |outcome: Result<()>| outcome.map(|_| true);
        match command {
            "goals" | "list" => read_only(self.list_goals()),
            "add" => mutated(self.add_goal(args)),
            "deposit" => mutated(self.record(TransactionKind::Deposit, args)),
            "withdraw" => mutated(self.record(TransactionKind::Withdrawal, args)),
            "show" => read_only(self.show_goal(required(args, 0, "goal")?)),
            "delete" => mutated(self.delete_goal(required(args, 0, "goal")?)),
            "stats" => read_only(self.stats()),
            // The onboarding flag is written on its own key.
            "onboard" => read_only(self.onboard()),
            "reset" => mutated(self.reset()),
            other => {
                print_usage();
                Err(usage(&format!("unknown command `{}`", other)))
            }
        }
    }

    fn money(&self, amount: f64) -> String {
        format_currency(amount, &self.config.currency, self.config.currency_precision)
    }

    fn list_goals(&self) -> Result<()> {
        let goals = self.vault.goals();
        if goals.is_empty() {
            output::info("No goals yet. Add one with `vaultrise_cli add <name> <target>`.");
            return Ok(());
        }
        output::section("Goals");
        for goal in goals {
            let marker = if goal.is_completed { "done" } else { "    " };
            output::info(format!(
                "{} {:<20} {} {:>3}%  {} / {}  [{}]",
                marker,
                goal.name,
                output::progress_bar(goal.progress(), 20),
                goal.progress_percentage(),
                self.money(goal.current_amount),
                self.money(goal.target_amount),
                short_id(goal.id)
            ));
        }
        Ok(())
    }

    fn add_goal(&mut self, args: &[String]) -> Result<()> {
        let name = required(args, 0, "name")?;
        let target = parse_amount(required(args, 1, "target")?)?;
        let mut draft = GoalDraft::new(name, target);
        if let Some(current) = flag(args, "--current")? {
            draft.current_amount = parse_starting_amount(current)?;
        }
        if let Some(deadline) = flag(args, "--deadline")? {
            draft.deadline = Some(parse_deadline(deadline)?);
        }

        let goal = draft.into_goal(self.vault.clock().now())?;
        let message = format!(
            "Added goal `{}` with target {} [{}]",
            goal.name,
            self.money(goal.target_amount),
            short_id(goal.id)
        );
        self.vault.add_goal(goal);
        output::success(message);
        Ok(())
    }

    fn record(&mut self, kind: TransactionKind, args: &[String]) -> Result<()> {
        let goal = self.find_goal(required(args, 0, "goal")?)?.clone();
        let amount = parse_amount(required(args, 1, "amount")?)?;
        let note = flag(args, "--note")?;
        let transaction = TransactionDraft::new(kind, amount)
            .with_note(note)
            .into_transaction(&goal, self.vault.clock().now())?;

        let outcome = self.vault.add_transaction(goal.id, transaction)?;
        let verb = match kind {
            TransactionKind::Deposit => "Deposited",
            TransactionKind::Withdrawal => "Withdrew",
        };
        output::success(format!(
            "{} {} {} `{}`; balance now {}",
            verb,
            self.money(amount),
            if kind == TransactionKind::Deposit { "into" } else { "from" },
            goal.name,
            self.money(outcome.current_amount)
        ));
        if outcome.newly_completed {
            output::success(format!("Goal reached! `{}` is complete.", goal.name));
        }
        Ok(())
    }

    fn show_goal(&self, query: &str) -> Result<()> {
        let goal = self.find_goal(query)?;
        let now = self.vault.clock().now();
        output::section(&goal.name);
        output::info(format!("Id:        {}", goal.id));
        output::info(format!(
            "Progress:  {} {}%",
            output::progress_bar(goal.progress(), 20),
            goal.progress_percentage()
        ));
        output::info(format!("Saved:     {}", self.money(goal.current_amount)));
        output::info(format!("Target:    {}", self.money(goal.target_amount)));
        output::info(format!("Remaining: {}", self.money(goal.remaining_amount())));
        output::info(format!("Started:   {}", format_date(goal.start_date)));
        if let (Some(deadline), Some(days)) = (goal.deadline, goal.days_remaining(now)) {
            let line = format!("Deadline:  {} ({} day(s) left)", format_date(deadline), days);
            if days < 0 {
                output::warning(line);
            } else {
                output::info(line);
            }
        }
        if goal.is_completed {
            output::success("Completed");
        }

        let recent = goal.recent_transactions();
        if recent.is_empty() {
            output::info("No transactions yet.");
            return Ok(());
        }
        output::section("Recent transactions");
        for transaction in recent.into_iter().take(RECENT_LIMIT) {
            output::info(format!(
                "{}  {}{}  {}",
                format_date(transaction.date),
                transaction.signed_label(),
                self.money(transaction.magnitude()),
                transaction.note.as_deref().unwrap_or("")
            ));
        }
        Ok(())
    }

    fn delete_goal(&mut self, query: &str) -> Result<()> {
        let id = self.find_goal(query)?.id;
        let removed = self.vault.delete_goal(id)?;
        output::success(format!("Deleted goal `{}`", removed.name));
        Ok(())
    }

    fn stats(&self) -> Result<()> {
        let summary = self.vault.summary();
        output::section("Vault statistics");
        output::info(format!("Total saved:        {}", self.money(summary.total_saved)));
        output::info(format!("Completed goals:    {}", summary.completed_count));
        output::info(format!("Active goals:       {}", summary.active_count));
        output::info(format!(
            "Average daily rate: {}",
            self.money(summary.average_daily_rate)
        ));
        Ok(())
    }

    fn onboard(&mut self) -> Result<()> {
        if self.vault.has_completed_onboarding() {
            output::info("Onboarding already completed.");
        } else {
            self.vault.complete_onboarding();
            output::success("Onboarding completed.");
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        let count = self.vault.goals().len();
        self.vault.reset_all();
        output::success(format!("Removed {} goal(s).", count));
        Ok(())
    }

    /// Matches by full id, unique id prefix, or case-insensitive name.
    fn find_goal(&self, query: &str) -> Result<&SavingsGoal> {
        let goals = self.vault.goals();
        if let Ok(id) = Uuid::parse_str(query) {
            return self
                .vault
                .goal(id)
                .ok_or_else(|| VaultError::GoalNotFound(query.to_string()));
        }

        if let Some(goal) = goals
            .iter()
            .find(|goal| goal.name.eq_ignore_ascii_case(query.trim()))
        {
            return Ok(goal);
        }

        let needle = query.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(VaultError::GoalNotFound(query.to_string()));
        }
        let mut matches = goals
            .iter()
            .filter(|goal| goal.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(goal), None) => Ok(goal),
            (Some(_), Some(_)) => Err(VaultError::InvalidInput(format!(
                "`{}` matches more than one goal",
                query
            ))),
            (None, _) => Err(VaultError::GoalNotFound(query.to_string())),
        }
    }
}

fn play(args: &[String], config: &Config) -> Result<()> {
    let seed = match flag(args, "--seed")? {
        Some(text) => parse_number(text, "--seed")?,
        None => random(),
    };
    let seconds = match flag(args, "--seconds")? {
        Some(text) => parse_number(text, "--seconds")?,
        None => DEFAULT_PLAY_SECONDS,
    };

    let mut session = GameSession::with_seed(config.game.clone(), seed);
    let outcome = autopilot::play(&mut session, Duration::from_secs(seconds));

    output::section("Vault Runner");
    output::info(format!("Seed:    {}", seed));
    output::info(format!("Score:   {}", outcome.score));
    output::info(format!("Bonus:   {}", outcome.bonus));
    output::info(format!("Level:   {}", outcome.level));
    output::info(format!("Elapsed: {:.1}s", outcome.elapsed.as_secs_f64()));
    if outcome.crashed {
        output::warning("Hit a rock. Game over.");
    } else {
        output::success("Time up.");
    }
    Ok(())
}

fn print_version() {
    let meta = build_info::current();
    output::info(meta.short());
    output::info(format!("built {} for {} ({})", meta.timestamp, meta.target, meta.profile));
    output::info(meta.rustc);
}

fn print_usage() {
    eprintln!(
        "Usage: vaultrise_cli <command>\n\
         Commands:\n  \
         goals\n  \
         add <name> <target> [--current N] [--deadline YYYY-MM-DD]\n  \
         deposit <goal> <amount> [--note TEXT]\n  \
         withdraw <goal> <amount> [--note TEXT]\n  \
         show <goal>\n  \
         delete <goal>\n  \
         stats\n  \
         onboard\n  \
         reset\n  \
         play [--seed N] [--seconds N]\n  \
         version"
    );
}

/// Positional argument `index`, skipping `--flag value` pairs.
fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            positional.push(arg.as_str());
        }
    }
    positional
        .get(index)
        .copied()
        .ok_or_else(|| usage(&format!("missing <{}>", name)))
}

fn flag<'a>(args: &'a [String], name: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|arg| arg == name) {
        Some(index) => args
            .get(index + 1)
            .map(|value| Some(value.as_str()))
            .ok_or_else(|| usage(&format!("{} needs a value", name))),
        None => Ok(None),
    }
}

fn parse_number(text: &str, name: &str) -> Result<u64> {
    text.trim()
        .parse()
        .map_err(|_| usage(&format!("{} expects a whole number, got `{}`", name, text)))
}

fn parse_starting_amount(text: &str) -> Result<f64> {
    if text.trim().parse::<f64>() == Ok(0.0) {
        return Ok(0.0);
    }
    parse_amount(text)
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

fn usage(message: &str) -> VaultError {
    VaultError::InvalidInput(message.to_string())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn positional_args_skip_flags() {
        let list = args(&["--note", "gift", "Car", "250"]);
        assert_eq!(required(&list, 0, "goal").unwrap(), "Car");
        assert_eq!(required(&list, 1, "amount").unwrap(), "250");
        assert!(required(&list, 2, "extra").is_err());
        assert_eq!(flag(&list, "--note").unwrap(), Some("gift"));
        assert_eq!(flag(&list, "--deadline").unwrap(), None);
        assert!(flag(&args(&["--note"]), "--note").is_err());
    }

    #[test]
    fn commands_persist_between_runs() {
        let temp = TempDir::new().unwrap();
        run(&args(&["add", "Car", "1000"]), temp.path()).unwrap();
        run(&args(&["deposit", "car", "1,000"]), temp.path()).unwrap();

        let session = Session::open(temp.path()).unwrap();
        let goal = session.find_goal("CAR").unwrap();
        assert!(goal.is_completed);
        assert_eq!(goal.current_amount, 1000.0);
        assert_eq!(goal.transactions.len(), 1);
    }

    #[test]
    fn goals_resolve_by_id_prefix() {
        let temp = TempDir::new().unwrap();
        run(&args(&["add", "Trip", "500"]), temp.path()).unwrap();
        let session = Session::open(temp.path()).unwrap();
        let id = session.vault.goals()[0].id;
        let prefix: String = id.to_string().chars().take(6).collect();
        assert_eq!(session.find_goal(&prefix).unwrap().id, id);
        assert_eq!(session.find_goal(&id.to_string()).unwrap().id, id);
        assert!(matches!(
            session.find_goal("nothing-like-this"),
            Err(VaultError::GoalNotFound(_))
        ));
    }

    #[test]
    fn overdrawn_withdrawal_is_rejected() {
        let temp = TempDir::new().unwrap();
        run(&args(&["add", "Fund", "500", "--current", "100"]), temp.path()).unwrap();
        let err = run(&args(&["withdraw", "Fund", "150"]), temp.path()).unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));

        let session = Session::open(temp.path()).unwrap();
        assert_eq!(session.vault.goals()[0].current_amount, 100.0);
    }

    #[test]
    fn read_only_commands_leave_stored_goals_untouched() {
        let temp = TempDir::new().unwrap();
        let path = utils::preferences_file(temp.path());
        let stored = r#"{"vaultrise_goals":[{"id":"x","name":"Car"}],"vaultrise_onboarding_completed":true}"#;
        std::fs::write(&path, stored).unwrap();

        for command in ["stats", "goals", "onboard"] {
            run(&args(&[command]), temp.path()).unwrap();
        }
        assert!(run(&args(&["show", "Car"]), temp.path()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), stored);
    }

    #[test]
    fn unknown_command_fails() {
        let temp = TempDir::new().unwrap();
        assert!(run(&args(&["fly"]), temp.path()).is_err());
        assert!(run(&[], temp.path()).is_err());
    }
}
