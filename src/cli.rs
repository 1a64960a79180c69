//! `resto-admin` command line shell over the page actions.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use zeroize::Zeroizing;

use crate::app::AdminApp;
use crate::commands::{self, Outcome};
use crate::config::AppConfig;
use crate::lookup::LookupKind;
use crate::models::ListQuery;
use crate::order_status::OrderStatus;
use crate::reports::ReportPeriod;
use crate::totals::{round_currency, Cart, OrderTotals};

#[derive(Parser, Debug)]
#[command(name = "resto-admin", version)]
#[command(about = "Restaurant back-office administration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Back-office API base URL (overrides configuration)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for the local database and logs (overrides configuration)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "RESTO_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Page to continue at after signing in
        #[arg(long)]
        next: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check whether the signed-in user may open a client route
    Route { path: String },
    /// Price a cart described in a JSON file
    Quote {
        cart: PathBuf,
        /// Apply a coupon code
        #[arg(long)]
        coupon: Option<String>,
    },
    #[command(subcommand)]
    Orders(OrdersCommand),
    #[command(subcommand)]
    Menu(MenuCommand),
    #[command(subcommand)]
    Expenses(ExpensesCommand),
    #[command(subcommand)]
    Report(ReportCommand),
    #[command(subcommand)]
    Loyalty(LoyaltyCommand),
    /// Show a lookup list
    Lookup {
        #[arg(value_enum)]
        kind: LookupArg,
    },
    /// Troubleshooting report (API reachability, local database, logs)
    Diagnostics {
        /// Drop cached lookup lists first
        #[arg(long)]
        reset_cache: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    Show { id: String },
    /// Move an order to a new status
    Status {
        id: String,
        status: OrderStatus,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MenuCommand {
    Categories {
        #[command(flatten)]
        page: PageArgs,
    },
    Items {
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExpensesCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Print per-type totals instead of the rows
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    ProfitLoss(PeriodArgs),
    ItemWise(PeriodArgs),
    CustomerWise(PeriodArgs),
}

#[derive(Subcommand, Debug)]
pub enum LoyaltyCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Points an order of `amount` would earn under each active program
    Preview { amount: f64 },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
}

impl PageArgs {
    fn query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            ..ListQuery::default()
        }
    }
}

/// Defaults to the current month so far.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    #[arg(long, conflicts_with = "days")]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// The last N days ending with `--to` (or today)
    #[arg(long)]
    pub days: Option<u32>,
}

impl PeriodArgs {
    fn period(&self, today: NaiveDate) -> anyhow::Result<ReportPeriod> {
        if let Some(days) = self.days {
            let window = ReportPeriod::last_days(self.to.unwrap_or(today), days);
            return Ok(ReportPeriod::new(window.from, window.to)?);
        }
        let default = ReportPeriod::month_to_date(today);
        let from = self.from.unwrap_or(default.from);
        let to = self.to.unwrap_or(today);
        Ok(ReportPeriod::new(from, to)?)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LookupArg {
    ExpenseTypes,
    PaymentModes,
    OrderStatuses,
}

impl From<LookupArg> for LookupKind {
    fn from(arg: LookupArg) -> Self {
        match arg {
            LookupArg::ExpenseTypes => LookupKind::ExpenseTypes,
            LookupArg::PaymentModes => LookupKind::PaymentModes,
            LookupArg::OrderStatuses => LookupKind::OrderStatuses,
        }
    }
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api_base_url = crate::config::normalize_base_url(url);
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a successful outcome; everything else becomes a command error.
fn emit<T: Serialize>(outcome: Outcome<T>) -> anyhow::Result<()> {
    match outcome {
        Outcome::Success(value) => print_json(&value),
        Outcome::Toast(message) => bail!(message),
        Outcome::FieldErrors(fields) => {
            let detail = fields
                .iter()
                .map(|(field, msg)| format!("  {field}: {msg}"))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("Please correct the following:\n{detail}")
        }
        Outcome::Redirect(to) => {
            bail!("Not signed in. Run `resto-admin login` first (redirect: {to})")
        }
    }
}

pub fn read_cart(path: &Path) -> anyhow::Result<Cart> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading cart file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing cart file {}", path.display()))
}

/// Totals as shown to the operator.
pub fn rounded(totals: &OrderTotals) -> serde_json::Value {
    json!({
        "subtotal": round_currency(totals.subtotal),
        "discountAmount": round_currency(totals.discount_amount),
        "discountedSubtotal": round_currency(totals.discounted_subtotal),
        "tax": round_currency(totals.tax),
        "total": round_currency(totals.total),
    })
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn execute(command: Command, app: &AdminApp) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    match command {
        Command::Login {
            username,
            password,
            next,
        } => {
            let password = Zeroizing::new(match password {
                Some(p) => p,
                None => read_password()?,
            });
            let outcome = commands::auth::login(app, &username, &password, next.as_deref()).await;
            emit(outcome.map(|user| json!({ "user": user, "next": app.read(|s| s.location.clone()) })))
        }
        Command::Logout => emit(commands::auth::logout(app)),
        Command::Whoami => match commands::auth::restore_session(app).await {
            Outcome::Success(None) => bail!("Not signed in"),
            other => emit(other),
        },
        Command::Route { path } => {
            if let Outcome::Toast(msg) = commands::auth::restore_session(app).await {
                tracing::warn!("could not verify session: {msg}");
            }
            emit(commands::navigation::navigate(app, &path).map(|route| route.to_string()))
        }
        Command::Quote { cart, coupon } => {
            let cart = read_cart(&cart)?;
            if let Some(code) = coupon.as_deref() {
                let query = ListQuery::default().with_search(code);
                let loaded = commands::coupons::load_coupons(app, &query).await;
                if !loaded.is_success() {
                    return emit(loaded).context("loading coupons");
                }
            }
            emit(commands::orders::quote(app, &cart, coupon.as_deref()).map(|t| rounded(&t)))
        }
        Command::Orders(cmd) => match cmd {
            OrdersCommand::List { page, status } => {
                let query = ListQuery {
                    status: status.map(|s| s.as_str().to_string()),
                    ..page.query()
                };
                emit(commands::orders::load_orders(app, &query).await)
            }
            OrdersCommand::Show { id } => emit(commands::orders::open_order(app, &id).await),
            OrdersCommand::Status { id, status, reason } => {
                emit(commands::orders::change_status(app, &id, status, reason).await)
            }
        },
        Command::Menu(cmd) => match cmd {
            MenuCommand::Categories { page } => {
                emit(commands::menu::load_categories(app, &page.query()).await)
            }
            MenuCommand::Items { page } => emit(commands::menu::load_items(app, &page.query()).await),
        },
        Command::Expenses(ExpensesCommand::List {
            page,
            from,
            to,
            summary,
        }) => {
            let query = ListQuery {
                from,
                to,
                ..page.query()
            };
            let outcome = commands::expenses::load_expenses(app, &query).await;
            if summary {
                let totals = outcome.map(|_| commands::expenses::summary(app));
                emit(totals.map(|t| {
                    t.into_iter()
                        .map(|(kind, amount)| (kind.as_str(), round_currency(amount)))
                        .collect::<std::collections::BTreeMap<_, _>>()
                }))
            } else {
                emit(outcome)
            }
        }
        Command::Report(cmd) => match cmd {
            ReportCommand::ProfitLoss(p) => {
                let period = p.period(today)?;
                let outcome = commands::reports::profit_loss(app, period).await;
                emit(outcome.map(|report| {
                    json!({
                        "marginPercent": crate::reports::margin_percent(&report).map(round_currency),
                        "report": report,
                    })
                }))
            }
            ReportCommand::ItemWise(p) => {
                emit(commands::reports::item_wise(app, p.period(today)?).await)
            }
            ReportCommand::CustomerWise(p) => {
                emit(commands::reports::customer_wise(app, p.period(today)?).await)
            }
        },
        Command::Loyalty(cmd) => match cmd {
            LoyaltyCommand::List { page } => {
                emit(commands::loyalty::load_programs(app, &page.query()).await)
            }
            LoyaltyCommand::Preview { amount } => {
                let loaded = commands::loyalty::load_programs(app, &ListQuery::default()).await;
                emit(loaded.map(|_| commands::loyalty::preview(app, amount)))
            }
        },
        Command::Lookup { kind } => emit(commands::lookup::options(app, kind.into()).await),
        Command::Diagnostics { reset_cache } => {
            if reset_cache {
                emit(commands::diagnostics::reset_cache(app).map(|removed| json!({ "removed": removed })))?;
            }
            print_json(&commands::diagnostics::troubleshooting_report(app).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_status_command() {
        let cli = Cli::try_parse_from([
            "resto-admin",
            "orders",
            "status",
            "o1",
            "in-kitchen",
            "--reason",
            "rush",
        ])
        .expect("parse");
        match cli.command {
            Command::Orders(OrdersCommand::Status { id, status, reason }) => {
                assert_eq!(id, "o1");
                assert_eq!(status, OrderStatus::InKitchen);
                assert_eq!(reason.as_deref(), Some("rush"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(Cli::try_parse_from(["resto-admin", "orders", "status", "o1", "served"]).is_err());
    }

    #[test]
    fn global_overrides_apply() {
        let cli = Cli::try_parse_from([
            "resto-admin",
            "whoami",
            "--api-url",
            "api.example.com/",
            "--data-dir",
            "/tmp/resto",
        ])
        .expect("parse");
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/resto"));
    }

    #[test]
    fn period_defaults_to_month_to_date() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 18).unwrap();
        let period = PeriodArgs::default().period(today).unwrap();
        assert_eq!(period.from, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(period.to, today);
    }

    #[test]
    fn days_flag_selects_trailing_window() {
        let cli = Cli::try_parse_from(["resto-admin", "report", "item-wise", "--days", "7"])
            .expect("parse");
        let Command::Report(ReportCommand::ItemWise(args)) = cli.command else {
            panic!("unexpected command");
        };
        let today = NaiveDate::from_ymd_opt(2026, 3, 18).unwrap();
        let period = args.period(today).unwrap();
        assert_eq!(period.from, NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
        assert_eq!(period.to, today);

        assert!(Cli::try_parse_from([
            "resto-admin", "report", "profit-loss", "--days", "7", "--from", "2026-03-01"
        ])
        .is_err());
    }

    #[test]
    fn parses_login_with_password_flag() {
        let cli = Cli::try_parse_from([
            "resto-admin", "login", "-u", "asha", "--password", "secret", "--next", "/orders",
        ])
        .expect("parse");
        match cli.command {
            Command::Login { username, password, next } => {
                assert_eq!(username, "asha");
                assert_eq!(password.as_deref(), Some("secret"));
                assert_eq!(next.as_deref(), Some("/orders"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_loyalty_preview() {
        let cli = Cli::try_parse_from(["resto-admin", "loyalty", "preview", "249.5"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Loyalty(LoyaltyCommand::Preview { amount }) if amount == 249.5
        ));
    }

    #[test]
    fn quote_file_round_trips_to_rounded_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(
            &path,
            r#"{ "lines": [ { "price": 8.99, "quantity": 2 }, { "price": 18.99, "quantity": 1 } ],
                "taxRate": 0.1, "deliveryFee": 5 }"#,
        )
        .unwrap();
        let cart = read_cart(&path).expect("cart");
        let shown = rounded(&cart.totals());
        assert_eq!(shown["subtotal"], json!(36.97));
        assert_eq!(shown["tax"], json!(3.7));
        assert_eq!(shown["total"], json!(45.67));
    }

    #[test]
    fn emit_turns_redirect_into_error() {
        let err = emit::<()>(Outcome::Redirect("/login?next=%2Forders".into())).unwrap_err();
        assert!(err.to_string().contains("resto-admin login"));
    }
}
