use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use order_desk_lib::commands::{dashboard, failure_message, orders, reports, system};
use order_desk_lib::config::{
    Settings, DEFAULT_CATALOG_FILE, DEFAULT_CONFIG_FILE, DEFAULT_REPORTS_DIR, DEFAULT_STORE_FILE,
};
use order_desk_lib::validation::OrderForm;
use order_desk_lib::{init_logging, load_catalog_or_empty, AppState};

#[derive(Debug, Parser)]
#[command(name = "order-desk", version, about = "Cadastro de pedidos, painel do dia e relatório diário")]
struct Cli {
    /// Order spreadsheet
    #[arg(long, global = true, env = "ORDER_DESK_STORE", default_value = DEFAULT_STORE_FILE)]
    store: PathBuf,

    /// Product catalog (name -> unit price)
    #[arg(long, global = true, env = "ORDER_DESK_CATALOG", default_value = DEFAULT_CATALOG_FILE)]
    catalog: PathBuf,

    /// Gateway and SMTP credentials
    #[arg(long, global = true, env = "ORDER_DESK_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where daily reports are written
    #[arg(long, global = true, env = "ORDER_DESK_REPORTS_DIR", default_value = DEFAULT_REPORTS_DIR)]
    reports_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new order
    Create(CreateArgs),
    /// List every stored order
    List,
    /// Show one order
    Show { id: String },
    /// Change an order's status and notify the customer
    SetStatus { id: String, status: String },
    /// Delete an order
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Today's order count, revenue and top product
    Dashboard,
    /// Export today's orders and email the spreadsheet
    Report,
    /// List catalog products and prices
    Products,
    /// Version and build information
    About,
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    product: String,
    #[arg(long, default_value = "")]
    quantity: String,
    /// Cartão or Pix
    #[arg(long, default_value = "")]
    payment: String,
    /// Defaults to "Em andamento"
    #[arg(long, default_value = "")]
    status: String,
}

impl From<CreateArgs> for OrderForm {
    fn from(args: CreateArgs) -> Self {
        OrderForm {
            name: args.name,
            phone: args.phone,
            product: args.product,
            quantity: args.quantity,
            payment: args.payment,
            status: args.status,
        }
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{prompt} [s/N] ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading confirmation")?;
    Ok(matches!(
        line.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let guard = init_logging();

    let settings = Settings {
        store_path: cli.store,
        catalog_path: cli.catalog,
        config_path: cli.config,
        reports_dir: cli.reports_dir,
    };
    let catalog = load_catalog_or_empty(&settings.catalog_path);
    let state = AppState::production(settings, catalog);

    let now = chrono::Local::now().naive_local();
    let result = match cli.command {
        Command::Create(args) => orders::order_create(&state, &args.into(), now),
        Command::List => orders::order_get_all(&state),
        Command::Show { id } => orders::order_get(&state, &orders::OrderGetPayload { order_id: id }),
        Command::SetStatus { id, status } => orders::order_update_status(
            &state,
            &orders::OrderUpdateStatusPayload {
                order_id: id,
                status,
            },
        ),
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Excluir o pedido {id}?"))? {
                eprintln!("Exclusão cancelada.");
                return Ok(());
            }
            orders::order_delete(&state, &orders::OrderDeletePayload { order_id: id })
        }
        Command::Dashboard => dashboard::dashboard_get_summary(&state, now.date()),
        Command::Report => reports::report_generate_daily(&state, now.date()),
        Command::Products => system::catalog_get_products(&state),
        Command::About => system::system_get_about(),
    };

    let value = match result {
        Ok(value) => value,
        Err(message) => bail!(message),
    };

    if let Some(message) = failure_message(&value) {
        eprintln!("{message}");
        drop(guard);
        std::process::exit(1);
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    drop(guard);
    Ok(())
}
