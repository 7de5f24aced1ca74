//! Command-line entry point for the storefront admin.
//!
//! # Responsibility
//! - Load configuration, start logging and open the store database.
//! - Expose the report page, change lists, bulk actions and system checks.

use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use storefront_core::admin::changelist::{ChangeListPage, ListRow};
use storefront_core::admin::store::{
    CollectionChangeList, CustomerChangeList, OrderChangeList, ProductChangeList,
};
use storefront_core::admin::ClearInventoryAction;
use storefront_core::repo::now_epoch_ms;
use storefront_core::repo::order_repo::SqliteOrderRepository;
use storefront_core::{
    hello_page, init_logging, open_db, AdminSite, ChangeListParams, ModelKind, StoreConfig,
};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Store administration and recent-orders report", version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the core library is linked
    Ping,
    /// Render the recent-orders page as HTML
    Report,
    /// List products
    Products {
        /// Search term matched against product titles
        #[arg(short, long)]
        query: Option<String>,
        /// Change-list query string, e.g. `inventory=%3C10&o=-unit_price`
        #[arg(long)]
        params: Option<String>,
    },
    /// List collections with their product counts
    Collections {
        #[arg(long)]
        params: Option<String>,
    },
    /// List customers
    Customers {
        #[arg(long)]
        params: Option<String>,
    },
    /// List orders
    Orders {
        #[arg(long)]
        params: Option<String>,
    },
    /// Set inventory to zero for the given product ids
    ClearInventory {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Validate the admin declarations
    Check,
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    if let Command::Ping = args.command {
        println!("storefront_core ping={}", storefront_core::ping());
        println!("storefront_core version={}", storefront_core::core_version());
        return Ok(());
    }

    let site = AdminSite::with_default_admins()?;
    if let Command::Check = args.command {
        let messages = site.check();
        for message in &messages {
            println!("{message}");
        }
        println!("System check identified {} issue(s).", messages.len());
        if messages.is_empty() {
            return Ok(());
        }
        return Err("admin declarations failed system checks".into());
    }

    let mut conn = open_db(&config.db_path)?;
    let now_ms = now_epoch_ms();
    info!(
        "event=cli_command module=cli status=start db_path={}",
        config.db_path.display()
    );

    match args.command {
        Command::Report => {
            let repo = SqliteOrderRepository::new(&mut conn);
            let html = hello_page(&repo, &config.report.greeting_name, config.report.limit)?;
            println!("{html}");
        }
        Command::Products { query, params } => {
            let mut list_params = parse_params(params.as_deref(), now_ms)?;
            if let Some(query) = query {
                list_params = list_params.with_search(query);
            }
            print_changelist(&site.changelist(&conn, &ProductChangeList, &list_params)?);
        }
        Command::Collections { params } => {
            print_changelist(&site.changelist(
                &conn,
                &CollectionChangeList,
                &parse_params(params.as_deref(), now_ms)?,
            )?);
        }
        Command::Customers { params } => {
            print_changelist(&site.changelist(
                &conn,
                &CustomerChangeList,
                &parse_params(params.as_deref(), now_ms)?,
            )?);
        }
        Command::Orders { params } => {
            print_changelist(&site.changelist(
                &conn,
                &OrderChangeList,
                &parse_params(params.as_deref(), now_ms)?,
            )?);
        }
        Command::ClearInventory { ids } => {
            let outcome = site.run_action(
                &conn,
                ModelKind::Product,
                ClearInventoryAction::NAME,
                &ids,
            )?;
            println!("[{}] {}", outcome.message.level.as_str(), outcome.message.text);
        }
        Command::Ping | Command::Check => {}
    }
    Ok(())
}

fn parse_params(query: Option<&str>, now_ms: i64) -> Result<ChangeListParams, Box<dyn Error>> {
    Ok(match query {
        Some(query) => ChangeListParams::from_query_string(query, now_ms)?,
        None => ChangeListParams::new(now_ms),
    })
}

fn print_changelist<R: ListRow>(page: &ChangeListPage<R>) {
    println!("{}", page.columns.join("\t"));
    for row in page.cells() {
        let line = row.iter().map(|cell| cell.plain()).collect::<Vec<_>>();
        println!("{}", line.join("\t"));
    }
    println!(
        "-- {} {} (page {}/{})",
        page.total_count,
        page.model.model_name(),
        page.page,
        page.num_pages
    );
}
