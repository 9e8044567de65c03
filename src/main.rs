use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use storefront_checkout::application::cart_store::CartStore;
use storefront_checkout::application::checkout::{CheckoutConfig, CheckoutEngine, CheckoutUpdate};
use storefront_checkout::domain::cart::{CartLine, VariantSelector};
use storefront_checkout::domain::order::OneClickOrder;
use storefront_checkout::domain::ports::SnapshotStoreArc;
use storefront_checkout::domain::product::Product;
use storefront_checkout::infrastructure::in_memory::{ScriptStep, ScriptedBackend};
use storefront_checkout::infrastructure::json_file::JsonFileSnapshotStore;
use storefront_checkout::interfaces::csv::cart_reader::CartLineReader;
use storefront_checkout::interfaces::csv::cart_writer::CartWriter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON cart snapshot
    #[arg(long, default_value = "cart.json")]
    cart_path: PathBuf,

    /// Path to a persistent RocksDB snapshot (overrides --cart-path)
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a product to the cart (merges with an existing identical line)
    Add {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        variant: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Remove a line from the cart
    Remove {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        variant: Option<String>,
        #[arg(long)]
        size: Option<String>,
    },
    /// Set the quantity of a line (values below 1 are ignored)
    SetQuantity {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        variant: Option<String>,
        #[arg(long)]
        size: Option<String>,
    },
    /// Print the cart as CSV
    Show,
    /// Print the derived totals
    Totals,
    /// Empty the cart
    Clear,
    /// Bulk-add lines from a CSV file
    Import { file: PathBuf },
    /// Write the cart as CSV to a file
    Export { file: PathBuf },
    /// Submit a one-click order and poll a scripted payment gateway
    Checkout {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        variant: Option<String>,
        #[arg(long)]
        size: Option<String>,
        /// Scripted gateway responses, one per poll tick
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "pending,processing,completed"
        )]
        statuses: Vec<ScriptStep>,
        #[arg(long, default_value_t = 50)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let snapshots = snapshot_store(&cli)?;
    let cart = CartStore::load(snapshots).await;

    match cli.command {
        Command::Add {
            product_id,
            name,
            price,
            quantity,
            variant,
            size,
            image_url,
        } => {
            cart.add_item(CartLine {
                product_id,
                variant_id: variant,
                size_label: size,
                name,
                unit_price: price,
                quantity,
                image_url,
            })
            .await
            .into_diagnostic()?;
        }
        Command::Remove {
            product_id,
            variant,
            size,
        } => {
            cart.remove_item(&product_id, &selector(variant, size))
                .await
                .into_diagnostic()?;
        }
        Command::SetQuantity {
            product_id,
            quantity,
            variant,
            size,
        } => {
            cart.update_quantity(&product_id, quantity, &selector(variant, size))
                .await
                .into_diagnostic()?;
        }
        Command::Show => {
            let stdout = io::stdout();
            let mut writer = CartWriter::new(stdout.lock());
            writer.write_lines(&cart.lines().await).into_diagnostic()?;
        }
        Command::Totals => {
            println!("total_items,total");
            println!("{},{}", cart.total_items().await, cart.total().await);
        }
        Command::Clear => {
            cart.clear().await.into_diagnostic()?;
        }
        Command::Import { file } => {
            let file = File::open(file).into_diagnostic()?;
            for line in CartLineReader::new(file).lines() {
                match line {
                    Ok(line) => cart.add_item(line).await.into_diagnostic()?,
                    Err(e) => eprintln!("Error reading cart line: {e}"),
                }
            }
        }
        Command::Export { file } => {
            let file = File::create(file).into_diagnostic()?;
            let mut writer = CartWriter::new(file);
            writer.write_lines(&cart.lines().await).into_diagnostic()?;
        }
        Command::Checkout {
            product_id,
            name,
            price,
            phone,
            variant,
            size,
            statuses,
            interval_ms,
        } => {
            run_checkout(
                cart,
                product_id,
                name,
                price,
                phone,
                variant,
                size,
                statuses,
                interval_ms,
            )
            .await?;
        }
    }

    Ok(())
}

fn snapshot_store(cli: &Cli) -> Result<SnapshotStoreArc> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = &cli.db_path {
        use storefront_checkout::infrastructure::rocksdb::RocksDbSnapshotStore;
        let store = RocksDbSnapshotStore::open(db_path).into_diagnostic()?;
        return Ok(Arc::new(store));
    }

    Ok(Arc::new(JsonFileSnapshotStore::new(&cli.cart_path)))
}

fn selector(variant: Option<String>, size: Option<String>) -> VariantSelector {
    VariantSelector {
        variant_id: variant,
        size_label: size,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_checkout(
    cart: CartStore,
    product_id: String,
    name: Option<String>,
    price: Decimal,
    phone: String,
    variant: Option<String>,
    size: Option<String>,
    statuses: Vec<ScriptStep>,
    interval_ms: u64,
) -> Result<()> {
    let backend = ScriptedBackend::new()
        .with_product(Product {
            id: product_id.clone(),
            name: name.unwrap_or_else(|| product_id.clone()),
            unit_price: price,
            image_url: None,
        })
        .await
        .with_script(statuses)
        .await;

    let engine = CheckoutEngine::new(
        cart,
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        Arc::new(backend),
        CheckoutConfig {
            poll_interval: Duration::from_millis(interval_ms),
        },
    );

    let product = engine
        .load_product(&product_id)
        .await
        .map_err(|err| miette::miette!("{}", err.user_message()))?;

    let order_id = engine
        .place_order(OneClickOrder {
            product_id: product.id,
            product_name: product.name,
            unit_price: product.unit_price,
            phone,
            variant_id: variant,
            size_label: size,
        })
        .await
        .map_err(|err| miette::miette!("{}", err.user_message()))?;

    println!("order submitted: {order_id}");

    let mut session = engine
        .watch_payment(Some(order_id), |update| match update {
            CheckoutUpdate::Status(status) => println!("status: {status}"),
            CheckoutUpdate::Succeeded(status) => println!("payment {status}: cart cleared"),
            CheckoutUpdate::Failed(status) => println!("payment {status}: cart kept for retry"),
        })
        .into_diagnostic()?;
    session.finished().await;

    Ok(())
}
