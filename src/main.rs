use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paymybuddy::application::service::PayMyBuddy;
use paymybuddy::config::{DEFAULT_OPERATOR, LedgerConfig};
use paymybuddy::domain::account::AccountId;
use paymybuddy::domain::ports::{AccountStoreRef, TransactionLogRef};
use paymybuddy::infrastructure::credentials::{DEFAULT_ITERATIONS, Pbkdf2Hasher};
use paymybuddy::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransactionLog};
use paymybuddy::interfaces::csv::account_writer::AccountWriter;
use paymybuddy::interfaces::csv::history_writer::HistoryWriter;
use paymybuddy::interfaces::csv::operation_reader::OperationReader;
use paymybuddy::telemetry;
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Print the transfers sent by this user instead of the account snapshot
    #[arg(long, value_name = "EMAIL")]
    history: Option<String>,

    /// Account credited with transfer fees
    #[arg(long, env = "PAYMYBUDDY_OPERATOR", default_value = DEFAULT_OPERATOR)]
    operator: String,

    #[arg(long, env = "PAYMYBUDDY_FEE_RATE", default_value = "0.05")]
    fee_rate: Decimal,

    /// Smallest amount a user may transfer
    #[arg(long, env = "PAYMYBUDDY_MIN_AMOUNT", default_value = "1")]
    min_amount: Decimal,

    #[arg(long, env = "PAYMYBUDDY_ALLOW_SELF_TRANSFER")]
    allow_self_transfer: bool,

    /// PBKDF2 iterations used to hash passwords
    #[arg(long, env = "PAYMYBUDDY_HASH_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    hash_iterations: NonZeroU32,
}

impl Cli {
    fn ledger_config(&self) -> paymybuddy::error::Result<LedgerConfig> {
        LedgerConfig {
            operator: AccountId::new(&self.operator)?,
            fee_rate: self.fee_rate,
            minimum_amount: self.min_amount,
            allow_self_transfer: self.allow_self_transfer,
        }
        .validate()
    }
}

fn open_storage(db_path: Option<PathBuf>) -> Result<(AccountStoreRef, TransactionLogRef)> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use paymybuddy::infrastructure::rocksdb::RocksDBStore;
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(in_memory())
        }
        None => Ok(in_memory()),
    }
}

fn in_memory() -> (AccountStoreRef, TransactionLogRef) {
    (
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(InMemoryTransactionLog::new()),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let config = cli.ledger_config().into_diagnostic()?;
    let (accounts, transactions) = open_storage(cli.db_path.clone())?;
    let hasher = Arc::new(Pbkdf2Hasher::with_iterations(cli.hash_iterations));
    let app = PayMyBuddy::new(accounts, transactions, hasher, config);
    app.users.ensure_operator().await.into_diagnostic()?;

    // Process operations
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for op_result in reader.operations() {
        match op_result {
            Ok(op) => {
                if let Err(e) = app.apply(op).await {
                    eprintln!("Error processing operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    let stdout = io::stdout();
    match cli.history {
        Some(email) => {
            let sender = AccountId::new(&email).into_diagnostic()?;
            let records = app
                .ledger
                .list_transfers_by_sender(&sender)
                .await
                .into_diagnostic()?;
            let mut writer = HistoryWriter::new(stdout.lock());
            writer.write_records(&records).into_diagnostic()?;
        }
        None => {
            let accounts = app.users.all().await.into_diagnostic()?;
            let mut writer = AccountWriter::new(stdout.lock());
            writer.write_accounts(accounts).into_diagnostic()?;
        }
    }

    Ok(())
}
