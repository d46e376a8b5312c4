//! # Recibo CLI
//!
//! Command-line interface for the branch operation ledger.
//!
//! ## Usage
//!
//! ```bash
//! # Record a deposit and print its receipt
//! recibo record --branch MIRAFLORES --account 2003004005006 \
//!     --client "Ana Quispe" --doc-number 45678912 \
//!     --type deposit --amount 150.00 --print
//!
//! # History, newest first
//! recibo list --recent
//!
//! # Reprint an earlier operation
//! recibo print 216-000001
//!
//! # Serve the HTTP API
//! recibo serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use recibo::{
    DeviceFilter, OperationLedger, PrinterConfig, ReciboError, SerialConnector, ThermalSession,
    format::grouped,
    model::{Currency, OperationInput, OperationNumber, OperationType, PaymentMethod, ReceiptRecord},
    preview,
    server::{self, ServerConfig},
};

/// Recibo - Branch operation ledger and thermal receipts
#[derive(Parser, Debug)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ledger file
    #[arg(long, global = true, env = "RECIBO_STORE", default_value = "data/operaciones.json")]
    store: PathBuf,

    /// USB vendor id of the printer, in hex
    #[arg(long, global = true, env = "RECIBO_VENDOR_ID", default_value = "04b8", value_parser = parse_vendor_id)]
    vendor_id: u16,

    /// Serial device path instead of searching by vendor id (the vendor id
    /// is still checked when the device reports one)
    #[arg(long, global = true)]
    device: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a new operation
    Record {
        #[arg(long)]
        branch: String,

        /// Account number (at least 10 digits)
        #[arg(long)]
        account: String,

        /// Client full name
        #[arg(long)]
        client: String,

        #[arg(long, default_value = "DNI")]
        doc_type: String,

        #[arg(long)]
        doc_number: String,

        /// deposit, withdrawal or transfer
        #[arg(long = "type", value_parser = parse_enum::<OperationType>)]
        operation_type: OperationType,

        /// sol or usd
        #[arg(long, default_value = "sol", value_parser = parse_enum::<Currency>)]
        currency: Currency,

        #[arg(long)]
        amount: Decimal,

        /// cash, check or transfer
        #[arg(long, default_value = "cash", value_parser = parse_enum::<PaymentMethod>)]
        payment: PaymentMethod,

        /// Cash handed over (defaults to the amount for cash payments)
        #[arg(long)]
        cash_received: Option<Decimal>,

        #[arg(long)]
        deposit_amount: Option<Decimal>,

        #[arg(long, default_value = "0")]
        tax_withheld: Decimal,

        #[arg(long)]
        notes: Option<String>,

        /// Print the receipt after recording
        #[arg(long)]
        print: bool,
    },

    /// List recorded operations
    List {
        /// Most recent first
        #[arg(long)]
        recent: bool,
    },

    /// Show one operation
    Show {
        /// Operation number, e.g. 216-000001
        number: OperationNumber,
    },

    /// Count, total and last operation
    Stats,

    /// Print the receipt of an existing operation
    Print {
        /// Operation number, e.g. 216-000001
        number: OperationNumber,
    },

    /// Print a test page to check the printer link
    TestPrint,

    /// Start the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(long, env = "RECIBO_LISTEN", default_value = "0.0.0.0:8080")]
        listen: String,
    },
}

fn parse_vendor_id(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid vendor id '{}': {}", s, e))
}

/// Parse a lower-case CLI word into one of the model's serde enums.
fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_uppercase()))
        .map_err(|_| format!("unknown value '{}'", s))
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,recibo=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), ReciboError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            branch,
            account,
            client,
            doc_type,
            doc_number,
            operation_type,
            currency,
            amount,
            payment,
            cash_received,
            deposit_amount,
            tax_withheld,
            notes,
            print,
        } => {
            let default_cash = match payment {
                PaymentMethod::Cash => amount,
                _ => Decimal::ZERO,
            };
            let input = OperationInput {
                branch,
                account_number: account,
                client_name: client,
                document_type: doc_type,
                document_number: doc_number,
                operation_type,
                currency,
                amount,
                payment_method: payment,
                cash_received: cash_received.unwrap_or(default_cash),
                deposit_amount: deposit_amount.unwrap_or(Decimal::ZERO),
                tax_withheld,
                notes,
            };
            input.validate()?;

            let ledger = OperationLedger::open(&cli.store)?;
            let record = ledger.append(input)?;
            println!("{}", preview::render_text(&record));

            if print {
                // The record is already stored; a print failure only reports
                match print_record(cli.device.as_deref(), cli.vendor_id, &record) {
                    Ok(()) => println!("Printed successfully!"),
                    Err(e) => eprintln!("Receipt not printed: {}", e),
                }
            }
        }

        Commands::List { recent } => {
            let ledger = OperationLedger::open(&cli.store)?;
            let records = if recent {
                ledger.recent_first()?
            } else {
                ledger.all()?
            };
            if records.is_empty() {
                println!("No operations recorded.");
                return Ok(());
            }
            for record in &records {
                print_row(record);
            }
        }

        Commands::Show { number } => {
            let record = find(&cli.store, number)?;
            println!("{}", preview::render_text(&record));
        }

        Commands::Stats => {
            let stats = OperationLedger::open(&cli.store)?.stats()?;
            println!("Operations: {}", stats.count);
            println!("Total:      {}", grouped(stats.total_amount));
            match &stats.last_record {
                Some(last) => {
                    print!("Last:       ");
                    print_row(last);
                }
                None => println!("Last:       -"),
            }
        }

        Commands::Print { number } => {
            let record = find(&cli.store, number)?;
            print_record(cli.device.as_deref(), cli.vendor_id, &record)?;
            println!("Printed {} successfully!", record.operation_number);
        }

        Commands::TestPrint => {
            let mut session = open_session(cli.device.as_deref(), cli.vendor_id)?;
            session.print_test_page()?;
            println!("Test page printed.");
        }

        Commands::Serve { listen } => {
            let config = ServerConfig {
                store_path: cli.store,
                listen_addr: listen,
                usb_vendor_id: cli.vendor_id,
                device_path: cli.device,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))?;
        }
    }

    Ok(())
}

fn find(store: &Path, number: OperationNumber) -> Result<ReceiptRecord, ReciboError> {
    OperationLedger::open(store)?
        .by_number(number)?
        .ok_or_else(|| ReciboError::NotFound(format!("No operation {}", number)))
}

fn print_row(record: &ReceiptRecord) {
    let op = &record.details;
    println!(
        "{}  {}  {:<13}  {:>3} {:>14}  {}",
        record.operation_number,
        record.created_at.format("%d/%m/%Y %H:%M"),
        op.operation_type.label(),
        op.currency.symbol(),
        grouped(op.amount),
        op.client_name
    );
}

/// Connect to the printer or fail with the reason.
fn open_session(device: Option<&Path>, vendor_id: u16) -> Result<ThermalSession, ReciboError> {
    let config = PrinterConfig::TM_T20II;
    let mut connector = SerialConnector::new(&config);
    if let Some(path) = device {
        connector = connector.with_device(path);
    }

    let mut session = ThermalSession::new(config, connector);
    session.open(&DeviceFilter::vendor(vendor_id))?;
    Ok(session)
}

fn print_record(
    device: Option<&Path>,
    vendor_id: u16,
    record: &ReceiptRecord,
) -> Result<(), ReciboError> {
    let mut session = open_session(device, vendor_id)?;
    session.print(record)
}
