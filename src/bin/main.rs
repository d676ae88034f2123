// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use expense_splitter_rs::{
    BalanceStatus, Expense, Ledger, LedgerError, Participant, Transfer, round_money,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Expense Splitter - Track shared expenses and settle up
///
/// Without a FILE, runs an interactive menu on stdin. With a FILE, reads
/// participants and expenses from CSV and prints expenses, balances and a
/// settlement plan to stdout.
#[derive(Parser, Debug)]
#[command(name = "expense-splitter")]
#[command(about = "Splits shared expenses and computes who pays whom", long_about = None)]
struct Args {
    /// Path to a CSV file of participants and expenses
    ///
    /// Expected format: kind,name,description,amount,paid_by,split_among
    /// Example: expense-splitter trip.csv > plan.txt
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Commit the settlement plan and print the resulting balances
    #[arg(long)]
    apply: bool,

    /// Output format for the settlement plan in batch mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so stdout stays clean for reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let result = match &args.input {
        Some(path) => run_batch(path, &args),
        None => {
            let ledger = Ledger::new();
            let stdin = io::stdin();
            run_interactive(&ledger, stdin.lock(), io::stdout())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_batch(path: &Path, args: &Args) -> io::Result<()> {
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("opening file '{}': {}", path.display(), e))
    })?;

    let ledger = process_commands(BufReader::new(file)).map_err(io::Error::other)?;

    let mut out = io::stdout().lock();
    write_expenses(&ledger.expenses(), &mut out)?;
    write_balances(&ledger.balances(), &mut out)?;

    match args.format {
        OutputFormat::Text => write_settlement(ledger.settlement_plan(), &mut out)?,
        OutputFormat::Csv => match ledger.settlement_plan() {
            Ok(plan) => write_transfers_csv(&plan, &mut out).map_err(io::Error::other)?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        },
    }

    if args.apply {
        match ledger.settle_up() {
            Ok(plan) => writeln!(out, "\nSettlement recorded: {} transfer(s).", plan.len())?,
            Err(e) => writeln!(out, "\nError: {}", e)?,
        }
        write_balances(&ledger.balances(), &mut out)?;
    }

    out.flush()
}

/// Raw CSV record matching the input format.
///
/// Fields: `kind, name, description, amount, paid_by, split_among`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(default)]
    paid_by: Option<String>,
    #[serde(default)]
    split_among: Option<String>,
}

/// A ledger operation decoded from one CSV row.
#[derive(Debug, PartialEq)]
enum Command {
    AddPerson {
        name: String,
    },
    AddExpense {
        description: String,
        amount: Decimal,
        paid_by: String,
        split_among: Vec<String>,
    },
}

impl CsvRecord {
    /// Converts CSV record to a ledger command.
    ///
    /// Returns `None` for unknown kinds or missing required fields.
    fn into_command(self) -> Option<Command> {
        match self.kind.to_lowercase().as_str() {
            "person" => Some(Command::AddPerson { name: self.name? }),
            "expense" => Some(Command::AddExpense {
                description: self.description.unwrap_or_default(),
                amount: self.amount?,
                paid_by: self.paid_by?,
                split_among: parse_split_names(&self.split_among.unwrap_or_default()),
            }),
            _ => None,
        }
    }
}

impl Command {
    fn apply(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        match self {
            Command::AddPerson { name } => ledger.register_participant(name).map(|_| ()),
            Command::AddExpense {
                description,
                amount,
                paid_by,
                split_among,
            } => {
                let names: Vec<&str> = split_among.iter().map(String::as_str).collect();
                ledger
                    .post_expense(description, *amount, paid_by, &names)
                    .map(|_| ())
            }
        }
    }
}

/// Splits a delimited list of names on commas or semicolons.
///
/// Names are trimmed and blank entries dropped, so `"A, B;;C "` yields
/// `["A", "B", "C"]`.
fn parse_split_names(input: &str) -> Vec<String> {
    input
        .split([',', ';'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Build a ledger from a CSV reader.
///
/// Malformed rows and rejected operations are logged and skipped.
///
/// # CSV Format
///
/// Expected columns: `kind, name, description, amount, paid_by, split_among`
/// - `kind`: `person` or `expense`
/// - `name`: Participant name (person rows)
/// - `description`, `amount`, `paid_by`, `split_among`: expense rows;
///   `split_among` lists names separated by `;` (or `,` when quoted)
///
/// # Example
///
/// ```csv
/// kind,name,description,amount,paid_by,split_among
/// person,Alice,,,,
/// person,Bob,,,,
/// expense,,Dinner,60.00,Alice,Alice;Bob
/// ```
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read.
fn process_commands<R: Read>(reader: R) -> Result<Ledger, csv::Error> {
    let ledger = Ledger::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let line = row + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "skipping malformed row");
                continue;
            }
        };

        let Some(command) = record.into_command() else {
            warn!(line, "skipping invalid command record");
            continue;
        };

        if let Err(e) = command.apply(&ledger) {
            warn!(line, error = %e, "skipping rejected command");
        }
    }

    Ok(ledger)
}

/// Formats money with exactly two decimal places.
fn money(amount: Decimal) -> String {
    round_money(amount).to_string()
}

fn write_expenses<W: Write>(expenses: &[Expense], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n=== All Expenses ===")?;
    if expenses.is_empty() {
        return writeln!(out, "No expenses recorded.");
    }
    for expense in expenses {
        writeln!(
            out,
            "{}. {} - ${} (paid by {}, split among {} people)",
            expense.id(),
            expense.description(),
            money(expense.amount()),
            expense.paid_by(),
            expense.split_among().len()
        )?;
    }
    Ok(())
}

fn write_balances<W: Write>(participants: &[Participant], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n=== Current Balances ===")?;
    if participants.is_empty() {
        return writeln!(out, "No participants registered.");
    }
    for participant in participants {
        match participant.status() {
            BalanceStatus::Owed(amount) => {
                writeln!(out, "{} is owed: ${}", participant.name(), money(amount))?
            }
            BalanceStatus::Owes(amount) => {
                writeln!(out, "{} owes: ${}", participant.name(), money(amount))?
            }
            BalanceStatus::Settled => writeln!(out, "{} is settled up", participant.name())?,
        }
    }
    Ok(())
}

fn write_settlement<W: Write>(
    plan: Result<Vec<Transfer>, LedgerError>,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\n=== Settlement Plan ===")?;
    match plan {
        Ok(transfers) if transfers.is_empty() => writeln!(out, "Everyone is settled up!"),
        Ok(transfers) => {
            for transfer in &transfers {
                writeln!(
                    out,
                    "{} owes {}: ${}",
                    transfer.debtor(),
                    transfer.creditor(),
                    money(transfer.amount())
                )?;
            }
            Ok(())
        }
        Err(e) => writeln!(out, "Error: {}", e),
    }
}

/// Write a settlement plan as CSV with columns `from, to, amount`.
fn write_transfers_csv<W: Write>(transfers: &[Transfer], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    if transfers.is_empty() {
        wtr.write_record(["from", "to", "amount"])?;
    }
    for transfer in transfers {
        wtr.serialize(transfer)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads one trimmed line after printing `prompt`. `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn report<T, W: Write>(result: Result<T, LedgerError>, out: &mut W) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            debug!(error = %e, "operation rejected");
            writeln!(out, "Error: {}", e)?;
            Ok(None)
        }
    }
}

/// Runs the interactive menu until the user exits or input ends.
fn run_interactive<R: BufRead, W: Write>(
    ledger: &Ledger,
    mut input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "=================================")?;
    writeln!(out, "  Smart Expense Splitter")?;
    writeln!(out, "=================================")?;

    loop {
        writeln!(out, "\n--- Menu ---")?;
        writeln!(out, "1. Add person")?;
        writeln!(out, "2. Add expense")?;
        writeln!(out, "3. Show all expenses")?;
        writeln!(out, "4. Show balances")?;
        writeln!(out, "5. Calculate settlements")?;
        writeln!(out, "6. Apply settlement plan")?;
        writeln!(out, "7. Exit")?;
        let Some(choice) = prompt(&mut input, &mut out, "Choose an option: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => {
                let Some(name) = prompt(&mut input, &mut out, "Enter person's name: ")? else {
                    break;
                };
                if let Some(participant) = report(ledger.register_participant(&name), &mut out)? {
                    writeln!(out, "Added: {}", participant.name())?;
                }
            }
            "2" => {
                let Some(description) = prompt(&mut input, &mut out, "Enter expense description: ")?
                else {
                    break;
                };
                let Some(raw_amount) = prompt(&mut input, &mut out, "Enter amount: ")? else {
                    break;
                };
                let Some(paid_by) = prompt(&mut input, &mut out, "Who paid? ")? else {
                    break;
                };
                let Some(split) =
                    prompt(&mut input, &mut out, "Split among (comma-separated names): ")?
                else {
                    break;
                };

                let Ok(amount) = Decimal::from_str(&raw_amount) else {
                    writeln!(out, "Error: '{}' is not a valid amount", raw_amount)?;
                    continue;
                };
                let split_among = parse_split_names(&split);
                let names: Vec<&str> = split_among.iter().map(String::as_str).collect();
                let posted = ledger.post_expense(&description, amount, &paid_by, &names);
                if let Some(expense) = report(posted, &mut out)? {
                    writeln!(
                        out,
                        "Added expense: {} - ${} (paid by {}, split among {} people)",
                        expense.description(),
                        money(expense.amount()),
                        expense.paid_by(),
                        expense.split_among().len()
                    )?;
                    writeln!(out, "Share per person: ${}", money(expense.share_per_person()))?;
                }
            }
            "3" => write_expenses(&ledger.expenses(), &mut out)?,
            "4" => write_balances(&ledger.balances(), &mut out)?,
            "5" => write_settlement(ledger.settlement_plan(), &mut out)?,
            "6" => {
                if let Some(plan) = report(ledger.settle_up(), &mut out)? {
                    writeln!(out, "Settlement recorded: {} transfer(s).", plan.len())?;
                }
            }
            "7" => {
                writeln!(out, "Thanks for using Smart Expense Splitter!")?;
                break;
            }
            _ => writeln!(out, "Invalid option! Please try again.")?,
        }
    }

    out.flush()
}
