use std::collections::HashSet;
use std::io::Write;

use serde::Serialize;

use crate::domain::{Balance, Error, Expense, ExpenseView, Money, OutputRepository};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Which view `flush` writes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Report {
    #[default]
    Balances,
    Expenses,
}

const BALANCE_HEADER: [&str; 4] = ["member", "name", "amount", "status"];
const EXPENSE_HEADER: [&str; 10] = [
    "expense",
    "description",
    "amount",
    "payer",
    "payer_name",
    "split",
    "participant",
    "participant_name",
    "share",
    "created_at",
];

/// Keeps accepted expenses in memory and writes reports to `W` on flush.
#[derive(Debug)]
pub struct WriterOutput<W: Write> {
    writer: W,
    format: OutputFormat,
    expenses: Vec<Expense>,
    ids: HashSet<String>,
}

impl<W: Write> WriterOutput<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            expenses: Vec::new(),
            ids: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_csv<I>(&mut self, header: &[&str], rows: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut wtr = csv::Writer::from_writer(&mut self.writer);
        wtr.write_record(header).map_err(csv_error)?;
        for row in rows {
            wtr.write_record(&row).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .map_err(|e| Error::Engine(format!("Failed to write report: {}", e)))?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> Error {
    Error::Engine(format!("Failed to write report: {}", e))
}

impl<W: Write> OutputRepository for WriterOutput<W> {
    fn record_expense(&mut self, expense: Expense) -> Result<(), Error> {
        if !self.ids.insert(expense.id.clone()) {
            return Err(Error::Engine(format!(
                "Expense ID {} already exists",
                expense.id
            )));
        }
        self.expenses.push(expense);
        Ok(())
    }

    fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    fn flush_balances(&mut self, balances: &[Balance]) -> Result<(), Error> {
        match self.format {
            OutputFormat::Csv => {
                let rows = balances.iter().map(|b| {
                    vec![
                        b.member_id.to_string(),
                        b.name.clone(),
                        Money(b.amount).to_string(),
                        String::from(if b.owes() { "owes" } else { "owed" }),
                    ]
                });
                self.write_csv(&BALANCE_HEADER, rows)
            }
            OutputFormat::Json => {
                let rounded: Vec<Balance> = balances
                    .iter()
                    .map(|b| Balance {
                        amount: Money::rounded(b.amount),
                        ..b.clone()
                    })
                    .collect();
                self.write_json(&rounded)
            }
        }
    }

    /// CSV lists one row per participant; JSON nests participants per expense.
    fn flush_expenses(&mut self, expenses: &[ExpenseView]) -> Result<(), Error> {
        match self.format {
            OutputFormat::Csv => {
                let rows = expenses.iter().flat_map(|e| {
                    e.participants.iter().map(move |p| {
                        vec![
                            e.id.clone(),
                            e.description.clone(),
                            Money(e.amount).to_string(),
                            e.payer.to_string(),
                            e.payer_name.clone(),
                            e.split_type.to_string(),
                            p.member_id.to_string(),
                            p.name.clone(),
                            Money(p.share).to_string(),
                            e.created_at.to_rfc3339(),
                        ]
                    })
                });
                self.write_csv(&EXPENSE_HEADER, rows)
            }
            OutputFormat::Json => self.write_json(&expenses),
        }
    }
}
