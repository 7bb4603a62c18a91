use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::{Error, Expense, ExpenseStream, Household, MemberId, Money, Split};

const LIST_SEPARATOR: char = ';';
const SHARE_SEPARATOR: char = ':';

/// Reads a household snapshot (`id`, `name`, `inviteCode`, `members`) from JSON.
pub fn load_household<R: Read>(reader: R) -> Result<Household, Error> {
    serde_json::from_reader(reader)
        .map_err(|e| Error::Ingestion(format!("Household deserialization error: {}", e)))
}

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Ok(Self { reader: Some(rdr) })
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    description: String,
    amount: Money,
    payer: String,
    participants: String,
    split: String,
    #[serde(default)]
    shares: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

fn parse_participants(raw: &str) -> BTreeSet<MemberId> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(MemberId::from)
        .collect()
}

fn parse_shares(raw: &str) -> Result<BTreeMap<MemberId, rust_decimal::Decimal>, Error> {
    let mut shares = BTreeMap::new();
    for pair in raw.split(LIST_SEPARATOR).map(str::trim).filter(|p| !p.is_empty()) {
        let (member, amount) = pair.split_once(SHARE_SEPARATOR).ok_or_else(|| {
            Error::Ingestion(format!("Invalid share entry (expected member:amount): {}", pair))
        })?;
        let amount = Money::from_decimal_str(amount)
            .ok_or_else(|| Error::Ingestion(format!("Invalid share amount: {}", pair)))?;
        if shares
            .insert(MemberId::from(member.trim()), amount.as_decimal())
            .is_some()
        {
            return Err(Error::Ingestion(format!(
                "Share listed twice for member {}",
                member.trim()
            )));
        }
    }
    Ok(shares)
}

fn parse_created_at(raw: Option<&str>) -> Result<DateTime<Utc>, Error> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Ingestion(format!("Invalid created_at {}: {}", ts, e))),
        None => Ok(Utc::now()),
    }
}

impl TryFrom<CsvRow> for Expense {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let shares = row.shares.as_deref().map(str::trim).unwrap_or_default();
        let split = match (row.split.trim().to_ascii_lowercase().as_str(), shares) {
            ("equal", "") => Split::Equal,
            ("equal", _) => {
                return Err(Error::Ingestion(format!(
                    "Expense {} has an equal split but lists custom shares",
                    row.id
                )));
            }
            ("custom", "") => {
                return Err(Error::Ingestion(format!(
                    "Expense {} has a custom split but no shares",
                    row.id
                )));
            }
            ("custom", raw) => Split::Custom {
                shares: parse_shares(raw)?,
            },
            (other, _) => {
                return Err(Error::Ingestion(format!("Invalid split type: {}", other)));
            }
        };

        Ok(Expense {
            created_at: parse_created_at(row.created_at.as_deref())?,
            id: row.id,
            description: row.description,
            amount: row.amount.as_decimal(),
            payer: MemberId::from(row.payer.trim()),
            participants: parse_participants(&row.participants),
            split,
        })
    }
}

impl<R: Read + Send + 'static> ExpenseStream for CsvReader<R> {
    type ExpStream = Pin<Box<dyn Stream<Item = Result<Expense, Error>> + Send>>;

    fn stream(&mut self) -> Self::ExpStream {
        // Take ownership of the reader so the stream owns all of its data.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed.
                return Box::pin(stream::iter(Vec::<Result<Expense, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Expense::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "id, description, amount, payer, participants, split, shares, created_at\n";

    async fn read_all(body: &str) -> Vec<Result<Expense, Error>> {
        let input = format!("{HEADER}{body}");
        let mut reader = CsvReader::new(std::io::Cursor::new(input.into_bytes())).unwrap();
        reader.stream().collect().await
    }

    #[tokio::test]
    async fn parses_equal_split_row() {
        let rows = read_all("e1, Groceries, 90.00, A, A;B;C, equal, , 2026-01-02T10:00:00Z\n").await;
        let expense = rows.into_iter().next().unwrap().unwrap();

        assert_eq!(expense.id, "e1");
        assert_eq!(expense.description, "Groceries");
        assert_eq!(expense.amount, dec!(90));
        assert_eq!(expense.payer, MemberId::from("A"));
        assert_eq!(expense.participants.len(), 3);
        assert_eq!(expense.split, Split::Equal);
        assert_eq!(expense.created_at.to_rfc3339(), "2026-01-02T10:00:00+00:00");
    }

    #[tokio::test]
    async fn parses_custom_split_row() {
        let rows = read_all("e2, Rent, 100, B, A;B, CUSTOM, A:70;B:30,\n").await;
        let expense = rows.into_iter().next().unwrap().unwrap();

        let Split::Custom { shares } = &expense.split else {
            panic!("expected custom split, got {:?}", expense.split);
        };
        assert_eq!(shares.get(&MemberId::from("A")), Some(&dec!(70)));
        assert_eq!(shares.get(&MemberId::from("B")), Some(&dec!(30)));
    }

    #[tokio::test]
    async fn duplicate_participants_collapse() {
        let rows = read_all("e3, Snacks, 10, A, A;B;A; , equal\n").await;
        let expense = rows.into_iter().next().unwrap().unwrap();

        assert_eq!(expense.participants.len(), 2);
    }

    #[tokio::test]
    async fn malformed_rows_become_errors_without_stopping_the_stream() {
        let rows = read_all(
            "e1, Bad type, 10, A, A, weighted, ,\n\
             e2, Bad amount, ten, A, A, equal, ,\n\
             e3, No shares, 10, A, A, custom, ,\n\
             e4, Stray shares, 10, A, A, equal, A:10,\n\
             e5, Bad share, 10, A, A, custom, A=10,\n\
             e6, Bad time, 10, A, A, equal, , yesterday\n\
             e7, Fine, 10, A, A, equal, ,\n",
        )
        .await;

        assert_eq!(rows.len(), 7);
        assert!(rows[..6].iter().all(|r| matches!(r, Err(Error::Ingestion(_)))));
        assert!(rows[6].is_ok());
    }

    #[tokio::test]
    async fn stream_is_single_use() {
        let input = format!("{HEADER}e1, Tea, 3, A, A, equal\n");
        let mut reader = CsvReader::new(std::io::Cursor::new(input.into_bytes())).unwrap();

        assert_eq!(reader.stream().count().await, 1);
        assert_eq!(reader.stream().count().await, 0);
    }

    #[test]
    fn loads_household_json() {
        let json = r#"{
            "id": "h1",
            "name": "Flat 4B",
            "inviteCode": "JOIN-4B",
            "members": [
                { "id": "A", "name": "Ana", "email": "ana@example.com" },
                { "id": "B", "name": "Bo", "email": "bo@example.com" }
            ]
        }"#;
        let household = load_household(json.as_bytes()).unwrap();

        assert_eq!(household.invite_code, "JOIN-4B");
        assert_eq!(household.members.len(), 2);
        assert_eq!(household.members[1].name, "Bo");
    }

    #[test]
    fn rejects_broken_household_json() {
        assert!(matches!(
            load_household(r#"{ "id": "h1" }"#.as_bytes()),
            Err(Error::Ingestion(_))
        ));
    }
}
