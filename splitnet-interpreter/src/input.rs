use rust_decimal::Decimal;
use serde::Deserialize;
use splitnet_application::GroupSnapshot;
use splitnet_domain::{Expense, ExpenseId, Member, MemberId, Money, SplitRule};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupFile {
    pub members: Vec<MemberEntry>,
    #[serde(default)]
    pub expenses: Vec<ExpenseEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberEntry {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpenseEntry {
    pub id: u64,
    pub payer: u64,
    pub total: i64,
    pub participants: Vec<u64>,
    pub split: SplitEntry,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitEntry {
    Equal,
    Exact { shares: Vec<i64> },
    Percentage { percentages: Vec<Decimal> },
}

impl From<SplitEntry> for SplitRule {
    fn from(entry: SplitEntry) -> Self {
        match entry {
            SplitEntry::Equal => SplitRule::Equal,
            SplitEntry::Exact { shares } => {
                SplitRule::Exact(shares.into_iter().map(Money::from_i64).collect())
            }
            SplitEntry::Percentage { percentages } => SplitRule::Percentage(percentages),
        }
    }
}

impl From<GroupFile> for GroupSnapshot {
    fn from(file: GroupFile) -> Self {
        let members = file
            .members
            .into_iter()
            .map(|entry| Member::new(MemberId(entry.id), entry.name))
            .collect();
        let expenses = file
            .expenses
            .into_iter()
            .map(|entry| Expense {
                id: ExpenseId(entry.id),
                payer: MemberId(entry.payer),
                total: Money::from_i64(entry.total),
                participants: entry.participants.into_iter().map(MemberId).collect(),
                rule: entry.split.into(),
                description: entry.description,
            })
            .collect();
        GroupSnapshot::new(members, expenses)
    }
}

pub fn parse_group(source: &str) -> Result<GroupSnapshot, serde_json::Error> {
    let file: GroupFile = serde_json::from_str(source)?;
    Ok(file.into())
}
