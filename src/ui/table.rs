use tabled::{settings::Style, Table, Tabled};

use crate::interest::Interest;
use crate::member::Member;

#[derive(Tabled)]
pub struct MemberRow {
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Contact")]
    pub contact: String,
}

impl From<&Member> for MemberRow {
    fn from(member: &Member) -> Self {
        Self {
            title: member.title.clone().unwrap_or_default(),
            name: member.full_name(),
            contact: member.contact_info.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct InterestRow {
    #[tabled(rename = "Stage")]
    pub stage: String,
    #[tabled(rename = "Interest")]
    pub name: String,
}

impl From<&Interest> for InterestRow {
    fn from(interest: &Interest) -> Self {
        Self {
            stage: interest.stage.clone(),
            name: interest.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn member_table(members: &[Member]) -> String {
    let rows: Vec<MemberRow> = members.iter().map(MemberRow::from).collect();
    render(&rows)
}

pub fn interest_table<'a>(interests: impl IntoIterator<Item = &'a Interest>) -> String {
    let rows: Vec<InterestRow> = interests.into_iter().map(InterestRow::from).collect();
    render(&rows)
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let rows: Vec<StatRow> = stats
        .iter()
        .map(|(label, value)| StatRow {
            metric: label.to_string(),
            value: value.clone(),
        })
        .collect();
    render(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(member_table(&[]).is_empty());
        assert!(stats_table(&[]).is_empty());
    }

    #[test]
    fn test_member_table_contains_names() {
        let members = vec![
            Member::new("Ali", "Rezaei", "ali@tec.ac.ir").with_title("Professor"),
            Member::new("Reza", "Moradi", "1234"),
        ];
        let table = member_table(&members);
        assert!(table.contains("Ali Rezaei"));
        assert!(table.contains("Professor"));
        assert!(table.contains("1234"));
    }

    #[test]
    fn test_interest_table() {
        let interests = vec![Interest::new("Networks", "کامپیوتر", "1")];
        let table = interest_table(&interests);
        assert!(table.contains("Networks"));
        assert!(table.contains("Stage"));
    }
}
