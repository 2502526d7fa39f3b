//! Composite snapshots backing the home and group pages

use serde::Serialize;

use crate::interest::Interest;
use crate::member::Member;
use crate::reference::{self, Group};
use crate::repository::Repository;
use crate::Result;

/// One "in a glimpse" figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistic {
    pub label: &'static str,
    pub value: u64,
}

/// Dean of the complex plus headline statistics
#[derive(Debug, Clone, Serialize)]
pub struct HomeOverview {
    pub dean_of_complex: Option<Member>,
    pub statistics: Vec<Statistic>,
}

impl HomeOverview {
    pub async fn load(repo: &Repository) -> Result<Self> {
        let dean_of_complex = repo.dean_of_complex().first().await?;
        let academics = repo.academics_number().first().await?;
        let authorities = repo.authorities_number().first().await?;
        let interests = repo.interests_number().first().await?;

        let statistics = vec![
            Statistic { label: "Academics", value: academics },
            Statistic { label: "Students", value: reference::STUDENTS },
            Statistic { label: "Employees", value: authorities },
            Statistic { label: "Educational groups", value: interests },
            Statistic { label: "Fields", value: reference::FIELDS },
        ];

        Ok(Self {
            dean_of_complex,
            statistics,
        })
    }
}

/// Everything shown for one department group
#[derive(Debug, Clone, Serialize)]
pub struct GroupOverview {
    pub group: Group,
    pub dean_of_faculty: Option<Member>,
    pub academics: Vec<Member>,
    pub authorities: Vec<Member>,
    pub interests: Vec<Interest>,
}

impl GroupOverview {
    pub async fn load(repo: &Repository, group: Group) -> Result<Self> {
        let (a, b) = group.fields();
        let (dean_of_faculty, academics, authorities, interests) = tokio::try_join!(
            repo.dean_of_faculty(a, b).first(),
            repo.academics(a, b).first(),
            repo.authorities(a, b).first(),
            repo.interests(a, b).first(),
        )?;

        Ok(Self {
            group,
            dean_of_faculty,
            academics,
            authorities,
            interests,
        })
    }

    /// Interests grouped by stage, stages in order of first appearance
    pub fn interests_by_stage(&self) -> Vec<(&str, Vec<&Interest>)> {
        let mut stages: Vec<(&str, Vec<&Interest>)> = Vec::new();
        for interest in &self.interests {
            match stages.iter_mut().find(|(stage, _)| *stage == interest.stage) {
                Some((_, list)) => list.push(interest),
                None => stages.push((interest.stage.as_str(), vec![interest])),
            }
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TecStore;

    #[tokio::test]
    async fn test_home_overview_without_dean() {
        let repo = Repository::new(TecStore::open_in_memory().unwrap());
        repo.add_member(Member::new("Reza", "Moradi", "1234")).await.unwrap();

        let home = HomeOverview::load(&repo).await.unwrap();
        assert!(home.dean_of_complex.is_none());

        let values: Vec<u64> = home.statistics.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0, 4006, 1, 0, 5]);
    }

    #[tokio::test]
    async fn test_group_overview_stage_grouping() {
        let repo = Repository::new(TecStore::open_in_memory().unwrap());
        let (field, _) = Group::Civil.fields();
        for (name, stage) in [("Structures", "کارشناسی"), ("Hydraulics", "ارشد"), ("Surveying", "کارشناسی")] {
            repo.add_interest(Interest::new(name, field, stage)).await.unwrap();
        }

        let overview = GroupOverview::load(&repo, Group::Civil).await.unwrap();
        assert!(overview.dean_of_faculty.is_none());
        assert_eq!(overview.interests.len(), 3);

        let grouped = overview.interests_by_stage();
        assert_eq!(grouped.len(), 2);
        let total: usize = grouped.iter().map(|(_, list)| list.len()).sum();
        assert_eq!(total, 3);
        let bachelor = grouped.iter().find(|(stage, _)| *stage == "کارشناسی").unwrap();
        assert_eq!(bachelor.1.len(), 2);
    }
}
