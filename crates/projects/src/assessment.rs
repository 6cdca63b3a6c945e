use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hackathon_core::{AssessmentId, CriterionId, DomainError, DomainResult, ProjectId, UserId};

use crate::{Project, ProjectStatus};

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// A judging criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCriterion {
    pub name: String,
}

impl CreateCriterion {
    pub fn normalized_name(&self) -> DomainResult<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("criterion name cannot be empty"));
        }
        Ok(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAssessment {
    pub id: AssessmentId,
    pub project_id: ProjectId,
    pub judge_id: UserId,
    pub criterion_id: CriterionId,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub criterion_id: CriterionId,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssessment {
    pub project_id: ProjectId,
    pub judge_id: UserId,
    pub criterion_id: CriterionId,
    pub score: i32,
}

/// One judge's scores for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeAssessments {
    pub judge_id: UserId,
    pub assessments: Vec<ProjectAssessment>,
    pub total_score: i64,
}

/// Decide a judge's assessment batch.
///
/// On success the caller inserts every row and moves the project to
/// `assessed` in one unit of work.
pub fn decide_assessment(
    project: &Project,
    judge_id: UserId,
    judge_registered: bool,
    known_criteria: &HashSet<CriterionId>,
    batch: &[AssessmentInput],
) -> DomainResult<Vec<NewAssessment>> {
    if project.status != ProjectStatus::Submitted {
        return Err(DomainError::ProjectStatusShouldBeSubmitted);
    }
    if !judge_registered {
        return Err(DomainError::Forbidden);
    }
    if batch.iter().any(|a| !known_criteria.contains(&a.criterion_id)) {
        return Err(DomainError::not_found("criterion"));
    }
    if batch.is_empty() {
        return Err(DomainError::validation("assessment batch cannot be empty"));
    }

    let mut seen = HashSet::with_capacity(batch.len());
    for input in batch {
        if !seen.insert(input.criterion_id) {
            return Err(DomainError::validation(format!(
                "criterion {} assessed twice",
                input.criterion_id
            )));
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&input.score) {
            return Err(DomainError::validation(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }
    }

    Ok(batch
        .iter()
        .map(|input| NewAssessment {
            project_id: project.id,
            judge_id,
            criterion_id: input.criterion_id,
            score: input.score,
        })
        .collect())
}

/// Group assessments by judge, ordered by judge id; rows within a group keep
/// their input order.
pub fn group_by_judge(assessments: Vec<ProjectAssessment>) -> Vec<JudgeAssessments> {
    let mut groups: BTreeMap<UserId, Vec<ProjectAssessment>> = BTreeMap::new();
    for a in assessments {
        groups.entry(a.judge_id).or_default().push(a);
    }
    groups
        .into_iter()
        .map(|(judge_id, assessments)| JudgeAssessments {
            judge_id,
            total_score: assessments.iter().map(|a| i64::from(a.score)).sum(),
            assessments,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::tests::{now, project};
    use proptest::prelude::*;

    fn criteria() -> HashSet<CriterionId> {
        [1, 2, 3].into_iter().map(CriterionId::new).collect()
    }

    fn input(criterion: i64, score: i32) -> AssessmentInput {
        AssessmentInput {
            criterion_id: CriterionId::new(criterion),
            score,
        }
    }

    fn row(id: i64, judge: i64, criterion: i64, score: i32) -> ProjectAssessment {
        ProjectAssessment {
            id: AssessmentId::new(id),
            project_id: ProjectId::new(5),
            judge_id: UserId::new(judge),
            criterion_id: CriterionId::new(criterion),
            score,
            created_at: now(),
        }
    }

    #[test]
    fn registered_judge_scores_submitted_project() {
        let rows = decide_assessment(
            &project(ProjectStatus::Submitted),
            UserId::new(20),
            true,
            &criteria(),
            &[input(1, 80), input(2, 65)],
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.judge_id == UserId::new(20)));
    }

    #[test]
    fn assessed_project_rejects_another_batch() {
        let err = decide_assessment(
            &project(ProjectStatus::Assessed),
            UserId::new(21),
            true,
            &criteria(),
            &[input(1, 50)],
        )
        .unwrap_err();
        assert_eq!(err, DomainError::ProjectStatusShouldBeSubmitted);
    }

    #[test]
    fn error_order_is_status_then_judge_then_criterion() {
        let draft = project(ProjectStatus::Draft);
        assert_eq!(
            decide_assessment(&draft, UserId::new(20), false, &criteria(), &[input(9, 50)]),
            Err(DomainError::ProjectStatusShouldBeSubmitted)
        );
        let submitted = project(ProjectStatus::Submitted);
        assert_eq!(
            decide_assessment(&submitted, UserId::new(20), false, &criteria(), &[input(9, 50)]),
            Err(DomainError::Forbidden)
        );
        assert_eq!(
            decide_assessment(&submitted, UserId::new(20), true, &criteria(), &[input(9, 50)]),
            Err(DomainError::DataNotFound("criterion"))
        );
    }

    #[test]
    fn batch_must_be_non_empty_unique_and_in_range() {
        let submitted = project(ProjectStatus::Submitted);
        for batch in [
            vec![],
            vec![input(1, 10), input(1, 20)],
            vec![input(1, 101)],
            vec![input(2, -1)],
        ] {
            assert!(matches!(
                decide_assessment(&submitted, UserId::new(20), true, &criteria(), &batch),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn grouping_sorts_by_judge_and_totals_scores() {
        let groups = group_by_judge(vec![
            row(1, 30, 1, 40),
            row(2, 20, 1, 70),
            row(3, 30, 2, 15),
            row(4, 20, 2, 5),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].judge_id, UserId::new(20));
        assert_eq!(groups[0].total_score, 75);
        assert_eq!(groups[1].judge_id, UserId::new(30));
        assert_eq!(groups[1].assessments.len(), 2);
        assert_eq!(groups[1].total_score, 55);
    }

    proptest! {
        #[test]
        fn grouping_does_not_depend_on_input_order(judges in proptest::collection::vec(1i64..6, 0..30)) {
            let rows: Vec<_> = judges
                .iter()
                .enumerate()
                .map(|(i, j)| row(i as i64 + 1, *j, 1, 10))
                .collect();
            let mut reversed = rows.clone();
            reversed.reverse();

            let forward = group_by_judge(rows);
            let backward = group_by_judge(reversed);
            let ids = |g: &[JudgeAssessments]| g.iter().map(|x| (x.judge_id, x.total_score)).collect::<Vec<_>>();
            prop_assert_eq!(ids(&forward), ids(&backward));
            prop_assert_eq!(forward.iter().map(|g| g.assessments.len()).sum::<usize>(), judges.len());
        }
    }
}
