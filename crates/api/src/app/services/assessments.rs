use hackathon_auth::Identity;
use hackathon_core::{DomainResult, ProjectId};
use hackathon_events::StaffKind;
use hackathon_infra::Stores;
use hackathon_projects::{
    AssessmentInput, JudgeAssessments, Project, ProjectAssessment, decide_assessment,
    group_by_judge,
};

use super::found;

pub struct AssessmentService {
    stores: Stores,
}

impl AssessmentService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// All scores for a project, grouped per judge.
    pub async fn list(&self, project_id: ProjectId) -> DomainResult<Vec<JudgeAssessments>> {
        self.project(project_id).await?;
        let rows = self.stores.assessments.list_assessments(project_id).await?;
        Ok(group_by_judge(rows))
    }

    /// Score a submitted project. The batch and the move to `assessed` land together.
    pub async fn submit(
        &self,
        judge: &Identity,
        project_id: ProjectId,
        batch: Vec<AssessmentInput>,
    ) -> DomainResult<Vec<ProjectAssessment>> {
        let project = self.project(project_id).await?;
        let registered = self
            .stores
            .events
            .is_staff(project.event_id, judge.id, StaffKind::Judge)
            .await?;
        let criteria = self.stores.reference.criterion_ids().await?;

        let rows = decide_assessment(&project, judge.id, registered, &criteria, &batch)?;
        let saved = self.stores.assessments.submit_assessments(project_id, rows).await?;
        tracing::info!(project_id = %project_id, judge_id = %judge.id, count = saved.len(), "project assessed");
        Ok(saved)
    }

    async fn project(&self, id: ProjectId) -> DomainResult<Project> {
        found(self.stores.projects.find_project(id).await?, "project")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::fixtures::Fixture;
    use crate::app::services::{ProjectService, TeamService};
    use hackathon_auth::Role;
    use hackathon_core::{CriterionId, DomainError};
    use hackathon_events::{EventStatus, StaffAssignment};
    use hackathon_infra::{EventStore, ReferenceStore};
    use hackathon_projects::{CreateProject, ProjectStatus};
    use hackathon_teams::CreateTeam;

    struct Setup {
        fx: Fixture,
        service: AssessmentService,
        judge: Identity,
        project: Project,
        criteria: Vec<CriterionId>,
    }

    async fn setup(status: ProjectStatus) -> Setup {
        let fx = Fixture::new();
        let event = fx.event(EventStatus::Running).await;
        let owner = fx.participant("owner@example.com");
        let judge = fx.user("judge@example.com", Role::Judge);
        fx.store
            .add_staff(StaffAssignment { event_id: event.id, user_id: judge.id, kind: StaffKind::Judge })
            .await
            .unwrap();

        let team = TeamService::new(fx.stores.clone())
            .create(&owner, CreateTeam { event_id: event.id, name: "Lifetimes".to_string() })
            .await
            .unwrap();
        let project = ProjectService::new(fx.stores.clone())
            .create(
                &owner,
                CreateProject {
                    team_id: team.id,
                    event_id: event.id,
                    name: "Borrow checker bot".to_string(),
                    description: None,
                    repository_url: None,
                    status,
                    technology_ids: Vec::new(),
                },
            )
            .await
            .unwrap();

        let mut criteria = Vec::new();
        for name in ["Impact", "Execution"] {
            criteria.push(fx.store.create_criterion(name).await.unwrap().id);
        }
        let service = AssessmentService::new(fx.stores.clone());
        Setup { fx, service, judge, project, criteria }
    }

    fn batch(criteria: &[CriterionId], score: i32) -> Vec<AssessmentInput> {
        criteria
            .iter()
            .map(|&criterion_id| AssessmentInput { criterion_id, score })
            .collect()
    }

    #[tokio::test]
    async fn batch_lands_and_project_becomes_assessed() {
        let s = setup(ProjectStatus::Submitted).await;
        let saved = s
            .service
            .submit(&s.judge, s.project.id, batch(&s.criteria, 80))
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);

        let grouped = s.service.list(s.project.id).await.unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].judge_id, s.judge.id);
        assert_eq!(grouped[0].total_score, 160);

        let project = s.fx.stores.projects.find_project(s.project.id).await.unwrap().unwrap();
        assert_eq!(project.status, ProjectStatus::Assessed);

        let again = s
            .service
            .submit(&s.judge, s.project.id, batch(&s.criteria, 50))
            .await
            .unwrap_err();
        assert_eq!(again, DomainError::ProjectStatusShouldBeSubmitted);
    }

    #[tokio::test]
    async fn draft_projects_cannot_be_assessed() {
        let s = setup(ProjectStatus::Draft).await;
        let err = s
            .service
            .submit(&s.judge, s.project.id, batch(&s.criteria, 80))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::ProjectStatusShouldBeSubmitted);
    }

    #[tokio::test]
    async fn unregistered_judge_is_forbidden() {
        let s = setup(ProjectStatus::Submitted).await;
        let outsider = s.fx.user("other-judge@example.com", Role::Judge);
        let err = s
            .service
            .submit(&outsider, s.project.id, batch(&s.criteria, 80))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Forbidden);
    }

    #[tokio::test]
    async fn unknown_criterion_leaves_nothing_behind() {
        let s = setup(ProjectStatus::Submitted).await;
        let mut inputs = batch(&s.criteria, 70);
        inputs.push(AssessmentInput { criterion_id: CriterionId::new(999), score: 70 });

        let err = s.service.submit(&s.judge, s.project.id, inputs).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("criterion"));
        assert!(s.service.list(s.project.id).await.unwrap().is_empty());

        let project = s.fx.stores.projects.find_project(s.project.id).await.unwrap().unwrap();
        assert_eq!(project.status, ProjectStatus::Submitted);
    }
}
