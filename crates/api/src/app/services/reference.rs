use hackathon_core::DomainResult;
use hackathon_events::Region;
use hackathon_infra::Stores;
use hackathon_projects::{CreateCriterion, Criterion, Technology};

/// Read-only lookups plus the admin-managed assessment criteria.
pub struct ReferenceService {
    stores: Stores,
}

impl ReferenceService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn regions(&self) -> DomainResult<Vec<Region>> {
        self.stores.reference.list_regions().await
    }

    pub async fn technologies(&self) -> DomainResult<Vec<Technology>> {
        self.stores.reference.list_technologies().await
    }

    pub async fn criteria(&self) -> DomainResult<Vec<Criterion>> {
        self.stores.reference.list_criteria().await
    }

    pub async fn create_criterion(&self, request: CreateCriterion) -> DomainResult<Criterion> {
        let name = request.normalized_name()?;
        let criterion = self.stores.reference.create_criterion(&name).await?;
        tracing::info!(criterion_id = %criterion.id, "criterion created");
        Ok(criterion)
    }
}
