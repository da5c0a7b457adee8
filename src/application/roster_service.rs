// Roster service - Use case for the character dashboard
use crate::application::economy_repository::EconomyRepository;
use crate::domain::character::Roster;
use std::sync::Arc;

#[derive(Clone)]
pub struct RosterService {
    repository: Arc<dyn EconomyRepository>,
}

impl RosterService {
    pub fn new(repository: Arc<dyn EconomyRepository>) -> Self {
        Self { repository }
    }

    pub async fn roster(&self) -> anyhow::Result<Roster> {
        let characters = self.repository.list_characters().await?;
        Ok(Roster::new(characters))
    }
}
