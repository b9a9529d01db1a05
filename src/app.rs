use crate::gateway::{GatewayError, ObservationGateway};
use crate::notify::{
    CREATE_NOTICE_TTL, DELETE_NOTICE_TTL, LOAD_NOTICE_TTL, Notification, Notifier,
};
use crate::record::{Observation, ObservationId};
use crate::state::{ObservationForm, ObservationList};
use crate::table::{SortColumn, SortState, TableView};
use async_trait::async_trait;
use futures::future::join_all;
use log::{error, info, warn};
use std::collections::HashSet;

/// Yes/no prompt shown before a delete goes out.
#[async_trait]
pub trait Confirm: Send {
    async fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers yes without asking, for `--yes`.
pub struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Server confirmed the delete.
    Deleted,
    /// Server refused; the row was dropped locally anyway.
    AlreadyGone,
    Cancelled,
    /// No such id in the local list; nothing was sent.
    Unknown,
}

/// Owns every piece of client state and is the only place it changes.
pub struct App<G> {
    gateway: G,
    observations: ObservationList,
    form: ObservationForm,
    notifier: Notifier,
    sort: SortState,
}

impl<G: ObservationGateway> App<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            observations: ObservationList::new(),
            form: ObservationForm::default(),
            notifier: Notifier::new(),
            sort: SortState::default(),
        }
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    pub fn observations(&self) -> &ObservationList {
        &self.observations
    }

    #[cfg(test)]
    pub fn form(&self) -> &ObservationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ObservationForm {
        &mut self.form
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifier.current()
    }

    pub fn select_sort(&mut self, column: SortColumn) {
        self.sort.select(column);
    }

    pub fn view(&self) -> TableView<'_> {
        TableView::new(self.observations.records(), self.sort)
    }

    /// Replaces the list with the server's. On failure the previous list stays.
    pub async fn load(&mut self) -> bool {
        match self.gateway.list().await {
            Ok(records) => {
                self.observations.replace_all(records);
                info!("Loaded {} observations", self.observations.len());
                true
            }
            Err(e) => {
                error!("Failed to load observations: {}", e);
                self.notifier.show(
                    Notification::error(format!("Could not load observations: {}", e)),
                    LOAD_NOTICE_TTL,
                );
                false
            }
        }
    }

    /// Submits the form. The form is reset whatever the outcome.
    pub async fn add(&mut self) -> bool {
        let draft = self.form.draft();
        let result = self.gateway.create(&draft).await;
        self.form.reset();

        match result {
            Ok(created) => {
                info!("Added observation {} ({})", created.id, created.name);
                let text = format!("Added {}", created.name);
                if !self.observations.append(created) {
                    warn!("Server returned an id that is already listed");
                }
                self.notifier
                    .show(Notification::success(text), CREATE_NOTICE_TTL);
                true
            }
            Err(e) => {
                warn!("Create rejected for '{}': {}", draft.name, e);
                self.notifier
                    .show(Notification::error(e.to_string()), CREATE_NOTICE_TTL);
                false
            }
        }
    }

    pub async fn remove<C>(&mut self, id: &ObservationId, confirm: &mut C) -> RemoveOutcome
    where
        C: Confirm + ?Sized,
    {
        let Some(target) = self.confirm_removal(id, confirm).await else {
            return self.unconfirmed_outcome(id);
        };
        let result = self.gateway.delete_by_id(&target.id).await;
        self.reconcile_removal(&target, result)
    }

    /// Confirms each distinct id in turn, then sends the confirmed deletes
    /// together. Outcomes follow first-seen order of `ids`.
    pub async fn remove_many<C>(
        &mut self,
        ids: &[ObservationId],
        confirm: &mut C,
    ) -> Vec<(ObservationId, RemoveOutcome)>
    where
        C: Confirm + ?Sized,
    {
        let mut seen = HashSet::new();
        let unique: Vec<ObservationId> = ids
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();

        if let [id] = unique.as_slice() {
            let outcome = self.remove(id, confirm).await;
            return vec![(id.clone(), outcome)];
        }

        let mut outcomes = vec![RemoveOutcome::Cancelled; unique.len()];
        let mut targets = Vec::new();
        for (index, id) in unique.iter().enumerate() {
            match self.confirm_removal(id, confirm).await {
                Some(target) => targets.push((index, target)),
                None => outcomes[index] = self.unconfirmed_outcome(id),
            }
        }

        let gateway = &self.gateway;
        let results = join_all(
            targets
                .iter()
                .map(|(_, target)| gateway.delete_by_id(&target.id)),
        )
        .await;

        for ((index, target), result) in targets.iter().zip(results) {
            outcomes[*index] = self.reconcile_removal(target, result);
        }
        unique.into_iter().zip(outcomes).collect()
    }

    async fn confirm_removal<C>(&mut self, id: &ObservationId, confirm: &mut C) -> Option<Observation>
    where
        C: Confirm + ?Sized,
    {
        let target = self.observations.get(id)?.clone();
        if confirm.confirm(&format!("Delete {}?", target.name)).await {
            Some(target)
        } else {
            info!("Delete of {} cancelled", target.name);
            None
        }
    }

    fn unconfirmed_outcome(&mut self, id: &ObservationId) -> RemoveOutcome {
        if self.observations.contains(id) {
            return RemoveOutcome::Cancelled;
        }
        warn!("No observation with id {}", id);
        self.notifier.show(
            Notification::error(format!("No observation with id {}", id)),
            DELETE_NOTICE_TTL,
        );
        RemoveOutcome::Unknown
    }

    fn reconcile_removal(
        &mut self,
        target: &Observation,
        result: Result<(), GatewayError>,
    ) -> RemoveOutcome {
        // The row goes either way: the server no longer knows it
        self.observations.remove_by_id(&target.id);

        match result {
            Ok(()) => {
                info!("Deleted observation {} ({})", target.id, target.name);
                self.notifier.show(
                    Notification::success(format!("Deleted {}", target.name)),
                    DELETE_NOTICE_TTL,
                );
                RemoveOutcome::Deleted
            }
            Err(e) => {
                warn!(
                    "Delete of {} failed, dropping it locally: {}",
                    target.id, e
                );
                self.notifier.show(
                    Notification::error(format!(
                        "{} was already removed from the server",
                        target.name
                    )),
                    DELETE_NOTICE_TTL,
                );
                RemoveOutcome::AlreadyGone
            }
        }
    }
}
