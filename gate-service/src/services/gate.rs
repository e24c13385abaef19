//! The authorization gate: privileged mutations are deferred behind a PIN
//! challenge, confirmed asynchronously, then replayed from the pending
//! slot.
//!
//! One gate exists per session. All transitions are driven by discrete
//! requests; while a validation or executor call is suspended the gate
//! stays in `Validating` and rejects re-entry instead of racing.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use uuid::Uuid;

use crate::models::{
    ActionKind, ChallengePrompt, Notification, NotificationType, PendingAction, Principal,
};
use crate::services::credentials::CredentialValidator;
use crate::services::members::ActionExecutor;
use crate::services::notify::NotificationSink;
use crate::services::policy::{PinPolicy, PolicyError};
use crate::services::ServiceError;

pub const INCORRECT_PIN_MESSAGE: &str = "Incorrect PIN. Please try again.";
pub const TIMED_OUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const UNAVAILABLE_MESSAGE: &str = "Unable to verify PIN. Please try again.";

/// Holds at most one deferred privileged action. A new request overwrites
/// any unconsumed entry - last request wins, since only one challenge can
/// be open at a time.
#[derive(Debug, Default)]
pub struct PendingSlot {
    slot: Mutex<Option<PendingAction>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingAction>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, action: PendingAction) {
        *self.lock() = Some(action);
    }

    /// Return the pending action and atomically clear it. The second of
    /// two back-to-back calls always sees `None`, which is what makes
    /// double execution impossible.
    pub fn take_and_clear(&self) -> Option<PendingAction> {
        self.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    pub fn peek_kind(&self) -> Option<ActionKind> {
        self.lock().as_ref().map(PendingAction::kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Idle,
    AwaitingInput { prompt: ChallengePrompt },
    Validating,
    /// PIN accepted for a bulk action; the drained payload is held here
    /// until the second, plain confirm step.
    Granted { held: PendingAction },
    /// Resting error state: the challenge stays open and another submit
    /// is allowed, so this behaves as AwaitingInput with an inline error.
    Denied { message: String },
}

/// What a resolved submit/confirm reports back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Executed { kind: ActionKind, message: String },
    SecurityAccessGranted,
    AwaitingConfirmation { kind: ActionKind, message: String },
    Denied { message: String },
    /// The slot was empty at grant time. Internal invariant violation,
    /// logged and treated as a no-op rather than surfaced as an error.
    NothingPending,
}

pub struct AuthorizationGate {
    principal: Principal,
    state: Mutex<GateState>,
    slot: PendingSlot,
    validator: Arc<dyn CredentialValidator>,
    executor: Arc<dyn ActionExecutor>,
    notifier: Arc<dyn NotificationSink>,
    policy: PinPolicy,
    call_timeout: Duration,
}

impl AuthorizationGate {
    pub fn new(
        principal: Principal,
        validator: Arc<dyn CredentialValidator>,
        executor: Arc<dyn ActionExecutor>,
        notifier: Arc<dyn NotificationSink>,
        policy: PinPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            principal,
            state: Mutex::new(GateState::Idle),
            slot: PendingSlot::new(),
            validator,
            executor,
            notifier,
            policy,
            call_timeout,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> GateState {
        self.lock_state().clone()
    }

    /// Kind of the action currently parked in the slot, if any.
    pub fn pending_kind(&self) -> Option<ActionKind> {
        self.slot.peek_kind()
    }

    /// A privileged action was requested: park it in the slot and surface
    /// the challenge. Overwrites any unconsumed pending action, including
    /// one already granted and awaiting its second confirm.
    pub fn request(
        &self,
        action: PendingAction,
        subject: Option<&str>,
    ) -> Result<ChallengePrompt, ServiceError> {
        let mut state = self.lock_state();
        if matches!(*state, GateState::Validating) {
            return Err(ServiceError::ValidationInProgress);
        }

        let prompt = action.challenge(subject);
        self.slot.set(action);
        *state = GateState::AwaitingInput {
            prompt: prompt.clone(),
        };
        Ok(prompt)
    }

    /// The user submitted a PIN. Format problems are reported inline with
    /// no state change; an actual mismatch moves through Denied and the
    /// challenge stays open for retry.
    pub async fn submit(&self, pin: &str) -> Result<SubmitOutcome, ServiceError> {
        if !self.policy.is_well_formed(pin) {
            return Err(ServiceError::PolicyViolation(PolicyError::MalformedPin {
                min: self.policy.min_len,
                max: self.policy.max_len,
            }));
        }

        {
            let mut state = self.lock_state();
            match *state {
                GateState::AwaitingInput { .. } | GateState::Denied { .. } => {
                    *state = GateState::Validating;
                }
                GateState::Validating => return Err(ServiceError::ValidationInProgress),
                GateState::Idle | GateState::Granted { .. } => {
                    return Err(ServiceError::NoChallenge)
                }
            }
        }

        let verdict = timeout(
            self.call_timeout,
            self.validator.validate(
                &self.principal.username,
                pin,
                self.principal.congregation_id,
            ),
        )
        .await;

        match verdict {
            Err(_) => Ok(self.deny(TIMED_OUT_MESSAGE)),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "PIN validation call failed");
                Ok(self.deny(UNAVAILABLE_MESSAGE))
            }
            Ok(Ok(false)) => Ok(self.deny(INCORRECT_PIN_MESSAGE)),
            Ok(Ok(true)) => self.grant().await,
        }
    }

    fn deny(&self, message: &str) -> SubmitOutcome {
        *self.lock_state() = GateState::Denied {
            message: message.to_string(),
        };
        SubmitOutcome::Denied {
            message: message.to_string(),
        }
    }

    /// Identity proven: drain the slot exactly once and dispatch. Bulk
    /// kinds stop at `Granted` for their second confirm; everything else
    /// executes while the gate is still marked in-flight.
    async fn grant(&self) -> Result<SubmitOutcome, ServiceError> {
        let Some(action) = self.slot.take_and_clear() else {
            tracing::warn!("Pending action slot empty at grant; treating as no-op");
            *self.lock_state() = GateState::Idle;
            return Ok(SubmitOutcome::NothingPending);
        };

        if let PendingAction::SecurityAccess = action {
            *self.lock_state() = GateState::Idle;
            return Ok(SubmitOutcome::SecurityAccessGranted);
        }

        if action.requires_confirmation() {
            let message = confirm_message(&action);
            let kind = action.kind();
            *self.lock_state() = GateState::Granted { held: action };
            return Ok(SubmitOutcome::AwaitingConfirmation { kind, message });
        }

        // state is still Validating here, blocking re-entry until the
        // executor settles
        let result = self.dispatch(action).await;
        *self.lock_state() = GateState::Idle;
        result
    }

    /// Second confirm step for bulk actions. The slot was already drained
    /// at grant, so a retry after cancel needs a fresh request.
    pub async fn confirm(&self) -> Result<SubmitOutcome, ServiceError> {
        let held = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, GateState::Validating) {
                GateState::Granted { held } => held,
                other => {
                    *state = other;
                    return Err(ServiceError::NothingToConfirm);
                }
            }
        };

        let result = self.dispatch(held).await;
        *self.lock_state() = GateState::Idle;
        result
    }

    /// Cancel the open challenge or the held bulk action. Discards without
    /// executing; idempotent, safe to call with nothing pending.
    pub fn cancel(&self) -> Result<(), ServiceError> {
        let mut state = self.lock_state();
        if matches!(*state, GateState::Validating) {
            return Err(ServiceError::ValidationInProgress);
        }
        self.slot.take_and_clear();
        *state = GateState::Idle;
        Ok(())
    }

    async fn dispatch(&self, action: PendingAction) -> Result<SubmitOutcome, ServiceError> {
        let kind = action.kind();
        let result = timeout(self.call_timeout, self.execute(action)).await;
        match result {
            Err(_) => Err(ServiceError::ExecutorFailed(TIMED_OUT_MESSAGE.to_string())),
            Ok(Err(e)) => Err(ServiceError::ExecutorFailed(e.to_string())),
            Ok(Ok(message)) => Ok(SubmitOutcome::Executed { kind, message }),
        }
    }

    async fn execute(&self, action: PendingAction) -> Result<String, ServiceError> {
        let actor = &self.principal.username;
        match action {
            PendingAction::Edit { member_id, fields } => {
                let member = self
                    .executor
                    .edit_member(member_id, &fields)
                    .await
                    .map_err(|e| ServiceError::ExecutorFailed(e.to_string()))?;
                self.notifier.notify(Notification::new(
                    NotificationType::Edit,
                    format!("Edit in {}", member.congregation_name),
                    format!("{} was edited by {}.", member.full_name(), actor),
                    member.congregation_id,
                ));
                Ok(format!("Member {} updated successfully!", member.full_name()))
            }
            PendingAction::Delete { member_id } => {
                let member = self
                    .executor
                    .delete_member(member_id)
                    .await
                    .map_err(|e| ServiceError::ExecutorFailed(e.to_string()))?;
                self.notifier.notify(Notification::new(
                    NotificationType::Delete,
                    format!("Delete in {}", member.congregation_name),
                    format!("{} was deleted by {}.", member.full_name(), actor),
                    member.congregation_id,
                ));
                Ok("Member deleted successfully!".to_string())
            }
            PendingAction::BulkEdit { member_ids, fields } => {
                let edited = self
                    .executor
                    .bulk_edit(&member_ids, &fields)
                    .await
                    .map_err(|e| ServiceError::ExecutorFailed(e.to_string()))?;
                self.notifier.notify(Notification::new(
                    NotificationType::BulkEdit,
                    format!("Bulk edit in {}", self.principal.congregation_name),
                    format!("{} member(s) were edited by {}.", edited, actor),
                    self.principal.congregation_id,
                ));
                Ok(format!("{} member(s) updated successfully!", edited))
            }
            PendingAction::BulkDelete { member_ids } => {
                let deleted = self
                    .executor
                    .bulk_delete(&member_ids)
                    .await
                    .map_err(|e| ServiceError::ExecutorFailed(e.to_string()))?;
                self.notifier.notify(Notification::new(
                    NotificationType::BulkDelete,
                    format!("Bulk delete in {}", self.principal.congregation_name),
                    format!("{} member(s) were deleted by {}.", deleted, actor),
                    self.principal.congregation_id,
                ));
                Ok(format!("{} member(s) deleted successfully!", deleted))
            }
            PendingAction::SecurityAccess => Err(ServiceError::Internal(anyhow::anyhow!(
                "security_access is not dispatched to an executor"
            ))),
        }
    }
}

fn confirm_message(action: &PendingAction) -> String {
    match action {
        PendingAction::BulkEdit { member_ids, .. } => format!(
            "You are about to edit {} member(s). Continue?",
            member_ids.len()
        ),
        PendingAction::BulkDelete { member_ids } => format!(
            "You are about to delete {} member(s). This cannot be undone. Continue?",
            member_ids.len()
        ),
        _ => "Continue?".to_string(),
    }
}

struct GateEntry {
    gate: Arc<AuthorizationGate>,
    expires_at: DateTime<Utc>,
}

/// One gate per active session, created on demand and dropped with the
/// session. Sessions expire lazily and may never be read again, so each
/// entry carries its session's deadline and stale entries are swept on
/// the next registry access.
pub struct GateRegistry {
    gates: dashmap::DashMap<String, GateEntry>,
    validator: Arc<dyn CredentialValidator>,
    executor: Arc<dyn ActionExecutor>,
    notifier: Arc<dyn NotificationSink>,
    policy: PinPolicy,
    call_timeout: Duration,
}

impl GateRegistry {
    pub fn new(
        validator: Arc<dyn CredentialValidator>,
        executor: Arc<dyn ActionExecutor>,
        notifier: Arc<dyn NotificationSink>,
        policy: PinPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            gates: dashmap::DashMap::new(),
            validator,
            executor,
            notifier,
            policy,
            call_timeout,
        }
    }

    /// Fetch the session's gate, creating it on first use.
    pub fn for_session(
        &self,
        token_hash: &str,
        principal: &Principal,
        expires_at: DateTime<Utc>,
    ) -> Arc<AuthorizationGate> {
        self.for_session_at(token_hash, principal, expires_at, Utc::now())
    }

    fn for_session_at(
        &self,
        token_hash: &str,
        principal: &Principal,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Arc<AuthorizationGate> {
        self.sweep_at(now);
        self.gates
            .entry(token_hash.to_string())
            .or_insert_with(|| GateEntry {
                gate: Arc::new(AuthorizationGate::new(
                    principal.clone(),
                    self.validator.clone(),
                    self.executor.clone(),
                    self.notifier.clone(),
                    self.policy,
                    self.call_timeout,
                )),
                expires_at,
            })
            .gate
            .clone()
    }

    /// Drop gates whose session window has closed.
    fn sweep_at(&self, now: DateTime<Utc>) {
        self.gates.retain(|_, entry| entry.expires_at > now);
    }

    pub fn remove(&self, token_hash: &str) {
        self.gates.remove(token_hash);
    }
}
