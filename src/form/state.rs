use serde::Serialize;

/// Save lifecycle of one form instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Idle,
    Submitting,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
    Succeeded,
    Failed,
    Reset,
}

impl FormState {
    /// Next state for `event`, or `None` when the event is not valid here
    pub fn on(self, event: FormEvent) -> Option<FormState> {
        use FormEvent as E;
        use FormState as S;

        match (self, event) {
            (S::Idle, E::Submit) => Some(S::Submitting),
            (S::Submitting, E::Succeeded) => Some(S::Success),
            (S::Submitting, E::Failed) => Some(S::Failed),
            (S::Failed, E::Reset) => Some(S::Idle),
            _ => None,
        }
    }
}

/// Confirmation-guarded delete lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteState {
    Idle,
    ConfirmPending,
    Deleting,
    Success,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteEvent {
    Request,
    Cancel,
    Confirm,
    Succeeded,
    Failed,
    Reset,
}

impl DeleteState {
    pub fn on(self, event: DeleteEvent) -> Option<DeleteState> {
        use DeleteEvent as E;
        use DeleteState as S;

        match (self, event) {
            (S::Idle | S::Cancelled, E::Request) => Some(S::ConfirmPending),
            (S::ConfirmPending, E::Cancel) => Some(S::Cancelled),
            (S::ConfirmPending, E::Confirm) => Some(S::Deleting),
            (S::Deleting, E::Succeeded) => Some(S::Success),
            (S::Deleting, E::Failed) => Some(S::Failed),
            (S::Failed | S::Cancelled, E::Reset) => Some(S::Idle),
            _ => None,
        }
    }
}
