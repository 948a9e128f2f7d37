//! Global Application State
//!
//! Session status, the signed-in user and toast notifications.

use leptos::*;

use fitlog_core::models::User;

/// Default toast lifetime
pub const TOAST_DURATION_MS: u32 = 3000;

/// Outcome of the session probe
#[derive(Clone, Debug, PartialEq)]
pub enum SessionStatus {
    Checking,
    SignedIn(User),
    SignedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
            ToastKind::Info => "ℹ",
            ToastKind::Warning => "⚠",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "bg-green-600",
            ToastKind::Error => "bg-red-600",
            ToastKind::Info => "bg-blue-600",
            ToastKind::Warning => "bg-yellow-600",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToastMessage {
    pub id: u64,
    pub kind: ToastKind,
    pub text: String,
}

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    pub session: RwSignal<SessionStatus>,
    pub toasts: RwSignal<Vec<ToastMessage>>,
    next_toast: StoredValue<u64>,
}

/// Provide global state to the component tree
pub fn provide_global_state() -> GlobalState {
    let state = GlobalState {
        session: create_rw_signal(SessionStatus::Checking),
        toasts: create_rw_signal(Vec::new()),
        next_toast: store_value(0),
    };
    provide_context(state);
    state
}

impl GlobalState {
    /// Signed-in user, if the probe succeeded
    pub fn user(&self) -> Option<User> {
        match self.session.get() {
            SessionStatus::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    /// Ask the server who we are. Any failure means signed out.
    pub fn probe_session(&self) {
        let session = self.session;
        spawn_local(async move {
            match crate::api::get_user().await {
                Ok(user) if user.id > 0 => session.set(SessionStatus::SignedIn(user)),
                _ => session.set(SessionStatus::SignedOut),
            }
        });
    }

    pub fn set_user(&self, user: User) {
        self.session.set(SessionStatus::SignedIn(user));
    }

    pub fn sign_out(&self) {
        self.session.set(SessionStatus::SignedOut);
    }

    /// Show a toast that clears itself after `duration_ms`
    pub fn show_toast(&self, kind: ToastKind, text: &str, duration_ms: u32) {
        let id = self.next_toast.get_value();
        self.next_toast.set_value(id + 1);
        self.toasts.update(|t| {
            t.push(ToastMessage {
                id,
                kind,
                text: text.to_string(),
            })
        });

        let toasts = self.toasts;
        gloo_timers::callback::Timeout::new(duration_ms, move || {
            toasts.update(|t| t.retain(|m| m.id != id));
        })
        .forget();
    }

    pub fn show_success(&self, message: &str) {
        self.show_toast(ToastKind::Success, message, TOAST_DURATION_MS);
    }

    pub fn show_error(&self, message: &str) {
        self.show_toast(ToastKind::Error, message, TOAST_DURATION_MS);
    }

    pub fn show_info(&self, message: &str) {
        self.show_toast(ToastKind::Info, message, TOAST_DURATION_MS);
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|t| t.retain(|m| m.id != id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_kinds_are_distinct() {
        let kinds = [
            ToastKind::Success,
            ToastKind::Error,
            ToastKind::Info,
            ToastKind::Warning,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.class(), b.class());
                assert_ne!(a.icon(), b.icon());
            }
        }
    }
}
