//! Presentation-state projections
//!
//! Every sync-service operation owns one observable state slot. Read-style
//! operations use [`FetchState`] (`Initial -> Loading -> {Empty | Success |
//! Error}`); write-style operations use [`ActionState`] (`Initial ->
//! Loading -> {Success | Error}`). Fast-fail validation jumps straight to
//! `Error`; blank-input paths jump straight to `Initial`.
//!
//! The conversion from fallible results into states is centralized here so
//! every operation's default policy is an explicit, visible choice:
//! [`FetchState::from_result`] and [`FetchState::from_lookup`] surface
//! failures as `Error`, while [`or_default`] absorbs them into a safe
//! default with a warn log.

use std::fmt::Display;

use tracing::warn;

/// State of a read-style operation producing a payload
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Nothing requested yet (or reset by a blank input)
    Initial,
    /// Request in flight
    Loading,
    /// Completed with nothing to show
    Empty,
    /// Completed with a payload
    Success(T),
    /// Failed; the message is ready for display
    Error(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Initial
    }
}

impl<T> FetchState<T> {
    pub fn is_initial(&self) -> bool {
        matches!(self, FetchState::Initial)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FetchState::Empty)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Error(_))
    }

    /// The payload, if this is `Success`
    pub fn success(&self) -> Option<&T> {
        match self {
            FetchState::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// The message, if this is `Error`
    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Project a lookup result: absent → `Empty`, present → `Success`,
    /// failure → `Error`.
    pub fn from_lookup<E: Display>(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(payload)) => FetchState::Success(payload),
            Ok(None) => FetchState::Empty,
            Err(e) => FetchState::Error(e.to_string()),
        }
    }
}

impl<T> FetchState<Vec<T>> {
    /// Project a listing: no items → `Empty`, otherwise `Success`.
    pub fn from_list(items: Vec<T>) -> Self {
        if items.is_empty() {
            FetchState::Empty
        } else {
            FetchState::Success(items)
        }
    }

    /// Project a fallible listing: failure → `Error`, otherwise as
    /// [`FetchState::from_list`].
    pub fn from_result<E: Display>(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(items) => Self::from_list(items),
            Err(e) => FetchState::Error(e.to_string()),
        }
    }
}

/// State of a write-style operation with no payload
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActionState {
    /// Nothing attempted yet (or reset after the caller consumed a result)
    #[default]
    Initial,
    /// Write in flight
    Loading,
    /// Write confirmed
    Success,
    /// Failed; the message is ready for display
    Error(String),
}

impl ActionState {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionState::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ActionState::Error(_))
    }

    /// The message, if this is `Error`
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ActionState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Absorb a failure into the type's default value, logging it.
///
/// Used by the read paths whose contract is "failure yields the safe
/// default" (favorites cross-reference, notes, history, reading state).
pub fn or_default<T: Default, E: Display>(op: &str, result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{} failed, using default: {}", op, e);
            T::default()
        }
    }
}
