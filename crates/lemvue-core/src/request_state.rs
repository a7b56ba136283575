// ── Request lifecycle state ──
//
// One value per data slot in a view. Data is only reachable through
// `success()` / `Success(..)`, so a view cannot render stale or missing
// data by accident.

use crate::error::RequestError;

/// Lifecycle of one asynchronous request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    /// No request has been made yet.
    Empty,
    /// A request is in flight.
    Loading,
    Failed(RequestError),
    Success(T),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> RequestState<T> {
    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// `Success` or `Failed`: the slot has settled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestState<U> {
        match self {
            Self::Empty => RequestState::Empty,
            Self::Loading => RequestState::Loading,
            Self::Failed(err) => RequestState::Failed(err),
            Self::Success(data) => RequestState::Success(f(data)),
        }
    }

    /// Replace the success payload through `f`, which returns `None` when
    /// nothing changed. Returns whether the slot was replaced.
    pub fn update(&mut self, f: impl FnOnce(&T) -> Option<T>) -> bool {
        let Self::Success(data) = self else {
            return false;
        };
        match f(data) {
            Some(next) => {
                *data = next;
                true
            }
            None => false,
        }
    }
}

impl<T, E> From<Result<T, E>> for RequestState<T>
where
    E: Into<RequestError>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Failed(err.into()),
        }
    }
}
