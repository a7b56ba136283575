//! Request lifecycle and view models between `lemvue-api` and the terminal UI.
//!
//! This crate owns everything a routed view needs besides drawing:
//!
//! - **[`Instance`]**: Facade over one Lemmy instance: connects and signs
//!   in, serves typed queries to the fetch layer, and turns every write
//!   [`Command`] into exactly one [`Mutation`].
//!
//! - **Fetch lifecycle** ([`guard`], [`fetch`], [`request_state`]): Every
//!   fetch gets a token from a [`FetchGuard`]; only the most recently issued
//!   token may commit into its slot, whatever order responses arrive in.
//!   [`FetchController`] tracks each slot's parameters and only re-fetches
//!   when they change.
//!
//! - **Route parameters** ([`params`], [`route`]): Pure parse/serialize of
//!   query strings with defaults omitted, cursor paging in [`pagination`].
//!
//! - **Reconciliation** ([`mutation`], [`reconcile`], [`tree`]): Write
//!   results fold into list and tree snapshots by identity, sharing every
//!   untouched `Arc`.
//!
//! - **View models** ([`views`]): Feed, post detail, inbox, modlog,
//!   community directory, multi-communities, and the registration queue.
//!   Each returns [`Fetch`] descriptions for the front end to run.
//!
//! - **Session plumbing** ([`services`], [`storage`], [`scroll`], [`oauth`],
//!   [`prefetch`]): Current user, unread badges, first-load flag, scroll
//!   offsets per history entry, OAuth handshake state, and the start-route
//!   prefetch payload.

pub mod command;
pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod instance;
pub mod mutation;
pub mod oauth;
pub mod pagination;
pub mod params;
pub mod prefetch;
pub mod reconcile;
pub mod render;
pub mod request_state;
pub mod route;
pub mod scroll;
pub mod services;
pub mod storage;
pub mod tree;
pub mod views;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, Vote};
pub use config::{AuthCredentials, InstanceConfig};
pub use error::{CoreError, ErrorKind, RequestError};
pub use fetch::{FetchController, FetchRequest};
pub use guard::{FetchGuard, FetchToken, Slot};
pub use instance::{ConnectionState, Instance};
pub use mutation::{Mutation, Reconcile, Thread};
pub use pagination::{CursorPage, OffsetPage, PageCursor, PageDirection, Paged};
pub use params::{Query, RouteParams, ViewDefaults};
pub use prefetch::{InitialPayload, RequestContext, RouteData, prefetch};
pub use render::{Project, Projection, RenderBody};
pub use request_state::RequestState;
pub use route::{HistoryKey, Route, RouteKind};
pub use scroll::{ScrollPhase, ScrollRestorer, Viewport};
pub use services::{FirstLoad, Services, Session, Unread, UnreadCounts};
pub use storage::{MemoryStorage, ScrollStore, SessionStorage};
pub use tree::{CommentNode, CommentTree};
pub use views::{
    CommunityListView, FeedView, Fetch, Fetched, InboxView, ModlogView, MultiCommunityListView,
    PostDetailView, RegistrationApplicationsView, View,
};
