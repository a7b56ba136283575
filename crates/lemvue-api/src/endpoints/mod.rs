//! Request/response pairs grouped by API area.
//!
//! Each request type implements [`Endpoint`](crate::Endpoint); pass it to
//! [`LemmyClient::call`](crate::LemmyClient::call).

pub mod account;
pub mod comments;
pub mod communities;
pub mod moderation;
pub mod notifications;
pub mod posts;

pub use account::*;
pub use comments::*;
pub use communities::*;
pub use moderation::*;
pub use notifications::*;
pub use posts::*;
