// ── Identifier newtypes ──
//
// Every server-side entity is addressed by a plain integer. Wrapping each
// in its own type keeps a `PostId` from ever being passed where a
// `CommentId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
                Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub i32);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<i32> for $name {
                fn from(raw: i32) -> Self {
                    Self(raw)
                }
            }
        )+
    };
}

id_type!(
    /// A user account, local or federated.
    PersonId,
    /// The local account record behind a [`PersonId`] on this instance.
    LocalUserId,
    CommunityId,
    MultiCommunityId,
    PostId,
    CommentId,
    PrivateMessageId,
    RegistrationApplicationId,
    NotificationId,
    ModlogId,
    InstanceId,
    OAuthProviderId,
);
