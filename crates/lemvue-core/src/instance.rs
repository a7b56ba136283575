// ── Instance facade ──
//
// One connection to one instance: the typed client, the shared services,
// and session storage. Read methods return domain values for the fetch
// layer; `execute` turns every write into exactly one `Mutation`.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use lemvue_api::endpoints::{
    ApproveRegistrationApplication, AuthenticateWithOauth, BanFromCommunity, BanPerson,
    BlockPerson, CreateComment, CreateCommentLike, CreatePostLike, EditComment, EditPost,
    FollowCommunity, FollowMultiCommunity, GetComments, GetModlog, GetMyUser, GetPost, GetPosts,
    GetSite, GetUnreadCounts, ListCommunities, ListMultiCommunities, ListNotifications,
    ListRegistrationApplications, MarkAllNotificationsAsRead, MarkNotificationAsRead,
    MarkPostsAsRead, OAuthProvider,
};
use lemvue_api::types::{
    CommentView, CommunityView, ModlogActionType, ModlogEntry, MultiCommunityView,
    NotificationEntry, OAuthProviderId, PostId, PostView, RegistrationApplicationView,
};
use lemvue_api::{LemmyClient, TransportConfig};

use crate::command::Command;
use crate::config::{AuthCredentials, InstanceConfig};
use crate::error::CoreError;
use crate::mutation::Mutation;
use crate::oauth::{self, OAuthError, OAuthState};
use crate::pagination::Paged;
use crate::params::{
    CommunityListParams, InboxParams, ModlogParams, MultiCommunityListParams, PostListParams,
    PostParams, RegistrationParams, ViewDefaults,
};
use crate::services::Services;
use crate::storage::SessionStorage;

/// Deepest comment level requested with a thread.
const MAX_COMMENT_DEPTH: u32 = 8;

/// Path the OAuth provider sends the user back to.
const OAUTH_CALLBACK_PATH: &str = "oauth/callback";

// ── ConnectionState ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Instance ─────────────────────────────────────────────────────────

/// Cheaply cloneable handle to one instance.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

struct InstanceInner {
    config: InstanceConfig,
    client: LemmyClient,
    services: Services,
    storage: Arc<dyn SessionStorage>,
    oauth_providers: ArcSwap<Vec<OAuthProvider>>,
    connection_state: watch::Sender<ConnectionState>,
}

impl Instance {
    /// Build the HTTP client for `config`. Does not touch the network;
    /// call [`connect()`](Self::connect) next.
    pub fn new(
        config: InstanceConfig,
        services: Services,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
        };
        let client = LemmyClient::new(config.url.clone(), &transport)?;
        Ok(Self::with_client(config, client, services, storage))
    }

    /// Wrap an existing client (tests point one at a mock server).
    pub fn with_client(
        config: InstanceConfig,
        client: LemmyClient,
        services: Services,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(InstanceInner {
                config,
                client,
                services,
                storage,
                oauth_providers: ArcSwap::from_pointee(Vec::new()),
                connection_state,
            }),
        }
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.inner.config
    }

    pub fn services(&self) -> &Services {
        &self.inner.services
    }

    pub fn client(&self) -> &LemmyClient {
        &self.inner.client
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.inner.storage
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn oauth_providers(&self) -> Arc<Vec<OAuthProvider>> {
        self.inner.oauth_providers.load_full()
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Authenticate as configured, then load the site, the current user,
    /// and unread counts.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let result = self.connect_inner().await;
        let state = if result.is_ok() {
            info!(url = %self.inner.config.url, "connected to instance");
            ConnectionState::Connected
        } else {
            ConnectionState::Failed
        };
        self.inner.connection_state.send_replace(state);
        result
    }

    async fn connect_inner(&self) -> Result<(), CoreError> {
        let client = &self.inner.client;
        match &self.inner.config.auth {
            AuthCredentials::Anonymous => debug!("browsing anonymously"),
            AuthCredentials::Jwt(token) => client.set_jwt(token.clone()),
            AuthCredentials::Password {
                username,
                password,
                totp,
            } => {
                let resp = client.login(username, password, totp.as_deref()).await?;
                if resp.jwt.is_none() {
                    return Err(pending_login_error(
                        resp.registration_created,
                        resp.verify_email_sent,
                    ));
                }
            }
        }

        let site = client.call(&GetSite {}).await?;
        self.inner.services.session.set_site(site.site_view);
        self.inner
            .oauth_providers
            .store(Arc::new(site.oauth_providers));

        if client.is_authenticated() {
            self.refresh_user().await?;
        }
        Ok(())
    }

    /// Reload the signed-in user and unread counts.
    pub async fn refresh_user(&self) -> Result<(), CoreError> {
        let client = &self.inner.client;
        let (me, unread) = tokio::join!(client.call(&GetMyUser {}), client.call(&GetUnreadCounts {}));
        self.inner.services.session.set_user(me?);
        self.inner.services.unread.set(unread?.into());
        Ok(())
    }

    /// Reload only the badge counts.
    pub async fn refresh_unread(&self) -> Result<(), CoreError> {
        if !self.inner.client.is_authenticated() {
            return Ok(());
        }
        let counts = self.inner.client.call(&GetUnreadCounts {}).await?;
        self.inner.services.unread.set(counts.into());
        Ok(())
    }

    /// Password login after startup.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        totp: Option<&str>,
    ) -> Result<(), CoreError> {
        let resp = self.inner.client.login(username, password, totp).await?;
        if resp.jwt.is_none() {
            return Err(pending_login_error(
                resp.registration_created,
                resp.verify_email_sent,
            ));
        }
        self.refresh_user().await
    }

    pub fn logout(&self) {
        self.inner.client.clear_jwt();
        self.inner.services.session.clear();
        self.inner.services.unread.set(crate::services::Unread::default());
        debug!("logged out");
    }

    /// Site and user level defaults for parameter parsing.
    pub fn defaults(&self) -> ViewDefaults {
        let session = &self.inner.services.session;
        let page_size = self.inner.config.page_size;
        match session.site() {
            Some(site) => ViewDefaults::from_site(&site, session.user().as_deref(), page_size),
            None => ViewDefaults {
                page_size,
                ..ViewDefaults::default()
            },
        }
    }

    // ── OAuth ────────────────────────────────────────────────────────

    fn oauth_redirect_uri(&self) -> Result<Url, CoreError> {
        self.inner
            .config
            .url
            .join(OAUTH_CALLBACK_PATH)
            .map_err(|e| CoreError::Config {
                message: format!("Invalid URL: {e}"),
            })
    }

    /// Store a fresh handshake and return the provider URL to open.
    pub fn begin_oauth(
        &self,
        provider_id: OAuthProviderId,
        redirect: &str,
        now: DateTime<Utc>,
    ) -> Result<Url, CoreError> {
        let providers = self.inner.oauth_providers.load();
        let provider = providers
            .iter()
            .find(|p| p.id == provider_id)
            .ok_or(OAuthError::UnknownProvider(provider_id))?;
        let state = OAuthState::begin(self.inner.storage.as_ref(), provider_id, redirect, now);
        Ok(state.authorization_url(provider, &self.oauth_redirect_uri()?))
    }

    /// Finish an OAuth login from the callback's `code` and `state`.
    /// Returns the local route to continue at.
    pub async fn complete_oauth(
        &self,
        code: &str,
        callback_state: &str,
        now: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        let state = oauth::validate(self.inner.storage.as_ref(), callback_state, now)?;
        let req = AuthenticateWithOauth {
            code: code.to_owned(),
            oauth_provider_id: state.provider_id,
            redirect_uri: self.oauth_redirect_uri()?,
            username: None,
        };
        let resp = self.inner.client.call(&req).await?;
        let Some(jwt) = resp.jwt else {
            return Err(pending_login_error(
                resp.registration_created,
                resp.verify_email_sent,
            ));
        };
        self.inner.client.set_jwt(jwt.into());
        self.refresh_user().await?;
        Ok(state.redirect)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn list_posts(
        &self,
        community: Option<&str>,
        params: &PostListParams,
        limit: u32,
    ) -> Result<Paged<PostView>, CoreError> {
        let (page_cursor, page_back) = params.page.to_request();
        let req = GetPosts {
            listing_type: community.is_none().then_some(params.listing),
            sort: Some(params.sort),
            community_name: community.map(str::to_owned),
            page_cursor,
            page_back,
            limit: Some(limit),
            ..GetPosts::default()
        };
        Ok(self.inner.client.call(&req).await?.into())
    }

    pub async fn get_post(&self, id: PostId) -> Result<PostView, CoreError> {
        Ok(self.inner.client.call(&GetPost { id }).await?.post_view)
    }

    pub async fn list_comments(
        &self,
        post_id: PostId,
        params: &PostParams,
        limit: u32,
    ) -> Result<Vec<CommentView>, CoreError> {
        let req = GetComments {
            post_id: Some(post_id),
            parent_id: params.comment,
            sort: Some(params.sort),
            max_depth: Some(MAX_COMMENT_DEPTH),
            limit: Some(limit),
            ..GetComments::default()
        };
        Ok(self.inner.client.call(&req).await?.items)
    }

    pub async fn modlog(
        &self,
        params: &ModlogParams,
        limit: u32,
    ) -> Result<Paged<ModlogEntry>, CoreError> {
        let (page_cursor, page_back) = params.page.to_request();
        let req = GetModlog {
            action_type: (params.action != ModlogActionType::All).then_some(params.action),
            mod_person_id: params.moderator,
            other_person_id: params.user,
            community_id: params.community,
            page_cursor,
            page_back,
            limit: Some(limit),
        };
        Ok(self.inner.client.call(&req).await?.into())
    }

    pub async fn notifications(
        &self,
        params: &InboxParams,
        limit: u32,
    ) -> Result<Paged<NotificationEntry>, CoreError> {
        self.require_login()?;
        let (page_cursor, page_back) = params.page.to_request();
        let req = ListNotifications {
            kind: params.kind,
            unread_only: Some(params.unread_only),
            page_cursor,
            page_back,
            limit: Some(limit),
        };
        Ok(self.inner.client.call(&req).await?.into())
    }

    pub async fn communities(
        &self,
        params: &CommunityListParams,
    ) -> Result<Vec<CommunityView>, CoreError> {
        let req = ListCommunities {
            listing_type: Some(params.listing),
            sort: Some(params.sort),
            page: Some(params.page.page),
            limit: Some(params.page.limit),
        };
        Ok(self.inner.client.call(&req).await?.communities)
    }

    pub async fn multi_communities(
        &self,
        params: &MultiCommunityListParams,
        limit: u32,
    ) -> Result<Paged<MultiCommunityView>, CoreError> {
        let (page_cursor, page_back) = params.page.to_request();
        let req = ListMultiCommunities {
            followed_only: params.followed_only.then_some(true),
            page_cursor,
            page_back,
            limit: Some(limit),
        };
        Ok(self.inner.client.call(&req).await?.into())
    }

    pub async fn registration_applications(
        &self,
        params: &RegistrationParams,
        limit: u32,
    ) -> Result<Paged<RegistrationApplicationView>, CoreError> {
        self.require_login()?;
        let (page_cursor, page_back) = params.page.to_request();
        let req = ListRegistrationApplications {
            unread_only: Some(params.unread_only),
            page_cursor,
            page_back,
            limit: Some(limit),
        };
        Ok(self.inner.client.call(&req).await?.into())
    }

    // ── Command execution ────────────────────────────────────────────

    fn require_login(&self) -> Result<(), CoreError> {
        if self.inner.client.is_authenticated() {
            Ok(())
        } else {
            Err(CoreError::NotLoggedIn)
        }
    }

    /// Run one write and describe its effect as a [`Mutation`].
    #[allow(clippy::too_many_lines)]
    pub async fn execute(&self, cmd: Command) -> Result<Mutation, CoreError> {
        self.require_login()?;
        let client = &self.inner.client;
        let unread = &self.inner.services.unread;
        debug!(command = cmd.name(), "executing command");

        let mutation = match cmd {
            Command::VotePost { post_id, vote } => {
                let resp = client
                    .call(&CreatePostLike {
                        post_id,
                        score: vote.score(),
                    })
                    .await?;
                Mutation::PostUpdated(Arc::new(resp.post_view))
            }
            Command::EditPost {
                post_id,
                name,
                body,
            } => {
                let resp = client
                    .call(&EditPost {
                        post_id,
                        name,
                        body,
                        ..EditPost::default()
                    })
                    .await?;
                Mutation::PostUpdated(Arc::new(resp.post_view))
            }
            Command::MarkPostsRead { post_ids, read } => {
                client
                    .call(&MarkPostsAsRead {
                        post_ids: post_ids.clone(),
                        read,
                    })
                    .await?;
                Mutation::PostsRead { post_ids, read }
            }
            Command::VoteComment { comment_id, vote } => {
                let resp = client
                    .call(&CreateCommentLike {
                        comment_id,
                        score: vote.score(),
                    })
                    .await?;
                Mutation::CommentUpdated(Arc::new(resp.comment_view))
            }
            Command::EditComment {
                comment_id,
                content,
            } => {
                let resp = client
                    .call(&EditComment {
                        comment_id,
                        content,
                    })
                    .await?;
                Mutation::CommentUpdated(Arc::new(resp.comment_view))
            }
            Command::CreateComment {
                post_id,
                parent_id,
                content,
            } => {
                let resp = client
                    .call(&CreateComment {
                        post_id,
                        parent_id,
                        content,
                    })
                    .await?;
                Mutation::CommentCreated(Arc::new(resp.comment_view))
            }
            Command::BanPerson {
                person_id,
                ban,
                reason,
                remove_data,
                expires_at,
            } => {
                let resp = client
                    .call(&BanPerson {
                        person_id,
                        ban,
                        reason,
                        remove_or_restore_data: remove_data.then_some(true),
                        expires_at,
                    })
                    .await?;
                Mutation::CreatorBanned {
                    person: resp.person_view.person.id,
                    community: None,
                    banned: resp.banned,
                }
            }
            Command::BanFromCommunity {
                community_id,
                person_id,
                ban,
                reason,
                expires_at,
            } => {
                let resp = client
                    .call(&BanFromCommunity {
                        community_id,
                        person_id,
                        ban,
                        reason,
                        expires_at,
                    })
                    .await?;
                Mutation::CreatorBanned {
                    person: resp.person_view.person.id,
                    community: Some(community_id),
                    banned: resp.banned,
                }
            }
            Command::BlockPerson { person_id, block } => {
                let resp = client.call(&BlockPerson { person_id, block }).await?;
                Mutation::PersonBlocked {
                    person: resp.person_view.person.id,
                    blocked: resp.blocked,
                }
            }
            Command::FollowCommunity {
                community_id,
                follow,
            } => {
                let resp = client
                    .call(&FollowCommunity {
                        community_id,
                        follow,
                    })
                    .await?;
                Mutation::CommunityUpdated(Arc::new(resp.community_view))
            }
            Command::FollowMultiCommunity {
                multi_community_id,
                follow,
            } => {
                let resp = client
                    .call(&FollowMultiCommunity {
                        multi_community_id,
                        follow,
                    })
                    .await?;
                Mutation::MultiCommunityUpdated(Arc::new(resp.multi_community_view))
            }
            Command::ApproveRegistration { id } => {
                let resp = client
                    .call(&ApproveRegistrationApplication {
                        id,
                        approve: true,
                        deny_reason: None,
                    })
                    .await?;
                unread.decrement_applications();
                Mutation::RegistrationUpdated(Arc::new(resp.registration_application))
            }
            Command::DenyRegistration { id, reason } => {
                let resp = client
                    .call(&ApproveRegistrationApplication {
                        id,
                        approve: false,
                        deny_reason: reason,
                    })
                    .await?;
                unread.decrement_applications();
                Mutation::RegistrationUpdated(Arc::new(resp.registration_application))
            }
            Command::MarkNotificationRead { id, read } => {
                client
                    .call(&MarkNotificationAsRead {
                        notification_id: id,
                        read,
                    })
                    .await?;
                if read {
                    unread.decrement_notifications();
                } else {
                    unread.increment_notifications();
                }
                Mutation::NotificationRead { id, read }
            }
            Command::MarkAllNotificationsRead => {
                client.call(&MarkAllNotificationsAsRead {}).await?;
                unread.clear_notifications();
                Mutation::AllNotificationsRead
            }
        };
        Ok(mutation)
    }
}

fn pending_login_error(registration_created: bool, verify_email_sent: bool) -> CoreError {
    let message = if verify_email_sent {
        "check your email to verify the account"
    } else if registration_created {
        "registration is awaiting approval"
    } else {
        "no session token returned"
    };
    warn!(reason = message, "login did not produce a session");
    CoreError::AuthenticationFailed {
        message: message.into(),
    }
}
