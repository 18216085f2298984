//! Session context, provider and hooks for the component tree

use super::manager::{LoginError, login_with, logout_from, restore_from};
use super::session::User;
use super::state::{SessionAction, SessionState};
use crate::config::{AuthConfig, backend_url};
use crate::storage::{BrowserStorage, SharedStore};
use porpagar_http::{AuthenticatedClient, PublicClient};
use std::future::Future;
use std::rc::Rc;
use thiserror::Error;
use yew::prelude::*;

impl Reducible for SessionState {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/// Misuse of the session hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("session context not found. Make sure to wrap your component with SessionProvider")]
    OutsideProvider,
}

/// The session interface handed to components under [`SessionProvider`]
#[derive(Clone)]
pub struct SessionHandle {
    state: UseReducerHandle<SessionState>,
    store: SharedStore,
    client: PublicClient,
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        *self.state == *other.state
    }
}

impl SessionHandle {
    pub fn user(&self) -> Option<User> {
        self.state.user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.token().map(str::to_string)
    }

    pub fn loading(&self) -> bool {
        self.state.loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    pub fn is_read_only(&self) -> bool {
        self.state.is_read_only()
    }

    /// Log in; the returned future owns everything it needs, so it can be
    /// handed to `spawn_local`
    pub fn login(
        &self,
        username: String,
        password: String,
    ) -> impl Future<Output = Result<User, LoginError>> + use<> {
        let client = self.client.clone();
        let store = self.store.clone();
        let dispatcher = self.state.dispatcher();

        async move {
            let (user, action) = login_with(&client, store.as_ref(), &username, &password).await?;
            dispatcher.dispatch(action);
            Ok(user)
        }
    }

    pub fn logout(&self) {
        let action = logout_from(self.store.as_ref(), self.state.user());
        self.state.dispatch(action);
    }

    /// Build a request against the backend carrying the current credential
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.state.request(&self.client, method, path)
    }

    /// Typed client for authenticated endpoints, if logged in
    pub fn authenticated_client(&self) -> Option<AuthenticatedClient> {
        self.state
            .token()
            .map(|token| self.client.authenticate(token))
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    /// Backend base URL; resolved from the build environment or page origin when unset
    #[prop_or_default]
    pub base_url: Option<AttrValue>,
    pub children: Children,
}

/// Owns the session for everything rendered beneath it
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let state = use_reducer(SessionState::default);
    let store = use_memo((), |_| -> SharedStore { Rc::new(BrowserStorage) });
    let client = use_memo(props.base_url.clone(), |base_url| {
        let base_url = base_url
            .as_ref()
            .map_or_else(backend_url, ToString::to_string);
        PublicClient::new(base_url)
    });

    // Load the persisted session on mount
    {
        let state = state.clone();
        let store = (*store).clone();
        use_effect_with((), move |_| {
            state.dispatch(restore_from(store.as_ref()));
        });
    }

    let client = match client.as_ref() {
        Ok(client) => client.clone(),
        Err(error) => {
            tracing::error!(%error, "failed to build HTTP client");
            // Children are not rendered: every one of them needs the context
            return html! { <ClientUnavailable /> };
        }
    };

    let handle = SessionHandle {
        state,
        store: (*store).clone(),
        client,
    };

    html! {
        <ContextProvider<SessionHandle> context={handle}>
            {props.children.clone()}
        </ContextProvider<SessionHandle>>
    }
}

/// Shown by [`SessionProvider`] when the backend client cannot be built
#[function_component(ClientUnavailable)]
pub fn client_unavailable() -> Html {
    html! { <p class="text-red-600">{ AuthConfig::CLIENT_UNAVAILABLE_MESSAGE }</p> }
}

/// Session handle, or [`UsageError`] when no provider is in scope
#[hook]
pub fn try_use_session() -> Result<SessionHandle, UsageError> {
    use_context::<SessionHandle>().ok_or(UsageError::OutsideProvider)
}

/// Session handle; panics when used outside [`SessionProvider`]
#[hook]
pub fn use_session() -> SessionHandle {
    require_session(try_use_session())
}

fn require_session(found: Result<SessionHandle, UsageError>) -> SessionHandle {
    match found {
        Ok(handle) => handle,
        Err(error) => panic!("{error}"),
    }
}

/// Hook to get the current user
#[hook]
pub fn use_user() -> Option<User> {
    use_session().user()
}

/// Hook to check if authenticated
#[hook]
pub fn use_is_authenticated() -> bool {
    use_session().is_authenticated()
}
