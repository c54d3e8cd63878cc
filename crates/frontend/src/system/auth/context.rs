use contracts::system::auth::UserInfo;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{api, storage};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub user_info: Option<UserInfo>,
    /// Project chosen in the switcher; only consulted for super-admins
    pub active_project_id: Option<String>,
}

impl AuthState {
    pub fn signed_in(access_token: String, user_info: UserInfo) -> Self {
        Self {
            access_token: Some(access_token),
            user_info: Some(user_info),
            active_project_id: storage::get_active_project(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user_info.as_ref().is_some_and(UserInfo::is_admin)
    }

    /// Project whose features apply to the current session.
    ///
    /// Regular users are bound to their own project. A super-admin has none
    /// until one is picked in the switcher.
    pub fn current_project_id(&self) -> Option<String> {
        let user = self.user_info.as_ref()?;
        let project_id = if user.role.is_super_admin() {
            self.active_project_id.clone()
        } else {
            user.project_id.clone()
        };
        project_id.filter(|id| !id.is_empty())
    }
}

async fn restore_session() -> Option<AuthState> {
    let access_token = storage::get_access_token()?;

    if let Ok(user_info) = api::get_current_user(&access_token).await {
        return Some(AuthState::signed_in(access_token, user_info));
    }

    let Some(refresh_token) = storage::get_refresh_token() else {
        storage::clear_tokens();
        return None;
    };

    match api::refresh_token(refresh_token).await {
        Ok(response) => {
            storage::save_access_token(&response.access_token);
            let user_info = api::get_current_user(&response.access_token).await.ok()?;
            Some(AuthState::signed_in(response.access_token, user_info))
        }
        Err(e) => {
            log::warn!("Session refresh failed: {}", e);
            storage::clear_tokens();
            None
        }
    }
}

#[component]
pub fn AuthProvider(children: ChildrenFn) -> impl IntoView {
    let (auth_state, set_auth_state) = signal(AuthState::default());

    // Restore the session from localStorage on mount
    Effect::new(move |_| {
        spawn_local(async move {
            if let Some(state) = restore_session().await {
                set_auth_state.set(state);
            }
        });
    });

    provide_context(auth_state);
    provide_context(set_auth_state);

    children()
}

pub fn use_auth() -> (ReadSignal<AuthState>, WriteSignal<AuthState>) {
    let auth_state =
        use_context::<ReadSignal<AuthState>>().expect("AuthProvider not found in component tree");
    let set_auth_state =
        use_context::<WriteSignal<AuthState>>().expect("AuthProvider not found in component tree");

    (auth_state, set_auth_state)
}

/// Reactive id of the project the session is scoped to
pub fn use_current_project_id() -> Signal<Option<String>> {
    let (auth_state, _) = use_auth();
    Signal::derive(move || auth_state.with(AuthState::current_project_id))
}

/// Switch the active project (super-admins only)
pub fn set_active_project(set_auth_state: WriteSignal<AuthState>, project_id: String) {
    storage::save_active_project(&project_id);
    set_auth_state.update(|state| state.active_project_id = Some(project_id));
}

pub async fn do_login(
    set_auth_state: WriteSignal<AuthState>,
    username: String,
    password: String,
) -> Result<(), String> {
    let response = api::login(username, password).await?;

    storage::save_access_token(&response.access_token);
    storage::save_refresh_token(&response.refresh_token);

    set_auth_state.set(AuthState::signed_in(response.access_token, response.user));

    Ok(())
}

pub async fn do_logout(set_auth_state: WriteSignal<AuthState>) {
    if let Some(refresh_token) = storage::get_refresh_token() {
        if let Err(e) = api::logout(refresh_token).await {
            log::warn!("Logout request failed: {}", e);
        }
    }

    storage::clear_tokens();
    set_auth_state.set(AuthState::default());
}
