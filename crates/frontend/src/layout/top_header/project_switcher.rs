use contracts::domain::a001_project::Project;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::system::auth::api;
use crate::system::auth::context::{set_active_project, use_auth, use_current_project_id};

/// Lets a super-admin choose which project's features the session uses
#[component]
pub fn ProjectSwitcher() -> impl IntoView {
    let (_, set_auth_state) = use_auth();
    let current = use_current_project_id();
    let (projects, set_projects) = signal(Vec::<Project>::new());
    let (error, set_error) = signal::<Option<String>>(None);

    Effect::new(move |_| {
        spawn_local(async move {
            match api::fetch_projects().await {
                Ok(list) => {
                    // Pick the first project when nothing is selected yet
                    if current.get_untracked().is_none() {
                        if let Some(first) = list.first() {
                            set_active_project(set_auth_state, first.id.clone());
                        }
                    }
                    set_projects.set(list);
                }
                Err(e) => {
                    log::warn!("Failed to fetch projects: {}", e);
                    set_error.set(Some(e));
                }
            }
        });
    });

    let on_change = move |ev| {
        let id = event_target_value(&ev);
        if !id.is_empty() {
            set_active_project(set_auth_state, id);
        }
    };

    view! {
        <div class="project-switcher">
            <select
                on:change=on_change
                prop:value=move || current.get().unwrap_or_default()
                title=move || error.get().unwrap_or_else(|| "Active project".to_string())
            >
                <option value="" disabled=true>"Select project"</option>
                <For
                    each=move || projects.get()
                    key=|p| p.id.clone()
                    children=move |p: Project| {
                        view! { <option value=p.id.clone()>{format!("{} · {}", p.code, p.name)}</option> }
                    }
                />
            </select>
        </div>
    }
}
