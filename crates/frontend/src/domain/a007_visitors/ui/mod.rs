use crate::layout::global_context::AppPage;
use crate::system::features::protector::FeatureLoading;
use crate::system::features::use_page_access;
use contracts::system::features::FeatureKey;
use leptos::prelude::*;
use thaw::*;

#[component]
pub fn VisitorsPage() -> impl IntoView {
    let access = use_page_access(FeatureKey::Visitors, AppPage::Dashboard);
    let guest = RwSignal::new(String::new());
    let registered = RwSignal::new(Vec::<String>::new());

    let register = move |_| {
        let name = guest.get_untracked().trim().to_string();
        if !name.is_empty() {
            registered.update(|list| list.push(name));
            guest.set(String::new());
        }
    };

    move || {
        if access.is_loading.get() {
            return view! { <FeatureLoading/> }.into_any();
        }
        if !access.can_access.get() {
            return access.render_disabled.run();
        }

        view! {
            <div class="feature-page" style="padding: 20px;">
                <h2>{format!("{} {}", FeatureKey::Visitors.icon(), FeatureKey::Visitors.label())}</h2>
                <Flex gap=FlexGap::Small>
                    <Input value=guest placeholder="Guest name" />
                    <Button appearance=ButtonAppearance::Primary on_click=register>
                        "Register"
                    </Button>
                </Flex>
                <ul>
                    {move || registered.get().into_iter().map(|name| view! { <li>{name}</li> }).collect_view()}
                </ul>
            </div>
        }
        .into_any()
    }
}
