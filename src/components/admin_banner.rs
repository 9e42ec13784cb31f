use tracing::debug;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::app::Services;
use crate::session::AdminQuery;

#[derive(Properties, PartialEq, Clone)]
pub struct AdminBannerProps {
    #[prop_or_default]
    pub principal: Option<AttrValue>,
}

/// Shown to verified admins. Verification comes from the stored session
/// when it is still valid, from the backend otherwise.
#[function_component(AdminBanner)]
pub fn admin_banner(props: &AdminBannerProps) -> Html {
    let services = use_context::<Services>();
    let is_admin = use_state_eq(|| false);
    let dismissed = use_state_eq(|| false);
    let verify_round = use_state(|| 0_u32);

    {
        let is_admin = is_admin.clone();
        let dismissed = dismissed.clone();
        let services = services.clone();
        use_effect_with(
            (props.principal.clone(), *verify_round),
            move |(principal, _)| {
                is_admin.set(false);
                match (principal.clone(), services) {
                    (Some(principal), Some(services)) => {
                        let sync = services.access.sync_session(&principal);
                        debug!(?sync, "Admin session synced");
                        if let Some(cached) = services
                            .access
                            .cached(AdminQuery::VerifyAdminAccess, &principal)
                        {
                            is_admin.set(cached);
                        } else {
                            spawn_local(async move {
                                let ok = services
                                    .access
                                    .verify_admin_access(&principal, services.admin_backend.as_ref())
                                    .await;
                                is_admin.set(ok);
                            });
                        }
                    }
                    _ => dismissed.set(false),
                }
                || ()
            },
        );
    }

    let on_dismiss = {
        let dismissed = dismissed.clone();
        Callback::from(move |_: MouseEvent| dismissed.set(true))
    };
    let on_reverify = {
        let services = services.clone();
        let verify_round = verify_round.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(services) = &services {
                services.access.session().force_reactivation();
            }
            verify_round.set(*verify_round + 1);
        })
    };

    if props.principal.is_none() || !*is_admin || *dismissed {
        return html! {};
    }

    html! {<div style="width:100%; background:rgba(46,160,67,0.12); border-bottom:1px solid #2ea043; padding:8px 16px; display:flex; align-items:center; justify-content:space-between; gap:12px; font-size:13px;">
        <span>{"Admin access verified. The session persists until you sign out."}</span>
        <div style="display:flex; gap:6px;">
            <button onclick={on_reverify}>{"Re-verify"}</button>
            <button onclick={on_dismiss} title="Dismiss">{"✕"}</button>
        </div>
    </div>}
}

