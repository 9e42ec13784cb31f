use std::rc::Rc;

use yew::prelude::*;

use super::admin_banner::AdminBanner;
use super::hooks::use_prevent_page_zoom;
use super::video_stage::VideoStage;
use crate::backend::{AdminBackend, OfflineBackend, ProgressBackend};
use crate::config::AppConfig;
use crate::session::{AdminAccess, AdminSessionCache, BrowserStorage, QueryCache};

/// Client-side services shared through context so components can reach the
/// backend and the admin session without prop drilling.
#[derive(Clone)]
pub struct Services {
    pub access: AdminAccess<BrowserStorage>,
    pub admin_backend: Rc<dyn AdminBackend>,
    pub progress_backend: Rc<dyn ProgressBackend>,
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.admin_backend, &other.admin_backend)
            && Rc::ptr_eq(&self.progress_backend, &other.progress_backend)
    }
}

impl Services {
    fn offline() -> Self {
        let backend = Rc::new(OfflineBackend);
        Self {
            access: AdminAccess::new(AdminSessionCache::new(BrowserStorage), QueryCache::new()),
            admin_backend: backend.clone(),
            progress_backend: backend,
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    pub config: AppConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    use_prevent_page_zoom();
    let services = use_memo((), |_| Services::offline());
    let principal = use_state(|| props.config.principal.clone().map(AttrValue::from));

    let sign_out = {
        let services = services.clone();
        let principal = principal.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(p) = &*principal {
                services.access.logout(p);
            }
            principal.set(None);
        })
    };

    let cfg = &props.config;
    let content = match &cfg.video {
        Some(video) => html! { <VideoStage
            video={video.clone()}
            zoom={cfg.zoom}
            zoom_step={cfg.zoom_step}
            aspect_ratio={cfg.aspect_ratio}
            principal={(*principal).clone()}
        /> },
        None => html! {<div style="padding:24px; opacity:0.7;">{"No video selected."}</div>},
    };

    html! { <ContextProvider<Services> context={(*services).clone()}>
        <div id="top-bar" style="display:flex; justify-content:space-between; align-items:center; padding:8px 16px; border-bottom:1px solid #30363d;">
            <strong>{"Video"}</strong>
            { match &*principal {
                Some(p) => html! {<div style="display:flex; gap:8px; align-items:center; font-size:12px;">
                    <span style="opacity:0.7;">{ p.to_string() }</span>
                    <button onclick={sign_out}>{"Sign out"}</button>
                </div>},
                None => html! {<span style="font-size:12px; opacity:0.7;">{"Not signed in"}</span>},
            } }
        </div>
        <AdminBanner principal={(*principal).clone()} />
        <main style="max-width:1100px; margin:0 auto; padding:16px;">{ content }</main>
    </ContextProvider<Services>> }
}
