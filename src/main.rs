use video_share_frontend::components::{App, AppProps};
use video_share_frontend::config::AppConfig;
use video_share_frontend::logging;

fn main() {
    logging::init();
    let config = AppConfig::load();
    tracing::info!(
        signed_in = config.principal.is_some(),
        has_video = config.video.is_some(),
        "Starting front-end"
    );
    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
