use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ZoomControlsProps {
    pub visible: bool,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub scale: f64,
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_pan: Callback<(f64, f64)>,
}

const PAN_STEP_PX: f64 = 40.0;

#[function_component(ZoomControls)]
pub fn zoom_controls(props: &ZoomControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let rs = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    // Arrows move the view, so the content shifts the other way.
    let pan = |dx: f64, dy: f64| {
        let cb = props.on_pan.clone();
        Callback::from(move |_: MouseEvent| cb.emit((dx, dy)))
    };
    let zoomed = props.can_zoom_out;
    let opacity = if props.visible || zoomed { "1" } else { "0.35" };

    html! {<div style={format!("position:absolute; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:6px; align-items:center; opacity:{opacity}; transition:opacity 0.2s;")}>
        <button onclick={zo} disabled={!props.can_zoom_out}> {"-"} </button>
        <span style="min-width:40px; text-align:center; font-size:12px;">{ format!("{:.1}x", props.scale) }</span>
        <button onclick={zi} disabled={!props.can_zoom_in}> {"+"} </button>
        { if zoomed { html! {<>
            <span style="width:8px;"></span>
            <button onclick={pan(PAN_STEP_PX, 0.0)}> {"←"} </button>
            <button onclick={pan(0.0, PAN_STEP_PX)}> {"↑"} </button>
            <button onclick={pan(0.0, -PAN_STEP_PX)}> {"↓"} </button>
            <button onclick={pan(-PAN_STEP_PX, 0.0)}> {"→"} </button>
            <span style="width:8px;"></span>
            <button onclick={rs}> {"Reset"} </button>
        </>} } else { html! {} } }
    </div>}
}
