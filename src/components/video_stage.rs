use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, Event, HtmlElement, HtmlVideoElement, TouchEvent};
use yew::platform::spawn_local;
use yew::prelude::*;

use super::app::Services;
use super::hooks::use_is_coarse_pointer;
use super::zoom_controls::ZoomControls;
use crate::backend::{OfflineBackend, ProgressBackend};
use crate::config::VideoSource;
use crate::gesture::{MeasureContainer, PinchPanConfig, PinchPanController, Point, Size};
use crate::playback::ProgressTracker;
use crate::playback::resume::{load_progress, save_progress};

const CONTROLS_VISIBLE_MS: i32 = 3_000;
const PROGRESS_POLL_MS: i32 = 500;
/// Used until the container can be measured.
const FALLBACK_CONTENT: Size = Size::new(1920.0, 1080.0);

type Controller = PinchPanController<NodeRef>;

impl MeasureContainer for NodeRef {
    fn container_size(&self) -> Option<Size> {
        let rect = self.cast::<Element>()?.get_bounding_client_rect();
        Some(Size::new(rect.width(), rect.height()))
    }
}

fn touch_points(e: &TouchEvent) -> Vec<Point> {
    let list = e.touches();
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64))
        .collect()
}

/// Wraps a controller mutation so the new transform is rendered and the zoom
/// controls flash up.
fn control<T: 'static>(
    controller: &Rc<RefCell<Controller>>,
    publish: &Callback<()>,
    show: &Callback<()>,
    apply: impl Fn(&mut Controller, T) + 'static,
) -> Callback<T> {
    let controller = controller.clone();
    let publish = publish.clone();
    let show = show.clone();
    Callback::from(move |arg: T| {
        apply(&mut controller.borrow_mut(), arg);
        publish.emit(());
        show.emit(());
    })
}

#[derive(Properties, PartialEq, Clone)]
pub struct VideoStageProps {
    pub video: VideoSource,
    pub zoom: PinchPanConfig,
    pub zoom_step: f64,
    pub aspect_ratio: f64,
    #[prop_or_default]
    pub principal: Option<AttrValue>,
}

#[function_component(VideoStage)]
pub fn video_stage(props: &VideoStageProps) -> Html {
    let container_ref = use_node_ref();
    let video_ref = use_node_ref();
    let controller = {
        let container_ref = container_ref.clone();
        let zoom = props.zoom;
        use_mut_ref(move || PinchPanController::new(zoom, container_ref, FALLBACK_CONTENT))
    };
    let transform = use_state_eq(|| controller.borrow().transform());
    let show_controls = use_state_eq(|| false);
    let hide_timeout = use_mut_ref(|| None::<i32>);
    let is_coarse = use_is_coarse_pointer();
    let progress_enabled = props.principal.is_some() && !props.video.blocked;
    let tracker = use_mut_ref(|| ProgressTracker::new(progress_enabled));
    let saved = use_state_eq(|| 0.0_f64);
    let progress_backend = match use_context::<Services>() {
        Some(services) => services.progress_backend,
        None => Rc::new(OfflineBackend) as Rc<dyn ProgressBackend>,
    };

    let publish = {
        let controller = controller.clone();
        let transform = transform.clone();
        Callback::from(move |_: ()| transform.set(controller.borrow().transform()))
    };
    let show_briefly = {
        let show_controls = show_controls.clone();
        let hide_timeout = hide_timeout.clone();
        Callback::from(move |_: ()| {
            show_controls.set(true);
            let Some(win) = web_sys::window() else {
                return;
            };
            if let Some(id) = hide_timeout.borrow_mut().take() {
                win.clear_timeout_with_handle(id);
            }
            let show_controls = show_controls.clone();
            let hide = Closure::once_into_js(move || show_controls.set(false));
            if let Ok(id) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                hide.unchecked_ref(),
                CONTROLS_VISIBLE_MS,
            ) {
                *hide_timeout.borrow_mut() = Some(id);
            }
        })
    };

    // The natural video size follows the container width.
    {
        let controller = controller.clone();
        let container_ref = container_ref.clone();
        let aspect = props.aspect_ratio;
        let publish = publish.clone();
        use_effect(move || {
            let content = container_ref
                .cast::<HtmlElement>()
                .map(|el| Size::from_width(el.client_width() as f64, aspect))
                .unwrap_or(FALLBACK_CONTENT);
            controller.borrow_mut().set_content_size(content);
            publish.emit(());
            || ()
        });
    }

    // Touch
    {
        let container_ref = container_ref.clone();
        let controller = controller.clone();
        let publish = publish.clone();
        let show_briefly = show_briefly.clone();
        use_effect_with((), move |_| {
            let start_cb = {
                let controller = controller.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let points = touch_points(&e);
                    controller.borrow_mut().touch_start(&points);
                    if points.len() == 1 {
                        show_briefly.emit(());
                    }
                }) as Box<dyn FnMut(_)>)
            };
            let move_cb = {
                let controller = controller.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let handled = controller.borrow_mut().touch_move(&touch_points(&e));
                    if handled {
                        e.prevent_default();
                        publish.emit(());
                    }
                }) as Box<dyn FnMut(_)>)
            };
            let end_cb = Closure::wrap(Box::new(move |_e: TouchEvent| {
                controller.borrow_mut().touch_end();
            }) as Box<dyn FnMut(_)>);

            let target = container_ref.cast::<HtmlElement>();
            if let Some(el) = &target {
                for (name, cb) in [
                    ("touchstart", &start_cb),
                    ("touchmove", &move_cb),
                    ("touchend", &end_cb),
                    ("touchcancel", &end_cb),
                ] {
                    let _ = el.add_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
                }
            }
            move || {
                if let Some(el) = &target {
                    for (name, cb) in [
                        ("touchstart", &start_cb),
                        ("touchmove", &move_cb),
                        ("touchend", &end_cb),
                        ("touchcancel", &end_cb),
                    ] {
                        let _ = el
                            .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
                    }
                }
            }
        });
    }

    let on_zoom_in = control(&controller, &publish, &show_briefly, |c, step: f64| c.zoom_in(step));
    let on_zoom_out = control(&controller, &publish, &show_briefly, |c, step: f64| c.zoom_out(step));
    let on_reset = control(&controller, &publish, &show_briefly, |c, ()| c.reset());
    let on_pan = control(&controller, &publish, &show_briefly, |c, (dx, dy): (f64, f64)| c.pan_by(dx, dy));
    let step = props.zoom_step;

    // Playback progress
    {
        let tracker = tracker.clone();
        use_effect_with(progress_enabled, move |enabled| {
            tracker.borrow_mut().set_enabled(*enabled);
            || ()
        });
    }
    {
        let saved = saved.clone();
        let backend = progress_backend.clone();
        let video_id = props.video.id.clone();
        use_effect_with((video_id, progress_enabled), move |(video_id, enabled)| {
            if *enabled {
                let video_id = video_id.clone();
                spawn_local(async move {
                    saved.set(load_progress(backend.as_ref(), &video_id).await);
                });
            }
            || ()
        });
    }
    let save = {
        let backend = progress_backend.clone();
        let video_id = props.video.id.clone();
        Callback::from(move |time: f64| {
            let backend = backend.clone();
            let video_id = video_id.clone();
            spawn_local(async move { save_progress(backend.as_ref(), &video_id, time).await });
        })
    };
    let try_resume = {
        let video_ref = video_ref.clone();
        let tracker = tracker.clone();
        let saved = *saved;
        Callback::from(move |_: ()| {
            let Some(video) = video_ref.cast::<HtmlVideoElement>() else {
                return;
            };
            // HAVE_METADATA
            if video.ready_state() < 1 {
                return;
            }
            let target = tracker.borrow_mut().resume_point(saved, video.duration());
            if let Some(time) = target {
                video.set_current_time(time);
            }
        })
    };
    {
        let try_resume = try_resume.clone();
        use_effect_with(*saved, move |_| {
            try_resume.emit(());
            || ()
        });
    }
    let on_loaded_metadata = {
        let try_resume = try_resume.clone();
        Callback::from(move |_: Event| try_resume.emit(()))
    };
    let on_time_update = {
        let video_ref = video_ref.clone();
        let tracker = tracker.clone();
        Callback::from(move |_: Event| {
            if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
                tracker.borrow_mut().on_time_update(
                    video.current_time(),
                    video.duration(),
                    js_sys::Date::now(),
                );
            }
        })
    };
    let on_pause = {
        let video_ref = video_ref.clone();
        let tracker = tracker.clone();
        let save = save.clone();
        Callback::from(move |_: Event| {
            let Some(video) = video_ref.cast::<HtmlVideoElement>() else {
                return;
            };
            let due = tracker.borrow_mut().on_pause(video.current_time());
            if let Some(time) = due {
                save.emit(time);
            }
        })
    };
    let on_ended = {
        let tracker = tracker.clone();
        let save = save.clone();
        Callback::from(move |_: Event| {
            let due = tracker.borrow_mut().on_ended();
            if let Some(time) = due {
                save.emit(time);
            }
        })
    };
    {
        let tracker = tracker.clone();
        let video_ref = video_ref.clone();
        let save = save.clone();
        use_effect_with(props.video.id.clone(), move |_| {
            let window = web_sys::window();
            let document = window.as_ref().and_then(|w| w.document());
            let leave: Rc<dyn Fn()> = {
                let tracker = tracker.clone();
                let save = save.clone();
                Rc::new(move || {
                    let Some(video) = video_ref.cast::<HtmlVideoElement>() else {
                        return;
                    };
                    let due = tracker
                        .borrow_mut()
                        .on_leave(video.current_time(), video.duration());
                    if let Some(time) = due {
                        save.emit(time);
                    }
                })
            };
            let poll_cb = Closure::wrap(Box::new(move || {
                let due = tracker.borrow_mut().poll(js_sys::Date::now());
                if let Some(time) = due {
                    save.emit(time);
                }
            }) as Box<dyn FnMut()>);
            let visibility_cb = {
                let leave = leave.clone();
                let document = document.clone();
                Closure::wrap(Box::new(move |_e: Event| {
                    if document.as_ref().is_some_and(|d| d.hidden()) {
                        leave();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            let unload_cb = {
                let leave = leave.clone();
                Closure::wrap(Box::new(move |_e: Event| leave()) as Box<dyn FnMut(_)>)
            };

            let interval = window.as_ref().and_then(|w| {
                w.set_interval_with_callback_and_timeout_and_arguments_0(
                    poll_cb.as_ref().unchecked_ref(),
                    PROGRESS_POLL_MS,
                )
                .ok()
            });
            if let Some(doc) = &document {
                let _ = doc.add_event_listener_with_callback(
                    "visibilitychange",
                    visibility_cb.as_ref().unchecked_ref(),
                );
            }
            if let Some(win) = &window {
                let _ = win
                    .add_event_listener_with_callback("beforeunload", unload_cb.as_ref().unchecked_ref());
            }

            move || {
                leave();
                if let Some(doc) = &document {
                    let _ = doc.remove_event_listener_with_callback(
                        "visibilitychange",
                        visibility_cb.as_ref().unchecked_ref(),
                    );
                }
                if let Some(win) = &window {
                    let _ = win.remove_event_listener_with_callback(
                        "beforeunload",
                        unload_cb.as_ref().unchecked_ref(),
                    );
                    if let Some(id) = interval {
                        win.clear_interval_with_handle(id);
                    }
                }
                let _keep_alive = &poll_cb;
            }
        });
    }

    if props.video.blocked {
        return html! {<div style="padding:24px; background:#161b22; border:1px solid #30363d; border-radius:8px;">
            {"This video is unavailable."}
        </div>};
    }

    let t = *transform;
    let (can_zoom_in, can_zoom_out, min_scale) = {
        let c = controller.borrow();
        (c.can_zoom_in(), c.can_zoom_out(), c.config().min_scale)
    };
    let surface_style = format!(
        "width:100%; height:100%; transform:{}; transform-origin:center center; will-change:transform;",
        t.to_css()
    );
    let container_style = format!(
        "position:relative; overflow:hidden; width:100%; aspect-ratio:{}; background:#000; touch-action:none;",
        props.aspect_ratio
    );

    html! {<div ref={container_ref} data-allow-zoom="true" style={container_style}>
        <div style={surface_style}>
            <video
                ref={video_ref}
                src={props.video.url.clone()}
                controls={true}
                playsinline={true}
                style="width:100%; height:100%; object-fit:contain;"
                onloadedmetadata={on_loaded_metadata}
                ontimeupdate={on_time_update}
                onpause={on_pause}
                onended={on_ended}
            />
        </div>
        { if is_coarse && t.scale > min_scale {
            html! {<div style="position:absolute; left:12px; top:12px; font-size:11px; background:rgba(0,0,0,0.6); padding:4px 8px; border-radius:6px;">{"Pinch to zoom, drag to pan"}</div>}
        } else { html! {} } }
        <ZoomControls
            visible={*show_controls}
            can_zoom_in={can_zoom_in}
            can_zoom_out={can_zoom_out}
            scale={t.scale}
            on_zoom_in={on_zoom_in.reform(move |_| step)}
            on_zoom_out={on_zoom_out.reform(move |_| step)}
            on_reset={on_reset}
            on_pan={on_pan}
        />
    </div>}
}
