use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget, TouchEvent};
use yew::prelude::*;

use crate::gesture::PageZoomGuard;
use crate::gesture::zoom_guard::{ALLOW_ZOOM_ATTR, opted_in};

fn target_opted_in(target: Option<EventTarget>) -> bool {
    let mut next = target.and_then(|t| t.dyn_into::<Element>().ok());
    opted_in(std::iter::from_fn(move || {
        let el = next.take()?;
        next = el.parent_element();
        Some(el.get_attribute(ALLOW_ZOOM_ATTR))
    }))
}

/// Blocks browser double-tap and pinch page zoom for the lifetime of the
/// calling component, except inside `data-allow-zoom="true"` subtrees.
#[hook]
pub fn use_prevent_page_zoom() {
    use_effect_with((), move |_| {
        let document = web_sys::window().and_then(|w| w.document());
        let guard = Rc::new(RefCell::new(PageZoomGuard::new()));

        let touch_end_cb = {
            let guard = guard.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                let allow = target_opted_in(e.target());
                if guard.borrow_mut().on_touch_end(js_sys::Date::now(), allow) {
                    e.prevent_default();
                }
            }) as Box<dyn FnMut(_)>)
        };
        let touch_move_cb = Closure::wrap(Box::new(move |e: TouchEvent| {
            let allow = target_opted_in(e.target());
            if PageZoomGuard::on_touch_move(e.touches().length(), allow) {
                e.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        let gesture_cb = Closure::wrap(Box::new(move |e: Event| {
            if PageZoomGuard::on_gesture_start(target_opted_in(e.target())) {
                e.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);

        // Document-level touch listeners are passive unless told otherwise.
        let opts = AddEventListenerOptions::new();
        opts.set_passive(false);
        if let Some(doc) = &document {
            let _ = doc.add_event_listener_with_callback_and_add_event_listener_options(
                "touchend",
                touch_end_cb.as_ref().unchecked_ref(),
                &opts,
            );
            let _ = doc.add_event_listener_with_callback_and_add_event_listener_options(
                "touchmove",
                touch_move_cb.as_ref().unchecked_ref(),
                &opts,
            );
            let _ = doc.add_event_listener_with_callback_and_add_event_listener_options(
                "gesturestart",
                gesture_cb.as_ref().unchecked_ref(),
                &opts,
            );
        }

        move || {
            if let Some(doc) = &document {
                let _ = doc.remove_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = doc.remove_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                );
                let _ = doc.remove_event_listener_with_callback(
                    "gesturestart",
                    gesture_cb.as_ref().unchecked_ref(),
                );
            }
        }
    });
}

/// Tracks the `(pointer: coarse)` media query, i.e. "primary input is touch".
#[hook]
pub fn use_is_coarse_pointer() -> bool {
    let coarse = use_state_eq(|| false);
    {
        let coarse = coarse.clone();
        use_effect_with((), move |_| {
            let listener = web_sys::window()
                .and_then(|w| w.match_media("(pointer: coarse)").ok().flatten())
                .map(|mql| {
                    coarse.set(mql.matches());
                    let cb = {
                        let mql = mql.clone();
                        Closure::wrap(Box::new(move |_e: Event| {
                            coarse.set(mql.matches());
                        }) as Box<dyn FnMut(_)>)
                    };
                    let _ = mql.add_event_listener_with_callback("change", cb.as_ref().unchecked_ref());
                    (mql, cb)
                });
            move || {
                if let Some((mql, cb)) = listener {
                    let _ = mql
                        .remove_event_listener_with_callback("change", cb.as_ref().unchecked_ref());
                }
            }
        });
    }
    *coarse
}
