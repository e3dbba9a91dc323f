//! DeviceOrientation subscription and the permission prompt some
//! platforms (iOS Safari) put in front of it.

use js_sys::{Function, Promise, Reflect};
use moonsearch_core::{Permission, RawOrientation};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Start the platform permission prompt, if there is one. Must run inside
/// the user-gesture handler; the returned promise may be awaited later.
pub fn request_permission() -> Option<Promise> {
    let ctor = Reflect::get(&js_sys::global(), &JsValue::from_str("DeviceOrientationEvent")).ok()?;
    if ctor.is_undefined() {
        return None;
    }
    let request = Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    match request.call0(&ctor) {
        Ok(value) => value.dyn_into::<Promise>().ok(),
        Err(e) => {
            log::warn!("[orientation] requestPermission threw: {:?}", e);
            Some(Promise::resolve(&JsValue::from_str("denied")))
        }
    }
}

pub async fn resolve_permission(prompt: Option<Promise>) -> Permission {
    let Some(prompt) = prompt else {
        return Permission::NotRequired;
    };
    match JsFuture::from(prompt).await {
        Ok(answer) if answer.as_string().as_deref() == Some("granted") => Permission::Granted,
        Ok(answer) => {
            log::warn!("[orientation] permission answer {:?}", answer);
            Permission::Denied
        }
        Err(e) => {
            log::warn!("[orientation] permission request failed: {:?}", e);
            Permission::Denied
        }
    }
}

/// Live `deviceorientation` listener; removed from the window on drop.
pub struct OrientationSubscription {
    window: web::Window,
    closure: Closure<dyn FnMut(web::DeviceOrientationEvent)>,
}

impl OrientationSubscription {
    pub fn subscribe(mut on_sample: impl FnMut(RawOrientation) + 'static) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let closure = Closure::wrap(Box::new(move |ev: web::DeviceOrientationEvent| {
            on_sample(RawOrientation {
                alpha: ev.alpha(),
                beta: ev.beta(),
                gamma: ev.gamma(),
            });
        }) as Box<dyn FnMut(web::DeviceOrientationEvent)>);
        window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("deviceorientation listener: {:?}", e))?;
        log::info!("[orientation] subscribed");
        Ok(Self { window, closure })
    }
}

impl Drop for OrientationSubscription {
    fn drop(&mut self) {
        _ = self.window.remove_event_listener_with_callback(
            "deviceorientation",
            self.closure.as_ref().unchecked_ref(),
        );
        log::info!("[orientation] unsubscribed");
    }
}
