use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] missing #{}", element_id);
    }
}

pub fn set_text(document: &web::Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_class(document: &web::Document, id: &str, class: &str, on: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let cl = el.class_list();
        _ = if on { cl.add_1(class) } else { cl.remove_1(class) };
    }
}

#[inline]
pub fn show(document: &web::Document, id: &str, visible: bool) {
    set_class(document, id, crate::constants::HIDDEN_CLASS, !visible);
}

pub fn set_style(document: &web::Document, id: &str, property: &str, value: &str) {
    let Some(el) = document.get_element_by_id(id) else {
        return;
    };
    if let Some(html) = el.dyn_ref::<web::HtmlElement>() {
        _ = html.style().set_property(property, value);
    }
}

pub fn set_attr(document: &web::Document, id: &str, name: &str, value: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        _ = el.set_attribute(name, value);
    }
}

/// Append a child element with the given class and text.
pub fn append_line(document: &web::Document, parent_id: &str, class: &str, text: &str) {
    let Some(parent) = document.get_element_by_id(parent_id) else {
        return;
    };
    if let Ok(el) = document.create_element("div") {
        el.set_class_name(class);
        el.set_text_content(Some(text));
        _ = parent.append_child(&el);
    }
}

/// CSS viewport size in pixels.
pub fn viewport() -> glam::Vec2 {
    let Some(w) = web::window() else {
        return glam::Vec2::ZERO;
    };
    let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    glam::Vec2::new(width as f32, height as f32)
}
