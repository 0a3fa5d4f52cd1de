use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, MouseEvent, TouchEvent, Window};

/// Attribute that marks blanks and the option tray as drop targets.
pub const DROP_TARGET_ATTR: &str = "data-drop-target";

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

/// Client coordinates of a pointer or touch event. `touchend` carries no
/// active touches, so the changed touch is used instead.
pub fn event_client_point(e: &Event) -> Option<(f64, f64)> {
    if let Some(m) = e.dyn_ref::<MouseEvent>() {
        return Some((m.client_x() as f64, m.client_y() as f64));
    }
    let t = e.dyn_ref::<TouchEvent>()?;
    let touch = t.touches().get(0).or_else(|| t.changed_touches().get(0))?;
    Some((touch.client_x() as f64, touch.client_y() as f64))
}

/// Id of the drop target under a client point, if any.
pub fn drop_target_at(document: &Document, x: f64, y: f64) -> Option<String> {
    let hit = document.element_from_point(x as f32, y as f32)?;
    let target = hit.closest(&format!("[{DROP_TARGET_ATTR}]")).ok()??;
    target.get_attribute(DROP_TARGET_ATTR)
}

/// Resolve an asset path against the optional `window.__BASE_URL` set by the
/// host page.
pub fn asset_url(path: &str) -> String {
    let p = path.trim();
    if p.starts_with("http://") || p.starts_with("https://") || p.starts_with("data:") {
        return p.to_string();
    }
    let base = web_sys::window()
        .and_then(|w| {
            js_sys::Reflect::get(&w, &JsValue::from_str("__BASE_URL"))
                .ok()?
                .as_string()
        })
        .unwrap_or_else(|| "/".to_string());
    format!("{}/{}", base.trim_end_matches('/'), p.trim_start_matches('/'))
}

/// Candidate URLs for a named exercise file, most specific first.
pub fn exercise_urls(name: &str) -> Vec<String> {
    let rel = format!("exercise/{name}.json");
    vec![asset_url(&rel), format!("/{rel}"), rel]
}

/// Fetch a text resource, trying each URL in order.
pub async fn fetch_text_with_fallbacks(window: &Window, urls: &[String]) -> Option<String> {
    for url in urls {
        let Ok(resp_value) =
            wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(url)).await
        else {
            continue;
        };
        let Ok(resp) = resp_value.dyn_into::<web_sys::Response>() else {
            continue;
        };
        if !resp.ok() {
            log(&format!("fetch {url}: HTTP {}", resp.status()));
            continue;
        }
        if let Ok(text_promise) = resp.text()
            && let Ok(text_js) = wasm_bindgen_futures::JsFuture::from(text_promise).await
            && let Some(s) = text_js.as_string()
        {
            return Some(s);
        }
    }
    None
}

/// Value of `key` in a `?a=b&c=d` query string, percent-decoded.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k == key).then(|| url_decode(v))
        })
        .next()
}

fn url_decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    let decoded = percent_encoding::percent_decode_str(&spaced)
        .decode_utf8()
        .map(|c| c.into_owned());
    decoded.unwrap_or(spaced)
}
