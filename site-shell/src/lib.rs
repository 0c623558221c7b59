use site_core::{NewsItem, ResearchItem};

#[cfg(target_arch = "wasm32")]
use std::cell::{Cell, RefCell};
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use auth_client::{AuthConfig, Credentials};
#[cfg(target_arch = "wasm32")]
use gloo_net::http::Request;
#[cfg(target_arch = "wasm32")]
use site_core::{
    messages, news_items, passwords_match, research_items, AuthState, CsvTable, DropdownState,
    AUTH_STORAGE_KEY,
};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, MouseEvent, Node, Storage};

/// Paths the pages fetch relative to their own origin.
pub const NEWS_CSV_PATH: &str = "news_sample.csv";
pub const RESEARCH_CSV_PATH: &str = "research_sample.csv";
pub const LOGIN_FRAGMENT_PATH: &str = "login.html";

/// Window global consulted when no api base is passed to the constructor.
pub const API_BASE_GLOBAL: &str = "REPORTMOA_API_BASE";

/// Social sign-in targets; plain navigation, no parameters.
pub const NAVER_AUTH_PATH: &str = "/auth/naver";
pub const KAKAO_AUTH_PATH: &str = "/auth/kakao";

pub const COLOR_ERROR: &str = "#ef4444";
pub const COLOR_SUCCESS: &str = "#16a34a";

pub const LABEL_LOGIN: &str = "로그인";
pub const LABEL_LOGOUT: &str = "로그아웃";

// ---------- Card templates ----------------------------------------------------

/// Escape text dropped into the card templates. Cell values come from
/// fetched CSV, so they never reach the DOM unescaped.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One news card: title link opening in a new tab, then "press | date".
pub fn news_card_html(item: &NewsItem) -> String {
    format!(
        "<div class=\"card\">\
         <div class=\"card-title\"><a href=\"{}\" target=\"_blank\">{}</a></div>\
         <div class=\"card-meta\">{}</div>\
         </div>",
        escape_html(&item.url),
        escape_html(&item.title),
        escape_html(&item.meta_line()),
    )
}

/// One research card: stock line, title link, then "broker | date | rating".
pub fn research_card_html(item: &ResearchItem) -> String {
    format!(
        "<div class=\"card\">\
         <div class=\"card-stock\">{}</div>\
         <div class=\"card-title\"><a href=\"{}\" target=\"_blank\">{}</a></div>\
         <div class=\"card-meta\">{}</div>\
         </div>",
        escape_html(&item.stock),
        escape_html(&item.url),
        escape_html(&item.title),
        escape_html(&item.meta_line()),
    )
}

pub fn news_list_html(items: &[NewsItem]) -> String {
    items
        .iter()
        .map(news_card_html)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn research_list_html(items: &[ResearchItem]) -> String {
    items
        .iter()
        .map(research_card_html)
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------- DOM helpers -------------------------------------------------------

#[cfg(target_arch = "wasm32")]
fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<Storage, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let storage = window
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))?;
    Ok(storage)
}

#[cfg(target_arch = "wasm32")]
fn read_global(key: &str) -> Option<String> {
    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
}

#[cfg(target_arch = "wasm32")]
fn log_error(text: &str) {
    web_sys::console::error_1(&JsValue::from_str(text));
}

#[cfg(target_arch = "wasm32")]
fn log_warn(text: &str) {
    web_sys::console::warn_1(&JsValue::from_str(text));
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(path: &str) -> Result<String, gloo_net::Error> {
    // Status is deliberately not checked here; callers that care (the
    // fragment loader) check it themselves.
    let response = Request::get(path).send().await?;
    response.text().await
}

// ---------- Session -----------------------------------------------------------

/// Per-page session: the login flag plus the api endpoints. Built once at
/// startup and shared into every handler that needs it.
#[cfg(target_arch = "wasm32")]
pub struct Session {
    auth: AuthState,
    config: AuthConfig,
}

#[cfg(target_arch = "wasm32")]
impl Session {
    /// Read the persisted flag; any storage failure decodes as logged out.
    fn load(config: AuthConfig) -> Session {
        let stored = local_storage()
            .ok()
            .and_then(|storage| storage.get_item(AUTH_STORAGE_KEY).ok().flatten());
        Session {
            auth: AuthState::from_stored(stored.as_deref()),
            config,
        }
    }

    fn logged_in(&self) -> bool {
        self.auth.logged_in()
    }

    /// Flip the flag in memory and mirror it to storage. A failed write is
    /// logged and the in-memory flag keeps the new value.
    fn set_logged_in(&mut self, logged_in: bool) {
        self.auth.set(logged_in);
        match local_storage() {
            Ok(storage) => {
                if storage
                    .set_item(AUTH_STORAGE_KEY, self.auth.storage_value())
                    .is_err()
                {
                    log_warn("localStorage 사용 불가");
                }
            }
            Err(_) => log_warn("localStorage 사용 불가"),
        }
    }
}

// ---------- Search-category dropdown ------------------------------------------

#[cfg(target_arch = "wasm32")]
fn sync_dropdown_class(category: &Element, state: &DropdownState) {
    let classes = category.class_list();
    let result = if state.open {
        classes.add_1("open")
    } else {
        classes.remove_1("open")
    };
    if let Err(err) = result {
        web_sys::console::error_1(&err);
    }
}

#[cfg(target_arch = "wasm32")]
fn init_search_dropdown(doc: &Document) -> Result<(), JsValue> {
    // Pages without the widget skip the whole setup.
    let Some(category) = doc.query_selector(".search-category")? else {
        return Ok(());
    };
    let Some(toggle) = category.query_selector(".search-category-toggle")? else {
        return Ok(());
    };
    let Some(menu) = category.query_selector(".search-category-menu")? else {
        return Ok(());
    };

    let state = Rc::new(RefCell::new(DropdownState::new()));

    // Toggle button flips the menu. Propagation stops here so the
    // document-level outside-click handler does not immediately close it.
    {
        let state = state.clone();
        let category = category.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |event: MouseEvent| {
            event.stop_propagation();
            let mut state = state.borrow_mut();
            state.toggle();
            sync_dropdown_class(&category, &state);
        }));
        toggle.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Menu item click adopts the item's value as the button label.
    {
        let state = state.clone();
        let category = category.clone();
        let toggle = toggle.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |event: MouseEvent| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if target.tag_name().to_ascii_lowercase() != "li" {
                return;
            }
            if let Some(value) = target.get_attribute("data-value") {
                let mut state = state.borrow_mut();
                state.select(&value);
                toggle.set_text_content(Some(&value));
                sync_dropdown_class(&category, &state);
                web_sys::console::log_1(&JsValue::from_str(&format!(
                    "선택한 검색 카테고리: {}",
                    value
                )));
            }
        }));
        menu.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Any click outside the widget closes the menu.
    {
        let state = state.clone();
        let category = category.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |event: MouseEvent| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            if !category.contains(target.as_ref()) {
                let mut state = state.borrow_mut();
                state.close();
                sync_dropdown_class(&category, &state);
            }
        }));
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

// ---------- CSV-driven lists --------------------------------------------------

#[cfg(target_arch = "wasm32")]
fn init_csv_list(
    doc: &Document,
    container_id: &str,
    csv_path: &'static str,
    render: fn(&CsvTable) -> String,
) {
    // Absent container means this page does not carry the list.
    let Some(container) = doc.get_element_by_id(container_id) else {
        return;
    };
    spawn_local(async move {
        match fetch_text(csv_path).await {
            Ok(text) => {
                let table = CsvTable::parse(&text);
                container.set_inner_html(&render(&table));
            }
            Err(err) => log_error(&format!("CSV 로드 에러 ({}): {}", csv_path, err)),
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn init_news_list(doc: &Document) {
    init_csv_list(doc, "news-list", NEWS_CSV_PATH, |table| {
        news_list_html(&news_items(table))
    });
}

#[cfg(target_arch = "wasm32")]
fn init_research_list(doc: &Document) {
    init_csv_list(doc, "research-list", RESEARCH_CSV_PATH, |table| {
        research_list_html(&research_items(table))
    });
}

// ---------- Login modal -------------------------------------------------------

/// Fetch the modal fragment and append it to the body. A non-ok status is
/// logged and leaves the page without a modal; wiring still proceeds so the
/// header button keeps working.
#[cfg(target_arch = "wasm32")]
async fn load_login_fragment(doc: &Document) -> Result<(), JsValue> {
    let response = Request::get(LOGIN_FRAGMENT_PATH)
        .send()
        .await
        .map_err(|err| JsValue::from_str(&format!("login.html fetch 에러: {}", err)))?;
    if !response.ok() {
        log_error(&format!("login.html 로드 실패: {}", response.status()));
        return Ok(());
    }
    let html = response
        .text()
        .await
        .map_err(|err| JsValue::from_str(&format!("login.html fetch 에러: {}", err)))?;
    let body = doc
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?;
    body.insert_adjacent_html("beforeend", &html)?;
    Ok(())
}

/// Every element the modal controller touches, resolved in one pass after
/// the fragment lands in the DOM. A `None` (or empty list) disables the
/// handlers that depend on it and nothing else.
#[cfg(target_arch = "wasm32")]
struct ModalElements {
    open_button: Option<Element>,
    modal: Option<Element>,
    close_button: Option<Element>,
    tabs: Vec<Element>,
    panels: Vec<Element>,
    login_form: Option<Element>,
    signup_form: Option<Element>,
    message: Option<HtmlElement>,
    naver_button: Option<Element>,
    kakao_button: Option<Element>,
    go_signup_link: Option<Element>,
    back_to_login_link: Option<Element>,
    login_email: Option<HtmlInputElement>,
    login_password: Option<HtmlInputElement>,
    signup_email: Option<HtmlInputElement>,
    signup_password: Option<HtmlInputElement>,
    signup_password_confirm: Option<HtmlInputElement>,
}

#[cfg(target_arch = "wasm32")]
impl ModalElements {
    /// Resolve all fixed identifiers, collecting the names that did not
    /// match anything so the caller can report them once.
    fn bind(doc: &Document) -> (ModalElements, Vec<&'static str>) {
        let mut missing = Vec::new();

        fn by_id<T: JsCast>(
            doc: &Document,
            id: &'static str,
            missing: &mut Vec<&'static str>,
        ) -> Option<T> {
            let found = doc
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<T>().ok());
            if found.is_none() {
                missing.push(id);
            }
            found
        }

        fn query(
            doc: &Document,
            selector: &'static str,
            missing: &mut Vec<&'static str>,
        ) -> Option<Element> {
            let found = doc.query_selector(selector).ok().flatten();
            if found.is_none() {
                missing.push(selector);
            }
            found
        }

        fn query_all(
            doc: &Document,
            selector: &'static str,
            missing: &mut Vec<&'static str>,
        ) -> Vec<Element> {
            let mut out = Vec::new();
            if let Ok(list) = doc.query_selector_all(selector) {
                for idx in 0..list.length() {
                    if let Some(node) = list.item(idx) {
                        if let Ok(element) = node.dyn_into::<Element>() {
                            out.push(element);
                        }
                    }
                }
            }
            if out.is_empty() {
                missing.push(selector);
            }
            out
        }

        let elements = ModalElements {
            open_button: query(doc, ".login-open-btn", &mut missing),
            modal: by_id(doc, "login-modal", &mut missing),
            close_button: query(doc, ".modal-close", &mut missing),
            tabs: query_all(doc, ".modal-tab", &mut missing),
            panels: query_all(doc, ".modal-panel", &mut missing),
            login_form: by_id(doc, "login-form", &mut missing),
            signup_form: by_id(doc, "signup-form", &mut missing),
            message: by_id(doc, "auth-message", &mut missing),
            naver_button: by_id(doc, "naver-login-btn", &mut missing),
            kakao_button: by_id(doc, "kakao-login-btn", &mut missing),
            go_signup_link: by_id(doc, "go-signup-link", &mut missing),
            back_to_login_link: by_id(doc, "back-to-login-link", &mut missing),
            login_email: by_id(doc, "login-email", &mut missing),
            login_password: by_id(doc, "login-password", &mut missing),
            signup_email: by_id(doc, "signup-email", &mut missing),
            signup_password: by_id(doc, "signup-password", &mut missing),
            signup_password_confirm: by_id(doc, "signup-password-confirm", &mut missing),
        };

        (elements, missing)
    }
}

#[cfg(target_arch = "wasm32")]
fn show_message(elements: &ModalElements, text: &str, color: &str) {
    if let Some(message) = &elements.message {
        message.set_text_content(Some(text));
        if let Err(err) = message.style().set_property("color", color) {
            web_sys::console::error_1(&err);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn clear_message(elements: &ModalElements) {
    if let Some(message) = &elements.message {
        message.set_text_content(Some(""));
    }
}

/// Mirror the login flag onto the header button and, when logged in, make
/// sure the modal is hidden.
#[cfg(target_arch = "wasm32")]
fn apply_auth_to_ui(elements: &ModalElements, logged_in: bool) {
    let Some(button) = &elements.open_button else {
        return;
    };
    if logged_in {
        button.set_text_content(Some(LABEL_LOGOUT));
        let _ = button.class_list().add_1("logged-in");
        if let Some(modal) = &elements.modal {
            let _ = modal.class_list().add_1("hidden");
        }
    } else {
        button.set_text_content(Some(LABEL_LOGIN));
        let _ = button.class_list().remove_1("logged-in");
    }
}

#[cfg(target_arch = "wasm32")]
fn show_panel(elements: &ModalElements, panel_id: &str) {
    for panel in &elements.panels {
        let _ = panel.class_list().remove_1("active");
    }
    if let Some(panel) = elements.panels.iter().find(|p| p.id() == panel_id) {
        let _ = panel.class_list().add_1("active");
    }
}

#[cfg(target_arch = "wasm32")]
fn input_value(input: &Option<HtmlInputElement>) -> Option<String> {
    input.as_ref().map(|el| el.value())
}

#[cfg(target_arch = "wasm32")]
fn wire_panel_link(
    link: &Option<Element>,
    elements: &Rc<ModalElements>,
    panel_id: &'static str,
) -> Result<(), JsValue> {
    let Some(link) = link else {
        return Ok(());
    };
    let elements = elements.clone();
    let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_event: MouseEvent| {
        show_panel(&elements, panel_id);
        clear_message(&elements);
    }));
    link.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn wire_redirect(button: &Option<Element>, path: &'static str) -> Result<(), JsValue> {
    let Some(button) = button else {
        return Ok(());
    };
    let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_event: MouseEvent| {
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.location().set_href(path) {
                web_sys::console::error_1(&err);
            }
        }
    }));
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn wire_login_form(
    elements: &Rc<ModalElements>,
    session: &Rc<RefCell<Session>>,
) -> Result<(), JsValue> {
    let Some(form) = elements.login_form.clone() else {
        return Ok(());
    };
    let elements = elements.clone();
    let session = session.clone();
    // One request at a time per form; a submit while one is pending is
    // dropped instead of firing a duplicate.
    let in_flight = Rc::new(Cell::new(false));
    let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        if in_flight.get() {
            return;
        }
        show_message(&elements, "", COLOR_ERROR);

        let (Some(email), Some(password)) = (
            input_value(&elements.login_email),
            input_value(&elements.login_password),
        ) else {
            return;
        };
        let credentials = Credentials::new(email, password);

        in_flight.set(true);
        let elements = elements.clone();
        let session = session.clone();
        let in_flight = in_flight.clone();
        spawn_local(async move {
            let config = session.borrow().config.clone();
            match auth_client::login(&config, &credentials).await {
                Ok(outcome) => {
                    if outcome.ok {
                        show_message(
                            &elements,
                            outcome.reply.success_text(messages::LOGIN_OK),
                            COLOR_SUCCESS,
                        );
                        session.borrow_mut().set_logged_in(true);
                        apply_auth_to_ui(&elements, true);
                    } else {
                        show_message(
                            &elements,
                            outcome.reply.failure_text(messages::LOGIN_FAILED),
                            COLOR_ERROR,
                        );
                    }
                }
                Err(err) => {
                    log_error(&err.to_string());
                    show_message(&elements, messages::NETWORK_ERROR, COLOR_ERROR);
                }
            }
            in_flight.set(false);
        });
    }));
    form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn wire_signup_form(
    elements: &Rc<ModalElements>,
    session: &Rc<RefCell<Session>>,
) -> Result<(), JsValue> {
    let Some(form) = elements.signup_form.clone() else {
        return Ok(());
    };
    let elements = elements.clone();
    let session = session.clone();
    let in_flight = Rc::new(Cell::new(false));
    let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        if in_flight.get() {
            return;
        }
        show_message(&elements, "", COLOR_ERROR);

        let (Some(email), Some(password), Some(confirm)) = (
            input_value(&elements.signup_email),
            input_value(&elements.signup_password),
            input_value(&elements.signup_password_confirm),
        ) else {
            return;
        };
        // Checked before anything goes on the wire.
        if !passwords_match(&password, &confirm) {
            show_message(&elements, messages::PASSWORD_MISMATCH, COLOR_ERROR);
            return;
        }
        let credentials = Credentials::new(email, password);

        in_flight.set(true);
        let elements = elements.clone();
        let session = session.clone();
        let in_flight = in_flight.clone();
        spawn_local(async move {
            let config = session.borrow().config.clone();
            match auth_client::signup(&config, &credentials).await {
                Ok(outcome) => {
                    if outcome.ok {
                        show_message(
                            &elements,
                            outcome.reply.success_text(messages::SIGNUP_OK),
                            COLOR_SUCCESS,
                        );
                    } else {
                        show_message(
                            &elements,
                            outcome.reply.failure_text(messages::SIGNUP_FAILED),
                            COLOR_ERROR,
                        );
                    }
                }
                Err(err) => {
                    log_error(&err.to_string());
                    show_message(&elements, messages::NETWORK_ERROR, COLOR_ERROR);
                }
            }
            in_flight.set(false);
        });
    }));
    form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn init_login_ui(doc: &Document, session: Rc<RefCell<Session>>) -> Result<(), JsValue> {
    let (elements, missing) = ModalElements::bind(doc);
    if !missing.is_empty() {
        log_warn(&format!("로그인 UI 요소 없음: {}", missing.join(", ")));
    }
    let elements = Rc::new(elements);

    apply_auth_to_ui(&elements, session.borrow().logged_in());

    // Header button: sign out when logged in, otherwise open the modal.
    if let Some(button) = elements.open_button.clone() {
        let elements = elements.clone();
        let session = session.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_event: MouseEvent| {
            let logged_in = session.borrow().logged_in();
            if logged_in {
                session.borrow_mut().set_logged_in(false);
                apply_auth_to_ui(&elements, false);
                clear_message(&elements);
                return;
            }
            if let Some(modal) = &elements.modal {
                let _ = modal.class_list().remove_1("hidden");
                show_message(&elements, "", COLOR_ERROR);
            }
        }));
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Close button.
    if let (Some(close_button), Some(modal)) = (&elements.close_button, &elements.modal) {
        let modal = modal.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_event: MouseEvent| {
            let _ = modal.class_list().add_1("hidden");
        }));
        close_button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Backdrop click closes too, but only when the overlay itself is hit.
    if let Some(modal) = elements.modal.clone() {
        let overlay = modal.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |event: MouseEvent| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            if overlay.is_same_node(target.as_ref()) {
                let _ = overlay.class_list().add_1("hidden");
            }
        }));
        modal.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Tabs keep exactly one panel active.
    for tab in &elements.tabs {
        let tab_clone = tab.clone();
        let elements = elements.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_event: MouseEvent| {
            for other in &elements.tabs {
                let _ = other.class_list().remove_1("active");
            }
            for panel in &elements.panels {
                let _ = panel.class_list().remove_1("active");
            }
            let _ = tab_clone.class_list().add_1("active");
            if let Some(target) = tab_clone.get_attribute("data-target") {
                if let Some(panel) = elements.panels.iter().find(|p| p.id() == target) {
                    let _ = panel.class_list().add_1("active");
                }
            }
            clear_message(&elements);
        }));
        tab.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    wire_panel_link(&elements.go_signup_link, &elements, "signup-panel")?;
    wire_panel_link(&elements.back_to_login_link, &elements, "login-panel")?;

    wire_login_form(&elements, &session)?;
    wire_signup_form(&elements, &session)?;

    wire_redirect(&elements.naver_button, NAVER_AUTH_PATH)?;
    wire_redirect(&elements.kakao_button, KAKAO_AUTH_PATH)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
async fn setup_login_ui(session: Rc<RefCell<Session>>) -> Result<(), JsValue> {
    let doc = document()?;
    if let Err(err) = load_login_fragment(&doc).await {
        web_sys::console::error_1(&err);
    }
    // Wiring runs even when the fragment is missing so the header button
    // still reflects the stored flag.
    init_login_ui(&doc, session)
}

// ---------- Page shell (wasm entry) -------------------------------------------

/// Host-facing entry point. Pages construct one of these after module init;
/// every widget wires itself up and pages without a given widget skip it.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct PageShell {
    session: Rc<RefCell<Session>>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl PageShell {
    /// `api_base` falls back to the `REPORTMOA_API_BASE` window global,
    /// then to the built-in local default.
    #[wasm_bindgen(constructor)]
    pub fn new(api_base: Option<String>) -> Result<PageShell, JsValue> {
        let doc = document()?;

        let config = api_base
            .or_else(|| read_global(API_BASE_GLOBAL))
            .map(AuthConfig::new)
            .unwrap_or_default();
        let session = Rc::new(RefCell::new(Session::load(config)));

        init_search_dropdown(&doc)?;
        init_news_list(&doc);
        init_research_list(&doc);

        // The modal arrives as a fetched fragment, so its wiring runs as an
        // independent async chain.
        {
            let session = session.clone();
            spawn_local(async move {
                if let Err(err) = setup_login_ui(session).await {
                    web_sys::console::error_1(&err);
                }
            });
        }

        Ok(PageShell { session })
    }

    /// Current login flag, for host-side checks.
    pub fn logged_in(&self) -> bool {
        self.session.borrow().logged_in()
    }
}
