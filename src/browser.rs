//! Browser host: binds the page controller to the live DOM.

use crate::ports::{
    ClassListPort, DetailPort, HIDDEN_CLASS, ListPort, QuickLinksPort, RegionPort,
    SearchFieldPort, TextPort, ToggleButtonPort, ViewPorts,
};
use crate::render::{
    CARD_ROLE, CARD_TAB_INDEX, CourseCard, DetailContent, ExternalLink, ListContent, QuickLink,
    is_activation_key,
};
use crate::search::Scheduler;
use crate::cookies::{cookie_value, preference_cookie};
use crate::theme::{MirroredPreferenceStore, PreferenceError, PreferenceStore};
use crate::{Catalog, CatalogPage};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlDocument, HtmlInputElement, KeyboardEvent, Storage, Window,
};

const DETAIL_HREF_ATTR: &str = "data-detail-href";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let query = window.location().search()?;

    let ports = dom_ports(&document);
    // The server renders from the cookie, so it leads; localStorage mirrors it.
    let store = MirroredPreferenceStore::new(
        DocumentCookieStore::new(&document),
        LocalStoragePreferenceStore::new(&window),
    );
    let scheduler = TimeoutScheduler {
        window: window.clone(),
    };
    let page = Rc::new(RefCell::new(CatalogPage::mount(
        Catalog::builtin(),
        ports,
        store,
        scheduler,
        &query,
    )));

    if let Some(input) = document.get_element_by_id("search-input") {
        let page = Rc::clone(&page);
        listen(&input, "input", move |_| page.borrow_mut().on_search_input())?;
    }
    if let Some(toggle) = document.get_element_by_id("theme-toggle") {
        let page = Rc::clone(&page);
        listen(&toggle, "click", move |event| {
            event.prevent_default();
            page.borrow().on_theme_toggle();
        })?;
    }
    if let Some(list) = document.get_element_by_id("courses-list") {
        listen(&list, "keydown", move |event| {
            if let Some(href) = card_activation(&event) {
                event.prevent_default();
                let _ = window.location().set_href(&href);
            }
        })?;
    }
    Ok(())
}

/// Listeners live as long as the page, so their closures are leaked.
fn listen<F>(target: &Element, kind: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Detail link of the focused card, when the key press activates it. Key
/// presses on the links inside a card are left alone.
fn card_activation(event: &Event) -> Option<String> {
    let key = event.dyn_ref::<KeyboardEvent>()?.key();
    if !is_activation_key(&key) {
        return None;
    }
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.get_attribute(DETAIL_HREF_ATTR)
}

fn dom_ports(document: &Document) -> ViewPorts {
    let by_id = |id: &str| document.get_element_by_id(id);
    let by_selector = |selector: &str| document.query_selector(selector).ok().flatten();
    let region = |element: Option<Element>| {
        element.map(|element| Box::new(DomRegion { element }) as Box<dyn RegionPort>)
    };

    ViewPorts {
        heading: region(by_selector(".container > h1")),
        subtitle: region(by_selector(".subtitle")),
        toolbar: region(by_selector(".toolbar")),
        links_section: region(by_id("courses-links")),
        detail_section: region(by_id("course-detail")),
        list: by_id("courses-list").map(|element| {
            Box::new(DomList {
                document: document.clone(),
                element,
            }) as Box<dyn ListPort>
        }),
        detail_content: by_id("course-detail-content").map(|element| {
            Box::new(DomDetail {
                document: document.clone(),
                element,
            }) as Box<dyn DetailPort>
        }),
        results_count: by_id("results-count")
            .map(|element| Box::new(DomText { element }) as Box<dyn TextPort>),
        quick_links: by_id("links-list").map(|element| {
            Box::new(DomQuickLinks {
                document: document.clone(),
                element,
            }) as Box<dyn QuickLinksPort>
        }),
        search_field: by_id("search-input")
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            .map(|input| Box::new(DomSearchField { input }) as Box<dyn SearchFieldPort>),
        theme_toggle: by_id("theme-toggle")
            .map(|element| Box::new(DomToggle { element }) as Box<dyn ToggleButtonPort>),
        root: document
            .body()
            .map(|body| Box::new(DomClassList { element: body.into() }) as Box<dyn ClassListPort>),
    }
}

fn set_hidden(element: &Element, hidden: bool) {
    let _ = element
        .class_list()
        .toggle_with_force(HIDDEN_CLASS, hidden);
}

fn create(document: &Document, tag: &str, class: Option<&str>, text: Option<&str>) -> Option<Element> {
    let element = document.create_element(tag).ok()?;
    if let Some(class) = class {
        element.set_class_name(class);
    }
    if text.is_some() {
        element.set_text_content(text);
    }
    Some(element)
}

fn append(parent: &Element, child: Option<Element>) {
    if let Some(child) = child {
        let _ = parent.append_child(&child);
    }
}

fn external_anchor(document: &Document, link: &ExternalLink, class: Option<&str>) -> Option<Element> {
    let anchor = create(document, "a", class, Some(link.label))?;
    let _ = anchor.set_attribute("href", &link.href);
    let _ = anchor.set_attribute("target", link.target);
    let _ = anchor.set_attribute("rel", link.rel);
    Some(anchor)
}

fn card_element(document: &Document, card: &CourseCard) -> Option<Element> {
    let article = create(document, "article", Some("course-card fade-in"), None)?;
    let _ = article.set_attribute("tabindex", &CARD_TAB_INDEX.to_string());
    let _ = article.set_attribute("role", CARD_ROLE);
    let _ = article.set_attribute(DETAIL_HREF_ATTR, &card.detail_href);
    append(&article, create(document, "h2", None, Some(&card.title)));
    append(
        &article,
        create(document, "p", Some("course-desc"), Some(&card.description)),
    );

    let actions = create(document, "div", Some("course-actions"), None)?;
    if let Some(details) = create(document, "a", Some("btn"), Some(card.details_label)) {
        let _ = details.set_attribute("href", &card.detail_href);
        append(&actions, Some(details));
    }
    append(
        &actions,
        external_anchor(document, &card.external, Some("btn btn-outline")),
    );
    append(&article, Some(actions));
    Some(article)
}

struct DomRegion {
    element: Element,
}

impl RegionPort for DomRegion {
    fn set_hidden(&mut self, hidden: bool) {
        set_hidden(&self.element, hidden);
    }
}

struct DomList {
    document: Document,
    element: Element,
}

impl RegionPort for DomList {
    fn set_hidden(&mut self, hidden: bool) {
        set_hidden(&self.element, hidden);
    }
}

impl ListPort for DomList {
    fn show_list(&mut self, content: &ListContent) {
        self.element.set_inner_html("");
        if let Some(message) = content.message() {
            append(&self.element, create(&self.document, "p", None, Some(message)));
            return;
        }
        for card in content.cards() {
            append(&self.element, card_element(&self.document, card));
        }
    }
}

struct DomDetail {
    document: Document,
    element: Element,
}

impl DetailPort for DomDetail {
    fn show_detail(&mut self, content: &DetailContent) {
        self.element.set_inner_html("");
        let Some(course) = content.course() else {
            append(&self.element, create(&self.document, "p", None, content.message()));
            return;
        };
        append(&self.element, create(&self.document, "h1", None, Some(&course.title)));
        append(
            &self.element,
            create(&self.document, "p", Some("course-desc"), Some(&course.description)),
        );
        if let Some(line) = create(&self.document, "p", None, None) {
            append(&line, create(&self.document, "strong", None, Some("Enlace:")));
            let _ = line.append_with_str_1(" ");
            append(&line, external_anchor(&self.document, &course.external, None));
            append(&self.element, Some(line));
        }
    }
}

struct DomText {
    element: Element,
}

impl TextPort for DomText {
    fn set_text(&mut self, text: &str) {
        self.element.set_text_content(Some(text));
    }
}

struct DomQuickLinks {
    document: Document,
    element: Element,
}

impl QuickLinksPort for DomQuickLinks {
    fn set_links(&mut self, links: &[QuickLink]) {
        self.element.set_inner_html("");
        for link in links {
            let Some(item) = create(&self.document, "li", None, None) else {
                continue;
            };
            if let Some(anchor) = create(&self.document, "a", None, Some(&link.title)) {
                let _ = anchor.set_attribute("href", &link.href);
                append(&item, Some(anchor));
            }
            append(&self.element, Some(item));
        }
    }
}

struct DomSearchField {
    input: HtmlInputElement,
}

impl SearchFieldPort for DomSearchField {
    fn value(&self) -> String {
        self.input.value()
    }
}

struct DomToggle {
    element: Element,
}

impl ToggleButtonPort for DomToggle {
    fn set_label(&mut self, label: &str) {
        self.element.set_text_content(Some(label));
    }

    fn set_pressed(&mut self, pressed: bool) {
        let _ = self
            .element
            .set_attribute("aria-pressed", if pressed { "true" } else { "false" });
    }
}

struct DomClassList {
    element: Element,
}

impl ClassListPort for DomClassList {
    fn set_class(&mut self, class: &str, enabled: bool) {
        let _ = self.element.class_list().toggle_with_force(class, enabled);
    }
}

/// `window.setTimeout` behind the [`Scheduler`] seam.
struct TimeoutScheduler {
    window: Window,
}

impl Scheduler for TimeoutScheduler {
    type Handle = i32;

    fn schedule(&mut self, delay: Duration, task: Box<dyn FnOnce()>) -> i32 {
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                Closure::once_into_js(move || task()).unchecked_ref(),
                millis,
            )
            .unwrap_or(0)
    }

    fn cancel(&mut self, handle: i32) {
        self.window.clear_timeout_with_handle(handle);
    }
}

/// `window.localStorage`, which may be missing or throw when storage is
/// disabled.
struct LocalStoragePreferenceStore {
    storage: Option<Storage>,
}

impl LocalStoragePreferenceStore {
    fn new(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }

    fn storage(&self) -> Result<&Storage, PreferenceError> {
        self.storage.as_ref().ok_or(PreferenceError::Unavailable)
    }
}

impl PreferenceStore for LocalStoragePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| PreferenceError::Denied(format!("{err:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| PreferenceError::Denied(format!("{err:?}")))
    }
}

/// `document.cookie`, written in the same format the server sends.
struct DocumentCookieStore {
    document: Option<HtmlDocument>,
}

impl DocumentCookieStore {
    fn new(document: &Document) -> Self {
        Self {
            document: document.clone().dyn_into::<HtmlDocument>().ok(),
        }
    }

    fn document(&self) -> Result<&HtmlDocument, PreferenceError> {
        self.document.as_ref().ok_or(PreferenceError::Unavailable)
    }
}

impl PreferenceStore for DocumentCookieStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let raw = self
            .document()?
            .cookie()
            .map_err(|err| PreferenceError::Denied(format!("{err:?}")))?;
        Ok(cookie_value(&raw, key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.document()?
            .set_cookie(&preference_cookie(key, value).to_string())
            .map_err(|err| PreferenceError::Denied(format!("{err:?}")))
    }
}
