//! List/detail view-state controller.

use crate::ports::ViewPorts;
use crate::query;
use crate::render::{self, DetailContent, ListView};
use crate::search::{Scheduler, SearchController};
use crate::theme::{PreferenceStore, Theme, ThemeController};
use crate::Catalog;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    List,
    Detail,
}

/// Derived page state. `mode` and `selected_id` are fixed at load.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ViewState {
    pub mode: Mode,
    pub selected_id: Option<i64>,
    pub filter_text: String,
}

pub struct PageController<P: PreferenceStore> {
    catalog: Catalog,
    ports: ViewPorts,
    state: ViewState,
    theme: ThemeController<P>,
}

impl<P: PreferenceStore> PageController<P> {
    /// Applies the stored theme, then enters detail mode when `query` selects
    /// an id and list mode otherwise.
    pub fn init(catalog: Catalog, mut ports: ViewPorts, store: P, query: &str) -> Self {
        let theme = ThemeController::init(store, &mut ports);
        let selected_id = query::selected_id(query);
        let mode = if selected_id.is_some() {
            Mode::Detail
        } else {
            Mode::List
        };
        let mut controller = Self {
            catalog,
            ports,
            state: ViewState {
                mode,
                selected_id,
                filter_text: String::new(),
            },
            theme,
        };
        match selected_id {
            Some(id) => controller.enter_detail(id),
            None => controller.enter_list(),
        }
        debug!(?mode, ?selected_id, "page initialized");
        controller
    }

    fn enter_detail(&mut self, id: i64) {
        let content = render::render_detail(&self.catalog, id);
        if let Some(port) = self.ports.detail_content.as_mut() {
            port.show_detail(&content);
        }
        if content == DetailContent::NotFound {
            debug!(id, "detail requested for unknown course");
        }
        self.ports.show_detail_mode(true);
    }

    fn enter_list(&mut self) {
        self.ports.show_detail_mode(false);
        self.refresh_list();
    }

    /// Re-renders the list from the search field's current text.
    pub fn refresh_list(&mut self) -> ListView {
        let filter = self.ports.search_text();
        let view = render::render_list(&self.catalog, &filter);
        if let Some(list) = self.ports.list.as_mut() {
            list.show_list(&view.content);
        }
        if let Some(summary) = view.summary.as_ref() {
            if let Some(counter) = self.ports.results_count.as_mut() {
                counter.set_text(&summary.label());
            }
            if let Some(links) = self.ports.quick_links.as_mut() {
                links.set_links(&summary.quick_links);
            }
        }
        self.state.filter_text = filter;
        view
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle(&mut self.ports)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    /// Hands back the preference store, e.g. to collect pending writes.
    pub fn into_store(self) -> P {
        self.theme.into_store()
    }
}

/// A mounted page: the controller plus the debounced search feeding it.
///
/// The debounced render holds only a weak reference to the controller, so a
/// render firing after the page is dropped does nothing.
pub struct CatalogPage<P: PreferenceStore + 'static, S: Scheduler> {
    controller: Rc<RefCell<PageController<P>>>,
    search: SearchController<S>,
}

impl<P: PreferenceStore + 'static, S: Scheduler> CatalogPage<P, S> {
    pub fn mount(catalog: Catalog, ports: ViewPorts, store: P, scheduler: S, query: &str) -> Self {
        Self {
            controller: Rc::new(RefCell::new(PageController::init(
                catalog, ports, store, query,
            ))),
            search: SearchController::new(scheduler),
        }
    }

    /// Input event on the search field.
    pub fn on_search_input(&mut self) {
        let controller = Rc::downgrade(&self.controller);
        self.search.on_input(move || {
            if let Some(controller) = controller.upgrade() {
                controller.borrow_mut().refresh_list();
            }
        });
    }

    /// Click on the theme toggle.
    pub fn on_theme_toggle(&self) -> Theme {
        self.controller.borrow_mut().toggle_theme()
    }

    pub fn state(&self) -> ViewState {
        self.controller.borrow().state().clone()
    }

    pub fn theme(&self) -> Theme {
        self.controller.borrow().theme()
    }
}
