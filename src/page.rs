//! In-memory page document.
//!
//! Implements every port over a shared [`DocumentState`]. The web host renders
//! the state to HTML after the controller has run; tests read it directly.

use crate::ports::{
    ClassListPort, DetailPort, ListPort, QuickLinksPort, RegionPort, SearchFieldPort, TextPort,
    ToggleButtonPort, ViewPorts,
};
use crate::render::{DetailContent, ListContent, QuickLink};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Elements a page may or may not contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PagePart {
    Heading,
    Subtitle,
    Toolbar,
    LinksSection,
    DetailSection,
    List,
    DetailContent,
    ResultsCount,
    QuickLinks,
    SearchInput,
    ThemeToggle,
    Root,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    pub hidden: BTreeSet<PagePart>,
    pub list: Option<ListContent>,
    pub list_renders: usize,
    pub detail: Option<DetailContent>,
    pub results_count: Option<String>,
    pub quick_links: Option<Vec<QuickLink>>,
    pub search_value: String,
    pub toggle_label: Option<String>,
    pub toggle_pressed: Option<bool>,
    pub root_classes: BTreeSet<String>,
}

impl DocumentState {
    pub fn is_hidden(&self, part: PagePart) -> bool {
        self.hidden.contains(&part)
    }
}

/// Cheap to clone: clones share one document.
#[derive(Debug, Clone, Default)]
pub struct PageDocument {
    state: Rc<RefCell<DocumentState>>,
    missing: BTreeSet<PagePart>,
}

impl PageDocument {
    /// A document containing every part.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without(mut self, part: PagePart) -> Self {
        self.missing.insert(part);
        self
    }

    pub fn with_search_value(self, value: &str) -> Self {
        self.type_search(value);
        self
    }

    /// Replaces the search field's text, as typing into it would.
    pub fn type_search(&self, value: &str) {
        self.state.borrow_mut().search_value = value.to_string();
    }

    pub fn has(&self, part: PagePart) -> bool {
        !self.missing.contains(&part)
    }

    pub fn snapshot(&self) -> DocumentState {
        self.state.borrow().clone()
    }

    /// Ports for every part this document contains.
    pub fn ports(&self) -> ViewPorts {
        ViewPorts {
            heading: self.region(PagePart::Heading),
            subtitle: self.region(PagePart::Subtitle),
            toolbar: self.region(PagePart::Toolbar),
            links_section: self.region(PagePart::LinksSection),
            detail_section: self.region(PagePart::DetailSection),
            list: self
                .handle(PagePart::List)
                .map(|h| Box::new(h) as Box<dyn ListPort>),
            detail_content: self
                .handle(PagePart::DetailContent)
                .map(|h| Box::new(h) as Box<dyn DetailPort>),
            results_count: self
                .handle(PagePart::ResultsCount)
                .map(|h| Box::new(h) as Box<dyn TextPort>),
            quick_links: self
                .handle(PagePart::QuickLinks)
                .map(|h| Box::new(h) as Box<dyn QuickLinksPort>),
            search_field: self
                .handle(PagePart::SearchInput)
                .map(|h| Box::new(h) as Box<dyn SearchFieldPort>),
            theme_toggle: self
                .handle(PagePart::ThemeToggle)
                .map(|h| Box::new(h) as Box<dyn ToggleButtonPort>),
            root: self
                .handle(PagePart::Root)
                .map(|h| Box::new(h) as Box<dyn ClassListPort>),
        }
    }

    fn region(&self, part: PagePart) -> Option<Box<dyn RegionPort>> {
        self.handle(part).map(|h| Box::new(h) as Box<dyn RegionPort>)
    }

    fn handle(&self, part: PagePart) -> Option<PartHandle> {
        self.has(part).then(|| PartHandle {
            part,
            state: Rc::clone(&self.state),
        })
    }
}

struct PartHandle {
    part: PagePart,
    state: Rc<RefCell<DocumentState>>,
}

impl RegionPort for PartHandle {
    fn set_hidden(&mut self, hidden: bool) {
        let mut state = self.state.borrow_mut();
        if hidden {
            state.hidden.insert(self.part);
        } else {
            state.hidden.remove(&self.part);
        }
    }
}

impl ListPort for PartHandle {
    fn show_list(&mut self, content: &ListContent) {
        let mut state = self.state.borrow_mut();
        state.list = Some(content.clone());
        state.list_renders += 1;
    }
}

impl DetailPort for PartHandle {
    fn show_detail(&mut self, content: &DetailContent) {
        self.state.borrow_mut().detail = Some(content.clone());
    }
}

impl TextPort for PartHandle {
    fn set_text(&mut self, text: &str) {
        self.state.borrow_mut().results_count = Some(text.to_string());
    }
}

impl QuickLinksPort for PartHandle {
    fn set_links(&mut self, links: &[QuickLink]) {
        self.state.borrow_mut().quick_links = Some(links.to_vec());
    }
}

impl SearchFieldPort for PartHandle {
    fn value(&self) -> String {
        self.state.borrow().search_value.clone()
    }
}

impl ToggleButtonPort for PartHandle {
    fn set_label(&mut self, label: &str) {
        self.state.borrow_mut().toggle_label = Some(label.to_string());
    }

    fn set_pressed(&mut self, pressed: bool) {
        self.state.borrow_mut().toggle_pressed = Some(pressed);
    }
}

impl ClassListPort for PartHandle {
    fn set_class(&mut self, class: &str, enabled: bool) {
        let mut state = self.state.borrow_mut();
        if enabled {
            state.root_classes.insert(class.to_string());
        } else {
            state.root_classes.remove(class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parts_produce_no_ports() {
        let document = PageDocument::new()
            .without(PagePart::QuickLinks)
            .without(PagePart::Heading);
        let ports = document.ports();
        assert!(ports.quick_links.is_none());
        assert!(ports.heading.is_none());
        assert!(ports.list.is_some());
    }

    #[test]
    fn clones_share_state() {
        let document = PageDocument::new();
        let ports = document.clone().ports();
        document.type_search("redes");
        assert_eq!(ports.search_text(), "redes");
    }
}
