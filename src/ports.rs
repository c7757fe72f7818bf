//! Page regions the controller writes to.
//!
//! Every port is optional. A host leaves a field `None` when the page has no
//! such element, and the controller skips the corresponding update.

use crate::render::{DetailContent, ListContent, QuickLink};

/// Class that hides a region.
pub const HIDDEN_CLASS: &str = "hidden";

pub trait RegionPort {
    fn set_hidden(&mut self, hidden: bool);
}

/// The course list container. It is also a region of its own.
pub trait ListPort: RegionPort {
    fn show_list(&mut self, content: &ListContent);
}

pub trait DetailPort {
    fn show_detail(&mut self, content: &DetailContent);
}

pub trait TextPort {
    fn set_text(&mut self, text: &str);
}

pub trait QuickLinksPort {
    fn set_links(&mut self, links: &[QuickLink]);
}

pub trait SearchFieldPort {
    fn value(&self) -> String;
}

pub trait ToggleButtonPort {
    fn set_label(&mut self, label: &str);
    fn set_pressed(&mut self, pressed: bool);
}

pub trait ClassListPort {
    fn set_class(&mut self, class: &str, enabled: bool);
}

/// Everything the controller may touch on the page.
#[derive(Default)]
pub struct ViewPorts {
    pub heading: Option<Box<dyn RegionPort>>,
    pub subtitle: Option<Box<dyn RegionPort>>,
    pub toolbar: Option<Box<dyn RegionPort>>,
    pub links_section: Option<Box<dyn RegionPort>>,
    pub detail_section: Option<Box<dyn RegionPort>>,
    pub list: Option<Box<dyn ListPort>>,
    pub detail_content: Option<Box<dyn DetailPort>>,
    pub results_count: Option<Box<dyn TextPort>>,
    pub quick_links: Option<Box<dyn QuickLinksPort>>,
    pub search_field: Option<Box<dyn SearchFieldPort>>,
    pub theme_toggle: Option<Box<dyn ToggleButtonPort>>,
    pub root: Option<Box<dyn ClassListPort>>,
}

impl ViewPorts {
    /// Current search text, empty when there is no search field.
    pub fn search_text(&self) -> String {
        self.search_field
            .as_ref()
            .map(|field| field.value())
            .unwrap_or_default()
    }

    /// Shows the list regions and hides the detail region, or the reverse.
    pub(crate) fn show_detail_mode(&mut self, detail: bool) {
        let list_regions = [
            &mut self.heading,
            &mut self.subtitle,
            &mut self.toolbar,
            &mut self.links_section,
        ];
        for region in list_regions.into_iter().flatten() {
            region.set_hidden(detail);
        }
        if let Some(list) = self.list.as_mut() {
            list.set_hidden(detail);
        }
        if let Some(section) = self.detail_section.as_mut() {
            section.set_hidden(!detail);
        }
    }
}
