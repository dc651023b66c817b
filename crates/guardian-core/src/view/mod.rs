// ── Derived view ──
//
// Raw collection -> filtered -> sorted -> one page. Pure, and re-run in
// full whenever an input changes.

mod filter;
mod page;
mod sort;

use std::sync::Arc;

use serde::Serialize;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::model::Device;

pub use filter::{filter_devices, matches};
pub use page::{clamp_page, page_slice, total_pages};
pub use sort::{SortDirection, SortKey, locale_compare, sort_devices};

/// Search, sort and page inputs of the device table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search: String,
    sort_key: SortKey,
    sort_direction: SortDirection,
    page: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Update the search text. A changed query goes back to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.page = 1;
        }
    }

    /// Same key flips the direction; a new key sorts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if key == self.sort_key {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.sort_direction = direction;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = clamp_page(self.page.saturating_add(1), total_pages);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Pull the stored page back into range after the data shrank.
    pub fn clamp_to(&mut self, total_pages: usize) {
        self.page = clamp_page(self.page, total_pages);
    }

    /// Run filter, sort and paginate over `devices`.
    pub fn derive(&self, devices: &[Arc<Device>]) -> DeviceView {
        let mut matched = filter_devices(devices, &self.search);
        sort_devices(&mut matched, self.sort_key, self.sort_direction);

        let total_pages = total_pages(matched.len(), self.page_size);
        let page = clamp_page(self.page, total_pages);
        let rows = page_slice(&matched, page, self.page_size).to_vec();

        DeviceView {
            rows,
            page,
            total_pages,
            matched: matched.len(),
            total: devices.len(),
        }
    }

    /// Filter and sort without paginating.
    pub fn derive_all(&self, devices: &[Arc<Device>]) -> Vec<Arc<Device>> {
        let mut matched = filter_devices(devices, &self.search);
        sort_devices(&mut matched, self.sort_key, self.sort_direction);
        matched
    }
}

/// One rendered page of the device table.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceView {
    pub rows: Vec<Arc<Device>>,
    /// Effective (clamped) 1-based page.
    pub page: usize,
    /// Zero when nothing matches.
    pub total_pages: usize,
    /// Devices left after filtering.
    pub matched: usize,
    /// Devices in the raw collection.
    pub total: usize,
}

impl DeviceView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `"Page 2 of 3"`. An empty result reads `"Page 1 of 1"`.
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages.max(1))
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::device::fixtures::device;
    use pretty_assertions::assert_eq;

    fn fleet(n: usize) -> Vec<Arc<Device>> {
        (0..n)
            .map(|i| {
                let mut d = device(&format!("aa:00:00:00:00:{i:02x}"), "online");
                d.hostname = Some(format!("host-{i:02}"));
                Arc::new(d)
            })
            .collect()
    }

    fn macs(devices: &[Arc<Device>]) -> Vec<String> {
        devices.iter().map(|d| d.mac.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let view = ViewState::default();
        assert_eq!(view.sort_key(), SortKey::Hostname);
        assert_eq!(view.sort_direction(), SortDirection::Asc);
        assert_eq!(view.page(), 1);
        assert_eq!(view.page_size(), 5);
        assert_eq!(view.search(), "");
    }

    #[test]
    fn toggle_sort_flips_then_resets() {
        let mut view = ViewState::default();
        view.toggle_sort(SortKey::Hostname);
        assert_eq!(view.sort_direction(), SortDirection::Desc);
        view.toggle_sort(SortKey::Hostname);
        assert_eq!(view.sort_direction(), SortDirection::Asc);

        view.toggle_sort(SortKey::Hostname);
        view.toggle_sort(SortKey::Ip);
        assert_eq!(view.sort_key(), SortKey::Ip);
        assert_eq!(view.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn toggling_active_key_reverses_rows() {
        let devices = fleet(7);
        let mut view = ViewState::new(100);
        let asc = view.derive(&devices).rows;
        view.toggle_sort(SortKey::Hostname);
        let mut desc = view.derive(&devices).rows;
        desc.reverse();
        assert_eq!(macs(&asc), macs(&desc));
    }

    #[test]
    fn pages_concatenate_to_sorted_collection() {
        let devices = fleet(12);
        let mut view = ViewState::default();
        view.toggle_sort(SortKey::Mac);
        let all = view.derive_all(&devices);

        let first = view.derive(&devices);
        assert_eq!(first.total_pages, 3);

        let mut joined = Vec::new();
        for page in 1..=first.total_pages {
            view.set_page(page);
            joined.extend(view.derive(&devices).rows);
        }
        assert_eq!(macs(&joined), macs(&all));
    }

    #[test]
    fn search_resets_page_and_clamps() {
        let devices = fleet(12);
        let mut view = ViewState::default();
        view.set_page(3);
        assert_eq!(view.derive(&devices).rows.len(), 2);

        view.set_search("host-1");
        assert_eq!(view.page(), 1);
        let page = view.derive(&devices);
        assert_eq!(page.matched, 2);
        assert_eq!(page.total_pages, 1);

        // A stale page number is clamped rather than showing nothing.
        view.set_page(9);
        let page = view.derive(&devices);
        assert_eq!(page.page, 1);
        assert_eq!(page.rows.len(), 2);
    }

    #[test]
    fn empty_result() {
        let mut view = ViewState::default();
        view.set_search("nothing matches this");
        let page = view.derive(&fleet(3));
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page_label(), "Page 1 of 1");
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn next_and_prev_stay_in_bounds() {
        let devices = fleet(6);
        let mut view = ViewState::default();
        let total = view.derive(&devices).total_pages;
        view.next_page(total);
        view.next_page(total);
        assert_eq!(view.page(), 2);
        view.prev_page();
        view.prev_page();
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn filter_and_sort_example() {
        let mut aa = device("AA", "online");
        aa.online_duration = Some("2 days, 03:15:00".into());
        let devices = vec![Arc::new(aa), Arc::new(device("BB", "blocked"))];

        let mut view = ViewState::default();
        view.set_search("bb");
        assert_eq!(macs(&view.derive(&devices).rows), ["BB"]);

        view.set_search("");
        view.set_sort(SortKey::Status, SortDirection::Asc);
        assert_eq!(macs(&view.derive(&devices).rows), ["BB", "AA"]);
    }
}
