//! Per-run session state.
//!
//! Owned by the caller and replaced wholesale on every load event, so a new
//! batch can never be shown with rankings computed for the previous one.

use sitescout_common::{RankedSite, Site};
use sitescout_geo::{Bounds, MapView};

#[derive(Debug, Clone, Default)]
pub struct ScoutSession {
    pub sites: Vec<Site>,
    pub bounds: Option<Bounds>,
    pub ranked: Vec<RankedSite>,
}

impl ScoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded batch. Previous sites, bounds and rankings are dropped.
    pub fn load_batch(self, sites: Vec<Site>, bounds: Option<Bounds>) -> Self {
        Self {
            sites,
            bounds: bounds.filter(|b| !b.is_empty()),
            ranked: Vec::new(),
        }
    }

    pub fn with_ranking(mut self, ranked: Vec<RankedSite>) -> Self {
        self.ranked = ranked;
        self
    }

    pub fn needs_ranking(&self) -> bool {
        !self.sites.is_empty() && self.ranked.is_empty()
    }

    pub fn map_view(&self) -> MapView {
        MapView::from_bounds(self.bounds.as_ref())
    }

    pub fn ranked_by_name(&self, name: &str) -> Option<&RankedSite> {
        self.ranked.iter().find(|r| r.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescout_ranker::score_sites;

    fn bounds() -> Bounds {
        let mut b = Bounds::empty();
        b.extend(-78.0, 38.0);
        b.extend(-76.0, 40.0);
        b
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = ScoutSession::new();
        assert!(session.sites.is_empty());
        assert!(!session.needs_ranking());
        assert_eq!(session.map_view(), MapView::default());
    }

    #[test]
    fn test_load_batch_clears_previous_ranking() {
        let first = vec![Site::new("Old", 1.0, 1.0)];
        let session = ScoutSession::new().load_batch(first.clone(), Some(bounds()));
        let ranked = score_sites(&session.sites);
        let session = session.with_ranking(ranked);
        assert!(!session.needs_ranking());
        assert!(session.ranked_by_name("Old").is_some());

        let session = session.load_batch(vec![Site::new("New", 2.0, 2.0)], None);
        assert!(session.ranked.is_empty());
        assert!(session.needs_ranking());
        assert!(session.ranked_by_name("Old").is_none());
        assert!(session.bounds.is_none());
        assert_eq!(session.map_view(), MapView::default());
    }

    #[test]
    fn test_empty_bounds_are_dropped() {
        let session = ScoutSession::new().load_batch(vec![], Some(Bounds::empty()));
        assert!(session.bounds.is_none());
    }

    #[test]
    fn test_map_view_follows_bounds() {
        let session = ScoutSession::new().load_batch(vec![Site::new("A", 39.0, -77.0)], Some(bounds()));
        let view = session.map_view();
        assert_eq!((view.center_lat, view.center_lon), (39.0, -77.0));
    }
}
