use crate::planner::Planner;
use crate::render::Grid;
use crate::storage::Store;
use crate::view::{resolve_view, Location, NavBar};

/// Everything a loaded planner page holds.
#[derive(Debug)]
pub struct Page {
    pub location: Location,
    pub nav: NavBar,
    pub planner: Planner,
    pub grid: Grid,
}

impl Page {
    /// Rebuild the grid from the current document.
    pub fn redraw(&mut self) {
        self.grid = self.planner.render();
    }
}

/// Resolve the view for `location`, mark it in the nav bar, load or seed its
/// document and draw the first grid.
pub fn bootstrap(store: Store, location: Location, mut nav: NavBar) -> Page {
    let view = resolve_view(&location);
    nav.mark_active(&view);
    log::info!("opening view {} from {}", view, location);
    let mut planner = Planner::load(store, &view);
    let grid = planner.render();
    Page {
        location,
        nav,
        planner,
        grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Card;
    use tempfile::TempDir;

    #[test]
    fn fresh_view_is_seeded_and_drawn() {
        let tmp = TempDir::new().unwrap();
        let page = bootstrap(
            Store::new(tmp.path()),
            Location::parse("/planner"),
            NavBar::standard(),
        );
        assert_eq!(page.planner.view(), "daily");
        assert_eq!(page.nav.active().map(|l| l.view.as_str()), Some("daily"));
        assert_eq!(page.grid.cards.len(), 5);
        assert_eq!(page.grid.cards.last(), Some(&Card::Create));
        assert_eq!(page.grid.focus, None);
    }

    #[test]
    fn stored_view_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path());
        let mut page = bootstrap(
            store.clone(),
            Location::parse("/planner?view=weekly"),
            NavBar::standard(),
        );
        page.planner.create_section("sprint");
        let saved = page.planner.document().clone();

        let again = bootstrap(
            store,
            Location::parse("/planner?view=weekly"),
            NavBar::standard(),
        );
        assert_eq!(again.planner.document(), &saved);
        assert_eq!(again.nav.active().map(|l| l.view.as_str()), Some("weekly"));
    }

    #[test]
    fn redraw_consumes_pending_focus() {
        let tmp = TempDir::new().unwrap();
        let mut page = bootstrap(
            Store::new(tmp.path()),
            Location::default(),
            NavBar::standard(),
        );
        let section_id = page.planner.document()[0].id.clone();
        page.planner.add_task(&section_id);
        page.redraw();
        assert!(page.grid.focus.is_some());
        assert_eq!(page.planner.pending_focus(), None);
        page.redraw();
        assert_eq!(page.grid.focus, None);
    }
}
