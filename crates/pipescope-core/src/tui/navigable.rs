//! Row selection shared by every tab with a selectable list.

/// Selection within the rows currently on screen.
///
/// Moving the selection drops the tracked row id so the next
/// `resolve_selection` goes by position instead of identity.
pub trait NavigableTable {
    fn selected(&self) -> usize;
    fn selected_mut(&mut self) -> &mut usize;
    fn clear_tracked(&mut self);
    /// Rows currently rendered.
    fn visible_rows(&self) -> usize;

    fn select_up(&mut self) {
        *self.selected_mut() = self.selected().saturating_sub(1);
        self.clear_tracked();
    }

    fn select_down(&mut self) {
        let last = self.visible_rows().saturating_sub(1);
        *self.selected_mut() = (self.selected() + 1).min(last);
        self.clear_tracked();
    }

    fn select_first(&mut self) {
        *self.selected_mut() = 0;
        self.clear_tracked();
    }

    fn select_last(&mut self) {
        *self.selected_mut() = self.visible_rows().saturating_sub(1);
        self.clear_tracked();
    }
}

/// Index of `tracked` in `row_ids`, else `selected` clamped into range.
pub fn resolve_index(row_ids: &[u64], tracked: Option<u64>, selected: usize) -> Option<usize> {
    if row_ids.is_empty() {
        return None;
    }
    tracked
        .and_then(|id| row_ids.iter().position(|&r| r == id))
        .or(Some(selected.min(row_ids.len() - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rows {
        selected: usize,
        tracked: Option<u64>,
        len: usize,
    }

    impl NavigableTable for Rows {
        fn selected(&self) -> usize {
            self.selected
        }
        fn selected_mut(&mut self) -> &mut usize {
            &mut self.selected
        }
        fn clear_tracked(&mut self) {
            self.tracked = None;
        }
        fn visible_rows(&self) -> usize {
            self.len
        }
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut rows = Rows {
            selected: 0,
            tracked: Some(7),
            len: 3,
        };
        rows.select_up();
        assert_eq!(rows.selected, 0);
        assert_eq!(rows.tracked, None);
        rows.select_down();
        rows.select_down();
        rows.select_down();
        assert_eq!(rows.selected, 2);
        rows.select_first();
        assert_eq!(rows.selected, 0);
        rows.select_last();
        assert_eq!(rows.selected, 2);
    }

    #[test]
    fn test_resolve_index_prefers_tracked_row() {
        assert_eq!(resolve_index(&[10, 20, 30], Some(30), 0), Some(2));
        assert_eq!(resolve_index(&[10, 20, 30], Some(99), 1), Some(1));
        assert_eq!(resolve_index(&[10, 20, 30], None, 8), Some(2));
        assert_eq!(resolve_index(&[], Some(10), 0), None);
    }
}
