pub use durations::*;
pub use facade::{CommandFlow, Controller};
pub use garage::*;
pub use leaderboard::*;
pub use race::*;
pub use timer::*;

mod durations;
mod facade;
mod garage;
mod leaderboard;
mod race;
mod timer;

/// The number of pages needed to display every item.
pub fn nb_pages(nb_items: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    (nb_items + per_page - 1) / per_page
}

/// The items on the specified page, which is empty if the page is out of range.
pub fn page<T>(items: &[T], page_idx: usize, per_page: usize) -> &[T] {
    let start = page_idx.saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}
