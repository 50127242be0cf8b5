use super::{GridItem, ImageRecord, PaginationControls, RenderedPage};

const STAGGER_MS: u64 = 100;

/// Current page (1-based) and the fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    page: usize,
    page_size: usize,
}

impl PaginationCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size)
    }

    /// Moves forward one page. Returns false on the last page.
    pub fn next(&mut self, count: usize) -> bool {
        if self.page < self.total_pages(count) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one page. Returns false on the first page.
    pub fn previous(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}

/// Stable sort, newest `date_added` first.
pub fn sort_newest_first(records: &mut [ImageRecord]) {
    records.sort_by(|a, b| b.date_added.cmp(&a.date_added));
}

/// Slice of an already sorted set visible at the cursor's page.
pub fn page_slice<'a>(records: &'a [ImageRecord], cursor: &PaginationCursor) -> &'a [ImageRecord] {
    let start = (cursor.page - 1) * cursor.page_size;
    if start >= records.len() {
        return &[];
    }
    let end = (start + cursor.page_size).min(records.len());
    &records[start..end]
}

pub fn controls(cursor: &PaginationCursor, count: usize) -> PaginationControls {
    let total_pages = cursor.total_pages(count);
    PaginationControls {
        visible: total_pages > 1,
        current_page: cursor.page,
        total_pages,
        prev_disabled: cursor.page == 1,
        next_disabled: cursor.page >= total_pages,
        info: format!("Page {} of {}", cursor.page, total_pages),
    }
}

/// Sorts `records` in place and renders the cursor's page of it.
pub fn render_page(records: &mut [ImageRecord], cursor: &PaginationCursor) -> RenderedPage {
    sort_newest_first(records);

    let items = page_slice(records, cursor)
        .iter()
        .enumerate()
        .map(|(index, record)| GridItem {
            index,
            src: record.src.clone(),
            alt: record.name.clone(),
            caption: record.caption.clone(),
            animation_delay_ms: index as u64 * STAGGER_MS,
        })
        .collect();

    RenderedPage {
        items,
        controls: controls(cursor, records.len()),
        total_images: records.len(),
    }
}
