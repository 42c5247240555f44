//! Response-shape normalization.
//!
//! The backend answers the same kind of request in several shapes: `{"data": ...}` or the
//! bare value, and for lists a bare array, `{"data": [..], "meta": {..}}`, a flat paginator
//! or a paginator nested under `data`. API modules decode through these types so callers
//! always receive one canonical shape: `T` for objects, `Vec<T>` for lists and [`Page<T>`]
//! for paginated lists.

use serde::{Deserialize, Serialize};

/// `{"data": T}` or a bare `T`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Pagination metadata. Synthesized when the backend omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageMeta {
    /// Metadata describing `len` items on a single page.
    pub fn single(len: usize) -> Self {
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        Self {
            current_page: 1,
            last_page: 1,
            per_page: len,
            total: u64::from(len),
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "RawPage<T>",
    bound(deserialize = "T: Deserialize<'de>", serialize = "T: Serialize")
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.meta.current_page < self.meta.last_page
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: PageMeta::single(0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage<T> {
    Bare(Vec<T>),
    Nested { data: Paginator<T> },
    Listing(Paginator<T>),
}

#[derive(Deserialize)]
struct Paginator<T> {
    data: Vec<T>,
    #[serde(default)]
    meta: Option<RawMeta>,
    #[serde(flatten)]
    flat: RawMeta,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default)]
    current_page: Option<u32>,
    #[serde(default)]
    last_page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    total: Option<u64>,
}

impl<T> From<RawPage<T>> for Page<T> {
    fn from(raw: RawPage<T>) -> Self {
        let (items, meta) = match raw {
            RawPage::Bare(items) => (items, RawMeta::default()),
            RawPage::Nested { data } | RawPage::Listing(data) => {
                let meta = data.meta.unwrap_or(data.flat);
                (data.data, meta)
            }
        };
        let meta = synthesize(meta, items.len());
        Page { items, meta }
    }
}

fn synthesize(raw: RawMeta, len: usize) -> PageMeta {
    let fallback = PageMeta::single(len);
    let per_page = raw.per_page.filter(|p| *p > 0).unwrap_or(fallback.per_page);
    let total = raw.total.unwrap_or(fallback.total);
    let current_page = raw.current_page.unwrap_or(1).max(1);
    let last_page = raw.last_page.unwrap_or_else(|| {
        if per_page == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        }
    });
    PageMeta {
        current_page,
        last_page: last_page.max(current_page),
        per_page,
        total,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        id: u32,
    }

    fn page(value: serde_json::Value) -> Page<Item> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn envelope_accepts_both_shapes() {
        let wrapped: Envelope<Item> = serde_json::from_value(json!({ "data": { "id": 1 } })).unwrap();
        let bare: Envelope<Item> = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(wrapped.into_inner(), bare.into_inner());

        let list: Envelope<Vec<Item>> = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(list.into_inner().is_empty());
    }

    #[test]
    fn bare_array_gets_single_page_meta() {
        let p = page(json!([{ "id": 1 }, { "id": 2 }]));
        assert_eq!(p.items.len(), 2);
        assert_eq!(p.meta, PageMeta::single(2));
        assert!(!p.has_next());
    }

    #[test]
    fn resource_collection_meta_is_used() {
        let p = page(json!({
            "data": [{ "id": 1 }],
            "links": { "next": "…" },
            "meta": { "current_page": 2, "last_page": 5, "per_page": 1, "total": 5 }
        }));
        assert_eq!(p.meta.current_page, 2);
        assert_eq!(p.meta.last_page, 5);
        assert!(p.has_next());
    }

    #[test]
    fn flat_paginator_is_read() {
        let p = page(json!({
            "current_page": 1,
            "data": [{ "id": 1 }, { "id": 2 }],
            "per_page": 2,
            "total": 7,
            "next_page_url": "…"
        }));
        assert_eq!(p.meta.total, 7);
        assert_eq!(p.meta.last_page, 4);
    }

    #[test]
    fn paginator_nested_under_data() {
        let p = page(json!({
            "data": { "data": [{ "id": 9 }], "current_page": 3, "last_page": 3, "per_page": 15, "total": 31 }
        }));
        assert_eq!(p.items, vec![Item { id: 9 }]);
        assert_eq!(p.meta.current_page, 3);
        assert!(!p.has_next());
    }

    #[test]
    fn wrapped_list_without_meta() {
        let p = page(json!({ "data": [] }));
        assert!(p.is_empty());
        assert_eq!(p.meta, PageMeta::single(0));
    }
}
