use std::cell::Cell;

use super::*;
use crate::foundation::error::PagevisError;

#[test]
fn second_lookup_does_not_reload() {
    let loads = Cell::new(0);
    let mut cache = ImageCache::<u32>::new();
    let load = || {
        loads.set(loads.get() + 1);
        Ok(7)
    };
    assert_eq!(cache.get_or_try_insert_with("a.png", load).unwrap(), 7);
    assert_eq!(
        cache
            .get_or_try_insert_with("a.png", || unreachable!("cached"))
            .unwrap(),
        7
    );
    assert_eq!(loads.get(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn failures_are_not_cached() {
    let mut cache = ImageCache::<u32>::new();
    let err = cache
        .get_or_try_insert_with("b.png", || Err(PagevisError::asset_load("offline")))
        .unwrap_err();
    assert_eq!(err.code(), "ASSET_LOAD_ERROR");
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.get_or_try_insert_with("b.png", || Ok(1)).unwrap(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn clear_empties() {
    let mut cache = ImageCache::<String>::new();
    cache
        .get_or_try_insert_with("x", || Ok("y".to_string()))
        .unwrap();
    cache.clear();
    assert_eq!(cache.len(), 0);
}
