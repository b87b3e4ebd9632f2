//! Per-thread lookup of live applications by id

use crate::app::AppHandle;
use kiln_core::AppId;
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static APPS: RefCell<HashMap<AppId, AppHandle>> = RefCell::new(HashMap::new());
}

/// Record a live application. Called on construction.
pub(crate) fn register(handle: AppHandle) {
    APPS.with(|apps| {
        apps.borrow_mut().insert(handle.id(), handle);
    });
}

/// Forget an application. Called on destroy.
pub(crate) fn unregister(id: AppId) {
    APPS.with(|apps| {
        apps.borrow_mut().remove(&id);
    });
}

/// Handle of a live application on this thread
pub fn get_application(id: AppId) -> Option<AppHandle> {
    APPS.with(|apps| apps.borrow().get(&id).cloned())
}

/// Ids of the live applications on this thread
pub fn application_ids() -> Vec<AppId> {
    APPS.with(|apps| apps.borrow().keys().copied().collect())
}
