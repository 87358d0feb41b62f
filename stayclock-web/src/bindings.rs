//! `wasm-bindgen` exports of the planner for page scripts.
use serde::Serialize;
use stayclock_engine::{PersistOutcome, TravelPlanner};
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::input::{parse_date, parse_visit_id};
use crate::share_link::{share_token_from_search, share_url};
use crate::storage::LocalVisitStorage;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn err_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn persist_warning(outcome: Option<&PersistOutcome>) -> Option<String> {
    match outcome {
        Some(PersistOutcome::Failed(err)) => Some(err.to_string()),
        _ => None,
    }
}

/// Planner bound to `localStorage` and the current page URL.
#[wasm_bindgen]
pub struct StayPlanner {
    planner: TravelPlanner<LocalVisitStorage>,
    share_notice: Option<String>,
}

#[wasm_bindgen]
impl StayPlanner {
    /// Load saved visits, switching to shared mode when the URL carries a token.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        let token = dom::location_search()
            .ok()
            .and_then(|search| share_token_from_search(&search));
        let (planner, notice) =
            TravelPlanner::open_with_share(LocalVisitStorage::new(), token.as_deref());
        if let Some(err) = &notice {
            log::warn!("share link ignored: {err}");
        }
        Self {
            planner,
            share_notice: notice.map(|err| err.to_string()),
        }
    }

    /// Why a share link in the URL was ignored, if it was.
    #[wasm_bindgen(getter, js_name = shareNotice)]
    pub fn share_notice(&self) -> Option<String> {
        self.share_notice.clone()
    }

    /// The last persistence failure, if saving is currently failing.
    #[wasm_bindgen(getter, js_name = storageWarning)]
    pub fn storage_warning(&self) -> Option<String> {
        persist_warning(self.planner.store().last_persist())
    }

    #[wasm_bindgen(getter, js_name = isShared)]
    pub fn is_shared(&self) -> bool {
        self.planner.is_shared()
    }

    #[wasm_bindgen(getter)]
    pub fn visits(&self) -> Result<JsValue, JsValue> {
        to_js(&self.planner.visits())
    }

    #[wasm_bindgen(js_name = addVisit)]
    pub fn add_visit(
        &mut self,
        entry: &str,
        exit: &str,
        location: &str,
    ) -> Result<JsValue, JsValue> {
        let entry = parse_date(entry).map_err(err_js)?;
        let exit = parse_date(exit).map_err(err_js)?;
        let visit = self
            .planner
            .add_visit(entry, exit, location)
            .map_err(err_js)?;
        to_js(&visit)
    }

    #[wasm_bindgen(js_name = removeVisit)]
    pub fn remove_visit(&mut self, id: &str) -> Result<(), JsValue> {
        let id = parse_visit_id(id).map_err(err_js)?;
        self.planner.remove_visit(id).map_err(err_js)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = beginEdit)]
    pub fn begin_edit(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_visit_id(id).map_err(err_js)?;
        let visit = self.planner.begin_edit(id).map_err(err_js)?;
        to_js(&visit)
    }

    #[wasm_bindgen(js_name = commitEdit)]
    pub fn commit_edit(
        &mut self,
        id: &str,
        entry: &str,
        exit: &str,
        location: &str,
    ) -> Result<JsValue, JsValue> {
        let id = parse_visit_id(id).map_err(err_js)?;
        let entry = parse_date(entry).map_err(err_js)?;
        let exit = parse_date(exit).map_err(err_js)?;
        let visit = self
            .planner
            .commit_edit(id, entry, exit, location)
            .map_err(err_js)?;
        to_js(&visit)
    }

    #[wasm_bindgen(js_name = cancelEdit)]
    pub fn cancel_edit(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_visit_id(id).map_err(err_js)?;
        let visit = self.planner.cancel_edit(id).map_err(err_js)?;
        to_js(&visit)
    }

    /// Balance for today in the browser's local calendar.
    pub fn recompute(&self) -> Result<JsValue, JsValue> {
        to_js(&self.planner.recompute(dom::today()))
    }

    /// Balance after planned trips, or `null` when none are planned.
    #[wasm_bindgen(js_name = projectFuture)]
    pub fn project_future(&self) -> Result<JsValue, JsValue> {
        to_js(&self.planner.project_future(dom::today()))
    }

    #[wasm_bindgen(js_name = generateShareToken)]
    pub fn generate_share_token(&self) -> Result<String, JsValue> {
        self.planner.generate_share_token().map_err(err_js)
    }

    /// A full link to `page_url` carrying the current visits.
    #[wasm_bindgen(js_name = shareUrl)]
    pub fn share_url(&self, page_url: &str) -> Result<String, JsValue> {
        let token = self.planner.generate_share_token().map_err(err_js)?;
        Ok(share_url(page_url, &token))
    }

    #[wasm_bindgen(js_name = importShareToken)]
    pub fn import_share_token(&mut self, token: &str) -> Result<usize, JsValue> {
        self.planner.import_share_token(token).map_err(err_js)
    }

    /// Keep a shared list as the user's own. Returns a warning when saving failed.
    #[wasm_bindgen(js_name = adoptSharedData)]
    pub fn adopt_shared_data(&mut self) -> Option<String> {
        let outcome = self.planner.adopt_shared_data();
        persist_warning(Some(&outcome))
    }
}

impl Default for StayPlanner {
    fn default() -> Self {
        Self::new()
    }
}
