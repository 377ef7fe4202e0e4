use std::cell::RefCell;
use std::rc::Rc;

use poketeam_core::core_api::{
    CatalogClient, CatalogSource, ClientConfig, CoreError, FilterCriteria, MAX_TEAM_SIZE,
    RosterSession, RosterStore, SharePayload, SortKey, filter, sort,
};
use poketeam_core::creature::{Creature, CreatureId};
use poketeam_render::{
    SearchDebouncer, Toast, ToastQueue, ToastSeverity, badge_color, render_json_detail,
    render_json_grid, render_json_roster, render_json_types,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

mod store;

pub use store::{BrowserStore, LocalStorageStore};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebFilterOptions {
    pub query: String,
    pub types: Vec<String>,
    pub generation: Option<u32>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone)]
struct WebError {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct WebErrorPayload {
    code: String,
    message: String,
}

impl WebError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_js_value(&self) -> JsValue {
        let payload = WebErrorPayload {
            code: self.code.to_string(),
            message: self.message.clone(),
        };
        serde_wasm_bindgen::to_value(&payload).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", payload.code, payload.message))
        })
    }
}

impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        Self::new(err.code.as_str(), err.message)
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| {
            WebError::new("render_failed", format!("failed to convert output: {err}")).to_js_value()
        })
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue, what: &str) -> Result<T, WebError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| WebError::new("invalid_input", format!("Failed to parse {what}: {err}")))
}

/// Filter then sort a catalog already held by the page.
#[wasm_bindgen]
pub fn filter_and_sort(records: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let records: Vec<Creature> = from_js(records, "records").map_err(|err| err.to_js_value())?;
    let options = parse_options(options).map_err(|err| err.to_js_value())?;
    let shown = filter_and_sort_impl(&records, &options).map_err(|err| err.to_js_value())?;
    to_js(&shown)
}

fn filter_and_sort_impl(
    records: &[Creature],
    options: &WebFilterOptions,
) -> Result<Vec<Creature>, WebError> {
    let key = parse_sort_key(options.sort.as_deref())?;
    let criteria = FilterCriteria {
        query: options.query.clone(),
        types: options.types.clone(),
        generation: options.generation,
    };
    Ok(sort(&filter(records, &criteria), key))
}

fn parse_options(options: JsValue) -> Result<WebFilterOptions, WebError> {
    if options.is_null() || options.is_undefined() {
        return Ok(WebFilterOptions::default());
    }
    from_js(options, "filter options")
}

fn parse_sort_key(raw: Option<&str>) -> Result<SortKey, WebError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(SortKey::default()),
        Some(raw) => raw
            .parse()
            .map_err(|message: String| WebError::new("invalid_options", message)),
    }
}

#[wasm_bindgen]
pub fn render_grid(records: JsValue, in_team: Vec<CreatureId>) -> Result<JsValue, JsValue> {
    let records: Vec<Creature> = from_js(records, "records").map_err(|err| err.to_js_value())?;
    to_js(&render_json_grid(&records, &in_team))
}

#[wasm_bindgen]
pub fn render_detail(record: JsValue) -> Result<JsValue, JsValue> {
    let record: Creature = from_js(record, "record").map_err(|err| err.to_js_value())?;
    to_js(&render_json_detail(&record))
}

#[wasm_bindgen]
pub fn render_types(labels: Vec<String>) -> Result<JsValue, JsValue> {
    to_js(&render_json_types(&labels))
}

#[wasm_bindgen]
pub fn type_badge_color(type_name: &str) -> String {
    badge_color(type_name).to_string()
}

/// Ids carried by a share link; empty when there is nothing to import.
#[wasm_bindgen]
pub fn parse_share_url(url: &str) -> Vec<CreatureId> {
    SharePayload::from_url(url)
        .map(|payload| payload.ids().to_vec())
        .unwrap_or_default()
}

/// Catalog client for the page. Responses are cached per request shape.
#[wasm_bindgen]
pub struct WebCatalog {
    client: Rc<CatalogClient>,
}

#[wasm_bindgen]
impl WebCatalog {
    #[wasm_bindgen(constructor)]
    pub fn new(api_base: Option<String>) -> WebCatalog {
        let mut config = ClientConfig::default();
        if let Some(api_base) = api_base.filter(|base| !base.trim().is_empty()) {
            config.api_base = api_base;
        }
        WebCatalog {
            client: Rc::new(CatalogClient::new(config)),
        }
    }

    pub fn fetch_all(&self) -> js_sys::Promise {
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let records = client
                .fetch_all()
                .await
                .map_err(|err| WebError::from(err).to_js_value())?;
            to_js(&records)
        })
    }

    pub fn fetch_by_id(&self, id: CreatureId) -> js_sys::Promise {
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let record = client
                .fetch_by_id(id)
                .await
                .map_err(|err| WebError::from(err).to_js_value())?;
            to_js(&record)
        })
    }

    pub fn fetch_by_generation(&self, generation: u32) -> js_sys::Promise {
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let records = client
                .fetch_by_generation(generation)
                .await
                .map_err(|err| WebError::from(err).to_js_value())?;
            to_js(&records)
        })
    }

    pub fn fetch_types(&self) -> js_sys::Promise {
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let labels = client
                .fetch_types()
                .await
                .map_err(|err| WebError::from(err).to_js_value())?;
            to_js(&labels)
        })
    }
}

/// Team state shared by the page. Every mutation answers with the toast to
/// show.
struct TeamState<S: RosterStore> {
    session: RosterSession<S>,
}

impl<S: RosterStore> TeamState<S> {
    fn open(store: S) -> Result<Self, WebError> {
        Ok(Self {
            session: RosterSession::open(store)?,
        })
    }

    fn add(&mut self, record: Creature) -> Toast {
        let toast = Toast::added(&record);
        match self.session.add(record) {
            Ok(_) => toast,
            Err(rejection) => Toast::rejected(&rejection),
        }
    }

    fn remove(&mut self, id: CreatureId) -> Toast {
        match self.session.remove(id) {
            Some(entry) => Toast::removed(&entry.creature),
            None => Toast::not_in_team(id),
        }
    }

    fn reorder(&mut self, from: usize, to: usize) -> Toast {
        match self.session.reorder(from, to) {
            Ok(()) => match self.session.roster().get(to) {
                Some(entry) => Toast::moved(&entry.creature, to),
                None => Toast::new(ToastSeverity::Info, "Équipe réordonnée."),
            },
            Err(rejection) => Toast::rejected(&rejection),
        }
    }

    fn clear(&mut self) -> Toast {
        self.session.clear();
        Toast::cleared()
    }

    fn share_url(&self, origin: &str) -> Option<String> {
        let payload = SharePayload::from_ids(&self.session.roster().export_ids());
        (!payload.is_empty()).then(|| payload.to_url(origin))
    }

    fn share_svg(&self, origin: &str) -> Result<Option<String>, WebError> {
        let payload = SharePayload::from_ids(&self.session.roster().export_ids());
        if payload.is_empty() {
            return Ok(None);
        }
        Ok(Some(payload.to_code(origin)?.to_svg()))
    }

    /// Apply the outcome of a batch fetch for `requested` ids.
    fn finish_import(
        &mut self,
        requested: usize,
        fetched: Result<Vec<Creature>, CoreError>,
    ) -> Result<Toast, WebError> {
        let creatures = fetched.inspect_err(|e| {
            tracing::warn!(error = %e, "team import failed, keeping current team");
        })?;
        self.session.replace_with(creatures);
        Ok(Toast::imported(requested))
    }
}

#[wasm_bindgen]
pub struct WebTeam {
    state: Rc<RefCell<TeamState<BrowserStore>>>,
}

#[wasm_bindgen]
impl WebTeam {
    /// Open the team saved in `localStorage`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebTeam, JsValue> {
        let state = TeamState::open(BrowserStore::detect()).map_err(|err| err.to_js_value())?;
        Ok(WebTeam {
            state: Rc::new(RefCell::new(state)),
        })
    }

    pub fn ids(&self) -> Vec<CreatureId> {
        self.state.borrow().session.roster().export_ids()
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.state.borrow().session.roster().contains(id)
    }

    pub fn is_full(&self) -> bool {
        self.state.borrow().session.roster().is_full()
    }

    pub fn members(&self) -> Result<JsValue, JsValue> {
        to_js(&render_json_roster(self.state.borrow().session.roster()))
    }

    pub fn add(&self, record: JsValue) -> Result<JsValue, JsValue> {
        let record: Creature = from_js(record, "record").map_err(|err| err.to_js_value())?;
        to_js(&self.state.borrow_mut().add(record))
    }

    pub fn remove(&self, id: CreatureId) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow_mut().remove(id))
    }

    pub fn reorder(&self, from: usize, to: usize) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow_mut().reorder(from, to))
    }

    pub fn clear(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow_mut().clear())
    }

    pub fn share_url(&self, origin: &str) -> Option<String> {
        self.state.borrow().share_url(origin)
    }

    pub fn share_qr_svg(&self, origin: &str) -> Result<Option<String>, JsValue> {
        self.state
            .borrow()
            .share_svg(origin)
            .map_err(|err| err.to_js_value())
    }

    /// Replace the team with the creatures of a share link. Resolves with a
    /// toast; rejects with `{code, message}` when any fetch fails.
    pub fn import_url(&self, catalog: &WebCatalog, url: &str) -> js_sys::Promise {
        let ids = parse_share_url(url);
        self.import_ids(catalog, ids)
    }

    pub fn import_ids(&self, catalog: &WebCatalog, ids: Vec<CreatureId>) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&catalog.client);
        future_to_promise(async move {
            if ids.is_empty() {
                return to_js(&Toast::nothing_to_import());
            }
            let wanted = &ids[..ids.len().min(MAX_TEAM_SIZE)];
            let fetched = client.fetch_by_ids(wanted).await;
            let toast = state
                .borrow_mut()
                .finish_import(ids.len(), fetched)
                .map_err(|err| err.to_js_value())?;
            to_js(&toast)
        })
    }
}

/// Search input debouncer driven by the page clock (`performance.now()`).
#[wasm_bindgen]
pub struct SearchBox {
    inner: SearchDebouncer,
}

#[wasm_bindgen]
impl SearchBox {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SearchBox {
        SearchBox {
            inner: SearchDebouncer::new(),
        }
    }

    pub fn push(&mut self, text: String, now_ms: f64) {
        self.inner.push(text, clock_ms(now_ms));
    }

    pub fn poll(&mut self, now_ms: f64) -> Option<String> {
        self.inner.poll(clock_ms(now_ms))
    }

    pub fn delay_ms(&self) -> f64 {
        self.inner.delay_ms() as f64
    }

    /// When the pending text becomes due, for arming a timer.
    pub fn due_at(&self) -> Option<f64> {
        self.inner.due_at().map(|due| due as f64)
    }

    /// Hand out the pending text without waiting (Enter key).
    pub fn flush(&mut self) -> Option<String> {
        self.inner.flush()
    }
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifications on screen. The page feeds back the toasts returned by
/// `WebTeam` and redraws from `visible()`.
#[wasm_bindgen]
pub struct ToastTray {
    queue: ToastQueue,
}

#[derive(Debug, Serialize)]
struct TrayEntry<'a> {
    id: u64,
    severity: ToastSeverity,
    message: &'a str,
}

impl ToastTray {
    fn push_toast(&mut self, toast: Toast, now_ms: f64) -> u64 {
        self.queue.push(toast, clock_ms(now_ms))
    }

    fn entries(&self) -> Vec<TrayEntry<'_>> {
        self.queue
            .visible()
            .map(|(id, toast)| TrayEntry {
                id,
                severity: toast.severity,
                message: &toast.message,
            })
            .collect()
    }
}

#[wasm_bindgen]
impl ToastTray {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ToastTray {
        ToastTray {
            queue: ToastQueue::new(),
        }
    }

    pub fn push(&mut self, toast: JsValue, now_ms: f64) -> Result<f64, JsValue> {
        let toast: Toast = from_js(toast, "toast").map_err(|err| err.to_js_value())?;
        Ok(self.push_toast(toast, now_ms) as f64)
    }

    pub fn dismiss(&mut self, id: f64) {
        if id.is_finite() && id >= 0.0 {
            self.queue.dismiss(id as u64);
        }
    }

    pub fn expire(&mut self, now_ms: f64) {
        self.queue.expire(clock_ms(now_ms));
    }

    pub fn visible(&self) -> Result<JsValue, JsValue> {
        to_js(&self.entries())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for ToastTray {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_ms(now_ms: f64) -> u64 {
    if now_ms.is_finite() && now_ms > 0.0 {
        now_ms as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use poketeam_core::core_api::{CoreErrorCode, MemoryStore, RosterRejection};

    use super::*;

    fn fixture_records() -> Vec<Creature> {
        let full_path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join("tests/fixtures/catalog.json");
        let bytes = fs::read(full_path).expect("fixture bytes should be readable");
        serde_json::from_slice(&bytes).expect("fixture should decode")
    }

    fn record(id: CreatureId) -> Creature {
        fixture_records()
            .into_iter()
            .find(|record| record.pokedex_id == id)
            .expect("fixture record")
    }

    #[test]
    fn filter_and_sort_impl_applies_options() {
        let options = WebFilterOptions {
            types: vec!["Feu".to_string()],
            sort: Some("name-desc".to_string()),
            ..WebFilterOptions::default()
        };
        let shown = filter_and_sort_impl(&fixture_records(), &options).expect("valid options");
        let ids: Vec<CreatureId> = shown.iter().map(Creature::id).collect();
        assert_eq!(ids, vec![4, 6]);
    }

    #[test]
    fn filter_and_sort_impl_rejects_unknown_sort_key() {
        let options = WebFilterOptions {
            sort: Some("random".to_string()),
            ..WebFilterOptions::default()
        };
        let err = filter_and_sort_impl(&[], &options).expect_err("unknown key should fail");
        assert_eq!(err.code, "invalid_options");
        assert!(err.message.contains("invalid sort key"));
    }

    #[test]
    fn blank_sort_key_uses_default_order() {
        assert_eq!(parse_sort_key(Some("  ")).expect("blank"), SortKey::IdAsc);
        assert_eq!(parse_sort_key(None).expect("none"), SortKey::IdAsc);
    }

    #[test]
    fn team_state_reports_toasts_and_persists() {
        let store = MemoryStore::new();
        let mut team = TeamState::open(store.clone()).expect("open");

        assert_eq!(team.add(record(25)).severity, ToastSeverity::Success);
        assert_eq!(team.add(record(25)).severity, ToastSeverity::Warning);
        assert_eq!(team.add(record(6)).message, "Dracaufeu ajouté à votre équipe !");
        assert!(store.raw().is_some_and(|raw| raw.contains("\"addedAt\"")));

        let toast = team.reorder(0, 5);
        assert_eq!(toast.severity, ToastSeverity::Warning);
        assert_eq!(team.reorder(1, 0).severity, ToastSeverity::Info);
        assert_eq!(team.session.roster().export_ids(), vec![6, 25]);

        assert_eq!(
            team.share_url("https://poke.test").as_deref(),
            Some("https://poke.test?team=6,25")
        );
        assert!(
            team.share_svg("https://poke.test")
                .expect("encodes")
                .is_some_and(|svg| svg.contains("<svg"))
        );

        assert_eq!(team.remove(6).severity, ToastSeverity::Info);
        assert_eq!(team.remove(6).severity, ToastSeverity::Warning);
        assert_eq!(team.clear().message, "Équipe vidée !");
        assert!(team.share_url("https://poke.test").is_none());
    }

    #[test]
    fn finish_import_replaces_or_keeps_team() {
        let mut team = TeamState::open(MemoryStore::new()).expect("open");
        team.add(record(7));

        let toast = team
            .finish_import(5, Ok(vec![record(25), record(6), record(1), record(1), record(150)]))
            .expect("import applies");
        assert_eq!(toast.message, "Équipe chargée avec 5 Pokémon !");
        assert_eq!(team.session.roster().export_ids(), vec![25, 6, 1, 1, 150]);

        let err = team
            .finish_import(
                2,
                Err(CoreError::new(CoreErrorCode::Network, "offline")),
            )
            .expect_err("failure is surfaced");
        assert_eq!(err.code, "network");
        assert_eq!(team.session.roster().len(), 5);
    }

    #[test]
    fn share_urls_parse_back_to_ids() {
        assert_eq!(parse_share_url("https://poke.test/?team=1%2C4,7"), vec![1, 4, 7]);
        assert!(parse_share_url("https://poke.test/").is_empty());
    }

    #[test]
    fn tray_keeps_team_toasts_until_they_expire() {
        let mut team = TeamState::open(MemoryStore::new()).expect("open");
        let mut tray = ToastTray::new();

        tray.push_toast(team.add(record(25)), 1000.0);
        tray.push_toast(team.add(record(25)), 1500.0);
        let full = tray.push_toast(Toast::rejected(&RosterRejection::Full), 2000.0);

        let entries = tray.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "Pikachu ajouté à votre équipe !");
        assert_eq!(entries[1].severity, ToastSeverity::Warning);

        tray.expire(6000.0);
        let ids: Vec<u64> = tray.entries().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![full]);

        tray.dismiss(full as f64);
        tray.dismiss(f64::NAN);
        assert!(tray.is_empty());
    }

    #[test]
    fn search_box_reports_due_time_and_flushes() {
        let mut search = SearchBox::new();
        assert_eq!(search.due_at(), None);

        search.push("pik".to_string(), 100.0);
        assert_eq!(search.due_at(), Some(400.0));
        assert_eq!(search.poll(200.0), None);
        assert_eq!(search.flush().as_deref(), Some("pik"));
        assert_eq!(search.poll(1000.0), None);
    }

    #[test]
    fn clock_rejects_negative_and_nan() {
        assert_eq!(clock_ms(-5.0), 0);
        assert_eq!(clock_ms(f64::NAN), 0);
        assert_eq!(clock_ms(1234.9), 1234);
    }
}
