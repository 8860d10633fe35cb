use crate::debounce::{QueryDebouncer, SettledInput};
use crate::distance::haversine_km;
use crate::normalize::normalize_hits;
use crate::options::SearchOptions;
use crate::ranking::rank;
use crate::traits::{GeocodeRequest, Geocoder};
use crate::{Coordinate, GeocodeError, RawHit, SearchCandidate, SearchStatus, SelectedLocation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub type SelectionHandler = Box<dyn FnMut(&SelectedLocation) + Send>;

/// Live query state. `generation` advances on every dispatch and whenever
/// in-flight work is invalidated; only a response tagged with the current
/// generation may change published results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSession {
    pub query_text: String,
    pub generation: u64,
    pub status: SearchStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResultsView {
    #[default]
    Hidden,
    Loading,
    Results,
    NoResults,
}

/// What subscribers see after every state change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub session: SearchSession,
    pub candidates: Vec<SearchCandidate>,
    pub view: ResultsView,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct GeocodeResponse {
    pub generation: u64,
    pub result: Result<Vec<RawHit>, GeocodeError>,
}

#[derive(Debug)]
pub enum ControllerEvent {
    Settled(SettledInput),
    Response(GeocodeResponse),
}

/// Aborts the request task when dropped.
#[derive(Debug)]
struct InFlight {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct ProximitySearchController<G: ?Sized> {
    geocoder: Arc<G>,
    options: SearchOptions,
    reference: Option<Coordinate>,
    session: SearchSession,
    candidates: Vec<SearchCandidate>,
    list_open: bool,
    last_error: Option<String>,
    debouncer: QueryDebouncer,
    settled_rx: mpsc::UnboundedReceiver<SettledInput>,
    handled_input_seq: u64,
    response_tx: mpsc::UnboundedSender<GeocodeResponse>,
    response_rx: mpsc::UnboundedReceiver<GeocodeResponse>,
    in_flight: Vec<InFlight>,
    snapshot_tx: watch::Sender<SearchSnapshot>,
    on_selected: Option<SelectionHandler>,
}

impl<G> ProximitySearchController<G>
where
    G: Geocoder + Send + Sync + ?Sized + 'static,
{
    pub fn new(geocoder: Arc<G>, options: SearchOptions) -> Self {
        let (debouncer, settled_rx) =
            QueryDebouncer::new(options.debounce(), options.min_query_chars);
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(SearchSnapshot::default());

        Self {
            geocoder,
            options,
            reference: None,
            session: SearchSession::default(),
            candidates: Vec::new(),
            list_open: false,
            last_error: None,
            debouncer,
            settled_rx,
            handled_input_seq: 0,
            response_tx,
            response_rx,
            in_flight: Vec::new(),
            snapshot_tx,
            on_selected: None,
        }
    }

    pub fn with_reference_position(mut self, reference: Option<Coordinate>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_selection_handler(
        mut self,
        handler: impl FnMut(&SelectedLocation) + Send + 'static,
    ) -> Self {
        self.on_selected = Some(Box::new(handler));
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn candidates(&self) -> &[SearchCandidate] {
        &self.candidates
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            session: self.session.clone(),
            candidates: self.candidates.clone(),
            view: self.results_view(),
            last_error: self.last_error.clone(),
        }
    }

    /// Number of request tasks that have not finished yet.
    pub fn in_flight_requests(&self) -> usize {
        self.in_flight
            .iter()
            .filter(|request| !request.handle.is_finished())
            .count()
    }

    pub fn results_view(&self) -> ResultsView {
        if self.session.query_text.is_empty() || !self.list_open {
            return ResultsView::Hidden;
        }
        match self.session.status {
            SearchStatus::Pending => ResultsView::Loading,
            _ if !self.candidates.is_empty() => ResultsView::Results,
            SearchStatus::Settled | SearchStatus::Failed
                if self.options.is_searchable(&self.session.query_text) =>
            {
                ResultsView::NoResults
            }
            _ => ResultsView::Hidden,
        }
    }

    /// Shows the new text immediately and hands it to the debouncer.
    pub fn on_input_changed(&mut self, text: &str) {
        self.session.query_text = text.to_string();
        self.list_open = !text.is_empty();
        self.debouncer.push(text);
        self.publish();
    }

    pub fn on_focus(&mut self) {
        self.list_open = !self.session.query_text.is_empty();
        self.publish();
    }

    /// Closes the list, shows the candidate's label and reports the pick.
    pub fn on_candidate_selected(&mut self, candidate: &SearchCandidate) -> SelectedLocation {
        let selection = SelectedLocation {
            coordinate: candidate.coordinate,
            label: candidate.display_name.clone(),
        };

        self.debouncer.stop();
        self.handled_input_seq = self.debouncer.current_seq();
        self.invalidate_in_flight();
        self.session.query_text = selection.label.clone();
        self.session.status = SearchStatus::Idle;
        self.list_open = false;
        self.candidates.clear();

        if let Some(handler) = self.on_selected.as_mut() {
            handler(&selection);
        }
        info!(label = %selection.label, "location selected");
        self.publish();
        selection
    }

    /// Updates the reference position and re-ranks what is on screen.
    pub fn set_reference_position(&mut self, reference: Option<Coordinate>) {
        self.reference = reference;
        let candidates = std::mem::take(&mut self.candidates)
            .into_iter()
            .map(|mut candidate| {
                candidate.distance_km =
                    reference.map(|origin| haversine_km(origin, candidate.coordinate));
                candidate
            })
            .collect();
        self.candidates = rank(candidates, reference);
        self.publish();
    }

    /// Waits for the next settled input or geocoder response.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        tokio::select! {
            Some(input) = self.settled_rx.recv() => Some(ControllerEvent::Settled(input)),
            Some(response) = self.response_rx.recv() => Some(ControllerEvent::Response(response)),
            else => None,
        }
    }

    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Settled(input) => self.on_settled(input),
            ControllerEvent::Response(response) => {
                self.apply_response(response);
            }
        }
    }

    /// Processes one event; false once no more events can arrive.
    pub async fn process_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Drives events until the latest input has been handled and no
    /// current-generation request is outstanding.
    pub async fn settle(&mut self) -> SearchSnapshot {
        while !self.is_quiescent() {
            if !self.process_next().await {
                break;
            }
        }
        self.snapshot()
    }

    /// Tears down timers and request tasks. Nothing is published afterwards
    /// for work started before the call.
    pub fn shutdown(&mut self) {
        self.debouncer.stop();
        self.handled_input_seq = self.debouncer.current_seq();
        self.invalidate_in_flight();
        if self.session.status == SearchStatus::Pending {
            self.session.status = SearchStatus::Idle;
        }
        debug!("search controller shut down");
    }

    fn is_quiescent(&self) -> bool {
        self.debouncer.is_latest(self.handled_input_seq)
            && self.session.status != SearchStatus::Pending
    }

    fn on_settled(&mut self, input: SettledInput) {
        if !self.debouncer.is_latest(input.seq) {
            debug!(seq = input.seq, "dropping superseded settled input");
            return;
        }
        self.handled_input_seq = input.seq;

        if !input.searchable {
            self.invalidate_in_flight();
            self.session.status = SearchStatus::Idle;
            self.candidates.clear();
            self.last_error = None;
            self.publish();
            return;
        }

        self.dispatch(input.text);
    }

    fn dispatch(&mut self, query: String) {
        if self.options.cancel_superseded {
            self.in_flight.clear();
        } else {
            self.in_flight.retain(|request| !request.handle.is_finished());
        }

        self.session.generation += 1;
        self.session.status = SearchStatus::Pending;
        self.last_error = None;
        let generation = self.session.generation;

        let request = GeocodeRequest {
            query,
            country_filter: self.options.country_filter.clone(),
            limit: self.options.result_limit,
            language: Some(self.options.language.clone()).filter(|language| !language.is_empty()),
        };
        info!(generation, query = %request.query, "dispatching geocode request");

        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.response_tx.clone();
        let timeout = self.options.request_timeout();
        let handle = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, geocoder.fetch(&request)).await {
                Ok(result) => result,
                Err(_) => Err(GeocodeError::Network(format!(
                    "request timed out after {} ms",
                    timeout.as_millis()
                ))),
            };
            let _ = tx.send(GeocodeResponse { generation, result });
        });

        self.in_flight.push(InFlight { generation, handle });
        self.publish();
    }

    /// Applies a geocoder response if it belongs to the current generation.
    /// Returns false when the response was stale and ignored.
    pub fn apply_response(&mut self, response: GeocodeResponse) -> bool {
        self.in_flight.retain(|request| request.generation != response.generation);

        if response.generation != self.session.generation {
            debug!(
                generation = response.generation,
                current = self.session.generation,
                "discarding stale geocode response"
            );
            return false;
        }

        match response.result {
            Ok(hits) => {
                let candidates = normalize_hits(hits, self.reference);
                self.candidates = rank(candidates, self.reference);
                self.session.status = SearchStatus::Settled;
                self.last_error = None;
                debug!(
                    generation = response.generation,
                    results = self.candidates.len(),
                    "geocode results published"
                );
            }
            Err(error) => {
                warn!(generation = response.generation, error = %error, "geocode request failed");
                self.candidates.clear();
                self.session.status = SearchStatus::Failed;
                self.last_error = Some(error.to_string());
            }
        }

        self.publish();
        true
    }

    /// Retires the current generation so replies still queued for it,
    /// finished or not, are discarded.
    fn invalidate_in_flight(&mut self) {
        self.session.generation += 1;
        self.in_flight.clear();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}
