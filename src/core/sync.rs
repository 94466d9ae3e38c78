//! Keeps the postcode field and the map marker in step.
//!
//! Every postcode edit bumps a generation counter and hands back a
//! [`LookupTicket`]. Only a ticket whose generation is still current may commit
//! its forward-geocode result; older responses are dropped when they arrive.
//! Marker drags and map clicks run a reverse lookup and feed a differing
//! postcode back through the same edit path.

use crate::core::wind::normalize_postcode;
use crate::domain::model::{GeoPoint, LatLon, LocationError, MapEvent, MarkerId};
use crate::domain::ports::{ForwardGeocoder, MapHandler, MapProvider, ReverseGeocoder};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Mutex;

pub const DEFAULT_ZOOM: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Resolving,
    Resolved,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    pub postcode: String,
    pub phase: SyncPhase,
    pub geo: Option<GeoPoint>,
    pub error: Option<LocationError>,
    pub map_ready: bool,
    pub generation: u64,
}

/// A forward lookup issued for one postcode edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    postcode: String,
}

impl LookupTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Normalized postcode sent to the geocoder.
    pub fn postcode(&self) -> &str {
        &self.postcode
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Applied(GeoPoint),
    NotFound,
    Failed,
    /// A newer edit was issued before this response arrived.
    Superseded,
}

struct SyncState<M> {
    postcode: String,
    generation: u64,
    phase: SyncPhase,
    geo: Option<GeoPoint>,
    error: Option<LocationError>,
    map: M,
    map_ready: bool,
    marker: Option<MarkerId>,
}

impl<M: MapProvider> SyncState<M> {
    /// Value-equality guard: an unchanged field issues nothing.
    fn apply_postcode(&mut self, raw: &str) -> Option<LookupTicket> {
        if self.postcode == raw {
            return None;
        }
        self.postcode = raw.to_string();
        self.generation += 1;

        let normalized = normalize_postcode(raw);
        if normalized.is_empty() {
            self.phase = SyncPhase::Idle;
            self.geo = None;
            self.error = None;
            if let Some(marker) = self.marker.take() {
                self.map.remove_marker(marker);
            }
            return None;
        }

        self.phase = SyncPhase::Resolving;
        self.error = None;
        Some(LookupTicket {
            generation: self.generation,
            postcode: normalized,
        })
    }

    fn fail(&mut self, error: LocationError) {
        self.phase = SyncPhase::Error;
        self.geo = None;
        self.error = Some(error);
    }

    fn snapshot(&self) -> LocationSnapshot {
        LocationSnapshot {
            postcode: self.postcode.clone(),
            phase: self.phase,
            geo: self.geo.clone(),
            error: self.error,
            map_ready: self.map_ready,
            generation: self.generation,
        }
    }
}

pub struct GeocodeSynchronizer<G, M> {
    geocoder: G,
    state: Mutex<SyncState<M>>,
    events_tx: MapHandler,
    events_rx: Mutex<UnboundedReceiver<MapEvent>>,
    zoom: u8,
}

impl<G, M> GeocodeSynchronizer<G, M>
where
    G: ForwardGeocoder + ReverseGeocoder,
    M: MapProvider,
{
    pub fn new(geocoder: G, map: M) -> Self {
        Self::with_zoom(geocoder, map, DEFAULT_ZOOM)
    }

    pub fn with_zoom(geocoder: G, map: M, zoom: u8) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            geocoder,
            state: Mutex::new(SyncState {
                postcode: String::new(),
                generation: 0,
                phase: SyncPhase::Idle,
                geo: None,
                error: None,
                map,
                map_ready: false,
                marker: None,
            }),
            events_tx,
            events_rx: Mutex::new(events_rx),
            zoom,
        }
    }

    pub async fn snapshot(&self) -> LocationSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn postcode(&self) -> String {
        self.state.lock().await.postcode.clone()
    }

    /// Records a field edit. Returns the lookup to run, or `None` when the value
    /// is unchanged or blank.
    pub async fn set_postcode(&self, raw: &str) -> Option<LookupTicket> {
        let mut state = self.state.lock().await;
        let ticket = state.apply_postcode(raw);
        match &ticket {
            Some(ticket) => tracing::debug!(
                "Postcode edit #{} -> resolving '{}'",
                ticket.generation,
                ticket.postcode
            ),
            None if state.phase == SyncPhase::Idle => {
                tracing::debug!("Postcode cleared, location idle")
            }
            None => {}
        }
        ticket
    }

    /// Runs the forward lookup for `ticket` and commits it if still current.
    pub async fn resolve(&self, ticket: LookupTicket) -> LookupOutcome {
        tracing::debug!("Forward geocode #{} for '{}'", ticket.generation, ticket.postcode);
        let result = self.geocoder.search_postcode(&ticket.postcode).await;

        let mut state = self.state.lock().await;
        if state.generation != ticket.generation {
            tracing::debug!(
                "Discarding stale lookup #{} for '{}' (current #{})",
                ticket.generation,
                ticket.postcode,
                state.generation
            );
            return LookupOutcome::Superseded;
        }

        let candidates = match result {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("⚠️ Forward geocode failed for '{}': {}", ticket.postcode, e);
                state.fail(LocationError::FetchFailed);
                return LookupOutcome::Failed;
            }
        };

        let Some(first) = candidates.into_iter().next() else {
            tracing::info!("📍 No location found for '{}'", ticket.postcode);
            state.fail(LocationError::NotFound);
            return LookupOutcome::NotFound;
        };

        let geo = GeoPoint {
            position: first.position,
            display_label: first.display_label,
        };
        state.geo = Some(geo.clone());
        state.error = None;
        state.phase = SyncPhase::Resolved;
        tracing::info!("📍 '{}' resolved to {}", ticket.postcode, geo.position);

        self.show_on_map(&mut state, geo.position);
        LookupOutcome::Applied(geo)
    }

    /// Convenience for callers that do not interleave edits.
    pub async fn edit_and_resolve(&self, raw: &str) -> Option<LookupOutcome> {
        let ticket = self.set_postcode(raw).await?;
        Some(self.resolve(ticket).await)
    }

    /// Reverse-geocodes a marker drag or map click. A postcode different from
    /// the field overwrites it and the returned ticket restarts the forward
    /// flow. Reverse failures are ignored and leave the marker where it is.
    pub async fn handle_map_event(&self, event: MapEvent) -> Option<LookupTicket> {
        let at = event.position();
        let generation = {
            let mut state = self.state.lock().await;
            if !state.map_ready {
                tracing::debug!("Map event before map initialised, ignoring");
                return None;
            }
            if state.phase == SyncPhase::Idle {
                tracing::debug!("Map event at {} with a blank postcode, ignoring", at);
                return None;
            }
            if let MapEvent::Click(_) = event {
                self.upsert_marker(&mut state, at);
            }
            state.generation
        };

        let address = match self.geocoder.reverse(at).await {
            Ok(address) => address,
            Err(e) => {
                tracing::debug!("Reverse geocode at {} failed, ignoring: {}", at, e);
                return None;
            }
        };
        let postcode = address
            .postcode
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())?;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!("Reverse result for {} arrived after a newer edit, ignoring", at);
            return None;
        }
        if normalize_postcode(&postcode) == normalize_postcode(&state.postcode) {
            tracing::debug!("Marker at {} is still in '{}'", at, state.postcode);
            return None;
        }

        tracing::info!("🔁 Marker moved into '{}', updating postcode", postcode);
        state.apply_postcode(&postcode)
    }

    /// Handles every queued map event, resolving any postcode change it causes.
    pub async fn drain_map_events(&self) -> usize {
        let mut handled = 0;
        loop {
            let next = self.events_rx.lock().await.try_recv();
            let Ok(event) = next else {
                break;
            };
            handled += 1;
            if let Some(ticket) = self.handle_map_event(event).await {
                self.resolve(ticket).await;
            }
        }
        handled
    }

    fn show_on_map(&self, state: &mut SyncState<M>, center: LatLon) {
        if state.map_ready {
            state.map.set_view(center, self.zoom);
        } else {
            if let Err(e) = state.map.initialize(center, self.zoom) {
                tracing::warn!("⚠️ Map could not be initialised: {}", e);
                state.error = Some(LocationError::MapUnavailable);
                return;
            }
            state.map.on_map_click(self.events_tx.clone());
            state.map_ready = true;
        }
        state.map.invalidate_size();
        self.upsert_marker(state, center);
    }

    fn upsert_marker(&self, state: &mut SyncState<M>, position: LatLon) {
        if let Some(previous) = state.marker.take() {
            state.map.remove_marker(previous);
        }
        let label = state.postcode.clone();
        let marker = state.map.add_marker(position, true, &label);
        state.map.on_marker_drag_end(marker, self.events_tx.clone());
        state.marker = Some(marker);
    }
}
