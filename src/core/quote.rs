use crate::core::filter::{assess_catalog, is_eligible, OptionAssessment};
use crate::core::form::{FormErrors, SiteForm};
use crate::core::sync::{GeocodeSynchronizer, LocationSnapshot, LookupOutcome, LookupTicket};
use crate::core::wind::estimate_wind;
use crate::domain::model::{FenceOption, SelectionSet, WindEstimate};
use crate::domain::ports::{ForwardGeocoder, MapProvider, ReverseGeocoder};
use crate::utils::error::{FenceError, Result};
use serde::Serialize;

/// What the download action would package. Nothing is written anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadManifest {
    pub label: String,
    pub project_name: String,
    pub postcode: String,
    pub required_height_m: f64,
    pub wind: Option<WindEstimate>,
    pub options: Vec<FenceOption>,
}

pub fn download_label(count: usize) -> String {
    format!(
        "Download {} selected Heras fence option{}",
        count,
        if count == 1 { "" } else { "s" }
    )
}

/// One user's pass through the form: site details, live wind, location and
/// the options picked after submitting.
pub struct QuoteSession<G, M> {
    form: SiteForm,
    locator: GeocodeSynchronizer<G, M>,
    catalog: Vec<FenceOption>,
    wind: Option<WindEstimate>,
    submitted: bool,
    selection: SelectionSet,
}

impl<G, M> QuoteSession<G, M>
where
    G: ForwardGeocoder + ReverseGeocoder,
    M: MapProvider,
{
    pub fn new(locator: GeocodeSynchronizer<G, M>, catalog: Vec<FenceOption>) -> Self {
        Self {
            form: SiteForm::new(),
            locator,
            catalog,
            wind: None,
            submitted: false,
            selection: SelectionSet::new(),
        }
    }

    pub fn form(&self) -> &SiteForm {
        &self.form
    }

    /// Non-postcode fields. The postcode goes through [`Self::edit_postcode`].
    pub fn form_mut(&mut self) -> &mut SiteForm {
        &mut self.form
    }

    pub fn locator(&self) -> &GeocodeSynchronizer<G, M> {
        &self.locator
    }

    pub fn wind(&self) -> Option<&WindEstimate> {
        self.wind.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn catalog(&self) -> &[FenceOption] {
        &self.catalog
    }

    pub async fn location(&self) -> LocationSnapshot {
        self.locator.snapshot().await
    }

    /// Updates the field and live wind, and issues the forward lookup.
    pub async fn edit_postcode(&mut self, raw: &str) -> Option<LookupTicket> {
        self.form.set_postcode(raw);
        self.refresh_wind();
        self.locator.set_postcode(self.form.postcode()).await
    }

    pub async fn resolve(&self, ticket: LookupTicket) -> LookupOutcome {
        self.locator.resolve(ticket).await
    }

    pub async fn update_postcode(&mut self, raw: &str) -> Option<LookupOutcome> {
        let ticket = self.edit_postcode(raw).await?;
        Some(self.resolve(ticket).await)
    }

    /// Applies queued map clicks and drags; a marker landing in another
    /// postcode rewrites the field.
    pub async fn process_map_events(&mut self) -> usize {
        let handled = self.locator.drain_map_events().await;
        let postcode = self.locator.postcode().await;
        if postcode != self.form.postcode() {
            self.form.set_postcode(&postcode);
            self.refresh_wind();
        }
        handled
    }

    fn refresh_wind(&mut self) {
        let postcode = self.form.postcode().trim();
        self.wind = if postcode.is_empty() {
            None
        } else {
            Some(estimate_wind(postcode))
        };
    }

    /// Validates the form. On success the wind is recomputed and any previous
    /// selection is dropped; on failure nothing else changes.
    pub fn submit(&mut self) -> std::result::Result<WindEstimate, FormErrors> {
        self.form.validate()?;
        let wind = estimate_wind(self.form.postcode());
        self.wind = Some(wind);
        self.submitted = true;
        self.selection.clear();
        tracing::info!(
            "✅ Submitted '{}' at {}: {:.0} m/s, {:.3} kPa",
            self.form.project_name,
            self.form.postcode(),
            wind.speed_ms,
            wind.pressure_kpa
        );
        Ok(wind)
    }

    pub fn options(&self) -> Vec<OptionAssessment<'_>> {
        assess_catalog(&self.catalog, self.wind.as_ref(), self.form.required_height_m())
    }

    /// Toggles an option. Ineligible options are left alone and report `false`.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let option = self
            .catalog
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| FenceError::ValidationError {
                message: format!("Unknown fence option '{}'", id),
            })?;

        if !is_eligible(option, self.wind.as_ref(), self.form.required_height_m()) {
            tracing::debug!("Option {} is not applicable, selection unchanged", id);
            return Ok(false);
        }
        Ok(self.selection.toggle(id))
    }

    pub fn download_manifest(&self) -> Result<DownloadManifest> {
        if self.selection.is_empty() {
            return Err(FenceError::ValidationError {
                message: "Select at least one fence option to download.".to_string(),
            });
        }

        let options: Vec<FenceOption> = self
            .catalog
            .iter()
            .filter(|o| self.selection.contains(&o.id))
            .cloned()
            .collect();

        Ok(DownloadManifest {
            label: download_label(options.len()),
            project_name: self.form.project_name.clone(),
            postcode: self.form.postcode().to_string(),
            required_height_m: self.form.required_height_m(),
            wind: self.wind,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::map::HeadlessMap;
    use crate::core::filter::default_catalog;
    use crate::core::form::FenceHeight;
    use crate::domain::model::{GeoCandidate, LatLon, ReverseAddress};
    use async_trait::async_trait;

    struct FixedGeocoder;

    #[async_trait]
    impl ForwardGeocoder for FixedGeocoder {
        async fn search_postcode(&self, postcode: &str) -> Result<Vec<GeoCandidate>> {
            Ok(vec![GeoCandidate {
                position: LatLon::new(51.46, -0.14),
                display_label: format!("{}, London", postcode),
            }])
        }
    }

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse(&self, _at: LatLon) -> Result<ReverseAddress> {
            Ok(ReverseAddress {
                postcode: Some("SW9 6AA".to_string()),
            })
        }
    }

    fn session() -> (QuoteSession<FixedGeocoder, HeadlessMap>, HeadlessMap) {
        let map = HeadlessMap::default();
        let locator = GeocodeSynchronizer::new(FixedGeocoder, map.clone());
        (QuoteSession::new(locator, default_catalog()), map)
    }

    #[tokio::test]
    async fn test_live_wind_follows_postcode() {
        let (mut session, _) = session();
        assert!(session.wind().is_none());

        session.update_postcode("sw4 6qd").await;
        assert_eq!(session.form().postcode(), "SW4 6QD");
        assert_eq!(session.wind().unwrap().pressure_kpa, 0.149);

        session.update_postcode("").await;
        assert!(session.wind().is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_state() {
        let (mut session, _) = session();
        session.update_postcode("not a postcode").await;
        let wind_before = session.wind().copied();
        let location_before = session.location().await;

        let errors = session.submit().unwrap_err();
        assert!(errors.project_name.is_some());
        assert!(errors.postcode.is_some());
        assert!(!session.is_submitted());
        assert_eq!(session.wind().copied(), wind_before);
        assert_eq!(session.location().await, location_before);
    }

    #[tokio::test]
    async fn test_submit_selection_and_download() {
        let (mut session, _) = session();
        session.form_mut().project_name = "Longreach STW – Perimeter".to_string();
        session.form_mut().height = FenceHeight::M2_4;
        session.update_postcode("SW4 6QD").await;

        session.submit().unwrap();
        assert!(session.download_manifest().is_err());

        // A is too weak and too short, B too short for 2.4 m
        assert!(!session.toggle("A").unwrap());
        assert!(!session.toggle("B").unwrap());
        assert!(session.toggle("C").unwrap());
        assert!(session.toggle("F").unwrap());
        assert!(session.toggle("Q").is_err());

        let manifest = session.download_manifest().unwrap();
        assert_eq!(manifest.label, "Download 2 selected Heras fence options");
        let ids: Vec<&str> = manifest.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "F"]);
        assert_eq!(manifest.required_height_m, 2.4);

        // resubmitting clears the selection
        session.submit().unwrap();
        assert!(session.selection().is_empty());
    }

    #[tokio::test]
    async fn test_map_click_rewrites_form_postcode() {
        let (mut session, map) = session();
        session.update_postcode("SW4 6QD").await;

        assert!(map.click(LatLon::new(51.47, -0.11)));
        assert_eq!(session.process_map_events().await, 1);

        assert_eq!(session.form().postcode(), "SW9 6AA");
        let location = session.location().await;
        assert_eq!(location.geo.unwrap().display_label, "SW96AA, London");
    }

    #[test]
    fn test_download_label() {
        assert_eq!(download_label(0), "Download 0 selected Heras fence options");
        assert_eq!(download_label(1), "Download 1 selected Heras fence option");
    }
}
