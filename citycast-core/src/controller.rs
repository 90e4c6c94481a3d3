//! Lookup orchestration and the state the presentation layer renders.
//!
//! Every trigger (startup, search, history replay, refresh) moves the state to
//! loading and hands back a [`LookupTicket`]. The caller executes the ticket,
//! either with [`LookupController::run`] or on its own executor followed by
//! [`LookupController::complete`]. Only the most recently issued ticket may
//! change state; results for older tickets are dropped.

use crate::{
    client::WeatherSource,
    error::LookupError,
    history::RecentSearches,
    model::{CityQuery, CurrentConditions, ForecastSample, Lookup, daily_forecast},
    store::KeyValueStore,
};

/// Shown whenever a lookup fails, whatever the cause.
pub const LOOKUP_FAILED_MESSAGE: &str = "City not found or API error.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupState {
    pub current_city: CityQuery,
    pub is_loading: bool,
    pub error: Option<String>,
    pub current: Option<CurrentConditions>,
    pub daily_forecast: Vec<ForecastSample>,
}

impl LookupState {
    fn new(current_city: CityQuery) -> Self {
        Self {
            current_city,
            is_loading: false,
            error: None,
            current: None,
            daily_forecast: Vec::new(),
        }
    }

    pub fn phase(&self) -> LookupPhase {
        if self.is_loading {
            LookupPhase::Loading
        } else if self.error.is_some() {
            LookupPhase::Failed
        } else if self.current.is_some() {
            LookupPhase::Ready
        } else {
            LookupPhase::Idle
        }
    }
}

/// A started lookup. Only the ticket with the latest generation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub generation: u64,
    pub query: CityQuery,
}

#[derive(Debug)]
pub struct LookupController<W, S> {
    source: W,
    store: S,
    state: LookupState,
    history: RecentSearches,
    input: String,
    theme: Theme,
    generation: u64,
}

impl<W: WeatherSource, S: KeyValueStore> LookupController<W, S> {
    /// Seeds the recent searches from `store`. No lookup is started until
    /// [`start`](Self::start).
    pub fn new(source: W, store: S, default_city: CityQuery) -> Self {
        let history = RecentSearches::load(&store);
        tracing::debug!(entries = history.len(), "loaded recent searches");

        Self {
            source,
            store,
            state: LookupState::new(default_city),
            history,
            input: String::new(),
            theme: Theme::default(),
            generation: 0,
        }
    }

    /// Initial lookup for the default city.
    pub fn start(&mut self) -> LookupTicket {
        self.trigger()
    }

    /// Search for `input`. Blank input changes nothing.
    pub fn search(&mut self, input: &str) -> Option<LookupTicket> {
        let city = CityQuery::parse(input)?;

        self.state.current_city = city.clone();
        self.input.clear();
        self.history.record(city);
        self.save_history();

        Some(self.trigger())
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Search for whatever is in the input field.
    pub fn submit_input(&mut self) -> Option<LookupTicket> {
        let input = self.input.clone();
        self.search(&input)
    }

    /// Look up a recent search again. History order is left alone.
    pub fn select_history(&mut self, index: usize) -> Option<LookupTicket> {
        let city = self.history.get(index)?.clone();
        self.state.current_city = city;
        Some(self.trigger())
    }

    /// Look up the current city again without touching history.
    pub fn refresh(&mut self) -> LookupTicket {
        self.trigger()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Err(e) = RecentSearches::forget(&mut self.store) {
            tracing::warn!(error = %e, "failed to remove persisted recent searches");
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        self.theme
    }

    /// Apply the outcome of `ticket`. Returns `false` when a newer lookup has
    /// been started since, in which case state is untouched.
    pub fn complete(&mut self, ticket: LookupTicket, result: Result<Lookup, LookupError>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                city = %ticket.query,
                generation = ticket.generation,
                latest = self.generation,
                "dropping stale lookup result"
            );
            return false;
        }

        match result {
            Ok(lookup) => {
                tracing::info!(city = %ticket.query, samples = lookup.forecast.len(), "lookup succeeded");
                self.state.daily_forecast = daily_forecast(&lookup.forecast);
                self.state.current = Some(lookup.current);
                self.state.error = None;
            }
            Err(e) => {
                tracing::warn!(city = %ticket.query, error = ?e, "lookup failed");
                self.state.error = Some(LOOKUP_FAILED_MESSAGE.to_string());
                self.state.current = None;
                self.state.daily_forecast.clear();
            }
        }
        self.state.is_loading = false;
        true
    }

    /// Execute `ticket` against the weather source and apply the result.
    pub async fn run(&mut self, ticket: LookupTicket) -> bool {
        let result = self.source.lookup(&ticket.query).await;
        self.complete(ticket, result)
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn recent_searches(&self) -> &RecentSearches {
        &self.history
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn trigger(&mut self) -> LookupTicket {
        self.generation += 1;
        self.state.is_loading = true;
        self.state.error = None;

        tracing::debug!(city = %self.state.current_city, generation = self.generation, "lookup started");

        LookupTicket {
            generation: self.generation,
            query: self.state.current_city.clone(),
        }
    }

    fn save_history(&mut self) {
        if let Err(e) = self.history.persist(&mut self.store) {
            tracing::warn!(error = %e, "failed to persist recent searches");
        }
    }
}
