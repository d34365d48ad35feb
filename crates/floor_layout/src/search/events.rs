//! Event types and sinks for observing search runs.
//!
//! This module defines [`SearchEvent`] and a set of sinks to emit or collect events while
//! a [`crate::search::engine::SearchEngine`] runs.
use crate::search::engine::SearchConfig;

/// Describes events emitted by the search engine.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// Emitted once the initial population has been built, before it is evaluated.
    RunStarted {
        /// The search configuration used.
        config: SearchConfig,
        /// Number of candidate sites.
        site_count: usize,
        /// Objects placed per candidate.
        object_count: usize,
    },

    /// Emitted after each generation has been ranked and truncated.
    ///
    /// Generation `0` is the evaluated initial population.
    GenerationFinished {
        generation: usize,
        /// Feasible individuals in the surviving population.
        feasible: usize,
        /// Size of the first front.
        front_size: usize,
        /// Smallest distance objective among feasible individuals, if any.
        best_distance: Option<f64>,
        /// Evaluations performed so far.
        evaluations: usize,
    },

    /// Emitted when a checkpoint was handed to the sink successfully.
    CheckpointWritten {
        generation: usize,
        /// Number of solutions in the checkpoint.
        solutions: usize,
        /// Sink-specific description of where it went.
        target: String,
    },

    /// Emitted when a checkpoint could not be written; the run continues.
    CheckpointFailed { generation: usize, message: String },

    /// Emitted when the run ends, either by budget or by cancellation.
    RunFinished {
        generations: usize,
        evaluations: usize,
        archive_size: usize,
        cancelled: bool,
    },

    /// Non-fatal warning generated during the search.
    Warning {
        /// Context string (e.g. `"init"`).
        context: String,
        message: String,
    },
}

/// Discriminant of a [`SearchEvent`], used by sinks to opt out of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEventKind {
    RunStarted,
    GenerationFinished,
    CheckpointWritten,
    CheckpointFailed,
    RunFinished,
    Warning,
}

impl SearchEvent {
    pub fn kind(&self) -> SearchEventKind {
        match self {
            SearchEvent::RunStarted { .. } => SearchEventKind::RunStarted,
            SearchEvent::GenerationFinished { .. } => SearchEventKind::GenerationFinished,
            SearchEvent::CheckpointWritten { .. } => SearchEventKind::CheckpointWritten,
            SearchEvent::CheckpointFailed { .. } => SearchEventKind::CheckpointFailed,
            SearchEvent::RunFinished { .. } => SearchEventKind::RunFinished,
            SearchEvent::Warning { .. } => SearchEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`SearchEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: SearchEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: SearchEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = SearchEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SearchEvent) {}

    #[inline]
    fn wants(&self, _kind: SearchEventKind) -> bool {
        false
    }
}

/// Forwards each event to a closure.
pub struct FnSink<F>
where
    F: FnMut(SearchEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(SearchEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(SearchEvent),
{
    #[inline]
    fn send(&mut self, event: SearchEvent) {
        (self.f)(event);
    }
}

/// Collects every event in memory; mostly useful in tests.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SearchEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of collected events of the given kind.
    pub fn count(&self, kind: SearchEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SearchEvent) {
        self.events.push(event);
    }
}
