//! Crawler coordinator - main crawl orchestration logic
//!
//! A crawl is a handful of single-owner tasks connected by channels:
//! - the dedup processor owns the visited set and is the only reader of
//!   the pending queue; unseen targets go on to the dispatch queue
//! - the termination monitor owns the in-flight count and stops every
//!   worker when it returns to zero
//! - the results collector gathers per-page results
//! - worker loops pull from the dispatch queue and spawn one fetch task
//!   per target
//!
//! In-flight accounting: every target is counted (+1) before it is put on
//! the pending queue and uncounted (-1) exactly once, when dedup drops it,
//! when a ceiling rejects it, or after its fetch task has queued its
//! children and sent its result.

use crate::config::{validate_crawler_config, validate_root_url, validate_rules, CrawlOptions, CrawlerConfig};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::health::{liveness_check, readiness_check, LivenessProbe};
use crate::crawler::metrics::MetricsRecorder;
use crate::crawler::pool::{TaskGauge, WorkerRegistry};
use crate::crawler::types::{CrawlResponse, CrawlTarget, WorkerResult};
use crate::crawler::worker::{PageScraper, RuleSet};
use crate::extract::{ItemRule, UrlRule};
use crate::robots::load_restrictions;
use crate::state::{CrawlState, StateTracker};
use crate::url::dedup_key;
use crate::{HealthError, Result, TrawlerError};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

/// Main crawler structure
///
/// Holds the validated options and the shared HTTP client. Each call to
/// [`Crawler::crawl`] is an independent crawl with its own visited set,
/// metrics and worker pool.
#[derive(Debug, Clone)]
pub struct Crawler {
    options: CrawlOptions,
    client: Client,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Options are valid and the HTTP client was built
    /// * `Err(TrawlerError)` - Invalid options or client construction failed
    pub fn new(options: CrawlOptions) -> Result<Self> {
        validate_crawler_config(&options.crawler)?;
        let client = build_http_client(&options.request)?;
        Ok(Self { options, client })
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Crawls from `root_url` and returns every page result
    ///
    /// All-or-nothing: a transport error on any page, or a failed health
    /// check, stops the worker pool and returns the error without partial
    /// results.
    ///
    /// # Arguments
    ///
    /// * `root_url` - Absolute HTTP(S) URL to start from (depth 0)
    /// * `item_rules` - Item rules, possibly empty
    /// * `url_rules` - URL rules; empty means every `href` is followed
    pub async fn crawl(
        &self,
        root_url: &str,
        item_rules: Vec<ItemRule>,
        url_rules: Vec<UrlRule>,
    ) -> Result<CrawlResponse> {
        let state = StateTracker::new();
        let config = &self.options.crawler;

        validate_root_url(root_url)?;
        validate_crawler_config(config)?;
        validate_rules(&item_rules, &url_rules)?;
        let root = Url::parse(root_url)?;

        info!(
            "Starting crawl of {} (max depth {}, {} workers)",
            root_url, config.max_depth, config.worker_count
        );

        let restrictions = Arc::new(load_restrictions(&self.client, &root, &self.options.request).await);
        let scraper = Arc::new(PageScraper::new(
            self.client.clone(),
            self.options.request.clone(),
            Arc::new(RuleSet::new(item_rules, url_rules)),
            restrictions,
        ));

        let (pending_tx, pending_rx) = mpsc::unbounded_channel::<CrawlTarget>();
        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel::<CrawlTarget>();
        let (in_flight_tx, in_flight_rx) = mpsc::unbounded_channel::<i64>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<WorkerResult>();
        let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel::<TrawlerError>();
        let (health_tx, mut health_rx) = mpsc::unbounded_channel::<HealthError>();

        let frontier = Frontier {
            pending: pending_tx,
            in_flight: in_flight_tx.clone(),
        };
        let registry = WorkerRegistry::new();
        let tasks = TaskGauge::new();
        let metrics = MetricsRecorder::new(root_url);

        state.advance(CrawlState::Seeding)?;
        if !frontier.enqueue(CrawlTarget::root(root_url, config.max_depth)) {
            return Err(TrawlerError::ChannelClosed("pending targets"));
        }
        state.advance(CrawlState::Running)?;

        tokio::spawn(run_dedup_processor(
            pending_rx,
            dispatch_tx.clone(),
            in_flight_tx,
            metrics.clone(),
        ));
        tokio::spawn(run_termination_monitor(
            in_flight_rx,
            registry.clone(),
            state.clone(),
        ));
        let collector = tokio::spawn(collect_results(result_rx));

        let context = WorkerContext {
            scraper,
            frontier: frontier.clone(),
            dispatch: Arc::new(Mutex::new(dispatch_rx)),
            requeue: dispatch_tx,
            results: result_tx,
            fatal: fatal_tx,
            metrics: metrics.clone(),
            tasks: tasks.clone(),
            registry: registry.clone(),
            fetch_budget: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config.clone()),
        };
        let workers: Vec<JoinHandle<()>> = (0..config.worker_count)
            .map(|id| tokio::spawn(run_worker(id, context.clone())))
            .collect();
        drop(context);
        drop(frontier);

        let health = &self.options.health;
        let ready = tokio::select! {
            biased;
            Some(e) = fatal_rx.recv() => Err(e),
            checked = readiness_check(&registry, config.worker_count, health.readiness_grace()) => {
                checked.map_err(TrawlerError::from)
            }
        };
        if let Err(e) = ready {
            error!("Crawl of {} aborted: {}", root_url, e);
            abort(&state, &registry, join_workers(workers)).await;
            collector.abort();
            return Err(e);
        }

        let liveness = {
            let probe = LivenessProbe {
                floor: config.worker_count,
                interval: health.liveness_interval(),
                window: health.liveness_window(),
            };
            let registry = registry.clone();
            let tasks = tasks.clone();
            let metrics = metrics.clone();
            tokio::spawn(async move {
                if let Some(e) = liveness_check(probe, registry.clone(), tasks, metrics).await {
                    error!("{}", e);
                    let _ = health_tx.send(e);
                    registry.stop_all();
                }
            })
        };

        let mut workers_done = Box::pin(join_workers(workers));
        let failure = tokio::select! {
            biased;
            Some(e) = fatal_rx.recv() => Some(e),
            Some(e) = health_rx.recv() => Some(TrawlerError::Health(e)),
            _ = &mut workers_done => None,
        };

        liveness.abort();

        if let Some(e) = failure {
            error!("Crawl of {} aborted: {}", root_url, e);
            abort(&state, &registry, workers_done).await;
            collector.abort();
            return Err(e);
        }

        let results = collector
            .await
            .map_err(|_| TrawlerError::ChannelClosed("results"))?;

        if state.current() == CrawlState::Running {
            state.advance(CrawlState::Draining)?;
        }
        state.advance(CrawlState::Done)?;

        let metrics = metrics.snapshot();
        info!(
            "Crawl of {} finished: {} pages visited, {} links found, {} duplicates, {} items",
            root_url,
            metrics.urls_visited,
            metrics.urls_found,
            metrics.duplicate_urls_found,
            metrics.items_found
        );

        Ok(CrawlResponse { results, metrics })
    }
}

/// Stops the pool after a failure and waits for every worker to drain
async fn abort<F>(state: &StateTracker, registry: &WorkerRegistry, workers_done: F)
where
    F: std::future::Future<Output = ()>,
{
    if let Err(e) = state.advance(CrawlState::Aborted) {
        warn!("{}", e);
    }
    registry.stop_all();
    workers_done.await;
}

async fn join_workers(workers: Vec<JoinHandle<()>>) {
    for worker in workers {
        if let Err(e) = worker.await {
            error!("Worker task failed: {}", e);
        }
    }
}

/// Producer side of the pending queue, paired with in-flight accounting
#[derive(Debug, Clone)]
struct Frontier {
    pending: mpsc::UnboundedSender<CrawlTarget>,
    in_flight: mpsc::UnboundedSender<i64>,
}

impl Frontier {
    /// Counts `target` as in flight and queues it for dedup
    ///
    /// Returns false once the crawl is winding down and nothing listens.
    fn enqueue(&self, target: CrawlTarget) -> bool {
        if self.in_flight.send(1).is_err() {
            return false;
        }
        if self.pending.send(target).is_err() {
            let _ = self.in_flight.send(-1);
            return false;
        }
        true
    }

    /// Uncounts one target
    fn complete(&self) {
        let _ = self.in_flight.send(-1);
    }

    /// Uncounts one target when the returned guard is dropped
    fn completion(&self) -> Completion {
        Completion {
            in_flight: self.in_flight.clone(),
        }
    }
}

/// Sends the final -1 for a fetch task, even if the task panics
struct Completion {
    in_flight: mpsc::UnboundedSender<i64>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        let _ = self.in_flight.send(-1);
    }
}

/// Single owner of the visited set
async fn run_dedup_processor(
    mut pending: mpsc::UnboundedReceiver<CrawlTarget>,
    dispatch: mpsc::UnboundedSender<CrawlTarget>,
    in_flight: mpsc::UnboundedSender<i64>,
    metrics: MetricsRecorder,
) {
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(target) = pending.recv().await {
        if target.current_url.is_empty() || !target.within_depth() {
            let _ = in_flight.send(-1);
            continue;
        }

        if !visited.insert(dedup_key(&target.current_url)) {
            debug!("Duplicate URL {}", target.current_url);
            metrics.record_duplicate();
            let _ = in_flight.send(-1);
            continue;
        }

        debug!(
            "Dispatching {} (depth {})",
            target.current_url, target.current_depth
        );
        if dispatch.send(target).is_err() {
            let _ = in_flight.send(-1);
        }
    }

    debug!("Dedup processor finished with {} unique URLs", visited.len());
}

/// Single owner of the in-flight count
async fn run_termination_monitor(
    mut in_flight: mpsc::UnboundedReceiver<i64>,
    registry: WorkerRegistry,
    state: StateTracker,
) {
    let mut outstanding: i64 = 0;

    while let Some(delta) = in_flight.recv().await {
        outstanding += delta;
        if outstanding <= 0 {
            info!("No targets left in flight, stopping workers");
            if let Err(e) = state.advance(CrawlState::Draining) {
                debug!("{}", e);
            }
            registry.stop_all();
            return;
        }
    }
}

async fn collect_results(mut results: mpsc::UnboundedReceiver<WorkerResult>) -> Vec<WorkerResult> {
    let mut collected = Vec::new();
    while let Some(result) = results.recv().await {
        collected.push(result);
    }
    collected
}

/// Everything a worker loop shares with the rest of the crawl
#[derive(Clone)]
struct WorkerContext {
    scraper: Arc<PageScraper>,
    frontier: Frontier,
    dispatch: Arc<Mutex<mpsc::UnboundedReceiver<CrawlTarget>>>,
    requeue: mpsc::UnboundedSender<CrawlTarget>,
    results: mpsc::UnboundedSender<WorkerResult>,
    fatal: mpsc::UnboundedSender<TrawlerError>,
    metrics: MetricsRecorder,
    tasks: TaskGauge,
    registry: WorkerRegistry,

    /// Fetch tasks spawned so far, checked against `max_visited_urls`
    fetch_budget: Arc<AtomicUsize>,
    config: Arc<CrawlerConfig>,
}

async fn next_target(
    dispatch: &Mutex<mpsc::UnboundedReceiver<CrawlTarget>>,
) -> Option<CrawlTarget> {
    dispatch.lock().await.recv().await
}

async fn run_worker(id: usize, context: WorkerContext) {
    let _live = context.tasks.track();
    let mut stop = context.registry.register(id);
    let mut fetches: JoinSet<()> = JoinSet::new();
    debug!("Worker {} started", id);

    loop {
        tokio::select! {
            biased;
            _ = stop.recv() => break,
            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                if let Err(e) = joined {
                    error!("Fetch task of worker {} failed: {}", id, e);
                }
            }
            target = next_target(&context.dispatch) => match target {
                Some(target) => context.handle(id, target, &mut fetches).await,
                None => break,
            },
        }
    }

    while let Some(joined) = fetches.join_next().await {
        if let Err(e) = joined {
            error!("Fetch task of worker {} failed: {}", id, e);
        }
    }
    debug!("Worker {} stopped", id);
}

impl WorkerContext {
    async fn handle(&self, id: usize, target: CrawlTarget, fetches: &mut JoinSet<()>) {
        let delay = self.config.crawl_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }

        if self.tasks.live() >= self.config.max_tasks {
            debug!(
                "Worker {} at task ceiling ({}), re-queueing {}",
                id, self.config.max_tasks, target.current_url
            );
            if self.requeue.send(target).is_err() {
                self.frontier.complete();
            }
            tokio::task::yield_now().await;
            return;
        }

        if self.fetch_budget.fetch_add(1, Ordering::SeqCst) >= self.config.max_visited_urls {
            debug!(
                "Visited ceiling ({}) reached, dropping {}",
                self.config.max_visited_urls, target.current_url
            );
            self.frontier.complete();
            return;
        }

        if self.metrics.items_found() >= self.config.max_items_found as u64 {
            debug!(
                "Item ceiling ({}) reached, dropping {}",
                self.config.max_items_found, target.current_url
            );
            self.frontier.complete();
            return;
        }

        let job = FetchJob {
            worker_id: id,
            scraper: Arc::clone(&self.scraper),
            frontier: self.frontier.clone(),
            results: self.results.clone(),
            fatal: self.fatal.clone(),
            metrics: self.metrics.clone(),
            tasks: self.tasks.clone(),
            allow_empty_item: self.config.allow_empty_item,
        };
        fetches.spawn(job.run(target));
    }
}

/// One fetch-and-extract cycle for one target
struct FetchJob {
    worker_id: usize,
    scraper: Arc<PageScraper>,
    frontier: Frontier,
    results: mpsc::UnboundedSender<WorkerResult>,
    fatal: mpsc::UnboundedSender<TrawlerError>,
    metrics: MetricsRecorder,
    tasks: TaskGauge,
    allow_empty_item: bool,
}

impl FetchJob {
    async fn run(self, target: CrawlTarget) {
        let _done = self.frontier.completion();
        let _live = self.tasks.track();

        match self.scraper.scrape(&target).await {
            Ok(result) => {
                let totals = self
                    .metrics
                    .record_page(result.extracted_urls.len(), result.extracted_items.len());
                info!(
                    "Worker {} scraped {} (depth {}): {} links, {} items [visited {}, found {}, duplicates {}, items {}]",
                    self.worker_id,
                    target.current_url,
                    target.current_depth,
                    result.extracted_urls.len(),
                    result.extracted_items.len(),
                    totals.urls_visited,
                    totals.urls_found,
                    totals.duplicate_urls_found,
                    totals.items_found
                );

                for child in result.extracted_urls.iter().filter(|child| child.within_depth()) {
                    if !self.frontier.enqueue(child.clone()) {
                        break;
                    }
                }

                if self.allow_empty_item || !result.extracted_items.is_empty() {
                    let _ = self.results.send(result);
                }
            }
            Err(e) => {
                error!(
                    "Worker {} failed to scrape {}: {}",
                    self.worker_id, target.current_url, e
                );
                let _ = self.fatal.send(e);
            }
        }
    }
}
