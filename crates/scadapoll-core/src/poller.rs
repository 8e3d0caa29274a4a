// ── Periodic poll scheduler ──
//
// Transport-agnostic: the poller knows how to fetch a URL and when to do
// it again, nothing about the payload. Three kinds of task cooperate:
//
// - one fetch task per issued request,
// - a schedule task that sleeps and issues the next request,
// - a single delivery task that hands completed responses to the
//   consumer callback, one at a time, in issue order.
//
// Everything stops on the shared `CancellationToken`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use scadapoll_api::{Error as ApiError, HttpTransport, Transport};

/// A completed request, tagged with its issue sequence number.
struct Delivery {
    seq: u64,
    result: Result<String, ApiError>,
}

/// Issues the initial request and schedules the ones after it.
#[derive(Debug)]
pub struct Poller<T = HttpTransport> {
    transport: Arc<T>,
}

impl<T> Clone for Poller<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> Poller<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Start polling. Must be called within a Tokio runtime.
    ///
    /// The first request goes out immediately with the URL `url_provider`
    /// returns now. `interval_provider` is consulted right after each
    /// issue: a non-zero duration schedules the next request that long
    /// after this one was issued, recomputing both URL and interval then.
    ///
    /// Every outcome, including transport errors, reaches `on_result`.
    /// Calls are serialized and never overlap. A response that arrives
    /// after a newer one has been delivered is discarded.
    ///
    /// Returns `None` when the interval is zero at start: a single poll
    /// is performed and there is nothing to stop.
    pub fn start<U, I, F>(
        &self,
        mut url_provider: U,
        mut interval_provider: I,
        on_result: F,
    ) -> Option<PollHandle>
    where
        U: FnMut() -> Result<Url, ApiError> + Send + 'static,
        I: FnMut() -> Duration + Send + 'static,
        F: FnMut(Result<String, ApiError>) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(deliver(rx, cancel.clone(), on_result));

        let mut issuer = Issuer {
            transport: Arc::clone(&self.transport),
            tx,
            cancel: cancel.clone(),
            next_seq: 0,
        };

        issuer.issue(&mut url_provider);
        let first = interval_provider();
        if first.is_zero() {
            debug!("zero interval, single poll");
            return None;
        }

        let schedule_cancel = cancel.clone();
        let schedule = tokio::spawn(async move {
            let mut interval = first;
            loop {
                tokio::select! {
                    biased;
                    () = schedule_cancel.cancelled() => break,
                    () = tokio::time::sleep(interval) => {}
                }
                issuer.issue(&mut url_provider);
                interval = interval_provider();
                if interval.is_zero() {
                    debug!("interval dropped to zero, polling ends");
                    break;
                }
            }
        });

        Some(PollHandle { cancel, schedule })
    }
}

/// State shared by every issue of one chain.
struct Issuer<T> {
    transport: Arc<T>,
    tx: mpsc::UnboundedSender<Delivery>,
    cancel: CancellationToken,
    next_seq: u64,
}

impl<T: Transport> Issuer<T> {
    fn issue<U>(&mut self, url_provider: &mut U)
    where
        U: FnMut() -> Result<Url, ApiError>,
    {
        let seq = self.next_seq;
        self.next_seq += 1;

        let url = match url_provider() {
            Ok(url) => url,
            Err(e) => {
                let _ = self.tx.send(Delivery { seq, result: Err(e) });
                return;
            }
        };
        trace!(seq, %url, "issuing poll");

        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                r = transport.get(url) => r,
            };
            let _ = tx.send(Delivery { seq, result });
        });
    }
}

/// Single consumer: serializes callbacks and drops stale or late responses.
async fn deliver<F>(
    mut rx: mpsc::UnboundedReceiver<Delivery>,
    cancel: CancellationToken,
    mut on_result: F,
) where
    F: FnMut(Result<String, ApiError>),
{
    let mut newest: Option<u64> = None;
    loop {
        let delivery = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            d = rx.recv() => match d {
                Some(d) => d,
                None => break,
            },
        };

        if newest.is_some_and(|n| delivery.seq < n) {
            debug!(seq = delivery.seq, "dropping superseded poll response");
            continue;
        }
        newest = Some(delivery.seq);
        on_result(delivery.result);
    }
}

// ── PollHandle ───────────────────────────────────────────────────

/// Stops a recurring poll chain. Dropping the handle stops it too.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    schedule: JoinHandle<()>,
}

impl PollHandle {
    /// Stop issuing requests and discard any response still in flight.
    /// Idempotent.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `true` while further requests may still be issued.
    pub fn is_running(&self) -> bool {
        !self.is_disposed() && !self.schedule.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Answers each GET with its call index, after a per-call delay.
    #[derive(Default)]
    struct FakeTransport {
        calls: Mutex<Vec<Url>>,
        delays: Vec<Duration>,
        fail_first: bool,
    }

    impl FakeTransport {
        fn with_delays(delays: &[u64]) -> Self {
            Self {
                delays: delays.iter().map(|ms| Duration::from_millis(*ms)).collect(),
                ..Self::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Transport for FakeTransport {
        async fn get(&self, url: Url) -> Result<String, ApiError> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(url);
                calls.len() - 1
            };
            let delay = self.delays.get(n).copied().unwrap_or_default();
            tokio::time::sleep(delay).await;
            if self.fail_first && n == 0 {
                return Err(ApiError::Http {
                    status: 503,
                    body: String::new(),
                });
            }
            Ok(n.to_string())
        }

        async fn post(&self, _url: Url, _body: String) -> Result<String, ApiError> {
            Ok(String::new())
        }
    }

    fn url() -> Result<Url, ApiError> {
        Ok(Url::parse("http://scada.test/read/patterns/x")?)
    }

    fn every(ms: u64) -> impl FnMut() -> Duration + Send + 'static {
        move || Duration::from_millis(ms)
    }

    /// Intervals returned in order, zero once exhausted.
    fn sequence(ms: &'static [u64]) -> impl FnMut() -> Duration + Send + 'static {
        let mut it = ms.iter();
        move || Duration::from_millis(it.next().copied().unwrap_or(0))
    }

    type Sink = Arc<Mutex<Vec<Result<String, String>>>>;

    fn collector() -> (Sink, impl FnMut(Result<String, ApiError>) + Send + 'static) {
        let sink: Sink = Arc::default();
        let out = Arc::clone(&sink);
        let cb = move |r: Result<String, ApiError>| {
            out.lock().unwrap().push(r.map_err(|e| e.to_string()));
        };
        (sink, cb)
    }

    fn bodies(sink: &Sink) -> Vec<String> {
        sink.lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.as_ref().ok().cloned())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_one_shot() {
        let transport = Arc::new(FakeTransport::default());
        let (sink, cb) = collector();

        let handle = Poller::new(Arc::clone(&transport)).start(url, every(0), cb);
        assert!(handle.is_none());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.call_count(), 1);
        assert_eq!(bodies(&sink), ["0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate_then_periodic() {
        let transport = Arc::new(FakeTransport::default());
        let (sink, cb) = collector();

        let handle = Poller::new(Arc::clone(&transport))
            .start(url, every(1000), cb)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.call_count(), 1);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(transport.call_count(), 4);
        assert_eq!(bodies(&sink), ["0", "1", "2", "3"]);
        assert!(handle.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_is_relative_to_issue_not_response() {
        // Each response takes 800ms; issues still happen every second.
        let transport = Arc::new(FakeTransport::with_delays(&[800, 800, 800]));
        let (_sink, cb) = collector();

        let _handle = Poller::new(Arc::clone(&transport))
            .start(url, every(1000), cb)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_requests_and_drops_late_response() {
        let transport = Arc::new(FakeTransport::with_delays(&[500]));
        let (sink, cb) = collector();

        let handle = Poller::new(Arc::clone(&transport))
            .start(url, every(1000), cb)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.dispose();
        handle.dispose();
        assert!(handle.is_disposed());
        assert!(!handle.is_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.call_count(), 1);
        assert!(sink.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_disposes() {
        let transport = Arc::new(FakeTransport::default());
        let (_sink, cb) = collector();

        let handle = Poller::new(Arc::clone(&transport)).start(url, every(1000), cb);
        drop(handle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn url_and_interval_are_recomputed_per_issue() {
        let transport = Arc::new(FakeTransport::default());
        let (_sink, cb) = collector();
        let counter = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&counter);
        let url_provider = move || -> Result<Url, ApiError> {
            let n = c.fetch_add(1, Ordering::SeqCst);
            Ok(Url::parse(&format!("http://scada.test/read/patterns/p{n}"))?)
        };

        let handle = Poller::new(Arc::clone(&transport))
            .start(url_provider, sequence(&[1000, 500]), cb)
            .unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let urls: Vec<String> = transport
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.path().to_owned())
            .collect();
        assert_eq!(
            urls,
            [
                "/read/patterns/p0",
                "/read/patterns/p1",
                "/read/patterns/p2"
            ]
        );
        assert!(!handle.is_running());
        assert!(!handle.is_disposed());
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_delivered_and_polling_continues() {
        let transport = Arc::new(FakeTransport {
            fail_first: true,
            ..FakeTransport::default()
        });
        let (sink, cb) = collector();

        let _handle = Poller::new(Arc::clone(&transport))
            .start(url, sequence(&[1000]), cb)
            .unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let results = sink.lock().unwrap().clone();
        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().unwrap_err().contains("503"));
        assert_eq!(results[1], Ok("1".to_owned()));
    }

    #[tokio::test(start_paused = true)]
    async fn url_provider_failure_is_delivered() {
        let transport = Arc::new(FakeTransport::default());
        let (sink, cb) = collector();
        let bad = || -> Result<Url, ApiError> { Ok(Url::parse("not a url")?) };

        let handle = Poller::new(Arc::clone(&transport)).start(bad, every(0), cb);
        assert!(handle.is_none());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.call_count(), 0);
        assert_eq!(sink.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_responses_are_dropped() {
        // Request 0 is slow and lands after requests 1 and 2.
        let transport = Arc::new(FakeTransport::with_delays(&[3000, 0, 0]));
        let (sink, cb) = collector();

        let _handle = Poller::new(Arc::clone(&transport))
            .start(url, sequence(&[1000, 1000]), cb)
            .unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.call_count(), 3);
        assert_eq!(bodies(&sink), ["1", "2"]);
    }
}
