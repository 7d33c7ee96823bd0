//! Where page bytes come from: libcurl or a simulated network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pageflow_core::manifest::ChapterManifest;
use pageflow_core::net;
use tokio::sync::mpsc::UnboundedSender;

/// Which part of the view a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Page(usize),
    Prefetch,
}

/// A settled fetch, sent back to the host loop.
#[derive(Debug)]
pub struct Fetched {
    pub target: Target,
    pub location: String,
    pub result: Result<Vec<u8>, String>,
}

#[derive(Clone)]
pub enum Transport {
    Http {
        manifest: Arc<ChapterManifest>,
        timeout: Duration,
    },
    Simulated {
        latency: Duration,
        fail_every: usize,
        served: Arc<AtomicUsize>,
    },
}

impl Transport {
    pub fn http(manifest: Arc<ChapterManifest>, timeout: Duration) -> Self {
        Transport::Http { manifest, timeout }
    }

    /// Every request takes `latency`; every `fail_every`-th one fails (0 = never).
    pub fn simulated(latency: Duration, fail_every: usize) -> Self {
        Transport::Simulated {
            latency,
            fail_every,
            served: Arc::default(),
        }
    }

    /// Start fetching `location` in the background; the outcome arrives on `tx`.
    pub fn dispatch(&self, target: Target, location: &str, tx: &UnboundedSender<Fetched>) {
        let location = location.to_string();
        let tx = tx.clone();
        match self {
            Transport::Http { manifest, timeout } => {
                let url = match manifest.resolve(&location) {
                    Ok(url) => url,
                    Err(e) => {
                        let _ = tx.send(Fetched {
                            target,
                            location,
                            result: Err(format!("{:#}", e)),
                        });
                        return;
                    }
                };
                let timeout = *timeout;
                tokio::task::spawn_blocking(move || {
                    let result = net::fetch_bytes(&url, timeout).map_err(|e| e.reason());
                    let _ = tx.send(Fetched {
                        target,
                        location,
                        result,
                    });
                });
            }
            Transport::Simulated {
                latency,
                fail_every,
                served,
            } => {
                let latency = *latency;
                let fail_every = *fail_every;
                let served = Arc::clone(served);
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    let n = served.fetch_add(1, Ordering::SeqCst) + 1;
                    let result = if fail_every > 0 && n % fail_every == 0 {
                        Err("simulated HTTP 503".to_string())
                    } else {
                        Ok(location.as_bytes().to_vec())
                    };
                    let _ = tx.send(Fetched {
                        target,
                        location,
                        result,
                    });
                });
            }
        }
    }
}
