use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;

use crate::ServiceState;

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
struct Clients {
    windows: HashMap<IpAddr, Window>,
    /// Expired windows are swept at most once per window length
    last_prune: Instant,
}

impl Clients {
    fn prune(&mut self, now: Instant, window: Duration) {
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
        self.last_prune = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed window request counter keyed by client address
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            clients: Mutex::new(Clients {
                windows: HashMap::new(),
                last_prune: Instant::now(),
            }),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Count a request from `client` and decide whether it may proceed
    pub fn check(&self, client: IpAddr) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> Decision {
        let mut clients = self.clients.lock();

        if now.saturating_duration_since(clients.last_prune) >= self.window {
            clients.prune(now, self.window);
        }

        let entry = clients.windows.entry(client).or_insert(Window {
            started: now,
            hits: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        if entry.hits >= self.max_requests {
            return Decision::Limited {
                retry_after: self
                    .window
                    .saturating_sub(now.saturating_duration_since(entry.started)),
            };
        }

        entry.hits += 1;
        Decision::Allowed {
            remaining: self.max_requests - entry.hits,
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients.lock().windows.len()
    }
}

/// Requests without connection info (e.g. in-process tests) share one bucket
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware throttling the routes it is layered on
pub async fn enforce(State(state): State<ServiceState>, request: Request, next: Next) -> Response {
    let client = client_ip(&request);
    let limiter = state.limiter();

    match limiter.check(client) {
        Decision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                RATELIMIT_LIMIT.clone(),
                HeaderValue::from(limiter.max_requests()),
            );
            headers.insert(RATELIMIT_REMAINING.clone(), HeaderValue::from(remaining));
            response
        }
        Decision::Limited { retry_after } => {
            tracing::warn!(%client, "verification rate limit exceeded");
            too_many_requests(retry_after)
        }
    }
}

fn too_many_requests(retry_after: Duration) -> Response {
    // round up so clients never retry a moment too early
    let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, seconds.max(1).to_string())],
        "Too many requests, please try again later.",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_allows_up_to_max_then_limits() {
        let limiter = RateLimiter::new(WINDOW, 10);
        let start = Instant::now();

        for i in 0..10 {
            assert_eq!(
                limiter.check_at(ip(1), start + Duration::from_secs(i)),
                Decision::Allowed {
                    remaining: 9 - i as u32
                }
            );
        }

        let decision = limiter.check_at(ip(1), start + Duration::from_secs(60));
        assert_eq!(
            decision,
            Decision::Limited {
                retry_after: WINDOW - Duration::from_secs(60)
            }
        );
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = RateLimiter::new(WINDOW, 2);
        let now = Instant::now();

        limiter.check_at(ip(1), now);
        limiter.check_at(ip(1), now);
        assert!(matches!(
            limiter.check_at(ip(1), now),
            Decision::Limited { .. }
        ));
        assert_eq!(
            limiter.check_at(ip(2), now),
            Decision::Allowed { remaining: 1 }
        );
    }

    #[test]
    fn test_new_window_resets_count() {
        let limiter = RateLimiter::new(WINDOW, 1);
        let start = Instant::now();

        assert!(matches!(
            limiter.check_at(ip(1), start),
            Decision::Allowed { .. }
        ));
        assert!(matches!(
            limiter.check_at(ip(1), start + WINDOW - Duration::from_secs(1)),
            Decision::Limited { .. }
        ));
        assert_eq!(
            limiter.check_at(ip(1), start + WINDOW),
            Decision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn test_expired_windows_are_pruned_once_per_window() {
        let limiter = RateLimiter::new(WINDOW, 1);
        let start = Instant::now();

        for i in 0..2048u128 {
            limiter.check_at(IpAddr::V6(std::net::Ipv6Addr::from(i)), start);
        }
        assert_eq!(limiter.tracked_clients(), 2048);

        // live windows are kept until a full window has passed
        let halfway = start + WINDOW / 2;
        limiter.check_at(ip(1), halfway);
        assert_eq!(limiter.tracked_clients(), 2049);

        limiter.check_at(ip(2), start + WINDOW);
        assert_eq!(limiter.tracked_clients(), 2);

        // the next sweep waits for another full window
        let sweep = start + WINDOW;
        limiter.check_at(ip(3), sweep + WINDOW / 2);
        assert_eq!(limiter.tracked_clients(), 3);

        limiter.check_at(ip(4), sweep + WINDOW);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_too_many_requests_response() {
        let response = too_many_requests(Duration::from_millis(1500));
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }
}
