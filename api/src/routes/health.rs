//! `GET /healthz`, for load balancer and orchestrator liveness probes.

pub async fn healthz() -> &'static str {
    "OK"
}
