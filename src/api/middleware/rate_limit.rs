//! Rate limiting middleware using a per-IP token bucket.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Rate limiter for the link management surface.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 50 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Keys are
/// client IPs from the socket peer address, so the server must run with
/// connect info enabled.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(50)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}
