//! SSE 变更推送 Handler

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Extension,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use tokio::sync::broadcast;

use crate::auth::CurrentStaff;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/events - 订阅本餐厅的变更事件流
pub async fn subscribe(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let restaurant_id = staff.restaurant_id()?.to_string();
    let rx = state.feed.subscribe();

    let stream = futures::stream::unfold(rx, move |mut rx| {
        let restaurant_id = restaurant_id.clone();
        async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        // Tenant filter; other restaurants' changes are skipped
                        if event.restaurant_id != restaurant_id {
                            continue;
                        }
                        match Event::default().json_data(&event) {
                            Ok(sse_event) => {
                                return Some((Ok::<_, Infallible>(sse_event), rx));
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to encode change event");
                                continue;
                            }
                        }
                    }
                    // A lagged subscriber just refetches; keep streaming
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "SSE subscriber lagged behind the change feed");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("keep-alive"),
    ))
}
