use crate::services::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use gate_core::axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use uuid::Uuid;

/// Replace member-id path segments with a placeholder so the `path` label
/// stays bounded; `/members/<uuid>` would otherwise mint a label value per
/// member.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{member_id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[&method, &path, &status]).inc();
    }

    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[&method, &path, &status])
            .observe(duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_ids_collapse_to_one_label_value() {
        let id = Uuid::new_v4();
        assert_eq!(
            normalize_path(&format!("/members/{}", id)),
            "/members/{member_id}"
        );
        assert_eq!(normalize_path("/gate/submit"), "/gate/submit");
        assert_eq!(normalize_path("/"), "/");
    }
}
