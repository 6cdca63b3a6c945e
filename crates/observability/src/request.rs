use uuid::Uuid;

/// A fresh, time-ordered request id.
pub fn new_request_id() -> Uuid {
    Uuid::now_v7()
}

/// Root span for one HTTP request. `user_id` is filled in once the caller is known.
pub fn request_span(method: &str, path: &str, request_id: Uuid) -> ::tracing::Span {
    ::tracing::info_span!(
        "request",
        %request_id,
        method,
        path,
        user_id = ::tracing::field::Empty
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_v7_and_unique() {
        let a = new_request_id();
        let b = new_request_id();
        assert_eq!(a.get_version_num(), 7);
        assert_ne!(a, b);
    }
}
