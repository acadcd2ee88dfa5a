//! Landing page for the Google sign-in popup
//!
//! Google redirects the popup here with the id token in the URL fragment.
//! The page hands the fragment to the window that opened it and closes.

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::core::backend::firebase::popup::CALLBACK_PATH;

const CALLBACK_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Signing in…</title></head>
<body>
<p>Completing sign-in…</p>
<script>
  (function () {
    var fragment = window.location.hash.replace(/^#/, "");
    if (window.opener) {
      window.opener.postMessage(fragment, window.location.origin);
    }
    window.close();
  })();
</script>
</body>
</html>
"#;

async fn callback_page() -> Html<&'static str> {
    Html(CALLBACK_PAGE)
}

/// Router serving the popup landing page at [`CALLBACK_PATH`]
pub fn oauth_callback_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(CALLBACK_PATH, get(callback_page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_callback_page_relays_fragment_to_opener() {
        let Html(page) = callback_page().await;

        assert!(page.contains("window.opener.postMessage(fragment, window.location.origin)"));
        assert!(page.contains("window.close()"));
    }

    #[test]
    fn test_callback_path() {
        assert_eq!(CALLBACK_PATH, "/auth/callback");
    }
}
