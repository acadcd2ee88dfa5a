//! JSON transport: `gloo-net` in the browser, `reqwest` on the server

use serde::Serialize;
use serde_json::Value;

/// Status code and parsed JSON body (`Null` when the body is not JSON)
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Default)]
pub struct HttpClient {
    #[cfg(feature = "ssr")]
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "ssr")]
impl HttpClient {
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &T,
    ) -> Result<HttpResponse, String> {
        let mut request = self.inner.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| e.to_string())?;
        Self::read(response).await
    }

    pub async fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, String> {
        let mut request = self.inner.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| e.to_string())?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, String> {
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(HttpResponse { status, body })
    }
}

#[cfg(not(feature = "ssr"))]
impl HttpClient {
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &T,
    ) -> Result<HttpResponse, String> {
        use gloo_net::http::Request;

        let mut builder = Request::post(url);
        if let Some(token) = bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        let request = builder.json(body).map_err(|e| e.to_string())?;
        let response = request.send().await.map_err(|e| e.to_string())?;
        Self::read(response).await
    }

    pub async fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, String> {
        use gloo_net::http::Request;

        let mut builder = Request::get(url);
        if let Some(token) = bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        let response = builder.send().await.map_err(|e| e.to_string())?;
        Self::read(response).await
    }

    async fn read(response: gloo_net::http::Response) -> Result<HttpResponse, String> {
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_range() {
        let response = |status| HttpResponse {
            status,
            body: Value::Null,
        };
        assert!(response(200).ok());
        assert!(response(204).ok());
        assert!(!response(404).ok());
        assert!(!response(500).ok());
    }
}
