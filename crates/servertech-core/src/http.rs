//! Generic REST client shared by vendor API clients.
//!
//! [`RestClient`] owns one transport session for the lifetime of an
//! orchestration operation and turns HTTP error statuses into [`Error`]s via a
//! caller-supplied status map.

use crate::client::{ClientConfig, RetryPolicy};
use crate::config::ConnectionConfig;
use crate::error::{Error, ErrorKind, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("servertech-core/", env!("CARGO_PKG_VERSION"));

/// Status map that leaves every error status to the generic REST error.
#[must_use]
pub const fn no_error_map(_status: StatusCode) -> Option<ErrorKind> {
    None
}

/// Builder for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestClientBuilder {
    connection: ConnectionConfig,
    base_path: String,
    http_config: ClientConfig,
    user_agent: String,
}

impl RestClientBuilder {
    /// Create a builder for the given connection and API base path (e.g. `jaws`).
    #[must_use]
    pub fn new(connection: ConnectionConfig, base_path: impl Into<String>) -> Self {
        Self {
            connection,
            base_path: base_path.into(),
            http_config: ClientConfig::new(),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the transport cannot be built.
    pub fn build(self) -> Result<RestClient> {
        let base_path = self.base_path.trim_matches('/');
        let raw_url = if base_path.is_empty() {
            format!(
                "{}://{}:{}/",
                self.connection.scheme(),
                self.connection.address(),
                self.connection.port()
            )
        } else {
            format!(
                "{}://{}:{}/{}/",
                self.connection.scheme(),
                self.connection.address(),
                self.connection.port(),
                base_path
            )
        };
        let base_url = Url::parse(&raw_url).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid PDU base URL `{raw_url}`: {err}"))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent)
            .default_headers(headers)
            .timeout(self.http_config.timeout)
            .connect_timeout(self.http_config.connect_timeout);

        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        if !self.connection.tls_verify() {
            warn!(
                address = self.connection.address(),
                "TLS verification disabled for PDU client"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build PDU HTTP client: {err}"))
        })?;

        Ok(RestClient {
            http,
            base_url,
            connection: self.connection,
            retry_policy: self.http_config.retry_policy,
        })
    }
}

/// REST client bound to a single PDU.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: Url,
    connection: ConnectionConfig,
    retry_policy: RetryPolicy,
}

impl RestClient {
    /// Create a client with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn new(connection: ConnectionConfig, base_path: impl Into<String>) -> Result<Self> {
        RestClientBuilder::new(connection, base_path).build()
    }

    /// Access the base URL (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Access the connection descriptor.
    #[must_use]
    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Retry policy configured for this client.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.trim_start_matches('/');

        self.base_url
            .join(normalized)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid PDU path `{path}`: {err}")))
    }

    /// Build an endpoint URL from individual path segments.
    ///
    /// Each segment is percent-encoded and stays a single segment, so ids
    /// containing `/`, `?` or `#` cannot escape into other parts of the URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] for empty, `.` or `..` segments.
    pub fn segments_url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(Error::InvalidEndpoint(format!(
                "Invalid PDU path segment `{bad}`"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidEndpoint(format!("PDU base URL `{}` cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Send a request to a path relative to the base URL.
    ///
    /// See [`RestClient::send`].
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid, the request cannot be sent, or
    /// the response carries a mapped error status.
    pub async fn do_request<B, M>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        raise_for_status: bool,
        error_map: M,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
        M: Fn(StatusCode) -> Option<ErrorKind>,
    {
        let url = self.build_url(path)?;
        self.send(method, url, body, raise_for_status, error_map).await
    }

    /// Send a request and, when `raise_for_status` is set, turn HTTP error
    /// statuses into errors through `error_map`.
    ///
    /// Statuses the map does not cover become [`Error::Rest`].
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request cannot be sent, or the mapped
    /// error for a 4xx/5xx response.
    pub async fn send<B, M>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        raise_for_status: bool,
        error_map: M,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
        M: Fn(StatusCode) -> Option<ErrorKind>,
    {
        let path = url.path().to_string();
        let mut request = self.http.request(method.clone(), url);

        if !self.connection.username().is_empty() {
            request = request.basic_auth(
                self.connection.username(),
                Some(self.connection.password()),
            );
        }
        if let Some(payload) = body {
            request = request.json(payload);
        }

        info!(%method, %path, "PDU request");

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, %path, %status, "PDU response");

        if raise_for_status && (status.is_client_error() || status.is_server_error()) {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%method, %path, %status, "HTTP Error: {text}");

            let kind = error_map(status).unwrap_or(ErrorKind::Rest);
            return Err(kind.into_error(
                status.as_u16(),
                format!("{method} {path} returned {status}: {text}"),
            ));
        }

        Ok(response)
    }

    /// Basic GET request.
    ///
    /// # Errors
    ///
    /// See [`RestClient::do_request`].
    pub async fn get<M>(&self, path: &str, raise_for_status: bool, error_map: M) -> Result<Response>
    where
        M: Fn(StatusCode) -> Option<ErrorKind>,
    {
        self.do_request(Method::GET, path, Option::<&()>::None, raise_for_status, error_map)
            .await
    }

    /// Basic POST request.
    ///
    /// # Errors
    ///
    /// See [`RestClient::do_request`].
    pub async fn post<B, M>(
        &self,
        path: &str,
        body: Option<&B>,
        raise_for_status: bool,
        error_map: M,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
        M: Fn(StatusCode) -> Option<ErrorKind>,
    {
        self.do_request(Method::POST, path, body, raise_for_status, error_map)
            .await
    }

    /// Basic PUT request.
    ///
    /// # Errors
    ///
    /// See [`RestClient::do_request`].
    pub async fn put<B, M>(
        &self,
        path: &str,
        body: Option<&B>,
        raise_for_status: bool,
        error_map: M,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
        M: Fn(StatusCode) -> Option<ErrorKind>,
    {
        self.do_request(Method::PUT, path, body, raise_for_status, error_map)
            .await
    }

    /// Basic PATCH request.
    ///
    /// # Errors
    ///
    /// See [`RestClient::do_request`].
    pub async fn patch<B, M>(
        &self,
        path: &str,
        body: Option<&B>,
        raise_for_status: bool,
        error_map: M,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
        M: Fn(StatusCode) -> Option<ErrorKind>,
    {
        self.do_request(Method::PATCH, path, body, raise_for_status, error_map)
            .await
    }

    /// Basic DELETE request.
    ///
    /// # Errors
    ///
    /// See [`RestClient::do_request`].
    pub async fn delete<M>(
        &self,
        path: &str,
        raise_for_status: bool,
        error_map: M,
    ) -> Result<Response>
    where
        M: Fn(StatusCode) -> Option<ErrorKind>,
    {
        self.do_request(Method::DELETE, path, Option::<&()>::None, raise_for_status, error_map)
            .await
    }
}

/// Decode a JSON response body; an empty body yields `T::default()`.
///
/// # Errors
///
/// Returns [`Error::ParseError`] if the body is not valid JSON for `T`.
pub async fn read_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let url = response.url().clone();
    let bytes = response.bytes().await?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(&bytes).map_err(|err| {
        Error::ParseError(format!("Failed to parse PDU response for `{}`: {err}", url.path()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn connection_for(server: &MockServer) -> ConnectionConfig {
        let address = server.address();
        ConnectionConfig::new(address.ip().to_string(), "admn", "admn")
            .unwrap()
            .with_scheme(crate::config::Scheme::Http)
            .with_port(address.port())
    }

    fn test_client(server: &MockServer) -> RestClient {
        RestClient::new(connection_for(server), "jaws").unwrap()
    }

    fn teapot_map(status: StatusCode) -> Option<ErrorKind> {
        match status {
            StatusCode::NOT_FOUND => Some(ErrorKind::Unavailable),
            StatusCode::CONFLICT => Some(ErrorKind::Conflict),
            _ => None,
        }
    }

    #[test]
    fn base_url_includes_scheme_port_and_base_path() {
        let conn = ConnectionConfig::new("192.168.30.128", "admn", "admn")
            .unwrap()
            .with_port(8443);
        let client = RestClient::new(conn, "/jaws/").unwrap();
        assert_eq!(client.base_url().as_str(), "https://192.168.30.128:8443/jaws/");
        assert_eq!(
            client.build_url("/control/outlets").unwrap().as_str(),
            "https://192.168.30.128:8443/jaws/control/outlets"
        );
    }

    #[test]
    fn segments_stay_single_path_segments() {
        let conn = ConnectionConfig::new("192.168.30.128", "admn", "admn").unwrap();
        let client = RestClient::new(conn, "jaws").unwrap();

        let url = client.segments_url(&["control", "outlets", "AA1"]).unwrap();
        assert_eq!(url.as_str(), "https://192.168.30.128/jaws/control/outlets/AA1");

        let url = client
            .segments_url(&["control", "outlets", "a/b?c#d"])
            .unwrap();
        assert_eq!(url.path(), "/jaws/control/outlets/a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn dot_segments_are_rejected() {
        let conn = ConnectionConfig::new("192.168.30.128", "admn", "admn").unwrap();
        let client = RestClient::new(conn, "jaws").unwrap();

        for bad in ["..", ".", ""] {
            let err = client
                .segments_url(&["control", "outlets", bad])
                .unwrap_err();
            assert!(matches!(err, Error::InvalidEndpoint(_)));
        }
    }

    #[test]
    fn invalid_address_is_rejected() {
        let conn = ConnectionConfig::new("bad host name", "", "").unwrap();
        let err = RestClient::new(conn, "jaws").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[tokio::test]
    async fn get_sends_auth_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jaws/config/info/system"))
            .and(header("authorization", "Basic YWRtbjphZG1u"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"firmware": "8.0k"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client
            .get("config/info/system", true, no_error_map)
            .await
            .unwrap();
        let body: serde_json::Value = read_json(response).await.unwrap();
        assert_eq!(body["firmware"], "8.0k");
    }

    #[tokio::test]
    async fn error_status_goes_through_error_map() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/jaws/control/outlets/AA1"))
            .and(body_json(json!({"control_action": "on"})))
            .respond_with(ResponseTemplate::new(409).set_body_string("locked"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .patch(
                "control/outlets/AA1",
                Some(&json!({"control_action": "on"})),
                true,
                teapot_map,
            )
            .await
            .unwrap_err();

        match err {
            Error::Conflict(message) => assert!(message.contains("locked")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unmapped_status_falls_back_to_rest_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/jaws/control/outlets/1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .delete("control/outlets/1", true, teapot_map)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rest { status: 403, .. }));
    }

    #[tokio::test]
    async fn raise_for_status_disabled_returns_raw_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jaws/control/outlets"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client
            .get("control/outlets", false, teapot_map)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_and_put_send_json_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jaws/config/users"))
            .and(body_json(json!({"username": "ops"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/jaws/config/users/ops"))
            .and(body_json(json!({"access_level": "admin"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let created = client
            .post("config/users", Some(&json!({"username": "ops"})), true, no_error_map)
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let updated = client
            .put(
                "config/users/ops",
                Some(&json!({"access_level": "admin"})),
                true,
                no_error_map,
            )
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn read_json_treats_empty_body_as_default() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/jaws/control/outlets/2"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client
            .patch("control/outlets/2", Some(&json!({"control_action": "off"})), true, no_error_map)
            .await
            .unwrap();
        let outlets: Vec<serde_json::Value> = read_json(response).await.unwrap();
        assert!(outlets.is_empty());
    }

    #[tokio::test]
    async fn read_json_reports_invalid_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jaws/control/outlets"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client
            .get("control/outlets", true, no_error_map)
            .await
            .unwrap();
        let err = read_json::<Vec<serde_json::Value>>(response)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
