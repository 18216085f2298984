//! Endpoint verification run
//!
//! Probes the public health check, logs in through a [`SessionManager`]
//! backed by in-memory storage, then walks the protected endpoints using
//! identifiers discovered along the way.

use porpagar_frontend_common::{LoginError, MemoryStorage, SessionManager, SharedStore};
use porpagar_http::PublicClient;
use porpagar_http::client::API_PREFIX;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// How a single probe ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// 404 on a download: the record exists but no file was uploaded
    Acceptable,
    Failed,
}

impl Outcome {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Passed => "✅",
            Self::Acceptable => "⚠️",
            Self::Failed => "❌",
        }
    }
}

/// Result of probing one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub name: String,
    pub method: Method,
    pub path: String,
    /// 0 when no response was received
    pub status: u16,
    pub outcome: Outcome,
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} → {}",
            self.outcome.symbol(),
            self.method,
            self.path,
            self.status
        )
    }
}

/// All probes from one run
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<ProbeResult>,
}

impl Report {
    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.total() - self.failed()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.outcome == Outcome::Failed)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.passed() as f64 / self.total() as f64 * 100.0
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn record(&mut self, result: ProbeResult) {
        println!("{result}");
        self.results.push(result);
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Endpoints probed: {}", self.total())?;
        writeln!(f, "✅ Passed: {}", self.passed())?;
        writeln!(f, "❌ Failed: {}", self.failed())?;
        writeln!(f, "📈 Success rate: {:.1}%", self.success_rate())?;

        if !self.is_success() {
            writeln!(f, "\nFailing endpoints:")?;
            for failure in self.failures() {
                writeln!(f, "   • {} → {}", failure.name, failure.status)?;
            }
        }
        Ok(())
    }
}

/// Drives a verification run against one backend
pub struct Verifier {
    manager: SessionManager,
}

impl Verifier {
    pub fn new(client: PublicClient) -> Self {
        let store: SharedStore = Rc::new(MemoryStorage::new());
        Self {
            manager: SessionManager::restored(store, client),
        }
    }

    /// Run every probe; a failed login ends the run early
    pub async fn run(&mut self, username: &str, password: &str) -> Report {
        let mut report = Report::default();

        println!("\n📋 Public endpoints\n");
        self.probe(&mut report, "Health check", "/health", false)
            .await;

        println!("\n🔐 Authentication\n");
        if !self.login(&mut report, username, password).await {
            println!("\n❌ No token obtained; skipping authenticated endpoints.");
            return report;
        }

        println!("\n🔒 Protected endpoints\n");
        self.probe(&mut report, "Current user", "/auth/me", false)
            .await;
        let empresas = self
            .probe(&mut report, "List empresas", "/empresas", false)
            .await;

        let Some(empresa_id) = empresas.as_ref().and_then(first_id) else {
            warn!("no empresa found; skipping empresa endpoints");
            return report;
        };
        info!(%empresa_id, "using empresa for scoped probes");

        println!("\n📊 Empresa endpoints\n");
        let invoices = self
            .probe(
                &mut report,
                "List invoices",
                &scoped_path("/invoices", &empresa_id),
                false,
            )
            .await;
        for (name, path) in [
            ("General summary", "resumen"),
            ("Paid account statement", "estado-cuenta-pagadas"),
            ("Export pending invoices", "export/facturas-pendientes"),
            ("Export paid invoices", "export/facturas-pagadas"),
            ("Export general summary", "export/resumen-general"),
        ] {
            self.probe(
                &mut report,
                name,
                &scoped_path(&format!("/{path}"), &empresa_id),
                false,
            )
            .await;
        }

        let Some(invoice_id) = invoices.as_ref().and_then(first_id) else {
            warn!("no invoice found; skipping download endpoints");
            return report;
        };

        println!("\n⬇️  Download endpoints\n");
        let invoice_path = scoped_path("/invoices", &invoice_id);
        for (name, suffix) in [
            ("Download PDF", "download"),
            ("Download receipt", "download-comprobante"),
            ("Download XML", "download-xml"),
        ] {
            self.probe(
                &mut report,
                name,
                &format!("{invoice_path}/{suffix}"),
                true,
            )
            .await;
        }

        report
    }

    async fn login(&mut self, report: &mut Report, username: &str, password: &str) -> bool {
        let (status, outcome) = match self.manager.login(username, password).await {
            Ok(user) => {
                println!("   🔑 Logged in as {} ({})", user.username, user.role);
                (200, Outcome::Passed)
            }
            Err(error) => {
                println!("   {}", error.message());
                (login_status(&error), Outcome::Failed)
            }
        };

        report.record(ProbeResult {
            name: "Login".to_string(),
            method: Method::POST,
            path: format!("{API_PREFIX}/auth/login"),
            status,
            outcome,
        });
        outcome == Outcome::Passed
    }

    /// Probe one endpoint, returning the JSON body of a successful response
    async fn probe(
        &self,
        report: &mut Report,
        name: &str,
        path: &str,
        allow_missing_file: bool,
    ) -> Option<Value> {
        let path = format!("{API_PREFIX}{path}");
        let response = self.manager.request(Method::GET, &path).send().await;

        let (status, body) = match response {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = if response.status().is_success() {
                    response.json::<Value>().await.ok()
                } else {
                    None
                };
                (status, body)
            }
            Err(error) => {
                debug!(%path, %error, "request failed");
                (0, None)
            }
        };

        let outcome = match status {
            200..=399 => Outcome::Passed,
            404 if allow_missing_file => Outcome::Acceptable,
            _ => Outcome::Failed,
        };

        report.record(ProbeResult {
            name: name.to_string(),
            method: Method::GET,
            path,
            status,
            outcome,
        });
        if outcome == Outcome::Acceptable {
            println!("   ℹ️  404 is expected when no file has been uploaded");
        }
        body
    }
}

fn login_status(error: &LoginError) -> u16 {
    match error {
        LoginError::Client(error) => error.status().unwrap_or(0),
        LoginError::MalformedResponse(_) => 200,
    }
}

/// `id` of the first element of a JSON array, unencoded
fn first_id(body: &Value) -> Option<String> {
    match body.as_array()?.first()?.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// `{prefix}/{id}` with the id percent-encoded as a single segment
fn scoped_path(prefix: &str, id: &str) -> String {
    format!("{prefix}/{}", urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_get(server: &MockServer, route: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "role": "admin",
                "username": "MAURO"
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn first_id_accepts_strings_and_numbers() {
        assert_eq!(first_id(&json!([{"id": "e1"}, {"id": "e2"}])), Some("e1".into()));
        assert_eq!(first_id(&json!([{"id": 7}])), Some("7".into()));
        assert_eq!(first_id(&json!([])), None);
        assert_eq!(first_id(&json!({"id": "e1"})), None);
    }

    #[test]
    fn scoped_path_keeps_the_id_in_one_segment() {
        assert_eq!(scoped_path("/invoices", "e1"), "/invoices/e1");
        assert_eq!(
            scoped_path("/export/resumen-general", "acme/01 x"),
            "/export/resumen-general/acme%2F01%20x"
        );
        assert_eq!(scoped_path("/invoices", "a?b#c"), "/invoices/a%3Fb%23c");
    }

    #[test]
    fn report_counts_acceptable_as_passed() {
        let mut report = Report::default();
        for (status, outcome) in [
            (200, Outcome::Passed),
            (404, Outcome::Acceptable),
            (500, Outcome::Failed),
            (0, Outcome::Failed),
        ] {
            report.record(ProbeResult {
                name: format!("probe {status}"),
                method: Method::GET,
                path: "/api/x".into(),
                status,
                outcome,
            });
        }

        assert_eq!(report.total(), 4);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 2);
        assert!((report.success_rate() - 50.0).abs() < f64::EPSILON);
        assert!(!report.is_success());
        assert!(report.to_string().contains("probe 500 → 500"));
    }

    #[tokio::test]
    async fn full_run_against_healthy_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;
        mount_login(&server).await;
        mount_get(&server, "/api/auth/me", 200, json!({"username": "MAURO", "role": "admin"})).await;
        mount_get(&server, "/api/empresas", 200, json!([{"id": "e1"}])).await;
        mount_get(&server, "/api/invoices/e1", 200, json!([{"id": "i9"}])).await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/(resumen|estado-cuenta-pagadas|export/[a-z-]+)/e1$"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(5)
            .mount(&server)
            .await;
        mount_get(&server, "/api/invoices/i9/download", 200, json!({})).await;
        mount_get(&server, "/api/invoices/i9/download-comprobante", 404, json!({"detail": "no file"})).await;
        mount_get(&server, "/api/invoices/i9/download-xml", 404, json!({"detail": "no file"})).await;

        let mut verifier = Verifier::new(PublicClient::new(server.uri()).unwrap());
        let report = verifier.run("MAURO", "pw").await;

        assert_eq!(report.total(), 13);
        assert!(report.is_success(), "{report}");
        let acceptable = report
            .results()
            .iter()
            .filter(|r| r.outcome == Outcome::Acceptable)
            .count();
        assert_eq!(acceptable, 2);
    }

    #[tokio::test]
    async fn failed_login_stops_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "bad credentials"})),
            )
            .mount(&server)
            .await;

        let mut verifier = Verifier::new(PublicClient::new(server.uri()).unwrap());
        let report = verifier.run("MAURO", "wrong").await;

        assert_eq!(report.total(), 2);
        assert_eq!(report.failed(), 1);
        let login = &report.results()[1];
        assert_eq!(login.status, 401);
        assert_eq!(login.outcome, Outcome::Failed);
    }

    #[tokio::test]
    async fn missing_empresas_skip_scoped_probes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        mount_login(&server).await;
        mount_get(&server, "/api/auth/me", 200, json!({"username": "MAURO", "role": "admin"})).await;
        mount_get(&server, "/api/empresas", 200, json!([])).await;

        let mut verifier = Verifier::new(PublicClient::new(server.uri()).unwrap());
        let report = verifier.run("MAURO", "pw").await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.results()[0].status, 503);
    }

    #[tokio::test]
    async fn empresa_ids_are_encoded_into_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;
        mount_login(&server).await;
        mount_get(&server, "/api/auth/me", 200, json!({"username": "MAURO", "role": "admin"})).await;
        mount_get(&server, "/api/empresas", 200, json!([{"id": "acme/01 x"}])).await;
        mount_get(&server, "/api/invoices/acme%2F01%20x", 200, json!([])).await;

        let mut verifier = Verifier::new(PublicClient::new(server.uri()).unwrap());
        let report = verifier.run("MAURO", "pw").await;

        let invoices = report
            .results()
            .iter()
            .find(|r| r.name == "List invoices")
            .unwrap();
        assert_eq!(invoices.path, "/api/invoices/acme%2F01%20x");
        assert_eq!(invoices.status, 200);
        assert_eq!(invoices.outcome, Outcome::Passed);
    }
}
