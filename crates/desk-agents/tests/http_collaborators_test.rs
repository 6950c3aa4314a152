//! HTTP collaborator tests against a one-shot local responder
//!
//! Each test binds an ephemeral port, answers exactly one request with a
//! canned status and JSON body, and hands back the raw request it saw.

use desk_agents::collaborators::{AgentEndpoint, HttpComplexity, HttpEstimator, HttpHistorical};
use desk_agents::{
    check_agents, AgentHealth, CollaboratorError, ComplexityEvaluator, Estimator, Historical,
    Readiness, TicketFeatures,
};
use routing::{Complexity, IncidenceType, Tier, TimeCategory, Urgency};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve one canned response; resolves to (request line, body) once answered
async fn respond_once(
    status: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let (head, body_start) = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break (String::from_utf8_lossy(&raw[..pos]).to_string(), pos + 4);
            }
        };
        let content_length = head
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while raw.len() < body_start + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        let request_body = String::from_utf8_lossy(&raw[body_start..]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let request_line = head.lines().next().unwrap_or_default().to_string();
        let _ = tx.send((request_line, request_body));
    });

    (url, rx)
}

fn endpoint(url: &str) -> AgentEndpoint {
    AgentEndpoint::new(url, Duration::from_secs(5)).unwrap()
}

fn features() -> TicketFeatures {
    TicketFeatures {
        ticket_id: "INC-77".into(),
        incidence_type: IncidenceType::Incident,
        attention_type: "Error en emision".into(),
        area: "Operaciones".into(),
        product: "SCTR".into(),
        summary: "No emite constancias".into(),
        urgency: Urgency::High,
    }
}

#[tokio::test]
async fn historical_precedent_parsed() {
    let (url, seen) = respond_once(
        "200 OK",
        r#"{"encontrado": true, "nivel_sugerido": "N1", "mesa_sugerida": "Service Desk 2",
            "resolucion_referencia": "INC-0042", "razonamiento": "ticket similar resuelto"}"#,
    )
    .await;

    let precedent = HttpHistorical::new(endpoint(&url))
        .consult(&features())
        .await
        .unwrap();
    assert!(precedent.found);
    assert_eq!(precedent.suggested_tier, Some(Tier::General));
    assert_eq!(precedent.suggested_desk.as_deref(), Some("Service Desk 2"));
    assert_eq!(precedent.resolution_reference.as_deref(), Some("INC-0042"));

    let (request_line, body) = seen.await.unwrap();
    assert!(request_line.starts_with("POST /consultar "));
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["ticket_id"], "INC-77");
    assert_eq!(body["producto"], "SCTR");
}

#[tokio::test]
async fn estimator_derives_missing_time_category() {
    let (url, seen) = respond_once(
        "200 OK",
        r#"{"tiempo_estimado_horas": 80.0, "rango_minimo_horas": 60.0, "rango_maximo_horas": 100.0}"#,
    )
    .await;

    let estimate = HttpEstimator::new(endpoint(&url))
        .estimate(&features())
        .await
        .unwrap();
    assert_eq!(estimate.hours, 80.0);
    assert_eq!(estimate.time_category, TimeCategory::Slow);

    let (request_line, body) = seen.await.unwrap();
    assert!(request_line.starts_with("POST /estimar "));
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["tipo_incidencia"], "Incidente");
    assert_eq!(body["urgencia_detectada"], "alta");
}

#[tokio::test]
async fn complexity_sends_estimated_hours() {
    let (url, seen) = respond_once(
        "200 OK",
        r#"{"complejidad": "muy_alta", "score": 88.5, "nivel_recomendado": "N3",
            "recomendacion": "requiere especialista"}"#,
    )
    .await;

    let assessment = HttpComplexity::new(endpoint(&url))
        .evaluate(&features(), Some(80.0))
        .await
        .unwrap();
    assert_eq!(assessment.category, Complexity::VeryHigh);
    assert_eq!(assessment.recommended_tier, Tier::Specialist);
    assert_eq!(assessment.reasoning, "requiere especialista");

    let (request_line, body) = seen.await.unwrap();
    assert!(request_line.starts_with("POST /evaluar "));
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["tiempo_estimado_horas"], 80.0);
}

#[tokio::test]
async fn complexity_rejects_out_of_range_score() {
    let (url, _seen) = respond_once(
        "200 OK",
        r#"{"complejidad": "alta", "score": 140.0, "nivel_recomendado": "N2"}"#,
    )
    .await;

    let err = HttpComplexity::new(endpoint(&url))
        .evaluate(&features(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::InvalidResponse(_)));
}

#[tokio::test]
async fn server_error_is_transport_failure() {
    let (url, _seen) =
        respond_once("503 Service Unavailable", r#"{"detail": "modelo no cargado"}"#).await;

    let err = HttpHistorical::new(endpoint(&url))
        .consult(&features())
        .await
        .unwrap_err();
    match err {
        CollaboratorError::Transport(message) => {
            assert!(message.contains("503"), "{}", message);
            assert!(message.contains("modelo no cargado"), "{}", message);
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let (url, _seen) = respond_once("200 OK", r#"{"tiempo": "pronto"}"#).await;

    let err = HttpEstimator::new(endpoint(&url))
        .estimate(&features())
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_agent_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = HttpHistorical::new(endpoint(&url))
        .consult(&features())
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::Transport(_)));
}

#[tokio::test]
async fn health_ok_is_online() {
    let (url, seen) = respond_once("200 OK", r#"{"status": "healthy"}"#).await;

    assert_eq!(endpoint(&url).health().await, AgentHealth::Online);
    let (request_line, _) = seen.await.unwrap();
    assert!(request_line.starts_with("GET /health "));
}

#[tokio::test]
async fn health_server_error_is_error() {
    let (url, _seen) = respond_once("503 Service Unavailable", r#"{}"#).await;
    assert_eq!(endpoint(&url).health().await, AgentHealth::Error);
}

#[tokio::test]
async fn health_unreachable_is_offline() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    assert_eq!(endpoint(&url).health().await, AgentHealth::Offline);
}

#[tokio::test]
async fn readiness_ready_when_all_agents_online() {
    let (historical, _h) = respond_once("200 OK", "{}").await;
    let (estimator, _e) = respond_once("200 OK", "{}").await;

    let report = check_agents(&[
        ("historical", endpoint(&historical)),
        ("estimator", endpoint(&estimator)),
    ])
    .await;
    assert_eq!(report.status, Readiness::Ready);
    assert_eq!(report.agents["historical"], AgentHealth::Online);
    assert_eq!(report.agents["estimator"], AgentHealth::Online);
}

#[tokio::test]
async fn readiness_degraded_when_any_agent_down() {
    let (historical, _h) = respond_once("200 OK", "{}").await;
    let (estimator, _e) = respond_once("500 Internal Server Error", "{}").await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let complexity = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let report = check_agents(&[
        ("historical", endpoint(&historical)),
        ("estimator", endpoint(&estimator)),
        ("complexity", endpoint(&complexity)),
    ])
    .await;
    assert_eq!(report.status, Readiness::Degraded);
    assert_eq!(report.agents["historical"], AgentHealth::Online);
    assert_eq!(report.agents["estimator"], AgentHealth::Error);
    assert_eq!(report.agents["complexity"], AgentHealth::Offline);
}
