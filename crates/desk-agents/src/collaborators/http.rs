//! HTTP collaborator clients
//!
//! Each agent exposes one JSON endpoint:
//!
//! ```text
//! Agent       | Endpoint        | Response fields used
//! ------------|-----------------|----------------------------------------------
//! historical  | POST /consultar | encontrado, nivel_sugerido, mesa_sugerida,
//!             |                 | resolucion_referencia, razonamiento
//! estimator   | POST /estimar   | tiempo_estimado_horas, rango_minimo_horas,
//!             |                 | rango_maximo_horas, categoria_tiempo
//! complexity  | POST /evaluar   | complejidad, score, nivel_recomendado,
//!             |                 | recomendacion
//! any         | GET /health     | status code only
//! ```

use super::{
    CollaboratorError, ComplexityAssessment, ComplexityEvaluator, Estimate, Estimator,
    Historical, Precedent, TicketFeatures,
};
use async_trait::async_trait;
use routing::{Complexity, IncidenceType, Tier, TimeCategory, Urgency};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::health::AgentHealth;
use tracing::{debug, warn};

/// Base URL plus a pooled HTTP client
#[derive(Debug, Clone)]
pub struct AgentEndpoint {
    client: reqwest::Client,
    base_url: String,
}

impl AgentEndpoint {
    /// `timeout` bounds the whole request at the transport level; the
    /// pipeline applies its own per-call timeout on top.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Share one connection pool between endpoints
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `/health`: `Online` on 2xx, `Error` on any other status,
    /// `Offline` when the agent cannot be reached.
    pub async fn health(&self) -> AgentHealth {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => AgentHealth::Online,
            Ok(response) => {
                warn!(url = %url, status = %response.status(), "Agent health check failed");
                AgentHealth::Error
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Agent unreachable");
                AgentHealth::Offline
            }
        }
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, CollaboratorError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Transport(format!("{} timed out", url))
                } else {
                    CollaboratorError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Transport(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        debug!(url = %url, "Collaborator responded");
        response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))
    }
}

fn incidence_label(incidence: IncidenceType) -> &'static str {
    match incidence {
        IncidenceType::Incident => "Incidente",
        IncidenceType::Request => "Solicitud",
    }
}

fn urgency_label(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::High => "alta",
        Urgency::Medium => "media",
    }
}

// ── Historical ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ConsultRequest<'a> {
    ticket_id: &'a str,
    resumen: &'a str,
    tipo_atencion_sd: &'a str,
    area: &'a str,
    producto: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConsultResponse {
    encontrado: bool,
    #[serde(default)]
    nivel_sugerido: Option<Tier>,
    #[serde(default)]
    mesa_sugerida: Option<String>,
    #[serde(default)]
    resolucion_referencia: Option<String>,
    #[serde(default)]
    razonamiento: String,
}

pub struct HttpHistorical {
    endpoint: AgentEndpoint,
}

impl HttpHistorical {
    pub fn new(endpoint: AgentEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl Historical for HttpHistorical {
    async fn consult(&self, ticket: &TicketFeatures) -> Result<Precedent, CollaboratorError> {
        let request = ConsultRequest {
            ticket_id: &ticket.ticket_id,
            resumen: &ticket.summary,
            tipo_atencion_sd: &ticket.attention_type,
            area: &ticket.area,
            producto: &ticket.product,
        };
        let response: ConsultResponse = self.endpoint.post("/consultar", &request).await?;
        Ok(Precedent {
            found: response.encontrado,
            suggested_tier: response.nivel_sugerido,
            suggested_desk: response.mesa_sugerida,
            resolution_reference: response.resolucion_referencia,
            reasoning: response.razonamiento,
        })
    }
}

// ── Estimator ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EstimateRequest<'a> {
    ticket_id: &'a str,
    tipo_incidencia: &'static str,
    tipo_atencion_sd: &'a str,
    area: &'a str,
    producto: &'a str,
    resumen: &'a str,
    urgencia_detectada: &'static str,
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    tiempo_estimado_horas: f64,
    rango_minimo_horas: f64,
    rango_maximo_horas: f64,
    #[serde(default)]
    categoria_tiempo: Option<TimeCategory>,
}

pub struct HttpEstimator {
    endpoint: AgentEndpoint,
}

impl HttpEstimator {
    pub fn new(endpoint: AgentEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl Estimator for HttpEstimator {
    async fn estimate(&self, ticket: &TicketFeatures) -> Result<Estimate, CollaboratorError> {
        let request = EstimateRequest {
            ticket_id: &ticket.ticket_id,
            tipo_incidencia: incidence_label(ticket.incidence_type),
            tipo_atencion_sd: &ticket.attention_type,
            area: &ticket.area,
            producto: &ticket.product,
            resumen: &ticket.summary,
            urgencia_detectada: urgency_label(ticket.urgency),
        };
        let response: EstimateResponse = self.endpoint.post("/estimar", &request).await?;
        let hours = response.tiempo_estimado_horas;
        if !hours.is_finite() || hours < 0.0 {
            return Err(CollaboratorError::InvalidResponse(format!(
                "estimated hours {} out of range",
                hours
            )));
        }
        Ok(Estimate {
            hours,
            min_hours: response.rango_minimo_horas,
            max_hours: response.rango_maximo_horas,
            time_category: response
                .categoria_tiempo
                .unwrap_or_else(|| TimeCategory::from_hours(hours)),
        })
    }
}

// ── Complexity ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    ticket_id: &'a str,
    tipo_incidencia: &'static str,
    tipo_atencion_sd: &'a str,
    resumen: &'a str,
    area: &'a str,
    producto: &'a str,
    urgencia_detectada: &'static str,
    tiempo_estimado_horas: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    complejidad: Complexity,
    score: f64,
    nivel_recomendado: Tier,
    #[serde(default)]
    recomendacion: String,
}

pub struct HttpComplexity {
    endpoint: AgentEndpoint,
}

impl HttpComplexity {
    pub fn new(endpoint: AgentEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl ComplexityEvaluator for HttpComplexity {
    async fn evaluate(
        &self,
        ticket: &TicketFeatures,
        estimated_hours: Option<f64>,
    ) -> Result<ComplexityAssessment, CollaboratorError> {
        let request = EvaluateRequest {
            ticket_id: &ticket.ticket_id,
            tipo_incidencia: incidence_label(ticket.incidence_type),
            tipo_atencion_sd: &ticket.attention_type,
            resumen: &ticket.summary,
            area: &ticket.area,
            producto: &ticket.product,
            urgencia_detectada: urgency_label(ticket.urgency),
            tiempo_estimado_horas: estimated_hours,
        };
        let response: EvaluateResponse = self.endpoint.post("/evaluar", &request).await?;
        if !(0.0..=100.0).contains(&response.score) {
            return Err(CollaboratorError::InvalidResponse(format!(
                "complexity score {} outside [0, 100]",
                response.score
            )));
        }
        Ok(ComplexityAssessment {
            category: response.complejidad,
            score: response.score,
            recommended_tier: response.nivel_recomendado,
            reasoning: response.recomendacion,
        })
    }
}
