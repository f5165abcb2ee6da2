//! Envío de rutas a conductores por correo
//!
//! El formato del correo es deliberadamente simple: lista de paradas y el
//! enlace de navegación. El transporte es un proveedor HTTP configurable.

use crate::config::EmailConfig;
use crate::models::{EventInfo, RouteWithDriver};
use crate::utils::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

/// Mensaje de ruta listo para enviar
#[derive(Debug, Clone, Serialize)]
pub struct RouteEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub route_id: Uuid,
    pub driver_id: Uuid,
    pub event_id: Uuid,
}

#[async_trait]
pub trait RouteNotifier: Send + Sync {
    async fn send_route(&self, email: &RouteEmail) -> AppResult<()>;
}

/// Escapar texto para incrustarlo en HTML
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Componer el correo de una ruta. Devuelve None si el conductor no tiene email.
pub fn compose_route_email(route: &RouteWithDriver, event: &EventInfo) -> Option<RouteEmail> {
    let to = route
        .driver_email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())?
        .to_string();

    let stops = &route.route.stops.0;
    let stop_items = if stops.is_empty() {
        "<p><em>No pickup locations specified</em></p>".to_string()
    } else {
        let items: Vec<String> = stops
            .iter()
            .map(|stop| {
                let phone = stop
                    .phone
                    .as_deref()
                    .map(|p| format!("<br>📞 {}", escape_html(p)))
                    .unwrap_or_default();
                format!(
                    "<li><strong>{}</strong><br>📍 {}{}</li>",
                    escape_html(&stop.passenger),
                    escape_html(&stop.address),
                    phone
                )
            })
            .collect();
        format!("<ol>{}</ol>", items.join(""))
    };

    let when = event
        .start_datetime
        .map(|start| start.format("%A, %B %-d, %Y %-I:%M %p UTC").to_string())
        .unwrap_or_else(|| "Date TBD".to_string());

    let html = format!(
        "<h1>🚗 Transport Route Assignment</h1>\
         <p><strong>Event:</strong> {}<br><strong>Date:</strong> {}<br><strong>Location:</strong> {}</p>\
         <p><strong>Driver:</strong> {}<br><strong>Vehicle:</strong> {}<br><strong>Passengers:</strong> {}</p>\
         <h3>📍 Pickup Locations</h3>{}\
         <p><a href=\"{}\">🗺️ Open Route in Maps</a></p>",
        escape_html(&event.title),
        when,
        escape_html(event.location.as_deref().unwrap_or("TBD")),
        escape_html(route.driver_name.as_deref().unwrap_or("Driver")),
        escape_html(route.vehicle_label.as_deref().unwrap_or("-")),
        stops.len(),
        stop_items,
        escape_html(&route.route.map_url),
    );

    Some(RouteEmail {
        to,
        subject: format!("🚗 Transport Route for {}", event.title),
        html,
        route_id: route.route.id,
        driver_id: route.route.driver_id,
        event_id: route.route.event_id,
    })
}

/// Proveedor de correo vía HTTP (POST JSON con token Bearer)
pub struct HttpEmailNotifier {
    config: EmailConfig,
    client: reqwest::Client,
}

impl HttpEmailNotifier {
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Internal(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl RouteNotifier for HttpEmailNotifier {
    async fn send_route(&self, email: &RouteEmail) -> AppResult<()> {
        let payload = json!({
            "from": self.config.from,
            "to": email.to,
            "subject": email.subject,
            "html": email.html,
            "metadata": {
                "event_id": email.event_id,
                "route_id": email.route_id,
                "driver_id": email.driver_id,
                "transport_type": "route_assignment",
            }
        });

        let mut request = self
            .client
            .post(&self.config.api_url)
            .header("User-Agent", "EventTransport/1.0")
            .json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("email request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Proveedor de correo respondió {}: {}", status, body);
            return Err(AppError::ExternalApi(format!(
                "email provider returned {}",
                status
            )));
        }

        Ok(())
    }
}

/// Notificador que solo registra el mensaje (sin proveedor configurado)
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl RouteNotifier for LogNotifier {
    async fn send_route(&self, email: &RouteEmail) -> AppResult<()> {
        tracing::info!(
            "✉️ (sin proveedor) ruta {} para {}: {}",
            email.route_id,
            email.to,
            email.subject
        );
        Ok(())
    }
}
