use chrono::NaiveDateTime;
use tokio::sync::RwLock;

/// Outgoing notification kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

const OUTBOX_CAPACITY: usize = 100;

/// Notification sender. Messages are written to the log; when delivery is
/// disabled only a debug line is emitted. The last messages stay in an
/// in-memory outbox.
pub struct EmailService {
    enabled: bool,
    from: String,
    frontend_url: String,
    outbox: RwLock<Vec<EmailMessage>>,
}

impl EmailService {
    pub fn new(enabled: bool, from: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            enabled,
            from: from.into(),
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
            outbox: RwLock::new(Vec::new()),
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    pub async fn send_password_reset(&self, to: &str, full_name: &str, token: &str) {
        let link = self.reset_link(token);
        let body = format!(
            "Hola {},\n\nRecibimos una solicitud para restablecer tu contraseña.\n\
             Usa este enlace para crear una nueva: {}\n\n\
             Si no solicitaste el cambio, ignora este mensaje.",
            full_name, link
        );
        self.send(to, "Restablecer contraseña - HairHub", body).await;
    }

    pub async fn send_appointment_confirmation(
        &self,
        to: &str,
        client_name: &str,
        business_name: &str,
        service_name: &str,
        start_time: NaiveDateTime,
    ) {
        let body = format!(
            "Hola {},\n\nTu cita de {} en {} fue confirmada para el {}.",
            client_name,
            service_name,
            business_name,
            start_time.format("%d/%m/%Y %H:%M")
        );
        self.send(to, "Cita confirmada - HairHub", body).await;
    }

    pub async fn send_appointment_cancellation(
        &self,
        to: &str,
        client_name: &str,
        business_name: &str,
        start_time: NaiveDateTime,
        reason: Option<&str>,
    ) {
        let mut body = format!(
            "Hola {},\n\nTu cita en {} del {} fue cancelada.",
            client_name,
            business_name,
            start_time.format("%d/%m/%Y %H:%M")
        );
        if let Some(reason) = reason {
            body.push_str(&format!("\nMotivo: {}", reason));
        }
        self.send(to, "Cita cancelada - HairHub", body).await;
    }

    async fn send(&self, to: &str, subject: &str, body: String) {
        if self.enabled {
            tracing::info!(from = %self.from, to = %to, subject = %subject, "Sending email\n{}", body);
        } else {
            tracing::debug!(to = %to, subject = %subject, "Email delivery disabled, message not sent");
        }

        let mut outbox = self.outbox.write().await;
        if outbox.len() >= OUTBOX_CAPACITY {
            outbox.remove(0);
        }
        outbox.push(EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body,
        });
    }

    pub async fn sent_messages(&self) -> Vec<EmailMessage> {
        self.outbox.read().await.clone()
    }
}
