//! Scheduled stock digest
//!
//! Summarizes at-risk products and mails the report to the configured
//! recipient. A background task fires at the configured local hours; the
//! notifications endpoint can also trigger a send on demand.

use chrono::{Local, NaiveTime};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use shared::{AlertBanding, StockSeverity};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::{DigestConfig, SmtpConfig};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct DigestService {
    db: PgPool,
    smtp: SmtpConfig,
    digest: DigestConfig,
    banding: AlertBanding,
}

/// Stock position counts included in the digest
#[derive(Debug, Serialize, FromRow)]
pub struct StockSummary {
    pub total_active: i64,
    pub out_of_stock: i64,
    pub critical: i64,
    pub near_critical: i64,
}

/// An at-risk product line in the digest
#[derive(Debug, Serialize)]
pub struct AtRiskProduct {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock: i32,
    pub min_stock: i32,
    pub severity: StockSeverity,
}

#[derive(Debug, FromRow)]
struct AtRiskRow {
    id: Uuid,
    sku: String,
    name: String,
    stock: i32,
    min_stock: i32,
}

/// Outcome of a digest send
#[derive(Debug, Serialize)]
pub struct DigestReport {
    pub sent: bool,
    pub recipient: String,
    pub at_risk_products: usize,
    pub summary: StockSummary,
}

impl DigestService {
    pub fn new(db: PgPool, smtp: SmtpConfig, digest: DigestConfig, banding: AlertBanding) -> Self {
        Self {
            db,
            smtp,
            digest,
            banding,
        }
    }

    /// Counts of products in each stock band.
    pub async fn stock_summary(&self) -> AppResult<StockSummary> {
        let summary = sqlx::query_as::<_, StockSummary>(
            r#"
            SELECT COUNT(*) AS total_active,
                   COUNT(*) FILTER (WHERE stock <= 0) AS out_of_stock,
                   COUNT(*) FILTER (WHERE stock > 0 AND stock <= min_stock) AS critical,
                   COUNT(*) FILTER (WHERE stock > min_stock
                                      AND stock::float8 <= min_stock::float8 * $1) AS near_critical
            FROM products
            WHERE active = TRUE
            "#,
        )
        .bind(self.banding.approaching_factor)
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }

    /// The ten most urgent at-risk products, out-of-stock first, then by how
    /// little stock remains.
    pub async fn top_at_risk(&self) -> AppResult<Vec<AtRiskProduct>> {
        let rows = sqlx::query_as::<_, AtRiskRow>(
            r#"
            SELECT id, sku, name, stock, min_stock
            FROM products
            WHERE active = TRUE
              AND stock::float8 <= min_stock::float8 * $1
            ORDER BY CASE WHEN stock <= 0 THEN 0 WHEN stock <= min_stock THEN 1 ELSE 2 END,
                     stock, name
            LIMIT 10
            "#,
        )
        .bind(self.banding.approaching_factor)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AtRiskProduct {
                severity: StockSeverity::classify(
                    r.stock,
                    r.min_stock,
                    self.banding.approaching_factor,
                ),
                id: r.id,
                sku: r.sku,
                name: r.name,
                stock: r.stock,
                min_stock: r.min_stock,
            })
            .collect())
    }

    /// Build and send the digest. When no product is at risk the send is
    /// skipped and the report says so.
    pub async fn send_digest(&self) -> AppResult<DigestReport> {
        let summary = self.stock_summary().await?;
        let at_risk = self.top_at_risk().await?;

        if at_risk.is_empty() {
            tracing::info!("Stock digest skipped: no products at risk");
            return Ok(DigestReport {
                sent: false,
                recipient: self.digest.recipient.clone(),
                at_risk_products: 0,
                summary,
            });
        }

        let html = render_digest(&summary, &at_risk);
        let subject = format!(
            "Stock digest: {} out of stock, {} critical",
            summary.out_of_stock, summary.critical
        );

        self.send_mail(&subject, html).await?;

        tracing::info!(
            recipient = %self.digest.recipient,
            at_risk = at_risk.len(),
            "Stock digest sent"
        );

        Ok(DigestReport {
            sent: true,
            recipient: self.digest.recipient.clone(),
            at_risk_products: at_risk.len(),
            summary,
        })
    }

    async fn send_mail(&self, subject: &str, html: String) -> AppResult<()> {
        let message = Message::builder()
            .from(
                self.smtp
                    .from
                    .parse()
                    .map_err(|e| AppError::Email(format!("Invalid sender address: {e}")))?,
            )
            .to(self
                .digest
                .recipient
                .parse()
                .map_err(|e| AppError::Email(format!("Invalid recipient address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| AppError::Email(format!("Failed to build message: {e}")))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.host)
            .map_err(|e| AppError::Email(format!("SMTP relay error: {e}")))?
            .port(self.smtp.port)
            .credentials(Credentials::new(
                self.smtp.username.clone(),
                self.smtp.password.clone(),
            ))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| AppError::Email(format!("Failed to send digest: {e}")))?;

        Ok(())
    }
}

/// Render the digest body as HTML.
fn render_digest(summary: &StockSummary, at_risk: &[AtRiskProduct]) -> String {
    let mut html = String::new();
    html.push_str("<h2>Stock digest</h2>");
    html.push_str(&format!(
        "<p>{} active products. <strong>{}</strong> out of stock, \
         <strong>{}</strong> at or below minimum, {} approaching minimum.</p>",
        summary.total_active, summary.out_of_stock, summary.critical, summary.near_critical
    ));
    html.push_str(
        "<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\
         <tr><th>SKU</th><th>Product</th><th>Stock</th><th>Minimum</th><th>Status</th></tr>",
    );
    for product in at_risk {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            product.sku,
            product.name,
            product.stock,
            product.min_stock,
            product.severity.label()
        ));
    }
    html.push_str("</table>");
    html
}

/// Spawn the background task that sends the digest at the configured local
/// hours.
pub fn spawn_scheduler(service: DigestService) {
    let config = service.digest.clone();
    if !config.enabled {
        tracing::info!("Stock digest scheduler disabled");
        return;
    }

    let mut hours = config.send_hours.clone();
    hours.retain(|h| *h < 24);
    hours.sort_unstable();
    hours.dedup();
    if hours.is_empty() {
        tracing::warn!("Stock digest scheduler has no valid send hours");
        return;
    }

    tokio::spawn(async move {
        loop {
            let wait = duration_until_next(Local::now().time(), &hours);
            tracing::debug!(seconds = wait.as_secs(), "Next stock digest scheduled");
            tokio::time::sleep(wait).await;

            if let Err(e) = service.send_digest().await {
                tracing::error!(error = %e, "Scheduled stock digest failed");
            }
        }
    });
}

/// Time to sleep until the next configured send hour. `hours` must be
/// sorted, deduplicated, and non-empty.
fn duration_until_next(now: NaiveTime, hours: &[u32]) -> std::time::Duration {
    let next_today = hours
        .iter()
        .filter_map(|h| NaiveTime::from_hms_opt(*h, 0, 0))
        .find(|t| *t > now);

    let until = match next_today {
        Some(t) => t - now,
        None => {
            // Wrap to the first hour tomorrow.
            let first = NaiveTime::from_hms_opt(hours[0], 0, 0).unwrap_or_default();
            chrono::Duration::hours(24) - (now - first)
        }
    };

    until.to_std().unwrap_or(std::time::Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_next_hour_later_today() {
        let now = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let wait = duration_until_next(now, &[8, 12]);
        assert_eq!(wait.as_secs(), 2 * 3600 + 30 * 60);
    }

    #[test]
    fn wraps_to_tomorrow_after_last_hour() {
        let now = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
        let wait = duration_until_next(now, &[8, 12]);
        assert_eq!(wait.as_secs(), 19 * 3600);
    }

    #[test]
    fn exact_hour_waits_for_the_following_slot() {
        let now = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let wait = duration_until_next(now, &[8, 12]);
        assert_eq!(wait.as_secs(), 4 * 3600);
    }
}
