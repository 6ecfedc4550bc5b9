//! Ticket QR rendering.
//!
//! Renders the ticket payload JSON into an SVG QR image and wraps it in a
//! data URI, so the frontend can drop it straight into an `img` tag and the
//! value can be persisted as a single text column.

use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::{render::svg, QrCode};
use thiserror::Error;

use domain::models::TicketQrPayload;

/// Error type for QR rendering.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("Failed to encode QR code: {0}")]
    Encoding(String),
}

const MIN_DIMENSIONS: u32 = 240;

/// Renders a ticket payload as an SVG QR code data URI.
pub fn render_ticket_qr(payload: &TicketQrPayload) -> Result<String, QrError> {
    let code = QrCode::new(payload.to_json().as_bytes())
        .map_err(|e| QrError::Encoding(e.to_string()))?;

    let image = code
        .render::<svg::Color>()
        .min_dimensions(MIN_DIMENSIONS, MIN_DIMENSIONS)
        .build();

    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}
