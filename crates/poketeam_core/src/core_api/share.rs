use std::fmt;

use qrcode::render::{svg, unicode};
use qrcode::{EcLevel, QrCode};

use crate::creature::CreatureId;

use super::error::{CoreError, CoreErrorCode};
use super::well_known::MAX_TEAM_SIZE;

pub const TEAM_PARAM: &str = "team";

pub const QR_SIZE_PX: u32 = 200;

/// Ordered id list of a shared team. Derived from the roster, never
/// authoritative over it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharePayload {
    ids: Vec<CreatureId>,
}

impl SharePayload {
    pub fn from_ids(ids: &[CreatureId]) -> Self {
        Self {
            ids: ids.iter().copied().take(MAX_TEAM_SIZE).collect(),
        }
    }

    /// Parse a `team` parameter value. Tokens that are empty, non-numeric or
    /// zero are dropped one by one; the rest keep their order.
    pub fn parse(value: &str) -> Self {
        let value = decode_commas(value);
        let ids = value
            .split(',')
            .filter_map(|token| token.trim().parse::<CreatureId>().ok())
            .filter(|&id| id > 0)
            .collect();
        Self { ids }
    }

    /// Extract the payload from a full share URL or a bare query string.
    /// `None` when the parameter is absent or nothing usable survives
    /// filtering.
    pub fn from_url(url: &str) -> Option<Self> {
        let query = match url.split_once('?') {
            Some((_, query)) => query,
            None => url,
        };
        let query = query.split('#').next().unwrap_or_default();

        let value = query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == TEAM_PARAM).then_some(value)
        })?;

        let payload = Self::parse(value);
        (!payload.is_empty()).then_some(payload)
    }

    pub fn ids(&self) -> &[CreatureId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn encode(&self) -> String {
        self.ids
            .iter()
            .map(CreatureId::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn to_url(&self, origin: &str) -> String {
        format!("{origin}?{TEAM_PARAM}={}", self.encode())
    }

    pub fn to_code(&self, origin: &str) -> Result<ShareCode, CoreError> {
        ShareCode::encode(&self.to_url(origin))
    }
}

fn decode_commas(value: &str) -> String {
    value.replace("%2C", ",").replace("%2c", ",")
}

/// QR code of a share URL at error-correction level H.
#[derive(Clone)]
pub struct ShareCode {
    url: String,
    code: QrCode,
}

impl fmt::Debug for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareCode")
            .field("url", &self.url)
            .field("width", &self.width())
            .finish()
    }
}

impl ShareCode {
    pub fn encode(url: &str) -> Result<Self, CoreError> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Encode,
                format!("failed to encode share code: {e}"),
            )
        })?;
        Ok(Self {
            url: url.to_string(),
            code,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn width(&self) -> usize {
        self.code.width()
    }

    pub fn to_svg(&self) -> String {
        self.code
            .render::<svg::Color>()
            .min_dimensions(QR_SIZE_PX, QR_SIZE_PX)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build()
    }

    /// Half-height block characters, light on dark, for terminals.
    pub fn to_terminal(&self) -> String {
        self.code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build()
    }
}
