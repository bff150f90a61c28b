//! Webhook payloads and the attribution data that rides along with them.

use serde::Serialize;
use url::Url;

use crate::models::{Contact, QualificationInput, normalize_phone_full};

pub const LEAD_EVENT: &str = "diagnostico-n8n-data";
pub const QUALIFICATION_EVENT: &str = "diagnostico";

/// Request-side context of the visitor, as a browser would expose it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserContext {
    pub source_url: String,
    pub referrer: String,
    pub user_agent: String,
    pub cookie_header: String,
}

/// Attribution parameters read from the landing URL and cookies.
///
/// Empty strings mean "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingParams {
    pub utm_campaign: String,
    pub utm_content: String,
    pub utm_id: String,
    pub utm_medium: String,
    pub utm_source: String,
    pub utm_term: String,
    pub utm_search: String,
    pub fbclid: String,
    pub gclid: String,
    pub wbraid: String,
    pub gbraid: String,
    pub fbp: String,
}

impl TrackingParams {
    /// Reads the query string of `url`. An unparseable URL yields no
    /// parameters.
    pub fn from_url(url: &str) -> Self {
        let mut params = Self::default();
        let Ok(parsed) = Url::parse(url) else {
            return params;
        };

        let mut utm_search_dash = String::new();
        for (key, value) in parsed.query_pairs() {
            let slot = match &*key {
                "utm_campaign" => &mut params.utm_campaign,
                "utm_content" => &mut params.utm_content,
                "utm_id" => &mut params.utm_id,
                "utm_medium" => &mut params.utm_medium,
                "utm_source" => &mut params.utm_source,
                "utm_term" => &mut params.utm_term,
                "utm_search" => &mut params.utm_search,
                "utm-search" => &mut utm_search_dash,
                "fbclid" => &mut params.fbclid,
                "gclid" => &mut params.gclid,
                "wbraid" => &mut params.wbraid,
                "gbraid" => &mut params.gbraid,
                "fbp" => &mut params.fbp,
                _ => continue,
            };
            // First occurrence wins.
            if slot.is_empty() {
                *slot = value.into_owned();
            }
        }

        if params.utm_search.is_empty() {
            params.utm_search = utm_search_dash;
        }
        params
    }

    /// Like [`from_url`](Self::from_url), but `fbp` prefers the `_fbp`
    /// cookie over the query parameter.
    pub fn from_context(ctx: &BrowserContext) -> Self {
        let mut params = Self::from_url(&ctx.source_url);
        if let Some(fbp) = cookie_value(&ctx.cookie_header, "_fbp").filter(|v| !v.is_empty()) {
            params.fbp = fbp;
        }
        params
    }
}

/// Value of cookie `name` in a `Cookie` header, percent-decoded.
///
/// ```
/// use margin_core::tracking::cookie_value;
///
/// let header = "a=1; _fbp=fb.1.17%2F2; b=2";
/// assert_eq!(cookie_value(header, "_fbp").as_deref(), Some("fb.1.17/2"));
/// assert_eq!(cookie_value(header, "missing"), None);
/// ```
pub fn cookie_value(
    header: &str,
    name: &str,
) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let value = pair.strip_prefix(name)?.strip_prefix('=')?;
        Some(match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_string(),
        })
    })
}

/// Maps a team-size label to its short wire form; unknown labels pass
/// through trimmed.
pub fn normalize_team(label: &str) -> String {
    let label = label.trim();
    match label {
        "Somente eu" => "1",
        "Eu e mais uma pessoa" => "2",
        "De 3 a 5 pessoas" => "3 a 5",
        "De 6 a 10 pessoas" => "6 a 10",
        "Mais de 10 pessoas" => "Mais de 10",
        other => other,
    }
    .to_string()
}

const AREA_SLUGS: &[(&str, &str)] = &[
    ("estetica", "aesthetic"),
    ("odontologia", "dentistry"),
    ("medicina", "medicine"),
    ("biomedicina", "biomedicine"),
    ("fisioterapia", "physiotherapy"),
    ("psicologia", "psychology"),
    ("nutricao", "nutrition"),
    ("podologia", "podiatry"),
    ("massoterapia", "massage-therapy"),
    ("micropigmentacao", "micropigmentation"),
    ("microblading", "microblading"),
    ("manicure/pedicure", "manicure-pedicure"),
    ("manicure / pedicure", "manicure-pedicure"),
    ("lash designer", "lash-designer"),
    ("depilacao", "depilation"),
    ("salao de beleza", "beauty"),
    ("outra", "default"),
];

const KNOWN_AREAS: &[&str] = &[
    "aesthetic",
    "dentistry",
    "medicine",
    "biomedicine",
    "physiotherapy",
    "psychology",
    "nutrition",
    "beauty",
    "depilation",
    "lash-designer",
    "manicure-pedicure",
    "massage-therapy",
    "microblading",
    "micropigmentation",
    "podiatry",
    "default",
];

/// Maps a Portuguese area label (accents optional, any case) to its slug.
///
/// Known slugs pass through; any other non-empty value becomes `default`.
/// Empty input stays empty.
pub fn normalize_area(label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        return String::new();
    }

    let folded = fold_accents(&label.to_lowercase());
    if let Some((_, slug)) = AREA_SLUGS.iter().find(|(name, _)| *name == folded) {
        return slug.to_string();
    }

    let lower = label.to_lowercase();
    if KNOWN_AREAS.contains(&lower.as_str()) {
        return lower;
    }

    "default".to_string()
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Minimal lead sent when the contact gate unlocks the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPayload {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub event: &'static str,
}

impl LeadPayload {
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.trim().to_string(),
            phone: normalize_phone_full(&contact.phone).unwrap_or_default(),
            email: contact.email.trim().to_string(),
            event: LEAD_EVENT,
        }
    }
}

/// Enriched lead sent when the qualification wizard is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualificationPayload {
    pub challenge: String,
    pub area: String,
    pub team: String,
    pub system: &'static str,
    pub active: &'static str,
    pub money: &'static str,
    pub event: &'static str,
    pub event_id: String,
    pub referrer: String,
    pub source_url: String,
    pub user_agent: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub fbclid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gclid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub wbraid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gbraid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fbp: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub utm_campaign: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub utm_content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub utm_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub utm_medium: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub utm_source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub utm_term: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub utm_search: String,
}

impl QualificationPayload {
    pub fn build(
        input: &QualificationInput,
        event_id: String,
        ctx: &BrowserContext,
    ) -> Self {
        let tracking = TrackingParams::from_context(ctx);
        let contact = &input.contact;

        Self {
            challenge: input.challenge.trim().to_string(),
            area: normalize_area(&input.area),
            team: normalize_team(&input.team_size),
            system: input.uses_system.as_str(),
            active: input.is_subscriber.as_str(),
            money: input.investment_ok.as_str(),
            event: QUALIFICATION_EVENT,
            event_id,
            referrer: ctx.referrer.clone(),
            source_url: ctx.source_url.clone(),
            user_agent: ctx.user_agent.clone(),
            email: contact.email.clone(),
            name: contact.name.clone(),
            phone: normalize_phone_full(&contact.phone).unwrap_or_default(),
            fbclid: tracking.fbclid,
            gclid: tracking.gclid,
            wbraid: tracking.wbraid,
            gbraid: tracking.gbraid,
            fbp: tracking.fbp,
            utm_campaign: tracking.utm_campaign,
            utm_content: tracking.utm_content,
            utm_id: tracking.utm_id,
            utm_medium: tracking.utm_medium,
            utm_source: tracking.utm_source,
            utm_term: tracking.utm_term,
            utm_search: tracking.utm_search,
        }
    }
}
