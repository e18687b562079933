use serde::{Deserialize, Deserializer, Serialize};

/// An opaque text attribute as received from a collaborator.
///
/// The original form is kept for display. Matching always happens on a
/// normalized copy produced by `markclash-features`; this value is never
/// rewritten in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextField(String);

impl TextField {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Decode raw bytes, treating anything that is not valid UTF-8 as empty text.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(s) => Self(s.to_string()),
            Err(_) => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the field holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for TextField {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TextField {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration status of a reference entry, derived from its free-text `Status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrademarkStatus {
    /// Registered and in force
    Live,
    /// Abandoned, refused, withdrawn, removed or expired
    Dead,
    /// Application still moving through examination or opposition
    Pending,
    /// Unrecognized status text
    Unknown,
}

impl Default for TrademarkStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl From<&str> for TrademarkStatus {
    fn from(s: &str) -> Self {
        let s = s.trim().to_lowercase();
        const DEAD: [&str; 6] = ["abandon", "refused", "withdrawn", "removed", "expired", "rejected"];
        const PENDING: [&str; 8] = [
            "pending", "objected", "opposed", "accepted", "advertised", "formalities",
            "examination", "exam",
        ];

        if s.is_empty() {
            Self::Unknown
        } else if DEAD.iter().any(|p| s.contains(p)) {
            Self::Dead
        } else if s.contains("registered") || s == "live" {
            Self::Live
        } else if PENDING.iter().any(|p| s.contains(p)) {
            Self::Pending
        } else {
            Self::Unknown
        }
    }
}

/// Structured output of the extraction collaborator for one page or document.
///
/// Every attribute is optional. Only `name` is needed for scoring; the
/// accessors return an empty string for anything absent so callers never
/// have to special-case missing fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Identifier of the source document, if the caller assigned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    /// Page the record was extracted from (1-based)
    #[serde(default, deserialize_with = "lenient_page", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    /// Company/applicant name
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub address: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub city: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub state: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub country: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub firm_type: Option<TextField>,

    /// Registration or application date, as printed
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub date: Option<TextField>,

    /// Stylized text that forms part of the logo itself
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub text_in_logo: Option<TextField>,

    /// Short visual description of the logo
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub logo_description: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub business_category: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub phone: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub website: Option<TextField>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<TextField>,

    /// Goods/services description
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<TextField>,
}

impl CandidateRecord {
    /// Create a minimal record carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(TextField::new(name)),
            ..Default::default()
        }
    }

    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    pub fn with_text_in_logo(mut self, text: impl Into<String>) -> Self {
        self.text_in_logo = Some(TextField::new(text));
        self
    }

    /// Identifier used in results: the source id, else the page, else a placeholder.
    pub fn id(&self) -> String {
        match (&self.source_id, self.page_number) {
            (Some(id), _) if !id.trim().is_empty() => id.clone(),
            (_, Some(page)) => format!("page-{}", page),
            _ => "candidate".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        text_or_empty(&self.name)
    }

    pub fn text_in_logo(&self) -> &str {
        text_or_empty(&self.text_in_logo)
    }

    pub fn registration_number(&self) -> &str {
        text_or_empty(&self.registration_number)
    }
}

fn text_or_empty(field: &Option<TextField>) -> &str {
    field.as_ref().map(TextField::as_str).unwrap_or("")
}

/// One row of the existing trademark database.
///
/// Serde names follow the reference CSV header exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(rename = "Client / Applicant", default)]
    pub applicant: TextField,

    #[serde(rename = "Application No.", default)]
    pub application_no: TextField,

    /// The word mark; rows without one cannot be compared
    #[serde(rename = "Trademark", default)]
    pub trademark: TextField,

    #[serde(rename = "Logo", default)]
    pub logo_description: TextField,

    /// Nice classification, free text such as "25" or "9, 42"
    #[serde(rename = "Class", default)]
    pub class: TextField,

    #[serde(rename = "Status", default)]
    pub status: TextField,

    #[serde(rename = "Validity", default)]
    pub validity: TextField,
}

impl ReferenceEntry {
    /// Create a minimal entry for testing.
    pub fn new(application_no: impl Into<String>, trademark: impl Into<String>) -> Self {
        Self {
            application_no: TextField::new(application_no),
            trademark: TextField::new(trademark),
            ..Default::default()
        }
    }

    pub fn with_applicant(mut self, applicant: impl Into<String>) -> Self {
        self.applicant = TextField::new(applicant);
        self
    }

    /// Identifier used in results: the application number, else the 1-based row.
    pub fn id(&self, index: usize) -> String {
        let no = self.application_no.as_str().trim();
        if no.is_empty() {
            format!("row-{}", index + 1)
        } else {
            no.to_string()
        }
    }

    pub fn registration_status(&self) -> TrademarkStatus {
        TrademarkStatus::from(self.status.as_str())
    }

    /// Nice class numbers mentioned in the `Class` column.
    pub fn classes(&self) -> Vec<u16> {
        self.class
            .as_str()
            .split(|c: char| !c.is_ascii_digit())
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

/// Accepts strings, numbers and booleans; anything else (null, arrays, objects) is absent.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Other(serde::de::IgnoredAny),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<TextField>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawField>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawField::Text(s)) => Some(TextField(s)),
        Some(RawField::Int(n)) => Some(TextField(n.to_string())),
        Some(RawField::Float(n)) => Some(TextField(n.to_string())),
        Some(RawField::Bool(b)) => Some(TextField(b.to_string())),
        Some(RawField::Other(_)) | None => None,
    })
}

fn lenient_page<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawField>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawField::Int(n)) => u32::try_from(n).ok(),
        Some(RawField::Text(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
