use serde::{Deserialize, Serialize};

use super::Contact;

/// Answer to a yes/no question that may not have been answered yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
    #[default]
    #[serde(rename = "")]
    Unanswered,
}

impl YesNo {
    /// Reads a select value. Accepts the Portuguese labels (`sim`, `não`,
    /// `nao`) and `yes`/`no`, case-insensitive; anything else is unanswered.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sim" | "yes" => YesNo::Yes,
            "não" | "nao" | "no" => YesNo::No,
            _ => YesNo::Unanswered,
        }
    }

    pub fn is_answered(&self) -> bool {
        !matches!(self, YesNo::Unanswered)
    }

    /// Wire value: `"yes"`, `"no"` or `""`.
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
            YesNo::Unanswered => "",
        }
    }
}

/// Answers collected by the "talk to a specialist" wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationInput {
    // Step 1
    pub challenge: String,
    pub team_size: String,
    pub uses_system: YesNo,

    // Step 2
    pub area: String,
    pub is_subscriber: YesNo,
    pub investment_ok: YesNo,

    // Step 3
    pub contact: Contact,
}

impl QualificationInput {
    /// Clears every answer but keeps the contact.
    pub fn clear_answers(&mut self) {
        let contact = std::mem::take(&mut self.contact);
        *self = Self {
            contact,
            ..Default::default()
        };
    }
}

/// Fields of the qualification wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualificationField {
    Challenge,
    TeamSize,
    UsesSystem,
    Area,
    IsSubscriber,
    InvestmentOk,
    Name,
    Phone,
    Email,
}

impl QualificationField {
    pub fn all() -> &'static [QualificationField] {
        &[
            QualificationField::Challenge,
            QualificationField::TeamSize,
            QualificationField::UsesSystem,
            QualificationField::Area,
            QualificationField::IsSubscriber,
            QualificationField::InvestmentOk,
            QualificationField::Name,
            QualificationField::Phone,
            QualificationField::Email,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            QualificationField::Challenge => "challenge",
            QualificationField::TeamSize => "team",
            QualificationField::UsesSystem => "uses_system",
            QualificationField::Area => "area",
            QualificationField::IsSubscriber => "subscriber",
            QualificationField::InvestmentOk => "investment",
            QualificationField::Name => "name",
            QualificationField::Phone => "phone",
            QualificationField::Email => "email",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|field| field.key() == s)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn yes_no_reads_portuguese_labels() {
        assert_eq!(YesNo::parse("Sim"), YesNo::Yes);
        assert_eq!(YesNo::parse(" NÃO "), YesNo::No);
        assert_eq!(YesNo::parse("nao"), YesNo::No);
        assert_eq!(YesNo::parse("talvez"), YesNo::Unanswered);
        assert_eq!(YesNo::parse(""), YesNo::Unanswered);
    }

    #[test]
    fn clear_answers_keeps_contact() {
        let mut input = QualificationInput {
            challenge: "Agenda".to_string(),
            uses_system: YesNo::Yes,
            contact: Contact::from_raw("Ana", "11987654321", "ana@x.com"),
            ..Default::default()
        };

        input.clear_answers();

        assert_eq!(input.challenge, "");
        assert_eq!(input.uses_system, YesNo::Unanswered);
        assert_eq!(input.contact.name, "Ana");
    }
}
