use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EntryKind {
  #[serde(rename = "utente")]
  User,
  #[serde(rename = "membro")]
  Member,
  #[serde(rename = "familiare")]
  Relative,
}

/// Household member listed under its head's entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HouseholdMemberRto {
  pub id: String,
  #[serde(rename = "nome")]
  pub first_name: String,
  #[serde(rename = "cognome")]
  pub last_name: String,
}

/// One person of the admin registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistryEntryRto {
  pub id: String,
  #[serde(rename = "tipo")]
  pub kind: EntryKind,
  #[serde(rename = "isCapofamiglia")]
  pub is_head: bool,
  #[serde(rename = "nome")]
  pub first_name: String,
  #[serde(rename = "cognome")]
  pub last_name: String,
  #[serde(rename = "dataNascita", skip_serializing_if = "Option::is_none")]
  pub birth_date: Option<String>,
  /// `dd/mm/yyyy`, "Data non valida" or "N/A".
  #[serde(rename = "dataNascitaFormattata")]
  pub birth_date_display: String,
  #[serde(rename = "luogoNascita", skip_serializing_if = "Option::is_none")]
  pub birth_place: Option<String>,
  #[serde(rename = "codiceFiscale", skip_serializing_if = "Option::is_none")]
  pub tax_code: Option<String>,
  #[serde(rename = "residenza")]
  pub residence: String,
  #[serde(rename = "famigliaId", skip_serializing_if = "Option::is_none")]
  pub family_id: Option<String>,
  #[serde(rename = "membriNucleo")]
  pub household: Vec<HouseholdMemberRto>,
}
