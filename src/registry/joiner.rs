use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate};

use super::rto::registry_entry_rto::{
  EntryKind, HouseholdMemberRto, RegistryEntryRto,
};
use crate::shared::model::{
  address::UNSPECIFIED_RESIDENCE,
  family::{Family, Member},
  person::Person,
  relative::Relative,
  user::User,
};

pub const MISSING_DATE: &str = "N/A";
pub const INVALID_DATE: &str = "Data non valida";

/// Every collection the registry is built from.
#[derive(Debug, Default)]
pub struct RegistrySource {
  pub users: Vec<User>,
  pub families: Vec<Family>,
  pub members: Vec<Member>,
  pub relatives: Vec<Relative>,
}

/// Merges users, household members and relatives into one list of people.
///
/// Users come first, then members, then relatives. Entries whose non-empty
/// tax code (compared case-insensitively) was already seen are dropped.
pub fn join(source: RegistrySource) -> Vec<RegistryEntryRto> {
  let RegistrySource {
    users,
    families,
    members,
    relatives,
  } = source;

  let mut members_by_family: HashMap<String, Vec<Member>> = HashMap::new();
  for member in members {
    members_by_family
      .entry(member.family_id.clone())
      .or_default()
      .push(member);
  }
  for household in members_by_family.values_mut() {
    household.sort_by(|a, b| a.created_at.cmp(&b.created_at));
  }

  let family_by_head: HashMap<&str, &Family> = families
    .iter()
    .map(|family| (family.head_user_id.as_str(), family))
    .collect();

  let mut entries = Vec::new();

  for user in &users {
    let family = family_by_head.get(user.id.as_str()).copied();
    let household: Vec<HouseholdMemberRto> = family
      .and_then(|family| members_by_family.get(&family.id))
      .map(|members| members.iter().map(household_member).collect())
      .unwrap_or_default();
    let residence = match family {
      Some(family) => family.address.residence_or_unspecified(),
      None => user.profile.address.residence_or_unspecified(),
    };
    let birth_date = user.profile.birth_date.clone();

    entries.push(RegistryEntryRto {
      id: user.id.clone(),
      kind: EntryKind::User,
      is_head: family.is_some(),
      first_name: user.profile.first_name.clone(),
      last_name: user.profile.last_name.clone(),
      birth_date_display: format_birth_date(birth_date.as_deref()),
      birth_date,
      birth_place: user.profile.birth_place.clone(),
      tax_code: user.profile.tax_code.clone(),
      residence,
      family_id: family.map(|family| family.id.clone()),
      household,
    });
  }

  for family in &families {
    let Some(household) = members_by_family.get(&family.id) else {
      continue;
    };
    let residence = family.address.residence_or_unspecified();
    for member in household {
      entries.push(person_entry(
        &member.id,
        EntryKind::Member,
        &member.person,
        residence.clone(),
        Some(family.id.clone()),
      ));
    }
  }

  for relative in &relatives {
    let residence = relative
      .address
      .clone()
      .unwrap_or_else(|| UNSPECIFIED_RESIDENCE.to_string());
    entries.push(person_entry(
      &relative.id,
      EntryKind::Relative,
      &relative.person,
      residence,
      None,
    ));
  }

  dedupe_by_tax_code(entries)
}

/// Keeps entries whose name, surname or tax code contains `query`,
/// ignoring case. A blank query keeps everything.
pub fn search(
  entries: Vec<RegistryEntryRto>,
  query: &str,
) -> Vec<RegistryEntryRto> {
  let query = query.trim().to_lowercase();
  if query.is_empty() {
    return entries;
  }

  entries
    .into_iter()
    .filter(|entry| {
      entry.first_name.to_lowercase().contains(&query)
        || entry.last_name.to_lowercase().contains(&query)
        || entry
          .tax_code
          .as_ref()
          .is_some_and(|code| code.to_lowercase().contains(&query))
    })
    .collect()
}

pub fn sort(entries: &mut [RegistryEntryRto]) {
  entries.sort_by_cached_key(|entry| {
    (entry.last_name.to_lowercase(), entry.first_name.to_lowercase())
  });
}

/// Renders an ISO birth date as `dd/mm/yyyy`.
pub fn format_birth_date(value: Option<&str>) -> String {
  let Some(value) = value.map(str::trim).filter(|value| !value.is_empty())
  else {
    return MISSING_DATE.to_string();
  };

  NaiveDate::parse_from_str(value, "%Y-%m-%d")
    .ok()
    .or_else(|| {
      DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.date_naive())
    })
    .map(|date| date.format("%d/%m/%Y").to_string())
    .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn household_member(member: &Member) -> HouseholdMemberRto {
  HouseholdMemberRto {
    id: member.id.clone(),
    first_name: member.person.first_name.clone(),
    last_name: member.person.last_name.clone(),
  }
}

fn person_entry(
  id: &str,
  kind: EntryKind,
  person: &Person,
  residence: String,
  family_id: Option<String>,
) -> RegistryEntryRto {
  RegistryEntryRto {
    id: id.to_string(),
    kind,
    is_head: false,
    first_name: person.first_name.clone(),
    last_name: person.last_name.clone(),
    birth_date: Some(person.birth_date.clone())
      .filter(|date| !date.trim().is_empty()),
    birth_date_display: format_birth_date(Some(&person.birth_date)),
    birth_place: person.birth_place.clone(),
    tax_code: person.tax_code.clone(),
    residence,
    family_id,
    household: Vec::new(),
  }
}

fn dedupe_by_tax_code(entries: Vec<RegistryEntryRto>) -> Vec<RegistryEntryRto> {
  let mut seen = HashSet::new();
  entries
    .into_iter()
    .filter(|entry| {
      match entry.tax_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => seen.insert(code.to_uppercase()),
        _ => true,
      }
    })
    .collect()
}
