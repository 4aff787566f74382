// Data model for medicines, prescriptions, and their resolved display form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when a prescribed medicine no longer exists in the catalog.
pub const UNKNOWN_MEDICINE: &str = "Unknown Medicine";

/// Dosage text used when no instruction, override, or catalog dosage is present.
pub const AS_DIRECTED: &str = "As directed";

/// Time of day a medicine is taken. The derived ordering is the fixed order
/// sections are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Night];
}

/// Whether a medicine is taken before or after a meal, or unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealRelation {
    Before,
    After,
    #[default]
    None,
}

impl MealRelation {
    /// Fixed label for the meal line, or `None` when the line is omitted.
    pub fn label(self) -> Option<&'static str> {
        match self {
            MealRelation::Before => Some("BEFORE MEAL"),
            MealRelation::After => Some("AFTER MEAL"),
            MealRelation::None => Option::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicineKind {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Cream,
    Ointment,
}

/// Catalog record for a registered medicine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub dosage: String,
    #[serde(rename = "type")]
    pub kind: MedicineKind,
    pub manufacturer: String,
}

/// One medicine line of a prescription, referencing the catalog by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionEntry {
    pub medicine_id: String,
    pub timing: Vec<TimeOfDay>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub meal: MealRelation,
    /// Legacy per-entry dosage override, kept for old records.
    #[serde(default)]
    pub dosage: Option<String>,
}

/// A submitted prescription. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(default)]
    pub id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub medicines: Vec<PrescriptionEntry>,
}

impl Prescription {
    /// Join each entry with its catalog record. Medicines missing from the
    /// catalog resolve to a placeholder name and an empty dosage fallback —
    /// degraded rendering, not an error.
    pub fn resolve(&self, catalog: &[Medicine]) -> ResolvedPrescription {
        let entries = self
            .medicines
            .iter()
            .map(|entry| {
                let medicine = catalog.iter().find(|m| m.id == entry.medicine_id);
                ResolvedEntry {
                    name: medicine
                        .map(|m| m.name.clone())
                        .unwrap_or_else(|| UNKNOWN_MEDICINE.to_string()),
                    dosage_fallback: medicine.map(|m| m.dosage.clone()).unwrap_or_default(),
                    timing: entry.timing.clone(),
                    instruction: entry.instruction.clone(),
                    legacy_dosage: entry.dosage.clone(),
                    meal: entry.meal,
                }
            })
            .collect();

        ResolvedPrescription {
            id: self.id.clone(),
            created_at: self.created_at,
            entries,
        }
    }
}

/// A prescription entry joined with its resolved catalog display fields.
/// This is the layout engine's input; the engine never touches the catalog.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub name: String,
    pub dosage_fallback: String,
    pub timing: Vec<TimeOfDay>,
    pub instruction: Option<String>,
    pub legacy_dosage: Option<String>,
    pub meal: MealRelation,
}

impl ResolvedEntry {
    /// Text for the dosage line: first non-empty of instruction, legacy
    /// override, catalog dosage; "As directed" when all are absent. Exactly
    /// one source is chosen, never concatenated.
    pub fn dosage_line(&self) -> &str {
        if let Some(ref instruction) = self.instruction {
            if !instruction.is_empty() {
                return instruction;
            }
        }
        if let Some(ref dosage) = self.legacy_dosage {
            if !dosage.is_empty() {
                return dosage;
            }
        }
        if !self.dosage_fallback.is_empty() {
            return &self.dosage_fallback;
        }
        AS_DIRECTED
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPrescription {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<ResolvedEntry>,
}

pub fn format_date_display(date: &DateTime<Utc>) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Last 8 characters of a prescription id, used for display and filenames.
pub fn id_suffix(id: &str) -> &str {
    let start = id.len().saturating_sub(8);
    if id.is_char_boundary(start) {
        &id[start..]
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ResolvedEntry {
        ResolvedEntry {
            name: "Paracetamol 500mg".to_string(),
            dosage_fallback: "1 tablet".to_string(),
            timing: vec![TimeOfDay::Morning],
            instruction: None,
            legacy_dosage: None,
            meal: MealRelation::None,
        }
    }

    #[test]
    fn dosage_line_prefers_instruction() {
        let mut e = entry();
        e.instruction = Some("2 tablets with water".to_string());
        e.legacy_dosage = Some("1 tablet".to_string());
        assert_eq!(e.dosage_line(), "2 tablets with water");
    }

    #[test]
    fn dosage_line_falls_back_to_legacy_override() {
        let mut e = entry();
        e.legacy_dosage = Some("half a tablet".to_string());
        e.dosage_fallback = "1 tablet".to_string();
        assert_eq!(e.dosage_line(), "half a tablet");
    }

    #[test]
    fn dosage_line_falls_back_to_catalog_dosage() {
        let e = entry();
        assert_eq!(e.dosage_line(), "1 tablet");
    }

    #[test]
    fn dosage_line_defaults_to_as_directed() {
        let mut e = entry();
        e.dosage_fallback = String::new();
        assert_eq!(e.dosage_line(), AS_DIRECTED);
    }

    #[test]
    fn empty_instruction_does_not_shadow_fallback() {
        let mut e = entry();
        e.instruction = Some(String::new());
        assert_eq!(e.dosage_line(), "1 tablet");
    }

    #[test]
    fn resolve_joins_catalog_fields() {
        let catalog = vec![Medicine {
            id: "med-001".to_string(),
            name: "Amoxicillin 250mg".to_string(),
            dosage: "1 capsule".to_string(),
            kind: MedicineKind::Capsule,
            manufacturer: "GSK".to_string(),
        }];
        let prescription = Prescription {
            id: "rx-1".to_string(),
            created_at: Utc::now(),
            medicines: vec![PrescriptionEntry {
                medicine_id: "med-001".to_string(),
                timing: vec![TimeOfDay::Night],
                instruction: None,
                meal: MealRelation::After,
                dosage: None,
            }],
        };

        let resolved = prescription.resolve(&catalog);
        assert_eq!(resolved.entries.len(), 1);
        assert_eq!(resolved.entries[0].name, "Amoxicillin 250mg");
        assert_eq!(resolved.entries[0].dosage_fallback, "1 capsule");
        assert_eq!(resolved.entries[0].meal, MealRelation::After);
    }

    #[test]
    fn resolve_missing_medicine_uses_placeholder() {
        let prescription = Prescription {
            id: "rx-1".to_string(),
            created_at: Utc::now(),
            medicines: vec![PrescriptionEntry {
                medicine_id: "med-404".to_string(),
                timing: vec![TimeOfDay::Morning],
                instruction: None,
                meal: MealRelation::None,
                dosage: None,
            }],
        };

        let resolved = prescription.resolve(&[]);
        assert_eq!(resolved.entries[0].name, UNKNOWN_MEDICINE);
        assert_eq!(resolved.entries[0].dosage_line(), AS_DIRECTED);
    }

    #[test]
    fn prescription_json_fills_defaults() {
        let json = r#"{"medicines": [{"medicine_id": "med-001", "timing": ["morning", "night"]}]}"#;
        let prescription: Prescription = serde_json::from_str(json).unwrap();
        assert!(prescription.id.is_empty());
        assert_eq!(prescription.medicines[0].meal, MealRelation::None);
        assert_eq!(
            prescription.medicines[0].timing,
            vec![TimeOfDay::Morning, TimeOfDay::Night]
        );
        assert!(prescription.medicines[0].instruction.is_none());
    }

    #[test]
    fn meal_relation_parses_lowercase() {
        let json = r#"{"medicine_id": "m", "timing": ["afternoon"], "meal": "before"}"#;
        let entry: PrescriptionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.meal, MealRelation::Before);
    }

    #[test]
    fn id_suffix_takes_last_eight_chars() {
        assert_eq!(id_suffix("rx-20250314-7f3a9c12"), "7f3a9c12");
        assert_eq!(id_suffix("short"), "short");
    }
}
