use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::warn;

/// Patient sex (0010,0040) as constrained by the CS value representation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
	#[default]
	M,
	F,
	O,
}

impl FromStr for Sex {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"M" => Ok(Self::M),
			"F" => Ok(Self::F),
			"O" => Ok(Self::O),
			_ => Err(()),
		}
	}
}

impl Display for Sex {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::M => write!(f, "M"),
			Self::F => write!(f, "F"),
			Self::O => write!(f, "O"),
		}
	}
}

impl Sex {
	/// Lenient parsing for the store boundary: anything outside {M,F,O} is
	/// corrected to M and logged, never rejected.
	pub fn normalize(value: Option<&str>) -> Self {
		match value {
			None | Some("") => Self::default(),
			Some(value) => value.parse().unwrap_or_else(|()| {
				warn!("Invalid patient sex '{value}', falling back to M");
				Self::default()
			}),
		}
	}
}

/// Modality (0008,0060) code strings supported by the worklist.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
	#[serde(rename = "US")]
	#[default]
	Us,
	#[serde(rename = "CT")]
	Ct,
	#[serde(rename = "MR")]
	Mr,
	#[serde(rename = "XR")]
	Xr,
	#[serde(rename = "CR")]
	Cr,
	#[serde(rename = "DX")]
	Dx,
	#[serde(rename = "MG")]
	Mg,
	#[serde(rename = "NM")]
	Nm,
	#[serde(rename = "PT")]
	Pt,
	#[serde(rename = "OT")]
	Ot,
}

impl Modality {
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Us => "US",
			Self::Ct => "CT",
			Self::Mr => "MR",
			Self::Xr => "XR",
			Self::Cr => "CR",
			Self::Dx => "DX",
			Self::Mg => "MG",
			Self::Nm => "NM",
			Self::Pt => "PT",
			Self::Ot => "OT",
		}
	}

	/// Lenient parsing for the store boundary: absent or unknown codes
	/// default to US and are logged, never rejected.
	pub fn normalize(value: Option<&str>) -> Self {
		match value {
			None | Some("") => Self::default(),
			Some(value) => value.parse().unwrap_or_else(|()| {
				warn!("Unknown modality '{value}', falling back to US");
				Self::default()
			}),
		}
	}
}

impl FromStr for Modality {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"US" => Ok(Self::Us),
			"CT" => Ok(Self::Ct),
			"MR" => Ok(Self::Mr),
			"XR" => Ok(Self::Xr),
			"CR" => Ok(Self::Cr),
			"DX" => Ok(Self::Dx),
			"MG" => Ok(Self::Mg),
			"NM" => Ok(Self::Nm),
			"PT" => Ok(Self::Pt),
			"OT" => Ok(Self::Ot),
			_ => Err(()),
		}
	}
}

impl Display for Modality {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A scheduled imaging procedure as persisted in a single `.wl` file.
///
/// Records are immutable once created; there is no update operation.
/// Only persisted fields live here — the creation timestamp belongs to the
/// store's cache entry because a decoded file carries no such information.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklistRecord {
	/// Unique identifier for the ordered procedure; also the storage key.
	pub accession_number: String,
	pub patient_family_name: String,
	pub patient_given_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub patient_middle_name: Option<String>,
	pub patient_id: String,
	/// Patient birth date in DICOM DA form (`YYYYMMDD`).
	pub birth_date: String,
	pub sex: Sex,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub requesting_physician: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub referring_physician: Option<String>,
	pub procedure_description: String,
	/// Scheduled procedure step start date in DA form (`YYYYMMDD`).
	pub scheduled_date: String,
	/// Scheduled procedure step start time in TM form (`HHMMSS`).
	pub scheduled_time: String,
	pub modality: Modality,
	pub station_aet: String,
	pub procedure_step_id: String,
	pub station_name: String,
	pub location: String,
	pub study_instance_uid: String,
	pub sop_instance_uid: String,
}

impl WorklistRecord {
	/// Composes the PN value `Family^Given^Middle^^` (or `Family^Given^^`
	/// when no middle name is present).
	pub fn patient_name(&self) -> String {
		match &self.patient_middle_name {
			Some(middle) => format!(
				"{}^{}^{}^^",
				self.patient_family_name, self.patient_given_name, middle
			),
			None => format!("{}^{}^^", self.patient_family_name, self.patient_given_name),
		}
	}

	/// Splits a PN value back into its name components.
	/// Empty trailing components become `None`.
	pub fn set_patient_name(&mut self, value: &str) {
		let mut parts = value.split('^');
		self.patient_family_name = parts.next().unwrap_or_default().to_owned();
		self.patient_given_name = parts.next().unwrap_or_default().to_owned();
		self.patient_middle_name = parts
			.next()
			.filter(|middle| !middle.is_empty())
			.map(ToOwned::to_owned);
	}
}

/// The plain input accepted by [`crate::store::WorklistStore::create`].
///
/// Dates and times may still carry separators (`1980-01-01`, `10:30`) and
/// sex/modality arrive as raw strings; the store normalizes all of them
/// before the codec ever sees the record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorklistItem {
	pub accession_number: String,
	pub patient_family_name: String,
	pub patient_given_name: String,
	#[serde(default)]
	pub patient_middle_name: Option<String>,
	pub patient_id: String,
	pub birth_date: String,
	#[serde(default)]
	pub sex: Option<String>,
	#[serde(default)]
	pub requesting_physician: Option<String>,
	#[serde(default)]
	pub referring_physician: Option<String>,
	pub procedure_description: String,
	pub scheduled_date: String,
	pub scheduled_time: String,
	#[serde(default)]
	pub modality: Option<String>,
	pub station_aet: String,
	pub procedure_step_id: String,
	pub station_name: String,
	pub location: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sex_normalizes_unknown_values_to_m() {
		assert_eq!(Sex::normalize(Some("X")), Sex::M);
		assert_eq!(Sex::normalize(None), Sex::M);
		assert_eq!(Sex::normalize(Some("")), Sex::M);
		assert_eq!(Sex::normalize(Some("F")), Sex::F);
		assert_eq!(Sex::normalize(Some("O")), Sex::O);
	}

	#[test]
	fn modality_defaults_to_us() {
		assert_eq!(Modality::normalize(None), Modality::Us);
		assert_eq!(Modality::normalize(Some("")), Modality::Us);
		assert_eq!(Modality::normalize(Some("HOLOGRAM")), Modality::Us);
		assert_eq!(Modality::normalize(Some("CT")), Modality::Ct);
	}

	#[test]
	fn patient_name_composition() {
		let mut record = WorklistRecord {
			patient_family_name: "DOE".to_owned(),
			patient_given_name: "JOHN".to_owned(),
			..WorklistRecord::default()
		};
		assert_eq!(record.patient_name(), "DOE^JOHN^^");

		record.patient_middle_name = Some("Q".to_owned());
		assert_eq!(record.patient_name(), "DOE^JOHN^Q^^");
	}

	#[test]
	fn patient_name_decomposition() {
		let mut record = WorklistRecord::default();
		record.set_patient_name("DOE^JOHN^Q^^");
		assert_eq!(record.patient_family_name, "DOE");
		assert_eq!(record.patient_given_name, "JOHN");
		assert_eq!(record.patient_middle_name.as_deref(), Some("Q"));

		record.set_patient_name("DOE^JOHN^^");
		assert_eq!(record.patient_middle_name, None);
	}
}
