//! Required-tag validation for decoded worklist records.
//!
//! The store runs this on the decode of freshly encoded bytes before
//! persisting, so a file is never written unless it would pass this check
//! when a modality reads it back.

use crate::dicom::dictionary::{self, tags, Tag};
use crate::types::WorklistRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("missing required tags: {}", format_tags(.0))]
	MissingTags(Vec<Tag>),
}

fn format_tags(missing: &[Tag]) -> String {
	missing
		.iter()
		.map(|&tag| format!("{tag} {}", dictionary::name_of(tag)))
		.collect::<Vec<_>>()
		.join(", ")
}

/// Checks the required tag set from the dictionary against a record and
/// reports every absent tag at once.
pub fn validate(record: &WorklistRecord) -> Result<(), ValidationError> {
	let missing: Vec<Tag> = dictionary::REQUIRED_TAGS
		.iter()
		.chain(dictionary::REQUIRED_STEP_TAGS)
		.copied()
		.filter(|&tag| !is_present(record, tag))
		.collect();

	if missing.is_empty() {
		Ok(())
	} else {
		Err(ValidationError::MissingTags(missing))
	}
}

fn is_present(record: &WorklistRecord, tag: Tag) -> bool {
	match tag {
		tags::ACCESSION_NUMBER => !record.accession_number.is_empty(),
		tags::PATIENT_NAME => !record.patient_family_name.is_empty(),
		tags::PATIENT_ID => !record.patient_id.is_empty(),
		tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE => {
			!record.station_aet.is_empty()
				|| !record.scheduled_date.is_empty()
				|| !record.scheduled_time.is_empty()
		}
		tags::SCHEDULED_STATION_AE_TITLE => !record.station_aet.is_empty(),
		tags::SCHEDULED_PROCEDURE_STEP_START_DATE => !record.scheduled_date.is_empty(),
		tags::SCHEDULED_PROCEDURE_STEP_START_TIME => !record.scheduled_time.is_empty(),
		// Sex and modality are structurally guaranteed by their enums.
		_ => true,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{Modality, Sex};

	fn complete_record() -> WorklistRecord {
		WorklistRecord {
			accession_number: "ACC1".to_owned(),
			patient_family_name: "DOE".to_owned(),
			patient_given_name: "JANE".to_owned(),
			patient_id: "PAT1".to_owned(),
			birth_date: "19800101".to_owned(),
			sex: Sex::F,
			procedure_description: "US Abdomen".to_owned(),
			scheduled_date: "20250601".to_owned(),
			scheduled_time: "091500".to_owned(),
			modality: Modality::Us,
			station_aet: "WS80A".to_owned(),
			procedure_step_id: "STEP1".to_owned(),
			station_name: "ROOM1".to_owned(),
			location: "LAB".to_owned(),
			study_instance_uid: "1.2.3".to_owned(),
			sop_instance_uid: "4.5.6".to_owned(),
			..WorklistRecord::default()
		}
	}

	#[test]
	fn complete_record_passes() {
		assert!(validate(&complete_record()).is_ok());
	}

	#[test]
	fn missing_station_aet_is_reported() {
		let record = WorklistRecord {
			station_aet: String::new(),
			..complete_record()
		};
		let Err(ValidationError::MissingTags(missing)) = validate(&record) else {
			panic!("expected validation failure");
		};
		assert_eq!(missing, vec![tags::SCHEDULED_STATION_AE_TITLE]);
	}

	#[test]
	fn empty_record_reports_all_required_tags() {
		let Err(ValidationError::MissingTags(missing)) = validate(&WorklistRecord::default())
		else {
			panic!("expected validation failure");
		};
		assert!(missing.contains(&tags::ACCESSION_NUMBER));
		assert!(missing.contains(&tags::PATIENT_NAME));
		assert!(missing.contains(&tags::PATIENT_ID));
		assert!(missing.contains(&tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE));
		assert!(missing.contains(&tags::SCHEDULED_PROCEDURE_STEP_START_DATE));
	}

	#[test]
	fn error_message_names_the_tags() {
		let record = WorklistRecord {
			accession_number: String::new(),
			..complete_record()
		};
		let message = validate(&record).unwrap_err().to_string();
		assert!(message.contains("(0008,0050)"));
		assert!(message.contains("AccessionNumber"));
	}
}
