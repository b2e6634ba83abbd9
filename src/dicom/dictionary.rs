//! Static tag dictionary for the Modality Worklist tag subset.
//!
//! Pure constant lookup; the codec asks for value representations (needed to
//! parse Implicit VR Little Endian datasets) and the validator asks for the
//! required tag sets.

use std::fmt::{Display, Formatter};

/// A DICOM attribute tag as a (group, element) pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u16, pub u16);

impl Display for Tag {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "({:04X},{:04X})", self.0, self.1)
	}
}

/// The value representations used by the worklist tag subset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Vr {
	/// Application Entity, ≤16 chars.
	AE,
	/// Code String.
	CS,
	/// Date, `YYYYMMDD`.
	DA,
	/// Long String.
	LO,
	/// Other Byte.
	OB,
	/// Person Name, `^`-joined components.
	PN,
	/// Short String, ≤16 chars.
	SH,
	/// Sequence of Items.
	SQ,
	/// Time, `HHMMSS`.
	TM,
	/// Unique Identifier, dotted numeric string padded with NUL.
	UI,
	/// Unsigned Long, 4-byte binary.
	UL,
}

impl Vr {
	pub const fn as_bytes(self) -> [u8; 2] {
		match self {
			Self::AE => *b"AE",
			Self::CS => *b"CS",
			Self::DA => *b"DA",
			Self::LO => *b"LO",
			Self::OB => *b"OB",
			Self::PN => *b"PN",
			Self::SH => *b"SH",
			Self::SQ => *b"SQ",
			Self::TM => *b"TM",
			Self::UI => *b"UI",
			Self::UL => *b"UL",
		}
	}

	/// Long-form VRs are written with a 2-byte reserved field followed by a
	/// 4-byte length; short-form VRs carry a 2-byte length.
	pub const fn is_long_form(self) -> bool {
		matches!(self, Self::OB | Self::SQ)
	}
}

pub mod tags {
	use super::Tag;

	// Group 0002 (file meta information)
	pub const FILE_META_INFORMATION_GROUP_LENGTH: Tag = Tag(0x0002, 0x0000);
	pub const FILE_META_INFORMATION_VERSION: Tag = Tag(0x0002, 0x0001);
	pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag(0x0002, 0x0002);
	pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag(0x0002, 0x0003);
	pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
	pub const IMPLEMENTATION_CLASS_UID: Tag = Tag(0x0002, 0x0012);
	pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag(0x0002, 0x0013);

	// Dataset
	pub const SPECIFIC_CHARACTER_SET: Tag = Tag(0x0008, 0x0005);
	pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
	pub const MODALITY: Tag = Tag(0x0008, 0x0060);
	pub const REFERRING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);
	pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
	pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
	pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
	pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);
	pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
	pub const REQUESTING_PHYSICIAN: Tag = Tag(0x0032, 0x1032);
	pub const REQUESTED_PROCEDURE_DESCRIPTION: Tag = Tag(0x0032, 0x1060);
	pub const SCHEDULED_STATION_AE_TITLE: Tag = Tag(0x0040, 0x0001);
	pub const SCHEDULED_PROCEDURE_STEP_START_DATE: Tag = Tag(0x0040, 0x0002);
	pub const SCHEDULED_PROCEDURE_STEP_START_TIME: Tag = Tag(0x0040, 0x0003);
	pub const SCHEDULED_PROCEDURE_STEP_DESCRIPTION: Tag = Tag(0x0040, 0x0007);
	pub const SCHEDULED_PROCEDURE_STEP_ID: Tag = Tag(0x0040, 0x0009);
	pub const SCHEDULED_STATION_NAME: Tag = Tag(0x0040, 0x0010);
	pub const SCHEDULED_PROCEDURE_STEP_LOCATION: Tag = Tag(0x0040, 0x0011);
	pub const SCHEDULED_PROCEDURE_STEP_SEQUENCE: Tag = Tag(0x0040, 0x0100);

	// Item framing (no VR on the wire)
	pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
	pub const ITEM_DELIMITATION: Tag = Tag(0xFFFE, 0xE00D);
	pub const SEQUENCE_DELIMITATION: Tag = Tag(0xFFFE, 0xE0DD);
}

struct Entry {
	tag: Tag,
	vr: Vr,
	name: &'static str,
}

static ENTRIES: &[Entry] = &[
	Entry { tag: tags::FILE_META_INFORMATION_GROUP_LENGTH, vr: Vr::UL, name: "FileMetaInformationGroupLength" },
	Entry { tag: tags::FILE_META_INFORMATION_VERSION, vr: Vr::OB, name: "FileMetaInformationVersion" },
	Entry { tag: tags::MEDIA_STORAGE_SOP_CLASS_UID, vr: Vr::UI, name: "MediaStorageSOPClassUID" },
	Entry { tag: tags::MEDIA_STORAGE_SOP_INSTANCE_UID, vr: Vr::UI, name: "MediaStorageSOPInstanceUID" },
	Entry { tag: tags::TRANSFER_SYNTAX_UID, vr: Vr::UI, name: "TransferSyntaxUID" },
	Entry { tag: tags::IMPLEMENTATION_CLASS_UID, vr: Vr::UI, name: "ImplementationClassUID" },
	Entry { tag: tags::IMPLEMENTATION_VERSION_NAME, vr: Vr::SH, name: "ImplementationVersionName" },
	Entry { tag: tags::SPECIFIC_CHARACTER_SET, vr: Vr::CS, name: "SpecificCharacterSet" },
	Entry { tag: tags::ACCESSION_NUMBER, vr: Vr::SH, name: "AccessionNumber" },
	Entry { tag: tags::MODALITY, vr: Vr::CS, name: "Modality" },
	Entry { tag: tags::REFERRING_PHYSICIAN_NAME, vr: Vr::PN, name: "ReferringPhysicianName" },
	Entry { tag: tags::PATIENT_NAME, vr: Vr::PN, name: "PatientName" },
	Entry { tag: tags::PATIENT_ID, vr: Vr::LO, name: "PatientID" },
	Entry { tag: tags::PATIENT_BIRTH_DATE, vr: Vr::DA, name: "PatientBirthDate" },
	Entry { tag: tags::PATIENT_SEX, vr: Vr::CS, name: "PatientSex" },
	Entry { tag: tags::STUDY_INSTANCE_UID, vr: Vr::UI, name: "StudyInstanceUID" },
	Entry { tag: tags::REQUESTING_PHYSICIAN, vr: Vr::PN, name: "RequestingPhysician" },
	Entry { tag: tags::REQUESTED_PROCEDURE_DESCRIPTION, vr: Vr::LO, name: "RequestedProcedureDescription" },
	Entry { tag: tags::SCHEDULED_STATION_AE_TITLE, vr: Vr::AE, name: "ScheduledStationAETitle" },
	Entry { tag: tags::SCHEDULED_PROCEDURE_STEP_START_DATE, vr: Vr::DA, name: "ScheduledProcedureStepStartDate" },
	Entry { tag: tags::SCHEDULED_PROCEDURE_STEP_START_TIME, vr: Vr::TM, name: "ScheduledProcedureStepStartTime" },
	Entry { tag: tags::SCHEDULED_PROCEDURE_STEP_DESCRIPTION, vr: Vr::LO, name: "ScheduledProcedureStepDescription" },
	Entry { tag: tags::SCHEDULED_PROCEDURE_STEP_ID, vr: Vr::SH, name: "ScheduledProcedureStepID" },
	Entry { tag: tags::SCHEDULED_STATION_NAME, vr: Vr::SH, name: "ScheduledStationName" },
	Entry { tag: tags::SCHEDULED_PROCEDURE_STEP_LOCATION, vr: Vr::SH, name: "ScheduledProcedureStepLocation" },
	Entry { tag: tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE, vr: Vr::SQ, name: "ScheduledProcedureStepSequence" },
];

/// Returns the value representation of a known tag.
pub fn vr_of(tag: Tag) -> Option<Vr> {
	ENTRIES.iter().find(|entry| entry.tag == tag).map(|entry| entry.vr)
}

/// Returns the semantic name of a known tag, or `"Unknown"`.
pub fn name_of(tag: Tag) -> &'static str {
	ENTRIES
		.iter()
		.find(|entry| entry.tag == tag)
		.map_or("Unknown", |entry| entry.name)
}

/// Top-level tags a worklist file must carry to be usable by a modality.
pub static REQUIRED_TAGS: &[Tag] = &[
	tags::ACCESSION_NUMBER,
	tags::PATIENT_NAME,
	tags::PATIENT_ID,
	tags::PATIENT_SEX,
	tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE,
];

/// Tags that must be present inside the scheduled procedure step item.
pub static REQUIRED_STEP_TAGS: &[Tag] = &[
	tags::SCHEDULED_STATION_AE_TITLE,
	tags::MODALITY,
	tags::SCHEDULED_PROCEDURE_STEP_START_DATE,
	tags::SCHEDULED_PROCEDURE_STEP_START_TIME,
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_known_tags() {
		assert_eq!(vr_of(tags::ACCESSION_NUMBER), Some(Vr::SH));
		assert_eq!(vr_of(tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE), Some(Vr::SQ));
		assert_eq!(name_of(tags::PATIENT_NAME), "PatientName");
	}

	#[test]
	fn lookup_unknown_tag() {
		assert_eq!(vr_of(Tag(0x7FE0, 0x0010)), None);
		assert_eq!(name_of(Tag(0x7FE0, 0x0010)), "Unknown");
	}

	#[test]
	fn tag_display_is_padded_hex() {
		assert_eq!(tags::ACCESSION_NUMBER.to_string(), "(0008,0050)");
		assert_eq!(tags::ITEM.to_string(), "(FFFE,E000)");
	}
}
