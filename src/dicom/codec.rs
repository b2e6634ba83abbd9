//! Part 10 record codec for modality worklist files.
//!
//! Encoding always produces Explicit VR Little Endian with explicit lengths
//! for the scheduled step sequence and its single item. Every length field is
//! written in one clean pass: units that need a length prefix (the file meta
//! group, the item, the sequence) are serialized into a scratch buffer first,
//! measured and then emitted behind their length field.
//!
//! Decoding is deliberately liberal: it accepts Explicit or Implicit VR
//! Little Endian datasets, sequence items with explicit lengths or
//! delimiter-terminated ones, and skips unknown tags by their declared
//! length. Files from the legacy dump2dcm pipeline therefore still parse.

use crate::dicom::dictionary::{self, tags, Tag, Vr};
use crate::dicom::{
	EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN, MODALITY_WORKLIST_SOP_CLASS_UID,
};
use crate::types::WorklistRecord;
use thiserror::Error;

const PREAMBLE_LENGTH: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";
const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

#[derive(Debug, Error)]
pub enum EncodeError {
	#[error("missing required field `{0}`")]
	MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("not a DICOM part 10 file: missing preamble or DICM magic")]
	MissingPreamble,
	#[error("unexpected end of stream at offset {0}")]
	Truncated(usize),
	#[error("unsupported transfer syntax `{0}`")]
	UnsupportedTransferSyntax(String),
}

/// Encodes a record into a complete Part 10 file:
/// 128-byte preamble, `DICM`, file meta group, dataset.
///
/// Fails before producing a single byte if any non-optional field is empty.
pub fn encode(record: &WorklistRecord) -> Result<Vec<u8>, EncodeError> {
	require(&record.accession_number, "accessionNumber")?;
	require(&record.patient_family_name, "patientFamilyName")?;
	require(&record.patient_given_name, "patientGivenName")?;
	require(&record.patient_id, "patientId")?;
	require(&record.birth_date, "birthDate")?;
	require(&record.procedure_description, "procedureDescription")?;
	require(&record.scheduled_date, "scheduledDate")?;
	require(&record.scheduled_time, "scheduledTime")?;
	require(&record.station_aet, "stationAET")?;
	require(&record.procedure_step_id, "procedureStepId")?;
	require(&record.station_name, "stationName")?;
	require(&record.location, "location")?;
	require(&record.study_instance_uid, "studyInstanceUid")?;
	require(&record.sop_instance_uid, "sopInstanceUid")?;

	let meta = encode_meta(&record.sop_instance_uid);
	let dataset = encode_dataset(record);

	let mut out = Vec::with_capacity(PREAMBLE_LENGTH + MAGIC.len() + meta.len() + dataset.len());
	out.resize(PREAMBLE_LENGTH, 0);
	out.extend_from_slice(MAGIC);
	out.extend_from_slice(&meta);
	out.extend_from_slice(&dataset);
	Ok(out)
}

/// Parses a Part 10 file back into a record.
///
/// Unknown tags and absent optional fields never fail; structural damage
/// (missing magic, truncated values, foreign transfer syntaxes) does.
/// The returned record carries no creation timestamp; the store supplies it
/// from the file modification time.
pub fn decode(bytes: &[u8]) -> Result<WorklistRecord, DecodeError> {
	if bytes.len() < PREAMBLE_LENGTH + MAGIC.len()
		|| &bytes[PREAMBLE_LENGTH..PREAMBLE_LENGTH + MAGIC.len()] != MAGIC
	{
		return Err(DecodeError::MissingPreamble);
	}

	let mut reader = Reader::new(&bytes[PREAMBLE_LENGTH + MAGIC.len()..]);
	let mut record = WorklistRecord::default();

	let transfer_syntax_uid = read_meta_group(&mut reader, &mut record)?;
	let transfer_syntax = match transfer_syntax_uid.as_str() {
		EXPLICIT_VR_LITTLE_ENDIAN => TransferSyntax::ExplicitVrLe,
		IMPLICIT_VR_LITTLE_ENDIAN => TransferSyntax::ImplicitVrLe,
		other => return Err(DecodeError::UnsupportedTransferSyntax(other.to_owned())),
	};

	read_dataset(&mut reader, transfer_syntax, &mut record)?;
	Ok(record)
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, EncodeError> {
	if value.is_empty() {
		Err(EncodeError::MissingField(field))
	} else {
		Ok(value)
	}
}

// --- encoding ---

/// The file meta group, always Explicit VR Little Endian.
///
/// The elements following (0002,0000) are serialized first so the group
/// length element can be written with the exact measured byte count.
fn encode_meta(sop_instance_uid: &str) -> Vec<u8> {
	let mut rest = Vec::new();
	write_element(&mut rest, tags::FILE_META_INFORMATION_VERSION, Vr::OB, &[0, 1]);
	write_str(
		&mut rest,
		tags::MEDIA_STORAGE_SOP_CLASS_UID,
		Vr::UI,
		MODALITY_WORKLIST_SOP_CLASS_UID,
	);
	write_str(
		&mut rest,
		tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
		Vr::UI,
		sop_instance_uid,
	);
	write_str(
		&mut rest,
		tags::TRANSFER_SYNTAX_UID,
		Vr::UI,
		EXPLICIT_VR_LITTLE_ENDIAN,
	);
	write_str(
		&mut rest,
		tags::IMPLEMENTATION_CLASS_UID,
		Vr::UI,
		crate::IMPLEMENTATION_CLASS_UID,
	);
	write_str(
		&mut rest,
		tags::IMPLEMENTATION_VERSION_NAME,
		Vr::SH,
		crate::IMPLEMENTATION_VERSION_NAME,
	);

	let mut meta = Vec::with_capacity(rest.len() + 12);
	write_element(
		&mut meta,
		tags::FILE_META_INFORMATION_GROUP_LENGTH,
		Vr::UL,
		&u32::try_from(rest.len()).unwrap_or(u32::MAX).to_le_bytes(),
	);
	meta.extend_from_slice(&rest);
	meta
}

/// The dataset in ascending tag order. Optional fields append their tags
/// only when present.
fn encode_dataset(record: &WorklistRecord) -> Vec<u8> {
	let mut item = Vec::new();
	write_str(&mut item, tags::MODALITY, Vr::CS, record.modality.as_str());
	write_str(
		&mut item,
		tags::SCHEDULED_STATION_AE_TITLE,
		Vr::AE,
		&record.station_aet,
	);
	write_str(
		&mut item,
		tags::SCHEDULED_PROCEDURE_STEP_START_DATE,
		Vr::DA,
		&record.scheduled_date,
	);
	write_str(
		&mut item,
		tags::SCHEDULED_PROCEDURE_STEP_START_TIME,
		Vr::TM,
		&record.scheduled_time,
	);
	write_str(
		&mut item,
		tags::SCHEDULED_PROCEDURE_STEP_DESCRIPTION,
		Vr::LO,
		&record.procedure_description,
	);
	write_str(
		&mut item,
		tags::SCHEDULED_PROCEDURE_STEP_ID,
		Vr::SH,
		&record.procedure_step_id,
	);
	write_str(
		&mut item,
		tags::SCHEDULED_STATION_NAME,
		Vr::SH,
		&record.station_name,
	);
	write_str(
		&mut item,
		tags::SCHEDULED_PROCEDURE_STEP_LOCATION,
		Vr::SH,
		&record.location,
	);

	let mut out = Vec::new();
	write_str(&mut out, tags::SPECIFIC_CHARACTER_SET, Vr::CS, "ISO_IR 100");
	write_str(
		&mut out,
		tags::ACCESSION_NUMBER,
		Vr::SH,
		&record.accession_number,
	);
	if let Some(referring) = &record.referring_physician {
		write_str(&mut out, tags::REFERRING_PHYSICIAN_NAME, Vr::PN, referring);
	}
	write_str(&mut out, tags::PATIENT_NAME, Vr::PN, &record.patient_name());
	write_str(&mut out, tags::PATIENT_ID, Vr::LO, &record.patient_id);
	write_str(&mut out, tags::PATIENT_BIRTH_DATE, Vr::DA, &record.birth_date);
	write_str(&mut out, tags::PATIENT_SEX, Vr::CS, &record.sex.to_string());
	write_str(
		&mut out,
		tags::STUDY_INSTANCE_UID,
		Vr::UI,
		&record.study_instance_uid,
	);
	if let Some(requesting) = &record.requesting_physician {
		write_str(&mut out, tags::REQUESTING_PHYSICIAN, Vr::PN, requesting);
	}
	write_str(
		&mut out,
		tags::REQUESTED_PROCEDURE_DESCRIPTION,
		Vr::LO,
		&record.procedure_description,
	);

	// Exactly one item, explicit lengths on both the item and the sequence.
	let mut sequence = Vec::with_capacity(item.len() + 8);
	write_tag(&mut sequence, tags::ITEM);
	sequence.extend_from_slice(&u32::try_from(item.len()).unwrap_or(u32::MAX).to_le_bytes());
	sequence.extend_from_slice(&item);

	write_tag(&mut out, tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE);
	out.extend_from_slice(&Vr::SQ.as_bytes());
	out.extend_from_slice(&[0, 0]);
	out.extend_from_slice(&u32::try_from(sequence.len()).unwrap_or(u32::MAX).to_le_bytes());
	out.extend_from_slice(&sequence);
	out
}

fn write_tag(buf: &mut Vec<u8>, tag: Tag) {
	buf.extend_from_slice(&tag.0.to_le_bytes());
	buf.extend_from_slice(&tag.1.to_le_bytes());
}

fn write_element(buf: &mut Vec<u8>, tag: Tag, vr: Vr, value: &[u8]) {
	write_tag(buf, tag);
	buf.extend_from_slice(&vr.as_bytes());
	if vr.is_long_form() {
		buf.extend_from_slice(&[0, 0]);
		buf.extend_from_slice(&u32::try_from(value.len()).unwrap_or(u32::MAX).to_le_bytes());
	} else {
		buf.extend_from_slice(&u16::try_from(value.len()).unwrap_or(u16::MAX).to_le_bytes());
	}
	buf.extend_from_slice(value);
}

/// String values are ASCII and must have even length on the wire:
/// UI pads with NUL, every other text VR pads with a space.
fn write_str(buf: &mut Vec<u8>, tag: Tag, vr: Vr, value: &str) {
	let mut bytes = value.as_bytes().to_vec();
	if bytes.len() % 2 != 0 {
		bytes.push(if vr == Vr::UI { 0 } else { b' ' });
	}
	write_element(buf, tag, vr, &bytes);
}

// --- decoding ---

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum TransferSyntax {
	ExplicitVrLe,
	ImplicitVrLe,
}

struct Reader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	const fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	const fn pos(&self) -> usize {
		self.pos
	}

	const fn remaining(&self) -> usize {
		self.buf.len() - self.pos
	}

	fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
		if self.remaining() < count {
			return Err(DecodeError::Truncated(self.pos));
		}
		let slice = &self.buf[self.pos..self.pos + count];
		self.pos += count;
		Ok(slice)
	}

	fn read_u16(&mut self) -> Result<u16, DecodeError> {
		let bytes = self.take(2)?;
		Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
	}

	fn read_u32(&mut self) -> Result<u32, DecodeError> {
		let bytes = self.take(4)?;
		Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
	}

	fn read_tag(&mut self) -> Result<Tag, DecodeError> {
		Ok(Tag(self.read_u16()?, self.read_u16()?))
	}

	fn peek_group(&self) -> Option<u16> {
		if self.remaining() < 2 {
			return None;
		}
		Some(u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]))
	}
}

/// A parsed element header: tag, value length and whether it opens a sequence.
struct ElementHeader {
	tag: Tag,
	length: u32,
	is_sequence: bool,
}

fn read_header(reader: &mut Reader, ts: TransferSyntax) -> Result<ElementHeader, DecodeError> {
	let tag = reader.read_tag()?;

	// Item and delimiter tags carry no VR in either transfer syntax.
	if tag.0 == 0xFFFE {
		let length = reader.read_u32()?;
		return Ok(ElementHeader {
			tag,
			length,
			is_sequence: false,
		});
	}

	match ts {
		TransferSyntax::ExplicitVrLe => {
			let vr_bytes = reader.take(2)?;
			let vr = [vr_bytes[0], vr_bytes[1]];
			let is_long = matches!(&vr, b"OB" | b"OW" | b"OF" | b"SQ" | b"UT" | b"UN");
			let length = if is_long {
				reader.take(2)?;
				reader.read_u32()?
			} else {
				u32::from(reader.read_u16()?)
			};
			Ok(ElementHeader {
				tag,
				length,
				is_sequence: &vr == b"SQ",
			})
		}
		TransferSyntax::ImplicitVrLe => {
			let length = reader.read_u32()?;
			Ok(ElementHeader {
				tag,
				length,
				is_sequence: dictionary::vr_of(tag) == Some(Vr::SQ),
			})
		}
	}
}

/// Reads group 0002 elements (always Explicit VR LE) and returns the dataset
/// transfer syntax UID. Also recovers the media storage SOP instance UID,
/// the only record field that lives in the meta group.
fn read_meta_group(reader: &mut Reader, record: &mut WorklistRecord) -> Result<String, DecodeError> {
	let mut transfer_syntax_uid = String::new();

	while reader.peek_group() == Some(0x0002) {
		let header = read_header(reader, TransferSyntax::ExplicitVrLe)?;
		let value = reader.take(header.length as usize)?;
		match header.tag {
			tags::TRANSFER_SYNTAX_UID => transfer_syntax_uid = ascii_str(value),
			tags::MEDIA_STORAGE_SOP_INSTANCE_UID => record.sop_instance_uid = ascii_str(value),
			_ => {}
		}
	}

	Ok(transfer_syntax_uid)
}

fn read_dataset(
	reader: &mut Reader,
	ts: TransferSyntax,
	record: &mut WorklistRecord,
) -> Result<(), DecodeError> {
	while reader.remaining() >= 8 {
		let header = read_header(reader, ts)?;
		if header.is_sequence {
			let populate = header.tag == tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE;
			read_sequence(reader, ts, header.length, record, populate)?;
			continue;
		}
		if header.length == UNDEFINED_LENGTH {
			// Undefined length is only meaningful for sequences and items.
			return Err(DecodeError::Truncated(reader.pos()));
		}
		let value = reader.take(header.length as usize)?;
		assign(record, header.tag, value);
	}
	Ok(())
}

/// Walks a sequence in either of its two wire forms. Only the first item of
/// the scheduled step sequence populates the record; further items and
/// foreign sequences are parsed for framing but discarded.
fn read_sequence(
	reader: &mut Reader,
	ts: TransferSyntax,
	length: u32,
	record: &mut WorklistRecord,
	populate: bool,
) -> Result<(), DecodeError> {
	let mut first = true;

	if length == UNDEFINED_LENGTH {
		loop {
			let header = read_header(reader, ts)?;
			if header.tag == tags::SEQUENCE_DELIMITATION {
				break;
			}
			if header.tag != tags::ITEM {
				return Err(DecodeError::Truncated(reader.pos()));
			}
			read_item(reader, ts, header.length, record, populate && first)?;
			first = false;
		}
	} else {
		let end = reader.pos() + length as usize;
		while reader.pos() + 8 <= end {
			let header = read_header(reader, ts)?;
			if header.tag != tags::ITEM {
				return Err(DecodeError::Truncated(reader.pos()));
			}
			read_item(reader, ts, header.length, record, populate && first)?;
			first = false;
		}
		if reader.pos() < end {
			reader.take(end - reader.pos())?;
		}
	}

	Ok(())
}

fn read_item(
	reader: &mut Reader,
	ts: TransferSyntax,
	length: u32,
	record: &mut WorklistRecord,
	populate: bool,
) -> Result<(), DecodeError> {
	if length == UNDEFINED_LENGTH {
		loop {
			let header = read_header(reader, ts)?;
			if header.tag == tags::ITEM_DELIMITATION {
				break;
			}
			read_item_element(reader, ts, header, record, populate)?;
		}
	} else {
		let end = reader.pos() + length as usize;
		while reader.pos() + 8 <= end {
			let header = read_header(reader, ts)?;
			read_item_element(reader, ts, header, record, populate)?;
		}
		if reader.pos() < end {
			reader.take(end - reader.pos())?;
		}
	}

	Ok(())
}

fn read_item_element(
	reader: &mut Reader,
	ts: TransferSyntax,
	header: ElementHeader,
	record: &mut WorklistRecord,
	populate: bool,
) -> Result<(), DecodeError> {
	if header.is_sequence {
		return read_sequence(reader, ts, header.length, record, false);
	}
	if header.length == UNDEFINED_LENGTH {
		return Err(DecodeError::Truncated(reader.pos()));
	}
	let value = reader.take(header.length as usize)?;
	if populate {
		assign(record, header.tag, value);
	}
	Ok(())
}

/// Maps one element onto its record field. Unknown tags are skipped.
fn assign(record: &mut WorklistRecord, tag: Tag, value: &[u8]) {
	let text = ascii_str(value);
	match tag {
		tags::ACCESSION_NUMBER => record.accession_number = text,
		tags::PATIENT_NAME => record.set_patient_name(&text),
		tags::PATIENT_ID => record.patient_id = text,
		tags::PATIENT_BIRTH_DATE => record.birth_date = text,
		tags::PATIENT_SEX => record.sex = text.parse().unwrap_or_default(),
		tags::STUDY_INSTANCE_UID => record.study_instance_uid = text,
		tags::REFERRING_PHYSICIAN_NAME => record.referring_physician = non_empty(text),
		tags::REQUESTING_PHYSICIAN => record.requesting_physician = non_empty(text),
		tags::REQUESTED_PROCEDURE_DESCRIPTION => record.procedure_description = text,
		tags::MODALITY => record.modality = text.parse().unwrap_or_default(),
		tags::SCHEDULED_STATION_AE_TITLE => record.station_aet = text,
		tags::SCHEDULED_PROCEDURE_STEP_START_DATE => record.scheduled_date = text,
		tags::SCHEDULED_PROCEDURE_STEP_START_TIME => record.scheduled_time = text,
		tags::SCHEDULED_PROCEDURE_STEP_DESCRIPTION => {
			// (0032,1060) wins when both descriptions are present.
			if record.procedure_description.is_empty() {
				record.procedure_description = text;
			}
		}
		tags::SCHEDULED_PROCEDURE_STEP_ID => record.procedure_step_id = text,
		tags::SCHEDULED_STATION_NAME => record.station_name = text,
		tags::SCHEDULED_PROCEDURE_STEP_LOCATION => record.location = text,
		_ => {}
	}
}

fn ascii_str(value: &[u8]) -> String {
	String::from_utf8_lossy(value)
		.trim_matches(|c| c == ' ' || c == '\0')
		.to_owned()
}

fn non_empty(text: String) -> Option<String> {
	if text.is_empty() {
		None
	} else {
		Some(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{Modality, Sex};

	fn sample_record() -> WorklistRecord {
		WorklistRecord {
			accession_number: "ACC1".to_owned(),
			patient_family_name: "DOE".to_owned(),
			patient_given_name: "JANE".to_owned(),
			patient_middle_name: None,
			patient_id: "PAT42".to_owned(),
			birth_date: "19800101".to_owned(),
			sex: Sex::F,
			requesting_physician: Some("DrReq".to_owned()),
			referring_physician: Some("DrRef".to_owned()),
			procedure_description: "Abdominal Ultrasound".to_owned(),
			scheduled_date: "20250601".to_owned(),
			scheduled_time: "091500".to_owned(),
			modality: Modality::Ct,
			station_aet: "WS80A".to_owned(),
			procedure_step_id: "STEP1".to_owned(),
			station_name: "US_ROOM".to_owned(),
			location: "US_LAB".to_owned(),
			study_instance_uid: "1.2.826.0.1.3680043.8.498.1.2.3".to_owned(),
			sop_instance_uid: "1.2.826.0.1.3680043.8.498.4.5.6".to_owned(),
		}
	}

	#[test]
	fn round_trip_preserves_every_field() {
		let record = sample_record();
		let bytes = encode(&record).unwrap();
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded, record);
	}

	#[test]
	fn round_trip_without_optional_fields() {
		let record = WorklistRecord {
			patient_middle_name: None,
			requesting_physician: None,
			referring_physician: None,
			..sample_record()
		};
		let bytes = encode(&record).unwrap();
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.patient_middle_name, None);
		assert_eq!(decoded.requesting_physician, None);
		assert_eq!(decoded.referring_physician, None);
		assert_eq!(decoded, record);
	}

	#[test]
	fn round_trip_with_middle_name() {
		let record = WorklistRecord {
			patient_middle_name: Some("Q".to_owned()),
			..sample_record()
		};
		let decoded = decode(&encode(&record).unwrap()).unwrap();
		assert_eq!(decoded.patient_middle_name.as_deref(), Some("Q"));
	}

	#[test]
	fn odd_length_values_survive_padding() {
		let record = WorklistRecord {
			accession_number: "ACC".to_owned(),
			patient_id: "PAT".to_owned(),
			station_name: "ROOM1".to_owned(),
			..sample_record()
		};
		let decoded = decode(&encode(&record).unwrap()).unwrap();
		assert_eq!(decoded.accession_number, "ACC");
		assert_eq!(decoded.patient_id, "PAT");
		assert_eq!(decoded.station_name, "ROOM1");
	}

	#[test]
	fn meta_group_length_matches_measured_length() {
		let bytes = encode(&sample_record()).unwrap();
		let mut reader = Reader::new(&bytes[PREAMBLE_LENGTH + MAGIC.len()..]);

		let header = read_header(&mut reader, TransferSyntax::ExplicitVrLe).unwrap();
		assert_eq!(header.tag, tags::FILE_META_INFORMATION_GROUP_LENGTH);
		assert_eq!(header.length, 4);
		let declared = u32::from_le_bytes(reader.take(4).unwrap().try_into().unwrap());

		let start = reader.pos();
		while reader.peek_group() == Some(0x0002) {
			let header = read_header(&mut reader, TransferSyntax::ExplicitVrLe).unwrap();
			reader.take(header.length as usize).unwrap();
		}
		let measured = reader.pos() - start;

		assert_eq!(u64::from(declared), measured as u64);
	}

	#[test]
	fn decode_rejects_missing_magic() {
		assert!(matches!(
			decode(b"not a dicom file"),
			Err(DecodeError::MissingPreamble)
		));

		let mut bytes = vec![0u8; 256];
		bytes[128..132].copy_from_slice(b"DCM?");
		assert!(matches!(
			decode(&bytes),
			Err(DecodeError::MissingPreamble)
		));
	}

	#[test]
	fn decode_rejects_truncated_stream() {
		let bytes = encode(&sample_record()).unwrap();
		let result = decode(&bytes[..200]);
		assert!(matches!(result, Err(DecodeError::Truncated(_))));
	}

	#[test]
	fn decode_rejects_foreign_transfer_syntax() {
		let mut bytes = encode(&sample_record()).unwrap();
		// Overwrite the transfer syntax UID value with a JPEG baseline UID of
		// equal length ("1.2.840.10008.1.2.1\0" -> "1.2.840.10008.1.2.4\0").
		let needle = b"1.2.840.10008.1.2.1\0";
		let pos = bytes
			.windows(needle.len())
			.position(|window| window == needle)
			.unwrap();
		bytes[pos + 18] = b'4';
		assert!(matches!(
			decode(&bytes),
			Err(DecodeError::UnsupportedTransferSyntax(uid)) if uid == "1.2.840.10008.1.2.4"
		));
	}

	#[test]
	fn decode_skips_unknown_tags() {
		let record = sample_record();
		let mut bytes = Vec::new();
		bytes.resize(PREAMBLE_LENGTH, 0);
		bytes.extend_from_slice(MAGIC);
		bytes.extend_from_slice(&encode_meta(&record.sop_instance_uid));

		let mut dataset = Vec::new();
		write_str(&mut dataset, tags::ACCESSION_NUMBER, Vr::SH, "ACC9");
		// InstitutionName is not part of the worklist subset.
		write_str(&mut dataset, Tag(0x0008, 0x0080), Vr::LO, "HOSPITAL");
		write_str(&mut dataset, tags::PATIENT_ID, Vr::LO, "PAT9");
		bytes.extend_from_slice(&dataset);

		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.accession_number, "ACC9");
		assert_eq!(decoded.patient_id, "PAT9");
	}

	#[test]
	fn decode_accepts_undefined_length_sequence() {
		// The legacy dump2dcm pipeline wrote the step sequence with item and
		// sequence delimiters instead of explicit lengths.
		let record = sample_record();
		let mut bytes = Vec::new();
		bytes.resize(PREAMBLE_LENGTH, 0);
		bytes.extend_from_slice(MAGIC);
		bytes.extend_from_slice(&encode_meta(&record.sop_instance_uid));

		let mut dataset = Vec::new();
		write_str(&mut dataset, tags::ACCESSION_NUMBER, Vr::SH, "ACC2");
		write_str(&mut dataset, tags::PATIENT_NAME, Vr::PN, "DOE^JOHN^^");
		write_str(&mut dataset, tags::PATIENT_ID, Vr::LO, "PAT2");
		write_str(&mut dataset, tags::PATIENT_SEX, Vr::CS, "M");

		write_tag(&mut dataset, tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE);
		dataset.extend_from_slice(&Vr::SQ.as_bytes());
		dataset.extend_from_slice(&[0, 0]);
		dataset.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());

		write_tag(&mut dataset, tags::ITEM);
		dataset.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
		write_str(&mut dataset, tags::MODALITY, Vr::CS, "MR");
		write_str(&mut dataset, tags::SCHEDULED_STATION_AE_TITLE, Vr::AE, "MRI1");
		write_str(
			&mut dataset,
			tags::SCHEDULED_PROCEDURE_STEP_START_DATE,
			Vr::DA,
			"20250601",
		);
		write_str(
			&mut dataset,
			tags::SCHEDULED_PROCEDURE_STEP_START_TIME,
			Vr::TM,
			"103000",
		);
		write_tag(&mut dataset, tags::ITEM_DELIMITATION);
		dataset.extend_from_slice(&0u32.to_le_bytes());
		write_tag(&mut dataset, tags::SEQUENCE_DELIMITATION);
		dataset.extend_from_slice(&0u32.to_le_bytes());

		bytes.extend_from_slice(&dataset);

		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.accession_number, "ACC2");
		assert_eq!(decoded.modality, Modality::Mr);
		assert_eq!(decoded.station_aet, "MRI1");
		assert_eq!(decoded.scheduled_date, "20250601");
		assert_eq!(decoded.scheduled_time, "103000");
	}

	#[test]
	fn decode_accepts_implicit_vr_dataset() {
		fn write_implicit(buf: &mut Vec<u8>, tag: Tag, value: &[u8]) {
			write_tag(buf, tag);
			buf.extend_from_slice(&u32::try_from(value.len()).unwrap().to_le_bytes());
			buf.extend_from_slice(value);
		}

		let mut bytes = Vec::new();
		bytes.resize(PREAMBLE_LENGTH, 0);
		bytes.extend_from_slice(MAGIC);

		// Minimal meta group advertising an Implicit VR LE dataset.
		let mut rest = Vec::new();
		write_str(&mut rest, tags::TRANSFER_SYNTAX_UID, Vr::UI, IMPLICIT_VR_LITTLE_ENDIAN);
		write_element(
			&mut bytes,
			tags::FILE_META_INFORMATION_GROUP_LENGTH,
			Vr::UL,
			&u32::try_from(rest.len()).unwrap().to_le_bytes(),
		);
		bytes.extend_from_slice(&rest);

		let mut dataset = Vec::new();
		write_implicit(&mut dataset, tags::ACCESSION_NUMBER, b"ACC3");
		write_implicit(&mut dataset, tags::PATIENT_ID, b"PAT3");

		// Explicit-length item inside an implicit VR sequence.
		let mut item = Vec::new();
		write_implicit(&mut item, tags::MODALITY, b"US");
		write_implicit(&mut item, tags::SCHEDULED_STATION_AE_TITLE, b"WS80A ");

		let mut sequence = Vec::new();
		write_tag(&mut sequence, tags::ITEM);
		sequence.extend_from_slice(&u32::try_from(item.len()).unwrap().to_le_bytes());
		sequence.extend_from_slice(&item);

		write_tag(&mut dataset, tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE);
		dataset.extend_from_slice(&u32::try_from(sequence.len()).unwrap().to_le_bytes());
		dataset.extend_from_slice(&sequence);

		bytes.extend_from_slice(&dataset);

		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.accession_number, "ACC3");
		assert_eq!(decoded.patient_id, "PAT3");
		assert_eq!(decoded.modality, Modality::Us);
		assert_eq!(decoded.station_aet, "WS80A");
	}

	#[test]
	fn encode_rejects_empty_required_field() {
		let record = WorklistRecord {
			procedure_description: String::new(),
			..sample_record()
		};
		assert!(matches!(
			encode(&record),
			Err(EncodeError::MissingField("procedureDescription"))
		));
	}

	#[test]
	fn only_first_sequence_item_populates_the_record() {
		let record = sample_record();
		let mut bytes = Vec::new();
		bytes.resize(PREAMBLE_LENGTH, 0);
		bytes.extend_from_slice(MAGIC);
		bytes.extend_from_slice(&encode_meta(&record.sop_instance_uid));

		let mut first_item = Vec::new();
		write_str(&mut first_item, tags::MODALITY, Vr::CS, "CT");
		let mut second_item = Vec::new();
		write_str(&mut second_item, tags::MODALITY, Vr::CS, "MR");

		let mut sequence = Vec::new();
		for item in [&first_item, &second_item] {
			write_tag(&mut sequence, tags::ITEM);
			sequence.extend_from_slice(&u32::try_from(item.len()).unwrap().to_le_bytes());
			sequence.extend_from_slice(item);
		}

		let mut dataset = Vec::new();
		write_tag(&mut dataset, tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE);
		dataset.extend_from_slice(&Vr::SQ.as_bytes());
		dataset.extend_from_slice(&[0, 0]);
		dataset.extend_from_slice(&u32::try_from(sequence.len()).unwrap().to_le_bytes());
		dataset.extend_from_slice(&sequence);
		bytes.extend_from_slice(&dataset);

		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.modality, Modality::Ct);
	}
}
