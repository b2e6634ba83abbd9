//! Filesystem-backed worklist store.
//!
//! One flat directory of `<accessionNumber>.wl` files is the single source of
//! truth; the in-memory cache keyed by filename is a derived, best-effort
//! performance shim that is rebuilt lazily during listing. Records move
//! through Submitted → Encoded → Persisted → Deleted; there is no update.
//!
//! The store assumes its caller serializes operations (the API layer holds it
//! behind an async mutex) and therefore carries no locking of its own. Cache
//! entries are never invalidated when a backing file changes out-of-process;
//! such changes become visible once a listing observes them.

use crate::dicom::codec::{self, DecodeError, EncodeError};
use crate::dicom::uid::UidGenerator;
use crate::dicom::validator::{self, ValidationError};
use crate::types::{Modality, NewWorklistItem, Sex, WorklistRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// File extension for persisted worklist files.
pub const WORKLIST_EXTENSION: &str = "wl";

/// Character limit of the SH and AE value representations.
const MAX_SHORT_VALUE: usize = 16;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error(transparent)]
	Encode(#[from] EncodeError),
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error("round-trip self-check failed: {0}")]
	RoundTrip(#[from] DecodeError),
	#[error("invalid accession number `{0}`")]
	InvalidAccessionNumber(String),
	#[error("worklist file `{0}` does not exist")]
	NotFound(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// A cached worklist record together with its reconstructed creation time.
///
/// `created_at` is the wall clock at creation for records created in this
/// process lifetime, or the file modification time for records first observed
/// during a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklistEntry {
	pub filename: String,
	pub created_at: DateTime<Utc>,
	#[serde(flatten)]
	pub record: WorklistRecord,
}

pub struct WorklistStore {
	dir: PathBuf,
	cache: HashMap<String, WorklistEntry>,
	uids: UidGenerator,
}

impl WorklistStore {
	/// Opens a store over the given directory, creating it if necessary.
	pub async fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
		let dir = dir.as_ref().to_path_buf();
		fs::create_dir_all(&dir).await?;
		Ok(Self {
			dir,
			cache: HashMap::new(),
			uids: UidGenerator::new(),
		})
	}

	/// Creates a new worklist file and returns its filename.
	///
	/// Sex, modality, date/time separators and SH/AE length limits are
	/// normalized here, at the store boundary; the codec only ever sees
	/// canonical values. The encoded bytes are decoded and validated again
	/// before anything reaches the disk, so a failing create leaves no file
	/// behind.
	pub async fn create(&mut self, item: NewWorklistItem) -> Result<String, StoreError> {
		let accession_number = item.accession_number.trim().to_owned();
		// The accession number is the file stem, so it must be a safe
		// filename inside the store directory and honor the SH limit.
		// Rejected before a single byte is encoded or written.
		if accession_number.len() > MAX_SHORT_VALUE
			|| !accession_number
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
		{
			return Err(StoreError::InvalidAccessionNumber(accession_number));
		}

		let record = WorklistRecord {
			accession_number,
			patient_family_name: item.patient_family_name,
			patient_given_name: item.patient_given_name,
			patient_middle_name: item.patient_middle_name.filter(|name| !name.is_empty()),
			patient_id: item.patient_id,
			birth_date: dicom_date(&item.birth_date),
			sex: Sex::normalize(item.sex.as_deref()),
			requesting_physician: item.requesting_physician.filter(|name| !name.is_empty()),
			referring_physician: item.referring_physician.filter(|name| !name.is_empty()),
			procedure_description: item.procedure_description,
			scheduled_date: dicom_date(&item.scheduled_date),
			scheduled_time: dicom_time(&item.scheduled_time),
			modality: Modality::normalize(item.modality.as_deref()),
			station_aet: clip(item.station_aet, "stationAet"),
			procedure_step_id: clip(item.procedure_step_id, "procedureStepId"),
			station_name: clip(item.station_name, "stationName"),
			location: clip(item.location, "location"),
			study_instance_uid: self.uids.next(),
			sop_instance_uid: self.uids.next(),
		};

		let bytes = codec::encode(&record)?;
		// Round-trip self-check: the file must pass validation as a modality
		// would read it, or it is not written at all.
		let decoded = codec::decode(&bytes)?;
		validator::validate(&decoded)?;

		let filename = format!("{}.{WORKLIST_EXTENSION}", record.accession_number);
		let path = self.dir.join(&filename);
		let temp = self.dir.join(format!("{filename}.tmp"));
		fs::write(&temp, &bytes).await?;
		fs::rename(&temp, &path).await?;

		let entry = WorklistEntry {
			filename: filename.clone(),
			created_at: Utc::now(),
			record,
		};
		self.cache.insert(filename.clone(), entry);

		info!("Created worklist file {filename}");
		Ok(filename)
	}

	/// Lists all persisted records, newest first (ties break by filename).
	///
	/// Files already in the cache are returned unchanged. Unknown files are
	/// decoded and cached with the file modification time as creation time;
	/// files that fail to decode are listed as degraded stub records instead
	/// of aborting the whole listing.
	pub async fn list(&mut self) -> Result<Vec<WorklistEntry>, StoreError> {
		let mut entries = Vec::new();
		let mut dir = fs::read_dir(&self.dir).await?;

		while let Some(dirent) = dir.next_entry().await? {
			let path = dirent.path();
			if path.extension().and_then(|ext| ext.to_str()) != Some(WORKLIST_EXTENSION) {
				continue;
			}
			let Some(filename) = path
				.file_name()
				.and_then(|name| name.to_str())
				.map(ToOwned::to_owned)
			else {
				continue;
			};

			if let Some(entry) = self.cache.get(&filename) {
				entries.push(entry.clone());
				continue;
			}

			let modified = dirent
				.metadata()
				.await?
				.modified()
				.map_or_else(|_| Utc::now(), DateTime::from);
			let bytes = fs::read(&path).await?;
			let record = match codec::decode(&bytes) {
				Ok(record) => record,
				Err(err) => {
					warn!("Failed to decode {filename}, listing a degraded stub: {err}");
					stub_record(&filename, modified)
				}
			};

			let entry = WorklistEntry {
				filename: filename.clone(),
				created_at: modified,
				record,
			};
			self.cache.insert(filename, entry.clone());
			entries.push(entry);
		}

		entries.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| a.filename.cmp(&b.filename))
		});
		Ok(entries)
	}

	/// Removes a worklist file and evicts its cache entry.
	///
	/// `NotFound` depends solely on the filesystem, never on the cache.
	pub async fn delete(&mut self, filename: &str) -> Result<(), StoreError> {
		// The filename is caller-supplied; it must not escape the store directory.
		if filename.contains(['/', '\\']) || !Path::new(filename)
			.extension()
			.is_some_and(|ext| ext == WORKLIST_EXTENSION)
		{
			return Err(StoreError::NotFound(filename.to_owned()));
		}

		let path = self.dir.join(filename);
		match fs::remove_file(&path).await {
			Ok(()) => {
				self.cache.remove(filename);
				info!("Deleted worklist file {filename}");
				Ok(())
			}
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				// A stale cache entry must not mask the missing file.
				self.cache.remove(filename);
				Err(StoreError::NotFound(filename.to_owned()))
			}
			Err(err) => Err(err.into()),
		}
	}
}

/// Placeholder record for a file that exists but cannot be decoded.
/// Keeps the file visible (and deletable) in listings.
fn stub_record(filename: &str, modified: DateTime<Utc>) -> WorklistRecord {
	let stem = filename
		.strip_suffix(&format!(".{WORKLIST_EXTENSION}"))
		.unwrap_or(filename);
	WorklistRecord {
		accession_number: stem.to_owned(),
		patient_id: stem.to_owned(),
		scheduled_date: modified.format("%Y%m%d").to_string(),
		..WorklistRecord::default()
	}
}

/// Truncates a value to the 16 character SH/AE limit, with a warning.
fn clip(value: String, field: &str) -> String {
	if value.chars().count() <= MAX_SHORT_VALUE {
		value
	} else {
		warn!("{field} `{value}` exceeds {MAX_SHORT_VALUE} characters, truncating");
		value.chars().take(MAX_SHORT_VALUE).collect()
	}
}

/// `1980-01-01` → `19800101`. Strips separators only; no calendar validation.
fn dicom_date(value: &str) -> String {
	value.chars().filter(char::is_ascii_digit).collect()
}

/// `10:30` → `103000`. Strips separators and zero-pads seconds.
fn dicom_time(value: &str) -> String {
	let mut digits: String = value.chars().filter(char::is_ascii_digit).collect();
	if digits.is_empty() {
		return digits;
	}
	while digits.len() < 6 {
		digits.push('0');
	}
	digits.truncate(6);
	digits
}
