//! The self-contained DICOM core: tag dictionary, UID generation, the
//! Part 10 record codec and the required-tag validator.
//!
//! Only the tag subset needed for the Modality Worklist information model is
//! implemented; anything else a file may contain is skipped on read.

pub mod codec;
pub mod dictionary;
pub mod uid;
pub mod validator;

/// Modality Worklist Information Model – FIND.
/// <https://dicom.nema.org/medical/dicom/current/output/chtml/part04/sect_K.6.html>
pub const MODALITY_WORKLIST_SOP_CLASS_UID: &str = "1.2.840.10008.5.1.4.31";

/// Explicit VR Little Endian, the only transfer syntax this codec writes.
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// Implicit VR Little Endian, accepted on read for files from legacy writers.
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
