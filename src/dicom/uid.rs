use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The organizational root all generated UIDs live under.
pub const UID_ROOT: &str = "1.2.826.0.1.3680043.8.498";

/// Generates dotted-numeric UIDs for studies and SOP instances.
///
/// Each UID is the fixed root followed by the epoch seconds, twelve random
/// digits and a process-wide counter. The counter guarantees that no two
/// calls within the same process collide; the random component is not meant
/// to be unguessable, only unique. The result stays within the 64 character
/// UI limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct UidGenerator;

impl UidGenerator {
	pub const fn new() -> Self {
		Self
	}

	pub fn next(&self) -> String {
		static SEQUENCE: AtomicU64 = AtomicU64::new(0);

		let seconds = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.unwrap_or_default()
			.as_secs();
		let random = Uuid::new_v4().as_u128() % 1_000_000_000_000;
		let sequence = SEQUENCE.fetch_add(1, Ordering::SeqCst);
		format!("{UID_ROOT}.{seconds}.{random}.{sequence}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn uids_are_unique_within_a_process() {
		let generator = UidGenerator::new();
		let uids: HashSet<String> = (0..1000).map(|_| generator.next()).collect();
		assert_eq!(uids.len(), 1000);
	}

	#[test]
	fn uids_are_dotted_numeric_under_the_root() {
		let uid = UidGenerator::new().next();
		assert!(uid.starts_with(UID_ROOT));
		assert!(uid.len() <= 64);
		assert!(uid.chars().all(|c| c.is_ascii_digit() || c == '.'));
	}
}
