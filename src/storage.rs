use core::cell::RefCell;
use hashbrown::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
	#[error("storage is unavailable")]
	Unavailable,
	#[error("failed to write {key:?}: {reason}")]
	Write { key: String, reason: String },
}

/// String key-value persistence, like [***localStorage***](https://developer.mozilla.org/en-US/docs/Web/API/Window/localStorage).
pub trait Storage {
	/// # Errors
	///
	/// If the storage can't be accessed.
	fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// # Errors
	///
	/// If the storage can't be accessed or is full.
	fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
	entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}

impl Storage for MemoryStorage {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}
