use crate::event::Publisher;

/// The search form. It has no markup of its own; the host reads and clears the input field.
#[derive(Default)]
pub struct SearchView {
	submitted: Publisher<String>,
}

impl SearchView {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_handler_search(&self, handler: impl Fn(String) + 'static) {
		self.submitted.subscribe(handler);
	}

	pub fn submit(&self, query: &str) {
		self.submitted.publish(query.to_owned());
	}
}
