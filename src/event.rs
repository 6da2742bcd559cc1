use core::cell::RefCell;
use std::rc::Rc;

/// A typed intent that views raise and the controller subscribes to.
pub struct Publisher<T> {
	handlers: RefCell<Vec<Rc<dyn Fn(T)>>>,
}

impl<T> Default for Publisher<T> {
	fn default() -> Self {
		Self { handlers: RefCell::new(Vec::new()) }
	}
}

impl<T: Clone> Publisher<T> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn subscribe(&self, handler: impl Fn(T) + 'static) {
		self.handlers.borrow_mut().push(Rc::new(handler));
	}

	/// Calls each handler with a clone of `value`.
	///
	/// Handlers may subscribe further handlers, which are only called for later values.
	pub fn publish(&self, value: T) {
		let handlers = self.handlers.borrow().clone();
		for handler in handlers {
			handler(value.clone());
		}
	}

	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.handlers.borrow().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use core::cell::Cell;

	#[test]
	fn reentrant_subscribe() {
		let publisher = Rc::new(Publisher::<u32>::new());
		let sum = Rc::new(Cell::new(0));
		publisher.subscribe({
			let publisher = Rc::downgrade(&publisher);
			let sum = Rc::clone(&sum);
			move |value| {
				sum.set(sum.get() + value);
				if let Some(publisher) = publisher.upgrade() {
					let sum = Rc::clone(&sum);
					publisher.subscribe(move |value| sum.set(sum.get() + 10 * value));
				}
			}
		});

		publisher.publish(1);
		assert_eq!(sum.get(), 1);
		publisher.publish(2);
		assert_eq!(sum.get(), 1 + 2 + 20);
	}
}
