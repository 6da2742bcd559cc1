//! The host environment: task spawning, timers and the navigable recipe id.

use core::time::Duration;
use futures::future::LocalBoxFuture;

pub trait Environment {
	/// Runs `task` on the event loop. Must not poll it synchronously.
	fn spawn(&self, task: LocalBoxFuture<'static, ()>);

	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

	/// The recipe id in the addressable location (the hash fragment in a browser), if any.
	fn location_id(&self) -> Option<String>;

	/// Changes the addressable location to `id` without signalling a location change.
	fn push_location_id(&self, id: &str);
}
