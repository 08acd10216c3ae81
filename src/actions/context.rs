/// Arguments threaded through to a command.
#[derive(Clone, Debug)]
pub struct Context<A = ()> {
	pub args_top: A,
}

impl Context {
	pub fn new() -> Self {
		Self { args_top: () }
	}
}

impl<A> Context<A> {
	pub fn with_top<C>(self, args_top: C) -> Context<C> {
		Context::<C> { args_top }
	}

	pub fn take_top(self) -> (A, Context<()>) {
		(self.args_top, Context::new())
	}
}
